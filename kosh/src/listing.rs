//! Listing pipeline: fetch a full scope, sort by headword, build the special index, paginate

use crate::collation::HindiCollator;
use crate::content::{KoshContent, Scope};
use crate::error::Result;
use crate::store::KoshStore;
use crate::vishesh::extract_special_index;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDefaults {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for ListingDefaults {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// Requested page, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    /// Page defaults to 1, limit to `defaults.default_limit`; limit is clamped to `1..=max_limit`
    pub fn new(page: Option<usize>, limit: Option<usize>, defaults: &ListingDefaults) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(defaults.default_limit)
            .clamp(1, defaults.max_limit.max(1));
        Self { page, limit }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn page_info(&self, total_count: usize) -> PageInfo {
        PageInfo {
            current_page: self.page,
            total_pages: total_count.div_ceil(self.limit),
            total_count,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KoshListing {
    pub contents: Vec<KoshContent>,
    pub vishesh_suchi: Vec<String>,
    pub pagination: PageInfo,
}

/// Sort, index and paginate an already fetched scope.
///
/// `contents` must be the whole scope; the order of a page depends on every record in it.
pub fn build_listing(
    collator: &HindiCollator,
    contents: Vec<KoshContent>,
    pagination: Pagination,
) -> KoshListing {
    let vishesh_suchi = extract_special_index(&contents, KoshContent::search_terms);
    let sorted = collator.sort_owned(contents, KoshContent::headword);
    let page_info = pagination.page_info(sorted.len());

    let contents = sorted
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.limit)
        .collect();

    KoshListing {
        contents,
        vishesh_suchi,
        pagination: page_info,
    }
}

/// Shared by every listing endpoint
#[derive(Debug, Clone)]
pub struct ListingService {
    store: KoshStore,
    collator: HindiCollator,
}

impl ListingService {
    pub fn new(store: KoshStore, collator: HindiCollator) -> Self {
        Self { store, collator }
    }

    pub fn list(&self, scope: &Scope, pagination: Pagination) -> Result<KoshListing> {
        let contents = self.store.fetch_scope(scope)?;
        let listing = build_listing(&self.collator, contents, pagination);

        tracing::debug!(
            "Listed {}: page {}/{} of {} contents, {} special index terms",
            scope,
            listing.pagination.current_page,
            listing.pagination.total_pages,
            listing.pagination.total_count,
            listing.vishesh_suchi.len()
        );
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::NewKoshContent;
    use crate::error::KoshError;

    const HEADWORDS: [&str; 25] = [
        "पठति", "गच्छति", "अमृत", "कमल", "क्षमा", "ज्ञान", "आम", "इमली", "उल्लू", "एक",
        "ओस", "औषधि", "खग", "घर", "चन्द्र", "जल", "टमाटर", "तारा", "दीपक", "नदी",
        "फल", "बादल", "मन", "वन", "हंस",
    ];

    fn record(id: i64, headword: Option<&str>, terms: Option<&str>) -> KoshContent {
        KoshContent {
            id,
            category_id: 1,
            subcategory_id: None,
            headword: headword.map(str::to_string),
            meaning: None,
            example: None,
            search_terms: terms.map(str::to_string),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn headwords(listing: &KoshListing) -> Vec<&str> {
        listing
            .contents
            .iter()
            .map(|c| c.headword().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let defaults = ListingDefaults::default();
        assert_eq!(Pagination::new(None, None, &defaults), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(0), Some(0), &defaults), Pagination { page: 1, limit: 1 });
        assert_eq!(Pagination::new(Some(3), Some(500), &defaults), Pagination { page: 3, limit: 100 });
        assert_eq!(Pagination::new(Some(3), Some(10), &defaults).offset(), 20);
    }

    #[test]
    fn test_page_info() {
        let p = Pagination { page: 1, limit: 10 };
        assert_eq!(p.page_info(25).total_pages, 3);
        assert_eq!(p.page_info(20).total_pages, 2);
        assert_eq!(p.page_info(0).total_pages, 0);
    }

    #[test]
    fn test_build_listing_sorts_before_paginating() {
        let collator = HindiCollator::hindi().unwrap();
        let records = vec![
            record(1, Some("पठति"), Some("पढ़ना")),
            record(2, Some("गच्छति"), Some("जाना, गम्")),
            record(3, Some(""), None),
            record(4, Some("अमृत"), Some("जाना")),
        ];

        let listing = build_listing(&collator, records, Pagination { page: 1, limit: 10 });
        assert_eq!(headwords(&listing), vec!["अमृत", "गच्छति", "पठति", ""]);
        assert_eq!(listing.vishesh_suchi, vec!["गम्", "जाना", "पढ़ना"]);
        assert_eq!(
            listing.pagination,
            PageInfo { current_page: 1, total_pages: 1, total_count: 4, limit: 10 }
        );
    }

    #[test]
    fn test_pages_partition_the_sorted_scope() {
        let collator = HindiCollator::hindi().unwrap();
        let records: Vec<KoshContent> = HEADWORDS
            .iter()
            .enumerate()
            .map(|(i, h)| record(i as i64, Some(*h), Some(*h)))
            .collect();

        let full = build_listing(&collator, records.clone(), Pagination { page: 1, limit: 100 });
        let pages: Vec<KoshListing> = (1..=4)
            .map(|page| build_listing(&collator, records.clone(), Pagination { page, limit: 10 }))
            .collect();

        assert_eq!(pages[0].pagination.total_pages, 3);
        assert_eq!(pages[0].contents.len(), 10);
        assert_eq!(pages[2].contents.len(), 5);
        assert!(pages[3].contents.is_empty());

        let stitched: Vec<&str> = pages.iter().flat_map(headwords).collect();
        assert_eq!(stitched, headwords(&full));
        assert_eq!(stitched[0], "अमृत");
        assert_eq!(stitched[24], "ज्ञान");

        for page in &pages {
            assert_eq!(page.vishesh_suchi, full.vishesh_suchi);
            assert_eq!(page.pagination.total_count, 25);
        }
    }

    #[test]
    fn test_listing_json_shape() {
        let collator = HindiCollator::hindi().unwrap();
        let listing = build_listing(&collator, Vec::new(), Pagination { page: 2, limit: 5 });
        let json = serde_json::to_value(&listing).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "contents": [],
                "vishesh_suchi": [],
                "pagination": { "current_page": 2, "total_pages": 0, "total_count": 0, "limit": 5 }
            })
        );
    }

    #[test]
    fn test_service_lists_store_scope() {
        let dir = tempfile::tempdir().unwrap();
        let store = KoshStore::open(dir.path().join("kosh.db")).unwrap();
        let category = store.create_category("kosh", None).unwrap();
        for (headword, terms) in [("पठति", "पढ़ना"), ("अमृत", "अमर, सुधा"), ("कमल", "सुधा")] {
            store
                .create_content(&NewKoshContent {
                    category_id: category.id,
                    headword: Some(headword.to_string()),
                    search_terms: Some(terms.to_string()),
                    ..Default::default()
                })
                .unwrap();
        }

        let service = ListingService::new(store, HindiCollator::hindi().unwrap());
        let listing = service
            .list(&Scope::Category(category.id), Pagination { page: 1, limit: 2 })
            .unwrap();

        assert_eq!(headwords(&listing), vec!["अमृत", "कमल"]);
        assert_eq!(listing.vishesh_suchi, vec!["अमर", "पढ़ना", "सुधा"]);
        assert_eq!(listing.pagination.total_pages, 2);

        assert!(matches!(
            service.list(&Scope::Category(category.id + 1), Pagination { page: 1, limit: 2 }),
            Err(KoshError::NotFound(_))
        ));
    }
}
