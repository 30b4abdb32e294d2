//! Dictionary record types and listing scopes

use crate::error::{KoshError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KoshCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KoshSubCategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub created_at: String,
}

/// A dictionary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KoshContent {
    pub id: i64,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub headword: Option<String>,
    pub meaning: Option<String>,
    pub example: Option<String>,
    pub search_terms: Option<String>, // comma-separated
    pub created_at: String,
    pub updated_at: String,
}

impl KoshContent {
    pub fn headword(&self) -> Option<&str> {
        self.headword.as_deref()
    }

    pub fn search_terms(&self) -> Option<&str> {
        self.search_terms.as_deref()
    }
}

/// Insert/update payload for [`KoshContent`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewKoshContent {
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub headword: Option<String>,
    pub meaning: Option<String>,
    pub example: Option<String>,
    pub search_terms: Option<String>,
}

impl NewKoshContent {
    /// Reject entries with neither a headword nor a meaning
    pub fn validate(&self) -> Result<()> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        if blank(&self.headword) && blank(&self.meaning) {
            return Err(KoshError::InvalidInput(
                "content needs a headword or a meaning".to_string(),
            ));
        }
        Ok(())
    }
}

/// The set of records a listing covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Scope {
    Category(i64),
    SubCategory(i64),
    Search(String),
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Category(id) => write!(f, "category:{}", id),
            Scope::SubCategory(id) => write!(f, "subcategory:{}", id),
            Scope::Search(q) => write!(f, "search:{}", q),
        }
    }
}
