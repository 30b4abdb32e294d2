//! SQLite persistence for categories, subcategories and dictionary contents

use crate::content::{KoshCategory, KoshContent, KoshSubCategory, NewKoshContent, Scope};
use crate::error::{KoshError, Result};
use crate::vishesh::split_terms;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

const CONTENT_COLUMNS: &str = "id, category_id, subcategory_id, headword, meaning, example, search_terms, created_at, updated_at";

fn row_to_content(row: &Row) -> rusqlite::Result<KoshContent> {
    Ok(KoshContent {
        id: row.get(0)?,
        category_id: row.get(1)?,
        subcategory_id: row.get(2)?,
        headword: row.get(3)?,
        meaning: row.get(4)?,
        example: row.get(5)?,
        search_terms: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn row_to_category(row: &Row) -> rusqlite::Result<KoshCategory> {
    Ok(KoshCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn row_to_subcategory(row: &Row) -> rusqlite::Result<KoshSubCategory> {
    Ok(KoshSubCategory {
        id: row.get(0)?,
        category_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Handle to the Kosh database. Each call opens its own connection.
#[derive(Debug, Clone)]
pub struct KoshStore {
    db_path: PathBuf,
}

impl KoshStore {
    /// Open the database at `db_path`, creating the file and schema if missing
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self { db_path };
        store.init_schema()?;
        tracing::debug!("Opened Kosh database at {:?}", store.db_path);
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kosh_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kosh_subcategories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER NOT NULL REFERENCES kosh_categories(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Dictionary entries; search_terms is the comma-separated tag field
            CREATE TABLE IF NOT EXISTS kosh_contents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER NOT NULL REFERENCES kosh_categories(id) ON DELETE CASCADE,
                subcategory_id INTEGER REFERENCES kosh_subcategories(id) ON DELETE SET NULL,
                headword TEXT,
                meaning TEXT,
                example TEXT,
                search_terms TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_kosh_subcategories_category
            ON kosh_subcategories(category_id);

            CREATE INDEX IF NOT EXISTS idx_kosh_contents_category
            ON kosh_contents(category_id);

            CREATE INDEX IF NOT EXISTS idx_kosh_contents_subcategory
            ON kosh_contents(subcategory_id);
            "#,
        )?;

        Ok(())
    }

    // === Categories ===

    pub fn create_category(&self, name: &str, description: Option<&str>) -> Result<KoshCategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KoshError::InvalidInput("category name is empty".to_string()));
        }

        let conn = self.connection()?;
        let created_at = now();
        conn.execute(
            "INSERT INTO kosh_categories (name, description, created_at) VALUES (?1, ?2, ?3)",
            params![name, description, created_at],
        )?;

        Ok(KoshCategory {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at,
        })
    }

    pub fn get_category(&self, id: i64) -> Result<Option<KoshCategory>> {
        let conn = self.connection()?;
        let category = conn
            .query_row(
                "SELECT id, name, description, created_at FROM kosh_categories WHERE id = ?1",
                params![id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    pub fn list_categories(&self) -> Result<Vec<KoshCategory>> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT id, name, description, created_at FROM kosh_categories ORDER BY id")?;
        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    // === Subcategories ===

    pub fn create_subcategory(&self, category_id: i64, name: &str) -> Result<KoshSubCategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KoshError::InvalidInput("subcategory name is empty".to_string()));
        }
        self.require_category(category_id)?;

        let conn = self.connection()?;
        let created_at = now();
        conn.execute(
            "INSERT INTO kosh_subcategories (category_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![category_id, name, created_at],
        )?;

        Ok(KoshSubCategory {
            id: conn.last_insert_rowid(),
            category_id,
            name: name.to_string(),
            created_at,
        })
    }

    pub fn get_subcategory(&self, id: i64) -> Result<Option<KoshSubCategory>> {
        let conn = self.connection()?;
        let subcategory = conn
            .query_row(
                "SELECT id, category_id, name, created_at FROM kosh_subcategories WHERE id = ?1",
                params![id],
                row_to_subcategory,
            )
            .optional()?;
        Ok(subcategory)
    }

    pub fn list_subcategories(&self, category_id: i64) -> Result<Vec<KoshSubCategory>> {
        self.require_category(category_id)?;

        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, category_id, name, created_at FROM kosh_subcategories
             WHERE category_id = ?1 ORDER BY id",
        )?;
        let subcategories = stmt
            .query_map(params![category_id], row_to_subcategory)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(subcategories)
    }

    fn require_category(&self, id: i64) -> Result<KoshCategory> {
        self.get_category(id)?
            .ok_or_else(|| KoshError::NotFound(format!("category {}", id)))
    }

    fn require_subcategory(&self, id: i64) -> Result<KoshSubCategory> {
        self.get_subcategory(id)?
            .ok_or_else(|| KoshError::NotFound(format!("subcategory {}", id)))
    }

    // === Contents ===

    /// Check the parent references of a content payload
    fn check_parents(&self, new: &NewKoshContent) -> Result<()> {
        new.validate()?;
        self.require_category(new.category_id)?;

        if let Some(subcategory_id) = new.subcategory_id {
            let subcategory = self.require_subcategory(subcategory_id)?;
            if subcategory.category_id != new.category_id {
                return Err(KoshError::InvalidInput(format!(
                    "subcategory {} does not belong to category {}",
                    subcategory_id, new.category_id
                )));
            }
        }
        Ok(())
    }

    pub fn create_content(&self, new: &NewKoshContent) -> Result<KoshContent> {
        self.check_parents(new)?;

        let conn = self.connection()?;
        let timestamp = now();
        conn.execute(
            "INSERT INTO kosh_contents
                (category_id, subcategory_id, headword, meaning, example, search_terms, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                new.category_id,
                new.subcategory_id,
                new.headword,
                new.meaning,
                new.example,
                new.search_terms,
                timestamp
            ],
        )?;

        Ok(KoshContent {
            id: conn.last_insert_rowid(),
            category_id: new.category_id,
            subcategory_id: new.subcategory_id,
            headword: new.headword.clone(),
            meaning: new.meaning.clone(),
            example: new.example.clone(),
            search_terms: new.search_terms.clone(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    pub fn get_content(&self, id: i64) -> Result<Option<KoshContent>> {
        let conn = self.connection()?;
        let content = conn
            .query_row(
                &format!("SELECT {} FROM kosh_contents WHERE id = ?1", CONTENT_COLUMNS),
                params![id],
                row_to_content,
            )
            .optional()?;
        Ok(content)
    }

    pub fn update_content(&self, id: i64, new: &NewKoshContent) -> Result<KoshContent> {
        self.check_parents(new)?;

        let conn = self.connection()?;
        let updated = conn.execute(
            "UPDATE kosh_contents
             SET category_id = ?1, subcategory_id = ?2, headword = ?3, meaning = ?4,
                 example = ?5, search_terms = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                new.category_id,
                new.subcategory_id,
                new.headword,
                new.meaning,
                new.example,
                new.search_terms,
                now(),
                id
            ],
        )?;

        if updated == 0 {
            return Err(KoshError::NotFound(format!("content {}", id)));
        }
        self.get_content(id)?
            .ok_or_else(|| KoshError::NotFound(format!("content {}", id)))
    }

    pub fn delete_content(&self, id: i64) -> Result<()> {
        let conn = self.connection()?;
        let deleted = conn.execute("DELETE FROM kosh_contents WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(KoshError::NotFound(format!("content {}", id)));
        }
        Ok(())
    }

    pub fn content_count(&self) -> Result<u64> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM kosh_contents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Every record in `scope`, in storage order.
    ///
    /// Never paginates: callers sort the full set before slicing.
    pub fn fetch_scope(&self, scope: &Scope) -> Result<Vec<KoshContent>> {
        let contents = match scope {
            Scope::Category(id) => {
                self.require_category(*id)?;
                self.query_contents("WHERE category_id = ?1", *id)?
            }
            Scope::SubCategory(id) => {
                self.require_subcategory(*id)?;
                self.query_contents("WHERE subcategory_id = ?1", *id)?
            }
            Scope::Search(query) => self.search_contents(query)?,
        };

        tracing::debug!("Fetched {} contents for {}", contents.len(), scope);
        Ok(contents)
    }

    fn query_contents(&self, filter: &str, id: i64) -> Result<Vec<KoshContent>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM kosh_contents {} ORDER BY id",
            CONTENT_COLUMNS, filter
        ))?;
        let contents = stmt
            .query_map(params![id], row_to_content)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(contents)
    }

    /// Case-insensitive substring match on headword or meaning, or an exact search-term match
    fn search_contents(&self, query: &str) -> Result<Vec<KoshContent>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(KoshError::InvalidQuery("search query is empty".to_string()));
        }
        let needle = query.to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .map_or(false, |v| v.to_lowercase().contains(&needle))
        };

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM kosh_contents ORDER BY id",
            CONTENT_COLUMNS
        ))?;

        let contents = stmt
            .query_map([], row_to_content)?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .filter(|c| {
                contains(&c.headword)
                    || contains(&c.meaning)
                    || c.search_terms().map_or(false, |raw| split_terms(raw).any(|t| t == query))
            })
            .collect();

        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (tempfile::TempDir, KoshStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = KoshStore::open(dir.path().join("kosh.db")).unwrap();
        (dir, store)
    }

    fn content(category_id: i64, headword: &str, terms: Option<&str>) -> NewKoshContent {
        NewKoshContent {
            category_id,
            headword: Some(headword.to_string()),
            meaning: Some(format!("meaning of {}", headword)),
            search_terms: terms.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_is_idempotent() {
        let (dir, store) = open_store();
        store.create_category("शब्दकोश", None).unwrap();

        let reopened = KoshStore::open(dir.path().join("kosh.db")).unwrap();
        assert_eq!(reopened.list_categories().unwrap().len(), 1);
    }

    #[test]
    fn test_create_and_fetch_by_scope() {
        let (_dir, store) = open_store();
        let category = store.create_category("संस्कृत", Some("धातु")).unwrap();
        let sub = store.create_subcategory(category.id, "क्रिया").unwrap();

        store.create_content(&content(category.id, "पठति", None)).unwrap();
        let mut in_sub = content(category.id, "गच्छति", Some("गम्, जाना"));
        in_sub.subcategory_id = Some(sub.id);
        let created = store.create_content(&in_sub).unwrap();

        let all = store.fetch_scope(&Scope::Category(category.id)).unwrap();
        assert_eq!(all.len(), 2);

        let only_sub = store.fetch_scope(&Scope::SubCategory(sub.id)).unwrap();
        assert_eq!(only_sub, vec![created.clone()]);

        assert_eq!(store.get_content(created.id).unwrap(), Some(created));
        assert_eq!(store.content_count().unwrap(), 2);
        assert_eq!(store.list_subcategories(category.id).unwrap(), vec![sub]);
    }

    #[test]
    fn test_missing_scope_is_not_found() {
        let (_dir, store) = open_store();
        assert!(matches!(store.fetch_scope(&Scope::Category(42)), Err(KoshError::NotFound(_))));
        assert!(matches!(store.fetch_scope(&Scope::SubCategory(42)), Err(KoshError::NotFound(_))));
        assert!(matches!(store.list_subcategories(42), Err(KoshError::NotFound(_))));
    }

    #[test]
    fn test_content_validation() {
        let (_dir, store) = open_store();
        let a = store.create_category("a", None).unwrap();
        let b = store.create_category("b", None).unwrap();
        let sub_of_b = store.create_subcategory(b.id, "x").unwrap();

        let mut wrong_parent = content(a.id, "कमल", None);
        wrong_parent.subcategory_id = Some(sub_of_b.id);
        assert!(matches!(store.create_content(&wrong_parent), Err(KoshError::InvalidInput(_))));

        assert!(matches!(store.create_content(&content(99, "कमल", None)), Err(KoshError::NotFound(_))));
        assert!(matches!(store.create_category("  ", None), Err(KoshError::InvalidInput(_))));
        assert!(matches!(store.create_subcategory(a.id, ""), Err(KoshError::InvalidInput(_))));
    }

    #[test]
    fn test_search_scope() {
        let (_dir, store) = open_store();
        let category = store.create_category("kosh", None).unwrap();
        store.create_content(&content(category.id, "कमल", Some("पुष्प, जल"))).unwrap();
        store.create_content(&content(category.id, "Lotus", None)).unwrap();
        store.create_content(&content(category.id, "जलज", None)).unwrap();

        let by_headword = store.fetch_scope(&Scope::Search("lotus".to_string())).unwrap();
        assert_eq!(by_headword.len(), 1);

        // "जल" matches the term of कमल and the headword substring of जलज
        let by_term = store.fetch_scope(&Scope::Search(" जल ".to_string())).unwrap();
        let headwords: Vec<_> = by_term.iter().filter_map(|c| c.headword()).collect();
        assert_eq!(headwords, vec!["कमल", "जलज"]);

        // Terms match whole, not by substring
        assert!(store.fetch_scope(&Scope::Search("पुष्".to_string())).unwrap().is_empty());

        assert!(matches!(
            store.fetch_scope(&Scope::Search("  ".to_string())),
            Err(KoshError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_update_and_delete() {
        let (_dir, store) = open_store();
        let category = store.create_category("kosh", None).unwrap();
        let created = store.create_content(&content(category.id, "कमल", None)).unwrap();

        let updated = store
            .update_content(created.id, &content(category.id, "कमला", Some("लक्ष्मी")))
            .unwrap();
        assert_eq!(updated.headword.as_deref(), Some("कमला"));
        assert_eq!(updated.search_terms(), Some("लक्ष्मी"));
        assert_eq!(updated.created_at, created.created_at);

        assert!(matches!(
            store.update_content(999, &content(category.id, "x", None)),
            Err(KoshError::NotFound(_))
        ));

        store.delete_content(created.id).unwrap();
        assert_eq!(store.get_content(created.id).unwrap(), None);
        assert!(matches!(store.delete_content(created.id), Err(KoshError::NotFound(_))));
    }
}
