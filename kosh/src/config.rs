//! Runtime configuration read from `KOSH_*` environment variables

use crate::alphabet::AlphabetTable;
use crate::error::{KoshError, Result};
use crate::listing::ListingDefaults;
use std::path::PathBuf;

const DB_FILE_NAME: &str = "kosh.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub bind_addr: String,
    /// JSON array of graphemes replacing the built-in Hindi table
    pub alphabet_path: Option<PathBuf>,
    pub listing: ListingDefaults,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("KOSH_DATA_DIR").map(PathBuf::from).unwrap_or_else(get_data_dir);
        let db_path = get("KOSH_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));
        let bind_addr = get("KOSH_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let alphabet_path = get("KOSH_ALPHABET_PATH").map(PathBuf::from);

        let defaults = ListingDefaults::default();
        let listing = ListingDefaults {
            default_limit: parse_limit("KOSH_DEFAULT_LIMIT", get("KOSH_DEFAULT_LIMIT"))?
                .unwrap_or(defaults.default_limit),
            max_limit: parse_limit("KOSH_MAX_LIMIT", get("KOSH_MAX_LIMIT"))?
                .unwrap_or(defaults.max_limit),
        };

        if listing.default_limit > listing.max_limit {
            return Err(KoshError::Config(format!(
                "default limit {} exceeds max limit {}",
                listing.default_limit, listing.max_limit
            )));
        }

        Ok(Self {
            data_dir,
            db_path,
            bind_addr,
            alphabet_path,
            listing,
        })
    }

    /// The configured table, or the built-in Hindi one
    pub fn load_alphabet(&self) -> Result<AlphabetTable> {
        match &self.alphabet_path {
            Some(path) => AlphabetTable::from_json_file(path),
            None => Ok(AlphabetTable::hindi()),
        }
    }
}

fn parse_limit(key: &str, value: Option<String>) -> Result<Option<usize>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().parse::<usize>() {
        Ok(0) => Err(KoshError::Config(format!("{} must be positive", key))),
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(KoshError::Config(format!("{} is not a number: {:?}", key, value))),
    }
}

/// Get the data directory
///
/// - Development: an existing `data/` folder holding kosh.db
/// - Otherwise: the platform data dir (e.g. ~/.local/share/Kosh)
/// - Fallback: `data` in the working directory
pub fn get_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        let dev_paths = [PathBuf::from("data"), PathBuf::from("../data")];
        for path in &dev_paths {
            if path.join(DB_FILE_NAME).exists() {
                return path.canonicalize().unwrap_or_else(|_| path.clone());
            }
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("Kosh");
    }

    PathBuf::from("data")
}
