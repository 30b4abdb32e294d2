//! Kosh - Hindi dictionary backend
//!
//! Hindi headword collation, special-index extraction and the listing pipeline built on them.

pub mod alphabet;
pub mod collation;
pub mod vishesh;
pub mod content;
pub mod error;
pub mod store;
pub mod listing;
pub mod config;
pub mod state;

pub use alphabet::{AlphabetTable, Rank};
pub use collation::{hindi_locale, HindiCollator};
pub use vishesh::{extract_special_index, extract_special_index_json, split_terms};
pub use content::{KoshCategory, KoshContent, KoshSubCategory, NewKoshContent, Scope};
pub use error::{KoshError, Result};
pub use store::KoshStore;
pub use listing::{build_listing, KoshListing, ListingDefaults, ListingService, PageInfo, Pagination};
pub use config::{get_data_dir, Config};
pub use state::AppState;
