//! Devanagari alphabet table defining the traditional sort sequence

use crate::error::{KoshError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Independent vowels in varnamala order
const VOWELS: [&str; 11] = ["अ", "आ", "इ", "ई", "उ", "ऊ", "ऋ", "ए", "ऐ", "ओ", "औ"];

/// Simple consonants in varnamala order
const CONSONANTS: [&str; 33] = [
    "क", "ख", "ग", "घ", "ङ",
    "च", "छ", "ज", "झ", "ञ",
    "ट", "ठ", "ड", "ढ", "ण",
    "त", "थ", "द", "ध", "न",
    "प", "फ", "ब", "भ", "म",
    "य", "र", "ल", "व",
    "श", "ष", "स", "ह",
];

/// Conjuncts recited after ह
const CONJUNCTS: [&str; 4] = ["क्ष", "त्र", "ज्ञ", "श्र"];

/// Dependent signs: anusvara, chandrabindu, visarga, matras, virama
const SIGNS: [&str; 14] = [
    "\u{0902}", "\u{0901}", "\u{0903}",
    "\u{093E}", "\u{093F}", "\u{0940}", "\u{0941}", "\u{0942}", "\u{0943}",
    "\u{0947}", "\u{0948}", "\u{094B}", "\u{094C}",
    "\u{094D}",
];

/// Position of a grapheme in an [`AlphabetTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(u32);

impl Rank {
    /// Rank of any grapheme missing from the table. Greater than every real rank.
    pub const UNKNOWN: Rank = Rank(u32::MAX);

    pub fn is_known(self) -> bool {
        self != Rank::UNKNOWN
    }
}

/// Ordered grapheme table. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AlphabetTable {
    ranks: HashMap<String, Rank>,
    /// Multi-char entries, longest first, so the longest prefix wins
    compounds: Vec<String>,
    entries: Vec<String>,
}

impl AlphabetTable {
    /// Build a table from graphemes in ascending order.
    ///
    /// Duplicates keep their first rank. Blank entries and empty tables are rejected.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();

        if entries.is_empty() {
            return Err(KoshError::InvalidAlphabet("table has no entries".to_string()));
        }
        if let Some(pos) = entries.iter().position(|e| e.trim().is_empty()) {
            return Err(KoshError::InvalidAlphabet(format!(
                "entry {} is blank",
                pos
            )));
        }

        Ok(Self::build(entries))
    }

    /// The traditional Hindi sequence: vowels, simple consonants, conjuncts, then dependent signs.
    pub fn hindi() -> Self {
        let entries = VOWELS
            .iter()
            .chain(CONSONANTS.iter())
            .chain(CONJUNCTS.iter())
            .chain(SIGNS.iter())
            .map(|s| s.to_string())
            .collect();
        Self::build(entries)
    }

    /// Load a table from a JSON array of strings
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<String> = serde_json::from_str(&content)
            .map_err(|e| KoshError::InvalidAlphabet(format!("{:?}: {}", path, e)))?;
        Self::new(entries)
    }

    fn build(entries: Vec<String>) -> Self {
        let mut ranks: HashMap<String, Rank> = HashMap::with_capacity(entries.len());
        let mut unique: Vec<String> = Vec::with_capacity(entries.len());

        for entry in entries {
            if ranks.contains_key(&entry) {
                continue;
            }
            ranks.insert(entry.clone(), Rank(unique.len() as u32));
            unique.push(entry);
        }

        let mut compounds: Vec<String> = unique
            .iter()
            .filter(|e| e.chars().count() > 1)
            .cloned()
            .collect();
        compounds.sort_by(|a, b| b.len().cmp(&a.len()));

        Self {
            ranks,
            compounds,
            entries: unique,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn rank(&self, grapheme: &str) -> Rank {
        self.ranks.get(grapheme).copied().unwrap_or(Rank::UNKNOWN)
    }

    /// The sorting unit at the start of `text`.
    ///
    /// Compound entries are tried before single chars, so "क्षत्र" yields "क्ष", not "क".
    /// Returns "" for empty input.
    pub fn lead_grapheme<'a>(&self, text: &'a str) -> &'a str {
        if let Some(compound) = self.compounds.iter().find(|c| text.starts_with(c.as_str())) {
            return &text[..compound.len()];
        }
        match text.chars().next() {
            Some(c) => &text[..c.len_utf8()],
            None => "",
        }
    }

    /// Whether some table entry is a prefix of `text`
    pub fn starts_entry(&self, text: &str) -> bool {
        !text.is_empty() && self.ranks.contains_key(self.lead_grapheme(text))
    }
}

impl Default for AlphabetTable {
    fn default() -> Self {
        Self::hindi()
    }
}
