//! Hindi collation for dictionary headwords
//!
//! Strings are ranked grapheme by grapheme against an [`AlphabetTable`]. Characters
//! outside the Devanagari block that don't start a table entry are skipped when
//! looking for the next grapheme to rank. Once neither side has anything left to
//! rank, the remainders are compared with the `hi` locale collator.

use crate::alphabet::AlphabetTable;
use crate::error::{KoshError, Result};
use icu::collator::{options::CollatorOptions, Collator, CollatorBorrowed};
use icu::locale::locale;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// CLDR collator for the `hi` locale, from the data compiled into the binary
pub fn hindi_locale() -> Result<CollatorBorrowed<'static>> {
    Collator::try_new(locale!("hi").into(), CollatorOptions::default())
        .map_err(|e| KoshError::Collation(format!("hi locale collator: {}", e)))
}

/// Three-way comparator over headwords. Cheap to clone; the table and the
/// locale collator are shared.
#[derive(Clone)]
pub struct HindiCollator {
    table: Arc<AlphabetTable>,
    locale: Arc<CollatorBorrowed<'static>>,
}

impl fmt::Debug for HindiCollator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HindiCollator")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl HindiCollator {
    pub fn new(table: Arc<AlphabetTable>, locale: Arc<CollatorBorrowed<'static>>) -> Self {
        Self { table, locale }
    }

    /// The built-in Hindi table with the `hi` locale collator
    pub fn hindi() -> Result<Self> {
        Ok(Self::new(
            Arc::new(AlphabetTable::hindi()),
            Arc::new(hindi_locale()?),
        ))
    }

    pub fn table(&self) -> &AlphabetTable {
        &self.table
    }

    /// Compare two optional headwords.
    ///
    /// Absent, empty and whitespace-only values sort after everything else and
    /// are equal to each other. Never panics.
    pub fn compare(&self, a: Option<&str>, b: Option<&str>) -> Ordering {
        let a = a.map(str::trim).filter(|s| !s.is_empty());
        let b = b.map(str::trim).filter(|s| !s.is_empty());

        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => self.compare_remainders(a, b),
        }
    }

    pub fn compare_str(&self, a: &str, b: &str) -> Ordering {
        self.compare(Some(a), Some(b))
    }

    /// Walk both strings one anchored grapheme at a time until the ranks differ.
    fn compare_remainders(&self, mut a: &str, mut b: &str) -> Ordering {
        loop {
            a = a.trim();
            b = b.trim();

            // An exhausted remainder is a prefix of the other side
            match (a.is_empty(), b.is_empty()) {
                (true, true) => return Ordering::Equal,
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                (false, false) => {}
            }

            let (anchor_a, anchor_b) = match (self.find_anchor(a), self.find_anchor(b)) {
                (None, None) => return self.locale_cmp(a, b),
                (None, Some(_)) => return Ordering::Greater,
                (Some(_), None) => return Ordering::Less,
                (Some(ia), Some(ib)) => (ia, ib),
            };

            let lead_a = self.table.lead_grapheme(&a[anchor_a..]);
            let lead_b = self.table.lead_grapheme(&b[anchor_b..]);

            match self.table.rank(lead_a).cmp(&self.table.rank(lead_b)) {
                Ordering::Equal => {
                    a = &a[anchor_a + lead_a.len()..];
                    b = &b[anchor_b + lead_b.len()..];
                }
                other => return other,
            }
        }
    }

    /// Byte offset of the first Devanagari char or table entry
    fn find_anchor(&self, text: &str) -> Option<usize> {
        text.char_indices()
            .find(|&(i, c)| is_devanagari(c) || self.table.starts_entry(&text[i..]))
            .map(|(i, _)| i)
    }

    /// Return a sorted copy of `entries`, leaving the input untouched.
    ///
    /// The sort is stable: entries with equal keys keep their input order, so
    /// repeated listings paginate identically.
    pub fn sort_by_key<T, F>(&self, entries: &[T], key: F) -> Vec<T>
    where
        T: Clone,
        F: Fn(&T) -> Option<&str>,
    {
        self.sort_owned(entries.to_vec(), key)
    }

    /// Like [`sort_by_key`](Self::sort_by_key) for data the caller already owns
    pub fn sort_owned<T, F>(&self, mut entries: Vec<T>, key: F) -> Vec<T>
    where
        F: Fn(&T) -> Option<&str>,
    {
        entries.sort_by(|a, b| self.compare(key(a), key(b)));
        entries
    }

    /// Locale comparison for remainders with no Devanagari content.
    ///
    /// Strings the collator considers equal fall back to code points, so the
    /// order stays total.
    pub fn locale_cmp(&self, a: &str, b: &str) -> Ordering {
        self.locale.compare(a, b).then_with(|| a.cmp(b))
    }
}
