//! Curated ASIN collection for the scan configuration form.
//!
//! The set is ordered for display, unique by construction, and every member
//! has passed validation. Pagination is a pure view over the set: the page
//! count is recomputed and the current page re-clamped on every mutation.

use std::collections::HashSet;

use crate::domain::value_objects::{Asin, AsinError};

/// Entries shown per page, matching the form's table view.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Rejection reasons for interactive entry. Both are reported to the
/// operator rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierSetError {
    #[error(transparent)]
    Invalid(#[from] AsinError),
    #[error("{0} is already in the list")]
    Duplicate(Asin),
}

/// Deduplicated, validated, paginated ASIN collection.
#[derive(Debug, Clone)]
pub struct IdentifierSet {
    entries: Vec<Asin>,
    seen: HashSet<Asin>,
    page_size: usize,
    current_page: usize,
}

impl Default for IdentifierSet {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl IdentifierSet {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[Asin] {
        &self.entries
    }

    #[must_use]
    pub fn contains(&self, asin: &Asin) -> bool {
        self.seen.contains(asin)
    }

    /// `max(1, ceil(len / page_size))`: an empty set still renders page 1.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(self.page_size).max(1)
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Entries visible on the current page.
    #[must_use]
    pub fn page_items(&self) -> &[Asin] {
        let start = (self.current_page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.entries.len());
        if start >= self.entries.len() {
            &[]
        } else {
            &self.entries[start..end]
        }
    }

    /// Moves the view to `page`, clamped into `[1, page_count]`.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.page_count());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    /// Validates and appends a single token, then moves the view to the page
    /// showing the new entry.
    ///
    /// # Errors
    /// Rejects tokens failing the ASIN pattern and tokens already present.
    pub fn add_one(&mut self, raw: &str) -> Result<(), IdentifierSetError> {
        let asin = Asin::parse(raw)?;
        if self.seen.contains(&asin) {
            return Err(IdentifierSetError::Duplicate(asin));
        }
        self.seen.insert(asin.clone());
        self.entries.push(asin);
        self.current_page = self.page_count();
        Ok(())
    }

    /// Removes by position in the full set, not the current page slice.
    pub fn remove_at(&mut self, index: usize) -> Option<Asin> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.seen.remove(&removed);
        self.clamp_page();
        Some(removed)
    }

    /// Unions already-validated entries into the set (bulk import).
    /// Duplicates are dropped silently; returns how many were added.
    pub fn merge(&mut self, imported: impl IntoIterator<Item = Asin>) -> usize {
        let mut added = 0;
        for asin in imported {
            if self.seen.insert(asin.clone()) {
                self.entries.push(asin);
                added += 1;
            }
        }
        if added > 0 {
            self.current_page = self.page_count();
        } else {
            self.clamp_page();
        }
        added
    }

    /// Replaces the whole set with the imported entries (explicit reset-import).
    pub fn replace(&mut self, imported: impl IntoIterator<Item = Asin>) {
        self.entries.clear();
        self.seen.clear();
        self.merge(imported);
        self.current_page = self.page_count();
    }

    /// Clears the set and resets the view to page 1.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.seen.clear();
        self.current_page = 1;
    }

    fn clamp_page(&mut self) {
        self.current_page = self.current_page.clamp(1, self.page_count());
    }
}
