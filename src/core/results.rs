//! The selectable results list and the selection collector that reads it.
//!
//! Entries live in a flat `Vec` in the order the catalog returned them; the
//! UI renders that order as-is, so display order and storage order are the
//! same thing.

use super::resource::{Resource, SelectionPayload};

/// One row of the results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub resource: Resource,
    pub selected: bool,
}

/// Ordered, selectable list of catalog results.
#[derive(Debug, Clone, Default)]
pub struct ResultList {
    entries: Vec<ResultEntry>,
}

impl ResultList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry.  Called at the start of each search.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append a resource as a new, unselected row.
    pub fn insert_option(&mut self, resource: Resource) {
        self.entries.push(ResultEntry {
            resource,
            selected: false,
        });
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark a row selected or not.  Out-of-range indices are ignored.
    pub fn set_selected(&mut self, index: usize, selected: bool) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.selected = selected;
        }
    }

    /// Flip the selection of a row.  Out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.selected = !entry.selected;
        }
    }

    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected).count()
    }
}

/// Build a payload from the selected rows, in display order.
///
/// Returns `None` when nothing is selected: an empty selection never turns
/// into a response (that is what cancel is for).
pub fn collect_selection(list: &ResultList) -> Option<SelectionPayload> {
    let results: Vec<Resource> = list
        .entries()
        .iter()
        .filter(|e| e.selected)
        .map(|e| e.resource.clone())
        .collect();
    if results.is_empty() {
        None
    } else {
        Some(SelectionPayload::new(results))
    }
}
