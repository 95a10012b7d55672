//! Paging state handed to the mediator

use crate::config::PagingConfig;
use crate::types::Item;
use serde::Serialize;

/// One batch of items as loaded by the paging mechanism
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<Item>,
}

impl Page {
    /// Create a new page
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What the paging mechanism currently has loaded, plus its page sizes
#[derive(Debug, Clone, PartialEq)]
pub struct PagingState {
    /// Loaded pages in display order
    pub pages: Vec<Page>,
    pub config: PagingConfig,
}

impl PagingState {
    /// State with nothing loaded yet
    pub fn empty(config: PagingConfig) -> Self {
        Self {
            pages: Vec::new(),
            config,
        }
    }

    /// State over already loaded pages
    pub fn new(pages: Vec<Page>, config: PagingConfig) -> Self {
        Self { pages, config }
    }

    /// Last item of the last non-empty page
    pub fn last_item_or_none(&self) -> Option<&Item> {
        self.pages
            .iter()
            .rev()
            .find(|page| !page.is_empty())
            .and_then(|page| page.items.last())
    }

    /// First item of the first non-empty page
    pub fn first_item_or_none(&self) -> Option<&Item> {
        self.pages
            .iter()
            .find(|page| !page.is_empty())
            .and_then(|page| page.items.first())
    }

    /// Total number of loaded items
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }

    /// All loaded items in order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }
}
