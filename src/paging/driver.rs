//! Minimal paging mechanism

use super::types::{Page, PagingState};
use crate::config::PagingConfig;
use crate::error::Result;
use crate::mediator::MediationEngine;
use crate::remote::RemoteFetcher;
use crate::store::CacheDatabase;
use crate::types::{InitializeAction, Item, LoadDirection, MediationOutcome};
use tracing::{debug, info};

/// Drives a [`MediationEngine`] the way a UI pager would
///
/// Loaded pages are always rebuilt from the local store after a load, never
/// from what the fetch returned. The driver does not retry failed loads.
pub struct PagingDriver<D, F> {
    engine: MediationEngine<D, F>,
    state: PagingState,
    exhausted: bool,
}

impl<D: CacheDatabase, F: RemoteFetcher> PagingDriver<D, F> {
    /// Create a new driver with nothing loaded
    pub fn new(engine: MediationEngine<D, F>, config: PagingConfig) -> Self {
        Self {
            engine,
            state: PagingState::empty(config),
            exhausted: false,
        }
    }

    /// Refresh if the engine asks for it, otherwise serve what is cached
    pub async fn start(&mut self) -> Result<Option<MediationOutcome>> {
        match self.engine.initialize()? {
            InitializeAction::LaunchInitialRefresh => self.refresh().await.map(Some),
            InitializeAction::SkipInitialRefresh => {
                info!(
                    "Serving cached partition '{}' without refresh",
                    self.engine.partition()
                );
                self.restore()?;
                Ok(None)
            }
        }
    }

    /// Load whatever the store already holds, without touching the remote
    pub fn restore(&mut self) -> Result<()> {
        self.reload()
    }

    /// Replace the partition with the first remote page
    pub async fn refresh(&mut self) -> Result<MediationOutcome> {
        let outcome = self.load(LoadDirection::Refresh).await?;
        if outcome.is_success() {
            self.exhausted = false;
        }
        Ok(outcome)
    }

    /// Load the page after the last loaded item
    pub async fn append(&mut self) -> Result<MediationOutcome> {
        let outcome = self.load(LoadDirection::Append).await?;
        if outcome.end_of_pagination_reached() == Some(true) {
            self.exhausted = true;
        }
        Ok(outcome)
    }

    /// Load the page before the first loaded item
    pub async fn prepend(&mut self) -> Result<MediationOutcome> {
        self.load(LoadDirection::Prepend).await
    }

    async fn load(&mut self, direction: LoadDirection) -> Result<MediationOutcome> {
        let outcome = self.engine.load(direction, &self.state).await?;
        if outcome.is_success() {
            self.reload()?;
        }
        Ok(outcome)
    }

    /// Rebuild the loaded pages from the store
    fn reload(&mut self) -> Result<()> {
        let partition = self.engine.partition().to_string();
        let items = self.engine.database().transaction(|tx| {
            let items = tx.items();
            let count = items.count_by_partition(&partition)?;
            items.items_by_partition(&partition, 0, count)
        })?;

        self.state.pages = paginate(items, &self.state.config);
        debug!(
            "Reloaded {} items in {} pages for '{}'",
            self.state.item_count(),
            self.state.pages.len(),
            partition
        );
        Ok(())
    }

    /// Items currently loaded, in order
    pub fn items(&self) -> Vec<&Item> {
        self.state.items().collect()
    }

    /// An append has reported the end of the list since the last refresh
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Get the current paging state
    pub fn state(&self) -> &PagingState {
        &self.state
    }

    /// Get the mediation engine
    pub fn engine(&self) -> &MediationEngine<D, F> {
        &self.engine
    }
}

/// Split items into a first page of `initial_load_size`, then `page_size` pages
fn paginate(items: Vec<Item>, config: &PagingConfig) -> Vec<Page> {
    let first = (config.initial_load_size as usize).max(1);
    let rest = (config.page_size as usize).max(1);

    let mut pages = Vec::new();
    let mut iter = items.into_iter();
    let head: Vec<Item> = iter.by_ref().take(first).collect();
    if head.is_empty() {
        return pages;
    }
    pages.push(Page::new(head));

    loop {
        let chunk: Vec<Item> = iter.by_ref().take(rest).collect();
        if chunk.is_empty() {
            break;
        }
        pages.push(Page::new(chunk));
    }
    pages
}
