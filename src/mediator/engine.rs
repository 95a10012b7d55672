//! Remote mediation engine

use crate::error::Result;
use crate::paging::PagingState;
use crate::remote::{FetchRequest, RemoteFetcher};
use crate::store::CacheDatabase;
use crate::types::{Cursor, InitializeAction, LoadDirection, MediationOutcome, RemoteKey};
use tracing::{debug, warn};

/// Decides what to fetch for a load request and merges it into the store
///
/// Loads for one partition must be serialized by the caller.
pub struct MediationEngine<D, F> {
    database: D,
    fetcher: F,
    partition: String,
    refresh_on_start: bool,
}

impl<D: CacheDatabase, F: RemoteFetcher> MediationEngine<D, F> {
    /// Create a new engine for one partition
    pub fn new(database: D, fetcher: F, partition: impl Into<String>) -> Self {
        Self {
            database,
            fetcher,
            partition: partition.into(),
            refresh_on_start: true,
        }
    }

    /// Whether `initialize` always asks for a refresh
    #[must_use]
    pub fn with_refresh_on_start(mut self, refresh_on_start: bool) -> Self {
        self.refresh_on_start = refresh_on_start;
        self
    }

    /// Get the partition this engine loads
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Get the cache database
    pub fn database(&self) -> &D {
        &self.database
    }

    /// Get the remote fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// What the paging mechanism should do before its first load
    pub fn initialize(&self) -> Result<InitializeAction> {
        if self.refresh_on_start {
            return Ok(InitializeAction::LaunchInitialRefresh);
        }

        let cached = self
            .database
            .transaction(|tx| tx.items().count_by_partition(&self.partition))?;

        Ok(if cached == 0 {
            InitializeAction::LaunchInitialRefresh
        } else {
            InitializeAction::SkipInitialRefresh
        })
    }

    /// Serve one load request from the paging mechanism
    ///
    /// Fetch failures are reported as [`MediationOutcome::Error`] with the
    /// store untouched. Storage failures are returned as `Err`.
    pub async fn load(
        &self,
        direction: LoadDirection,
        state: &PagingState,
    ) -> Result<MediationOutcome> {
        let after = match direction {
            LoadDirection::Prepend => {
                debug!("Prepend on '{}': nothing before the first page", self.partition);
                return Ok(MediationOutcome::success(true));
            }
            LoadDirection::Refresh => None,
            LoadDirection::Append => match self.append_cursor(state)? {
                Some(cursor) => Some(cursor),
                None => {
                    debug!("Append on '{}': no next cursor, end reached", self.partition);
                    return Ok(MediationOutcome::success(true));
                }
            },
        };

        let limit = match direction {
            LoadDirection::Refresh => state.config.initial_load_size,
            _ => state.config.page_size,
        };
        let request = FetchRequest::after(self.partition.as_str(), after, limit);
        debug!(
            "{} on '{}': fetching after={:?} limit={}",
            direction, self.partition, request.after, limit
        );

        let page = match self.fetcher.fetch_page(&request).await {
            Ok(page) => page,
            Err(e) => {
                warn!("{} on '{}' failed: {}", direction, self.partition, e);
                return Ok(MediationOutcome::Error(e));
            }
        };

        let keys: Vec<RemoteKey> = page
            .items
            .iter()
            .map(|item| RemoteKey::for_item(item, page.before.as_deref(), page.after.as_deref()))
            .collect();

        self.database.transaction(|tx| {
            if direction == LoadDirection::Refresh {
                tx.remote_keys().delete_by_partition(&self.partition)?;
                tx.items().delete_by_partition(&self.partition)?;
            }
            tx.remote_keys().insert_all(&keys)?;
            tx.items().insert_all(&page.items)
        })?;

        debug!(
            "{} on '{}': stored {} items (next={:?})",
            direction,
            self.partition,
            page.items.len(),
            page.after
        );
        Ok(MediationOutcome::success(page.items.is_empty()))
    }

    /// Next cursor stored for the last loaded item, if any
    fn append_cursor(&self, state: &PagingState) -> Result<Option<Cursor>> {
        let Some(last) = state.last_item_or_none() else {
            return Ok(None);
        };

        let key = self
            .database
            .transaction(|tx| tx.remote_keys().key_for(&last.name, &last.partition))?;

        Ok(key.and_then(|k| k.next_cursor))
    }
}

impl<D, F> std::fmt::Debug for MediationEngine<D, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediationEngine")
            .field("partition", &self.partition)
            .field("refresh_on_start", &self.refresh_on_start)
            .finish_non_exhaustive()
    }
}
