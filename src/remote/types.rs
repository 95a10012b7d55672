//! Remote fetch contract

use crate::error::FetchError;
use crate::types::{Cursor, Item};
use async_trait::async_trait;

/// Parameters of a single page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub partition: String,
    /// Fetch the page following this cursor (`None` = first page)
    pub after: Option<Cursor>,
    /// Fetch the page preceding this cursor
    pub before: Option<Cursor>,
    /// Page size hint
    pub limit: u32,
}

impl FetchRequest {
    /// Request for the page after `after` (first page if `None`)
    pub fn after(partition: impl Into<String>, after: Option<Cursor>, limit: u32) -> Self {
        Self {
            partition: partition.into(),
            after,
            before: None,
            limit,
        }
    }
}

/// One page as returned by the remote
///
/// The remote issues a single cursor pair per page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemotePage {
    pub items: Vec<Item>,
    pub before: Option<Cursor>,
    pub after: Option<Cursor>,
}

impl RemotePage {
    /// Create a new page
    pub fn new(items: Vec<Item>, before: Option<Cursor>, after: Option<Cursor>) -> Self {
        Self {
            items,
            before,
            after,
        }
    }
}

/// Network collaborator that fetches pages
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fetch one page
    async fn fetch_page(&self, request: &FetchRequest) -> Result<RemotePage, FetchError>;
}
