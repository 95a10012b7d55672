//! Common types used throughout page-mediator
//!
//! Items, remote keys, load directions and the mediation outcome.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Opaque pagination token issued by the remote source
pub type Cursor = String;

// ============================================================================
// Items
// ============================================================================

/// A cached item, unique by `(name, partition)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identity within the partition
    pub name: String,
    /// Partition the item belongs to
    pub partition: String,
    /// Remaining fields as returned by the remote
    #[serde(default)]
    pub payload: JsonValue,
}

impl Item {
    /// Create an item with an empty payload
    pub fn new(name: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition: partition.into(),
            payload: JsonValue::Null,
        }
    }

    /// Attach a payload
    #[must_use]
    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload = payload;
        self
    }
}

// ============================================================================
// Remote Keys
// ============================================================================

/// Cursor pair persisted per item, used to find the page after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteKey {
    pub name: String,
    pub partition: String,
    #[serde(default)]
    pub previous_cursor: Option<Cursor>,
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
}

impl RemoteKey {
    /// Key for `item` carrying the cursor pair of the page it arrived in
    pub fn for_item(item: &Item, previous: Option<&str>, next: Option<&str>) -> Self {
        Self {
            name: item.name.clone(),
            partition: item.partition.clone(),
            previous_cursor: previous.map(String::from),
            next_cursor: next.map(String::from),
        }
    }
}

// ============================================================================
// Load Direction
// ============================================================================

/// What the paging mechanism is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadDirection {
    /// Replace the whole partition with the first page
    Refresh,
    /// Extend before the first loaded item
    Prepend,
    /// Extend after the last loaded item
    Append,
}

impl fmt::Display for LoadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Refresh => "refresh",
            Self::Prepend => "prepend",
            Self::Append => "append",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Mediation Outcome
// ============================================================================

/// Result of a single `load` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediationOutcome {
    /// Storage is up to date for this direction
    Success {
        /// No further loads in this direction will yield data
        end_of_pagination_reached: bool,
    },
    /// The remote fetch failed; storage was not touched
    Error(FetchError),
}

impl MediationOutcome {
    /// Create a success outcome
    pub fn success(end_of_pagination_reached: bool) -> Self {
        Self::Success {
            end_of_pagination_reached,
        }
    }

    /// Check if the load succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Check if the fetch failed
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// `Some(end_reached)` on success, `None` on error
    pub fn end_of_pagination_reached(&self) -> Option<bool> {
        match self {
            Self::Success {
                end_of_pagination_reached,
            } => Some(*end_of_pagination_reached),
            Self::Error(_) => None,
        }
    }
}

// ============================================================================
// Initialize Action
// ============================================================================

/// Whether the paging mechanism should refresh before serving cached data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitializeAction {
    LaunchInitialRefresh,
    SkipInitialRefresh,
}

// ============================================================================
// Backoff
// ============================================================================

/// Backoff strategy for transport-level retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    Constant,
    Linear,
    #[default]
    Exponential,
}
