//! HTTP fetcher for listing-style JSON APIs
//!
//! A listing response carries an array of records plus one `before` / `after`
//! cursor pair for the whole page, e.g.
//!
//! ```text
//! { "data": { "children": [ { "data": { "name": "t3_a", ... } } ],
//!             "after": "t3_z", "before": null } }
//! ```
//!
//! Where each piece lives is described by [`ListingConfig`].

use super::client::{HttpClient, HttpClientConfig};
use super::types::{FetchRequest, RemoteFetcher, RemotePage};
use crate::config::{HttpConfig, ListingConfig, RemoteConfig};
use crate::error::{Error, FetchError, Result};
use crate::types::{Cursor, Item, JsonValue};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

const PARTITION_PLACEHOLDER: &str = "{partition}";

/// [`RemoteFetcher`] over HTTP
#[derive(Debug)]
pub struct ListingFetcher {
    client: HttpClient,
    base_url: Url,
    remote: RemoteConfig,
}

impl ListingFetcher {
    /// Build a fetcher and its HTTP client from configuration
    pub fn new(remote: RemoteConfig, http: &HttpConfig) -> Result<Self> {
        let client = HttpClient::new(HttpClientConfig::from(http))?;
        Self::with_client(remote, client)
    }

    /// Build a fetcher around an existing client
    pub fn with_client(remote: RemoteConfig, client: HttpClient) -> Result<Self> {
        let base_url = Url::parse(&remote.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_value(
                "remote.base_url",
                "must be a hierarchical URL",
            ));
        }

        Ok(Self {
            client,
            base_url,
            remote,
        })
    }

    /// URL of the listing for `partition`, with the partition percent-encoded
    pub fn listing_url(&self, partition: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for segment in self.remote.path.split('/').filter(|s| !s.is_empty()) {
                if segment.contains(PARTITION_PLACEHOLDER) {
                    segments.push(&segment.replace(PARTITION_PLACEHOLDER, partition));
                } else {
                    segments.push(segment);
                }
            }
        }
        url
    }

    fn query_for(&self, request: &FetchRequest) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(3);
        if let Some(after) = &request.after {
            query.push((self.remote.after_param.clone(), after.clone()));
        }
        if let Some(before) = &request.before {
            query.push((self.remote.before_param.clone(), before.clone()));
        }
        query.push((self.remote.limit_param.clone(), request.limit.to_string()));
        query
    }
}

#[async_trait]
impl RemoteFetcher for ListingFetcher {
    async fn fetch_page(
        &self,
        request: &FetchRequest,
    ) -> std::result::Result<RemotePage, FetchError> {
        let url = self.listing_url(&request.partition);
        let query = self.query_for(request);

        debug!(
            "Fetching {} (after={:?}, limit={})",
            url, request.after, request.limit
        );

        let body = self.client.get_json(url.as_str(), &query).await?;
        decode_listing(&self.remote.listing, &request.partition, &body)
    }
}

/// Decode a listing body into a page of items stamped with `partition`
pub fn decode_listing(
    listing: &ListingConfig,
    partition: &str,
    body: &JsonValue,
) -> std::result::Result<RemotePage, FetchError> {
    let records = lookup(body, &listing.records_path)
        .and_then(JsonValue::as_array)
        .ok_or_else(|| {
            FetchError::invalid_response(format!(
                "No record array at '{}'",
                listing.records_path
            ))
        })?;

    let items = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let data = lookup(record, &listing.item_path).ok_or_else(|| {
                FetchError::invalid_response(format!(
                    "Record {index} has no item at '{}'",
                    listing.item_path
                ))
            })?;
            let name = data
                .get(&listing.name_field)
                .and_then(scalar_to_string)
                .ok_or_else(|| {
                    FetchError::invalid_response(format!(
                        "Record {index} has no '{}' field",
                        listing.name_field
                    ))
                })?;

            Ok(Item {
                name,
                partition: partition.to_string(),
                payload: data.clone(),
            })
        })
        .collect::<std::result::Result<Vec<_>, FetchError>>()?;

    Ok(RemotePage {
        items,
        before: cursor_at(body, &listing.before_path),
        after: cursor_at(body, &listing.after_path),
    })
}

/// Follow a dotted path (`$.` prefix optional, empty = the value itself)
fn lookup<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Absent, null and empty cursors all mean "no page in that direction"
fn cursor_at(body: &JsonValue, path: &str) -> Option<Cursor> {
    lookup(body, path)
        .and_then(scalar_to_string)
        .filter(|c| !c.is_empty())
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
