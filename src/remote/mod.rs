//! Remote page fetching
//!
//! # Overview
//!
//! - `RemoteFetcher` - the contract the mediator calls, one page per call
//! - `HttpClient` - reqwest wrapper with rate limiting and optional retry
//! - `ListingFetcher` - `RemoteFetcher` for listing-style JSON APIs

mod client;
mod listing;
mod rate_limit;
mod types;

pub use client::{HttpClient, HttpClientConfig};
pub use listing::{decode_listing, ListingFetcher};
pub use rate_limit::RateLimiter;
pub use types::{FetchRequest, RemoteFetcher, RemotePage};

#[cfg(test)]
mod tests;
