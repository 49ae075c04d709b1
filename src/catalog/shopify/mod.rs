//! Shopify Admin REST implementation of the catalog collaborators.
//!
//! Products and collections are fetched page by page following `Link: rel="next"` headers,
//! so callers always see the complete catalog. Every request passes through a token bucket
//! owned by the client; HTTP 429 responses are retried after `Retry-After`.

pub mod client;
pub mod config;
pub mod connector;
pub mod rate_limit;
pub mod wire;

#[cfg(test)]
mod tests;

pub use client::ShopifyClient;
pub use config::{DEFAULT_REQUEST_TIMEOUT, ShopifyConfig};
pub use connector::ShopifyConnector;
pub use rate_limit::TokenBucket;
pub use wire::next_page_url;
