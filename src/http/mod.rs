//! HTTP Module
//!
//! Network transport used on cache misses.

mod fetcher;

pub use fetcher::Fetcher;
