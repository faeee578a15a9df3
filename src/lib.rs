//! Pokedex - A caching PokeAPI client
//!
//! Memoizes upstream responses by request key, expires them after a fixed
//! TTL and reaps stale entries in the background. One client can be shared
//! by any number of concurrent callers.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod tasks;

pub use client::PokeClient;
pub use config::Config;
pub use error::{ClientError, Result};
