//! Resource Client
//!
//! Public entry point: derives cache keys, serves fresh entries from the
//! cache and falls back to the network on a miss.

pub mod keys;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::http::Fetcher;
use crate::models::{LocationArea, PageResult, Pokemon, PokemonSpecies, Resource};
use crate::tasks::{spawn_reaper_task, ReaperHandle};

// == Poke Client ==
/// Caching PokeAPI client.
///
/// Cloning is cheap and every clone shares the same cache, so one instance
/// can serve a REPL and any number of concurrent request handlers. The
/// background reaper stops once the last clone is dropped or
/// [`PokeClient::shutdown`] is called.
///
/// Concurrent misses on the same key are not coalesced: each caller fetches
/// and the last write wins.
#[derive(Debug, Clone)]
pub struct PokeClient {
    base_url: Arc<str>,
    fetcher: Fetcher,
    cache: SharedCache,
    reaper: Arc<ReaperHandle>,
}

impl PokeClient {
    // == Constructors ==
    /// Creates a client against the public API with the given request
    /// timeout and cache TTL.
    pub fn new(request_timeout: Duration, cache_ttl: Duration) -> Result<Self> {
        Self::from_config(&Config {
            request_timeout,
            cache_ttl,
            ..Config::default()
        })
    }

    /// Creates a client from configuration and starts its reaper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(ClientError::Config(
                "client must be created inside a tokio runtime".to_string(),
            ));
        }

        let fetcher = Fetcher::new(config.request_timeout)?;
        let cache = CacheStore::new(config.cache_ttl)?.into_shared();
        let reaper = spawn_reaper_task(cache.clone(), config.reap_interval());

        info!(
            "PokeClient ready: base_url={}, ttl={:?}, timeout={:?}",
            config.base_url, config.cache_ttl, config.request_timeout
        );

        Ok(Self {
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            fetcher,
            cache,
            reaper: Arc::new(reaper),
        })
    }

    // == List Pages ==
    /// Fetches a page of location areas.
    ///
    /// `None` requests the first page; pass a page's `next` or `previous` URL
    /// to move through the list.
    pub async fn list_location_areas(&self, page_url: Option<&str>) -> Result<PageResult> {
        let url = match page_url {
            Some(url) => url.to_string(),
            None => keys::first_page_url(&self.base_url, LocationArea::ENDPOINT),
        };

        self.cached(&url, &url, PageResult::validate).await
    }

    // == Item Lookups ==
    /// Fetches a single resource by name or id.
    ///
    /// The identifier is trimmed and lowercased before it is used, so
    /// `"Pikachu"` and `"pikachu"` share one cache entry.
    pub async fn get_item<T: Resource>(&self, identifier: &str) -> Result<T> {
        let normalized = keys::normalize_identifier(identifier);
        // Dot segments would be dropped from the path and hit the list endpoint
        if normalized.is_empty() || normalized == "." || normalized == ".." {
            return Err(ClientError::NotFound {
                resource: T::ENDPOINT,
                identifier: identifier.to_string(),
            });
        }

        let key = keys::item_key(T::ENDPOINT, &normalized);
        let url = keys::item_url(&self.base_url, T::ENDPOINT, &normalized)?;

        self.cached(&key, &url, T::validate)
            .await
            .map_err(|err| match err {
                ClientError::Remote { status: 404, .. } => ClientError::NotFound {
                    resource: T::ENDPOINT,
                    identifier: normalized,
                },
                other => other,
            })
    }

    pub async fn get_pokemon(&self, name_or_id: &str) -> Result<Pokemon> {
        self.get_item(name_or_id).await
    }

    pub async fn get_location_area(&self, name_or_id: &str) -> Result<LocationArea> {
        self.get_item(name_or_id).await
    }

    pub async fn get_pokemon_species(&self, name_or_id: &str) -> Result<PokemonSpecies> {
        self.get_item(name_or_id).await
    }

    /// Flavor text for a species in the given language code, e.g. `"en"`.
    ///
    /// `Ok(None)` means the species exists but has no entry in that language.
    pub async fn flavor_text(&self, name_or_id: &str, language: &str) -> Result<Option<String>> {
        let species = self.get_pokemon_species(name_or_id).await?;
        Ok(species.flavor_text(language))
    }

    // == Cache Access ==
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub async fn cache_ttl(&self) -> Duration {
        self.cache.read().await.ttl()
    }

    /// Stops the background reaper. Lookups keep working; stale entries are
    /// still filtered on read but no longer swept.
    pub fn shutdown(&self) {
        self.reaper.stop();
    }

    // == Request Pipeline ==
    /// Hit: decode cached bytes. Miss: fetch, decode, validate, then store.
    /// Bytes that fail to decode or validate are never cached.
    async fn cached<T, F>(&self, key: &str, url: &str, validate: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> std::result::Result<(), String>,
    {
        // Guard dropped at the end of the statement
        let hit = self.cache.write().await.get(key);

        if let Some(bytes) = hit {
            debug!("cache hit: {}", key);
            return decode(url, &bytes, &validate);
        }

        debug!("cache miss: {}", key);
        let bytes = self.fetcher.fetch(url).await?;
        let value = decode(url, &bytes, &validate)?;

        self.cache.write().await.put(key, bytes);
        Ok(value)
    }
}

fn decode<T, F>(url: &str, bytes: &[u8], validate: &F) -> Result<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> std::result::Result<(), String>,
{
    let value: T = serde_json::from_slice(bytes).map_err(|e| ClientError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    validate(&value).map_err(|reason| ClientError::Decode {
        url: url.to_string(),
        reason,
    })?;

    Ok(value)
}
