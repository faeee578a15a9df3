//! Domain records decoded from PokeAPI payloads
//!
//! Every record is immutable once decoded; normalization happens here, never
//! on cached data.

pub mod location;
pub mod pokemon;
pub mod species;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use location::{LocationArea, PokemonEncounter};
pub use pokemon::{Pokemon, PokemonStat, PokemonType, Sprites};
pub use species::{FlavorTextEntry, PokemonSpecies};

// == Resource Trait ==
/// A record that can be fetched by name or id from `/{ENDPOINT}/{identifier}`.
pub trait Resource: DeserializeOwned {
    /// Path segment under the API base URL, also used as the cache key prefix
    const ENDPOINT: &'static str;

    /// Rejects payloads that decoded but are unusable.
    fn validate(&self) -> Result<(), String>;
}

/// A `{name, url}` reference to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One page of a paginated list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Total number of resources across all pages
    pub count: u64,
    /// URL of the following page, absent on the last page
    pub next: Option<String>,
    /// URL of the preceding page, absent on the first page
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

impl PageResult {
    /// Every listed resource must carry a name and a URL.
    pub fn validate(&self) -> Result<(), String> {
        match self
            .results
            .iter()
            .position(|item| item.name.is_empty() || item.url.is_empty())
        {
            Some(index) => Err(format!("result {} has an empty name or url", index)),
            None => Ok(()),
        }
    }
}
