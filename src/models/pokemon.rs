//! Pokemon records

use serde::{Deserialize, Serialize};

use super::{NamedResource, Resource};

/// A single Pokemon as returned by `/pokemon/{name or id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    /// Base experience gained for defeating this Pokemon; null for some forms
    pub base_experience: Option<u32>,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    pub types: Vec<PokemonType>,
    pub sprites: Sprites,
    pub stats: Vec<PokemonStat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonType {
    pub slot: u8,
    #[serde(rename = "type")]
    pub type_: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    pub effort: u32,
    pub stat: NamedResource,
}

/// Sprite image URLs. Upstream sends null for missing artwork.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    pub back_default: Option<String>,
    pub front_shiny: Option<String>,
    pub back_shiny: Option<String>,
}

impl Pokemon {
    /// Type names ordered by slot.
    pub fn type_names(&self) -> Vec<&str> {
        let mut types: Vec<&PokemonType> = self.types.iter().collect();
        types.sort_by_key(|t| t.slot);
        types.into_iter().map(|t| t.type_.name.as_str()).collect()
    }

    /// Base value of the named stat, e.g. `"hp"` or `"speed"`.
    pub fn base_stat(&self, name: &str) -> Option<u32> {
        self.stats
            .iter()
            .find(|s| s.stat.name == name)
            .map(|s| s.base_stat)
    }
}

impl Resource for Pokemon {
    const ENDPOINT: &'static str = "pokemon";

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("pokemon has an empty name".to_string());
        }
        Ok(())
    }
}
