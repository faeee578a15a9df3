//! Location area records

use serde::{Deserialize, Serialize};

use super::{NamedResource, Resource};

/// A location area and the Pokemon that can be encountered there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationArea {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedResource,
}

impl LocationArea {
    /// Names of the encounterable Pokemon, in upstream order.
    pub fn pokemon_names(&self) -> impl Iterator<Item = &str> {
        self.pokemon_encounters
            .iter()
            .map(|encounter| encounter.pokemon.name.as_str())
    }
}

impl Resource for LocationArea {
    const ENDPOINT: &'static str = "location-area";

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("location area has an empty name".to_string());
        }
        Ok(())
    }
}
