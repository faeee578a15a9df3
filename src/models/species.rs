//! Pokemon species records and localized flavor text

use serde::{Deserialize, Serialize};

use super::{NamedResource, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonSpecies {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    /// Language reference; `name` is the language code, e.g. `"en"`
    pub language: NamedResource,
    pub version: Option<NamedResource>,
}

impl PokemonSpecies {
    /// First flavor text in `language`, with line breaks and form feeds
    /// collapsed to single spaces.
    ///
    /// This differs from the upstream payload, which keeps the raw game text.
    /// Read `flavor_text_entries` directly to get it unchanged.
    pub fn flavor_text(&self, language: &str) -> Option<String> {
        self.flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == language)
            .map(|entry| {
                entry
                    .flavor_text
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
    }
}

impl Resource for PokemonSpecies {
    const ENDPOINT: &'static str = "pokemon-species";

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("species has an empty name".to_string());
        }
        Ok(())
    }
}
