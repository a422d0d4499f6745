use serde::{Deserialize, Serialize};

/// Unresolved pointer into the catalog, straight off the list endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub url: String,
}

/// Full per-entity record. Immutable once cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub id: u16,
    pub name: String,
    pub types: Vec<String>,
    pub stats: Vec<PokemonStat>,
    pub height: u16,
    pub weight: u16,
    /// Display references passed through to the presentation layer.
    pub sprite_front_default: Option<String>,
    pub artwork: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub name: String,
    pub value: u16,
}

/// Auxiliary per-entity record carrying descriptive text and the
/// evolution chain reference, which the API may legitimately omit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonSpecies {
    pub name: String,
    pub flavor_text: Option<String>,
    pub genus: Option<String>,
    pub evolution_chain_url: Option<String>,
    pub evolves_from: Option<String>,
}
