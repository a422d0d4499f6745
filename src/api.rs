use serde::Deserialize;

use crate::model::{ListEntry, PokemonDetail, PokemonSpecies, PokemonStat};

const API_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("response parse error: {0}")]
    Parse(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u16,
    name: String,
    height: u16,
    weight: u16,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSpeciesResponse {
    name: String,
    #[serde(default)]
    flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    genera: Vec<GenusEntry>,
    evolution_chain: Option<ApiResource>,
    evolves_from_species: Option<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct GenusEntry {
    genus: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    chain: ChainLink,
}

/// Raw evolution chain node as the API ships it. The tree builder in
/// [`crate::evolution`] reshapes this into typed [`crate::EvolutionNode`]s.
#[derive(Clone, Debug, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolution_details: Vec<EvolutionDetailEntry>,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EvolutionDetailEntry {
    pub min_level: Option<u16>,
    pub trigger: Option<NamedResource>,
    pub item: Option<NamedResource>,
}

/// Thin gateway over the PokeAPI read endpoints. No caching, no retry,
/// no state beyond the shared HTTP client.
#[derive(Clone)]
pub struct Api {
    client: reqwest::Client,
    base_url: String,
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

impl Api {
    pub fn new() -> Self {
        Self::with_base_url(API_BASE.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn fetch_list(&self, limit: u32) -> Result<Vec<ListEntry>, ApiError> {
        let url = format!("{}/pokemon?limit={limit}", self.base_url);
        let response: ListResponse = self.get_json(&url).await?;
        Ok(response
            .results
            .into_iter()
            .map(|entry| ListEntry {
                name: entry.name,
                url: entry.url,
            })
            .collect())
    }

    pub async fn fetch_pokemon(&self, id_or_name: &str) -> Result<PokemonDetail, ApiError> {
        let url = format!("{}/pokemon/{id_or_name}", self.base_url);
        let response: PokemonResponse = self.get_json(&url).await?;

        let types = response
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect();
        let stats = response
            .stats
            .into_iter()
            .map(|slot| PokemonStat {
                name: slot.stat.name,
                value: slot.base_stat,
            })
            .collect();

        let sprite_front_default = pointer_string(&response.sprites, "/front_default");
        let artwork = pointer_string(&response.sprites, "/other/official-artwork/front_default");

        Ok(PokemonDetail {
            id: response.id,
            name: response.name,
            types,
            stats,
            height: response.height,
            weight: response.weight,
            sprite_front_default,
            artwork,
        })
    }

    pub async fn fetch_species(&self, id: u16) -> Result<PokemonSpecies, ApiError> {
        let url = format!("{}/pokemon-species/{id}", self.base_url);
        let response: PokemonSpeciesResponse = self.get_json(&url).await?;
        let flavor_text = response
            .flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == "en")
            .map(|entry| sanitize_text(&entry.flavor_text));
        let genus = response
            .genera
            .iter()
            .find(|entry| entry.language.name == "en")
            .map(|entry| entry.genus.clone());
        Ok(PokemonSpecies {
            name: response.name,
            flavor_text,
            genus,
            evolution_chain_url: response.evolution_chain.map(|chain| chain.url),
            evolves_from: response.evolves_from_species.map(|species| species.name),
        })
    }

    /// The chain URL is absolute, supplied by the species payload.
    pub async fn fetch_evolution_chain(&self, url: &str) -> Result<ChainLink, ApiError> {
        let response: EvolutionChainResponse = self.get_json(url).await?;
        Ok(response.chain)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| ApiError::Request(err.to_string()))?
            .error_for_status()
            .map_err(|err| ApiError::Request(err.to_string()))?;
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(err.to_string()))
    }
}

fn sanitize_text(text: &str) -> String {
    text.replace('\n', " ").replace('\u{000C}', " ")
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}
