//! Pokedex catalog core.
//!
//! Data-fetching and caching layer for a PokeAPI catalog browser: a thin
//! async gateway over the read endpoints, an alias-keyed detail cache, a
//! listing session with debounced concurrent hydration, and an evolution
//! tree builder. Presentation is expected to live elsewhere and call in
//! through [`ListSession`], [`DetailCache`] and [`fetch_evolution_tree`].

pub mod api;
pub mod cache;
pub mod evolution;
pub mod model;
pub mod session;
pub mod sprites;

pub use api::{Api, ApiError, ChainLink};
pub use cache::DetailCache;
pub use evolution::{fetch_evolution_tree, fetch_species, EvolutionNode};
pub use model::{ListEntry, PokemonDetail, PokemonSpecies, PokemonStat};
pub use session::{ListSession, SessionSnapshot};
