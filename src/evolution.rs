use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::api::{Api, ChainLink};
use crate::cache::DetailCache;
use crate::model::PokemonSpecies;

const ENRICH_CONCURRENCY: usize = 12;

/// One node of the typed evolution tree, rooted at the base form.
///
/// `min_level`, `trigger` and `item` come from the node's first
/// `evolution_details` entry only; a node may list multiple alternative
/// trigger conditions and the rest are dropped. All three are `None` for
/// the base form. `types` starts `None` and is filled by the enrichment
/// pass; it stays `None` for a node whose detail fetch failed.
#[derive(Clone, Debug, PartialEq)]
pub struct EvolutionNode {
    pub species_name: String,
    pub id: u16,
    pub min_level: Option<u16>,
    pub trigger: Option<String>,
    pub item: Option<String>,
    pub types: Option<Vec<String>>,
    pub children: Vec<EvolutionNode>,
}

/// Fetch a species payload, swallowing failure into `None` for the detail
/// view (a missing species just omits its section).
pub async fn fetch_species(api: &Api, id: u16) -> Option<PokemonSpecies> {
    match api.fetch_species(id).await {
        Ok(species) => Some(species),
        Err(error) => {
            tracing::warn!(id, %error, "species fetch failed");
            None
        }
    }
}

/// Build the enriched evolution tree for an entity, or `None` when the
/// species has no chain reference or any required fetch fails. Built fresh
/// per call; only the per-node detail lookups go through the cache.
pub async fn fetch_evolution_tree(
    api: &Api,
    cache: &DetailCache,
    id: u16,
) -> Option<EvolutionNode> {
    let species = fetch_species(api, id).await?;
    let url = species.evolution_chain_url?;
    let chain = match api.fetch_evolution_chain(&url).await {
        Ok(chain) => chain,
        Err(error) => {
            tracing::warn!(id, %error, "evolution chain fetch failed");
            return None;
        }
    };
    let mut root = build_tree(&chain)?;
    enrich(cache, &mut root).await;
    Some(root)
}

/// Reshape a raw chain node into the typed tree, root-down. Nodes whose
/// species URL carries no parsable id are dropped with their subtree.
pub fn build_tree(chain: &ChainLink) -> Option<EvolutionNode> {
    let id = match species_id_from_url(&chain.species.url) {
        Some(id) => id,
        None => {
            tracing::warn!(url = %chain.species.url, "unparsable species url in chain");
            return None;
        }
    };
    let condition = chain.evolution_details.first();
    Some(EvolutionNode {
        species_name: chain.species.name.clone(),
        id,
        min_level: condition.and_then(|detail| detail.min_level),
        trigger: condition.and_then(|detail| detail.trigger.as_ref().map(|t| t.name.clone())),
        item: condition.and_then(|detail| detail.item.as_ref().map(|i| i.name.clone())),
        types: None,
        children: chain.evolves_to.iter().filter_map(build_tree).collect(),
    })
}

/// Concurrently resolve type tags for every distinct id in the tree and
/// attach them. Per-id failures leave that node's `types` as `None`.
async fn enrich(cache: &DetailCache, root: &mut EvolutionNode) {
    let mut ids = BTreeSet::new();
    collect_ids(root, &mut ids);

    let semaphore = Arc::new(Semaphore::new(ENRICH_CONCURRENCY));
    let mut join_set = JoinSet::new();
    for id in ids {
        let cache = cache.clone();
        let semaphore = Arc::clone(&semaphore);
        join_set.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (id, None),
            };
            (id, cache.get_by_id(id).await)
        });
    }

    let mut types_by_id: HashMap<u16, Vec<String>> = HashMap::new();
    while let Some(result) = join_set.join_next().await {
        if let Ok((id, Some(detail))) = result {
            types_by_id.insert(id, detail.types.clone());
        }
    }

    attach_types(root, &types_by_id);
}

fn collect_ids(node: &EvolutionNode, ids: &mut BTreeSet<u16>) {
    ids.insert(node.id);
    for child in &node.children {
        collect_ids(child, ids);
    }
}

fn attach_types(node: &mut EvolutionNode, types_by_id: &HashMap<u16, Vec<String>>) {
    node.types = types_by_id.get(&node.id).cloned();
    for child in &mut node.children {
        attach_types(child, types_by_id);
    }
}

fn species_id_from_url(url: &str) -> Option<u16> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}
