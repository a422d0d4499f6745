use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::Api;
use crate::model::PokemonDetail;

/// In-memory detail cache keyed by both name and numeric id.
///
/// A given entity is fetched from the network at most once per process
/// lifetime regardless of which alias is used to request it: the first
/// successful fetch inserts the record under both keys in one lock
/// acquisition, and both aliases resolve to the same `Arc`. Failures are
/// never cached, so a later call with the same key hits the network again.
/// Never evicts.
#[derive(Clone)]
pub struct DetailCache {
    api: Api,
    entries: Arc<Mutex<HashMap<String, Arc<PokemonDetail>>>>,
}

impl DetailCache {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Resolve a detail record by name or stringified id.
    ///
    /// Cache hits return synchronously with no network access. Concurrent
    /// misses for the same key may race to fetch twice; the insert is
    /// idempotent so the worst case is a duplicate in-flight request.
    pub async fn get(&self, id_or_name: &str) -> Option<Arc<PokemonDetail>> {
        if let Some(hit) = self.lookup(id_or_name) {
            tracing::debug!(key = id_or_name, "detail cache hit");
            return Some(hit);
        }

        match self.api.fetch_pokemon(id_or_name).await {
            Ok(detail) => {
                let detail = Arc::new(detail);
                let mut entries = self.entries.lock().unwrap();
                entries.insert(detail.name.clone(), Arc::clone(&detail));
                entries.insert(detail.id.to_string(), Arc::clone(&detail));
                Some(detail)
            }
            Err(error) => {
                tracing::warn!(key = id_or_name, %error, "detail fetch failed");
                None
            }
        }
    }

    pub async fn get_by_id(&self, id: u16) -> Option<Arc<PokemonDetail>> {
        self.get(&id.to_string()).await
    }

    fn lookup(&self, key: &str) -> Option<Arc<PokemonDetail>> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}
