use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::api::Api;
use crate::cache::DetailCache;
use crate::model::{ListEntry, PokemonDetail};

const PAGE_SIZE: usize = 20;
const MASTER_LIST_LIMIT: u32 = 1302;
const DEBOUNCE: Duration = Duration::from_millis(300);
const HYDRATE_CONCURRENCY: usize = 12;

/// Browsing state for the catalog list view.
///
/// Owns the master list, the search filter and the pagination window, and
/// keeps the published detail records in sync with the visible subset via
/// debounced, cancellable hydration cycles. Construct one per UI tree root
/// and clone freely; clones share state.
#[derive(Clone)]
pub struct ListSession {
    api: Api,
    cache: DetailCache,
    inner: Arc<Mutex<SessionInner>>,
    generation: Arc<AtomicU64>,
    page_size: usize,
    debounce: Duration,
}

/// Point-in-time view handed to the presentation layer.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub entries: Vec<Arc<PokemonDetail>>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub is_empty: bool,
}

struct SessionInner {
    master: Vec<ListEntry>,
    filter: String,
    window: usize,
    visible: Vec<Arc<PokemonDetail>>,
    list_loading: bool,
    hydrating: bool,
    error: Option<String>,
}

impl SessionInner {
    fn new(window: usize) -> Self {
        Self {
            master: Vec::new(),
            filter: String::new(),
            window,
            visible: Vec::new(),
            list_loading: false,
            hydrating: false,
            error: None,
        }
    }

    fn filtered(&self) -> Vec<&ListEntry> {
        let needle = self.filter.to_lowercase();
        self.master
            .iter()
            .filter(|entry| needle.is_empty() || entry.name.to_lowercase().contains(&needle))
            .collect()
    }

    fn filtered_len(&self) -> usize {
        self.filtered().len()
    }

    fn visible_entries(&self) -> Vec<ListEntry> {
        self.filtered()
            .into_iter()
            .take(self.window)
            .cloned()
            .collect()
    }
}

impl ListSession {
    pub fn new(api: Api, cache: DetailCache) -> Self {
        Self::with_config(api, cache, PAGE_SIZE, DEBOUNCE)
    }

    /// Override page size and debounce interval. Mainly for tests; the
    /// defaults match the production UI.
    pub fn with_config(api: Api, cache: DetailCache, page_size: usize, debounce: Duration) -> Self {
        Self {
            api,
            cache,
            inner: Arc::new(Mutex::new(SessionInner::new(page_size))),
            generation: Arc::new(AtomicU64::new(0)),
            page_size,
            debounce,
        }
    }

    /// Fetch the master list. Runs the network call at most once per
    /// session; revisiting the list view is a no-op once populated.
    /// A transport failure is surfaced as the session-level error string.
    pub async fn load_master_list(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if !inner.master.is_empty() || inner.list_loading {
                return;
            }
            inner.list_loading = true;
            inner.error = None;
        }

        match self.api.fetch_list(MASTER_LIST_LIMIT).await {
            Ok(entries) => {
                let mut inner = self.inner.lock().unwrap();
                inner.master = entries;
                inner.list_loading = false;
            }
            Err(error) => {
                tracing::warn!(%error, "master list fetch failed");
                let mut inner = self.inner.lock().unwrap();
                inner.list_loading = false;
                inner.error = Some(error.to_string());
                return;
            }
        }
        self.schedule_hydration();
    }

    /// Replace the search filter. This is the user-initiated path, so the
    /// window resets to one page; reading state back after navigation does
    /// not go through here and keeps its position.
    pub fn set_filter(&self, text: &str) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.filter = text.to_string();
            inner.window = self.page_size;
        }
        self.schedule_hydration();
    }

    /// Grow the window by one page. Never shrinks, never touches the filter.
    pub fn load_more(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.window += self.page_size;
        }
        self.schedule_hydration();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().unwrap();
        let filtered_len = inner.filtered_len();
        let visible_len = inner.window.min(filtered_len);
        let in_flight = inner.list_loading || inner.hydrating;
        SessionSnapshot {
            entries: inner.visible.clone(),
            loading: in_flight,
            error: inner.error.clone(),
            has_more: visible_len < filtered_len,
            is_empty: inner.visible.is_empty() && !inner.filter.is_empty() && !in_flight,
        }
    }

    /// Ordered filtered view of the master list, independent of the window.
    pub fn filtered_entries(&self) -> Vec<ListEntry> {
        let inner = self.inner.lock().unwrap();
        inner.filtered().into_iter().cloned().collect()
    }

    /// Debounced dispatch: bump the generation, sleep, and only run the
    /// cycle if no newer trigger arrived in the meantime. The generation is
    /// re-checked at publish time so a stale cycle whose fetches were
    /// already in flight cannot overwrite a newer cycle's results.
    fn schedule_hydration(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let session = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(session.debounce).await;
            if session.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            session.run_cycle(generation).await;
        });
    }

    async fn run_cycle(&self, generation: u64) {
        let targets = {
            let mut inner = self.inner.lock().unwrap();
            inner.hydrating = true;
            inner.visible_entries()
        };

        if targets.is_empty() {
            let mut inner = self.inner.lock().unwrap();
            if self.generation.load(Ordering::SeqCst) == generation {
                inner.visible.clear();
                inner.hydrating = false;
            }
            return;
        }

        let semaphore = Arc::new(Semaphore::new(HYDRATE_CONCURRENCY));
        let mut join_set = JoinSet::new();
        for (index, entry) in targets.into_iter().enumerate() {
            let cache = self.cache.clone();
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, None),
                };
                (index, cache.get(&entry.name).await)
            });
        }

        let mut settled = Vec::new();
        while let Some(result) = join_set.join_next().await {
            if let Ok(pair) = result {
                settled.push(pair);
            }
        }
        // Completion order is unspecified; publication preserves request order.
        settled.sort_by_key(|(index, _)| *index);
        let details: Vec<Arc<PokemonDetail>> = settled
            .into_iter()
            .filter_map(|(_, detail)| detail)
            .collect();

        let mut inner = self.inner.lock().unwrap();
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        inner.visible = details;
        inner.hydrating = false;
    }

    #[cfg(test)]
    pub(crate) fn seed_master_list(&self, entries: Vec<ListEntry>) {
        self.inner.lock().unwrap().master = entries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ListEntry {
        ListEntry {
            name: name.to_string(),
            url: format!("https://pokeapi.co/api/v2/pokemon/{name}/"),
        }
    }

    fn session() -> ListSession {
        let api = Api::with_base_url("http://127.0.0.1:9".to_string());
        let cache = DetailCache::new(api.clone());
        ListSession::with_config(api, cache, 2, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn filter_is_case_insensitive_substring_match() {
        let session = session();
        session.seed_master_list(vec![
            entry("bulbasaur"),
            entry("charmander"),
            entry("squirtle"),
        ]);

        session.set_filter("BULBA");
        let filtered = session.filtered_entries();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "bulbasaur");
    }

    #[tokio::test]
    async fn empty_filter_returns_master_list_in_order() {
        let session = session();
        session.seed_master_list(vec![
            entry("bulbasaur"),
            entry("charmander"),
            entry("squirtle"),
        ]);

        session.set_filter("");
        let names: Vec<String> = session
            .filtered_entries()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["bulbasaur", "charmander", "squirtle"]);
    }

    #[tokio::test]
    async fn load_more_grows_window_until_filtered_exhausted() {
        let session = session();
        session.seed_master_list(vec![
            entry("bulbasaur"),
            entry("charmander"),
            entry("squirtle"),
        ]);

        // Page size 2: first page leaves one entry unshown.
        assert!(session.snapshot().has_more);

        session.load_more();
        assert!(!session.snapshot().has_more);

        // Growing past the end stays saturated.
        session.load_more();
        assert!(!session.snapshot().has_more);
    }

    #[tokio::test]
    async fn set_filter_resets_window_to_one_page() {
        let session = session();
        session.seed_master_list(vec![
            entry("bulbasaur"),
            entry("charmander"),
            entry("squirtle"),
        ]);

        session.load_more();
        assert!(!session.snapshot().has_more);

        session.set_filter("r");
        // All three names contain "r"; back to one page of two, so one
        // entry is beyond the window again.
        assert!(session.snapshot().has_more);
    }
}
