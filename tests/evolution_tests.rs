//! Evolution tree construction and enrichment against a mock API server.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pokedex::{fetch_evolution_tree, fetch_species, Api, DetailCache};

fn detail_body(id: u16, name: &str, types: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "height": 7,
        "weight": 69,
        "types": types
            .iter()
            .map(|t| json!({"slot": 1, "type": {"name": t, "url": ""}}))
            .collect::<Vec<_>>(),
        "stats": [{"base_stat": 45, "stat": {"name": "hp", "url": ""}}],
        "sprites": {"front_default": null, "other": {"official-artwork": {"front_default": null}}}
    })
}

fn species_ref(name: &str, id: u16) -> serde_json::Value {
    json!({
        "name": name,
        "url": format!("https://pokeapi.co/api/v2/pokemon-species/{id}/")
    })
}

fn starter_chain_body() -> serde_json::Value {
    json!({
        "chain": {
            "species": species_ref("bulbasaur", 1),
            "evolution_details": [],
            "evolves_to": [{
                "species": species_ref("ivysaur", 2),
                "evolution_details": [{"min_level": 16, "trigger": {"name": "level-up", "url": ""}, "item": null}],
                "evolves_to": [{
                    "species": species_ref("venusaur", 3),
                    "evolution_details": [{"min_level": 36, "trigger": {"name": "level-up", "url": ""}, "item": null}],
                    "evolves_to": []
                }]
            }]
        }
    })
}

async fn mount_species(server: &MockServer, id: u16, name: &str, chain_url: Option<String>) {
    let chain = match chain_url {
        Some(url) => json!({"url": url}),
        None => serde_json::Value::Null,
    };
    Mock::given(method("GET"))
        .and(path(format!("/pokemon-species/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": name,
            "flavor_text_entries": [
                {"flavor_text": "Ein Same wurde\u{000C}gepflanzt.", "language": {"name": "de", "url": ""}},
                {"flavor_text": "A seed was\nplanted\u{000C}on its back.", "language": {"name": "en", "url": ""}}
            ],
            "genera": [{"genus": "Seed Pokemon", "language": {"name": "en", "url": ""}}],
            "evolution_chain": chain,
            "evolves_from_species": null
        })))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: u16, name: &str, types: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/pokemon/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(id, name, types)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn three_stage_chain_builds_an_enriched_tree() {
    let server = MockServer::start().await;
    let chain_url = format!("{}/evolution-chain/1", server.uri());
    mount_species(&server, 1, "bulbasaur", Some(chain_url)).await;
    Mock::given(method("GET"))
        .and(path("/evolution-chain/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(starter_chain_body()))
        .mount(&server)
        .await;
    mount_detail(&server, 1, "bulbasaur", &["grass", "poison"]).await;
    mount_detail(&server, 2, "ivysaur", &["grass", "poison"]).await;
    mount_detail(&server, 3, "venusaur", &["grass", "poison"]).await;

    let api = Api::with_base_url(server.uri());
    let cache = DetailCache::new(api.clone());
    let root = fetch_evolution_tree(&api, &cache, 1)
        .await
        .expect("tree should build");

    assert_eq!(root.species_name, "bulbasaur");
    assert_eq!(root.min_level, None);
    assert_eq!(root.types.as_deref(), Some(["grass".to_string(), "poison".to_string()].as_slice()));

    let ivysaur = &root.children[0];
    assert_eq!(ivysaur.min_level, Some(16));
    assert!(ivysaur.types.is_some());

    let venusaur = &ivysaur.children[0];
    assert_eq!(venusaur.min_level, Some(36));
    assert!(venusaur.types.is_some());
    assert!(venusaur.children.is_empty());
}

#[tokio::test]
async fn enrichment_failure_leaves_that_node_untyped() {
    let server = MockServer::start().await;
    let chain_url = format!("{}/evolution-chain/1", server.uri());
    mount_species(&server, 1, "bulbasaur", Some(chain_url)).await;
    Mock::given(method("GET"))
        .and(path("/evolution-chain/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(starter_chain_body()))
        .mount(&server)
        .await;
    mount_detail(&server, 1, "bulbasaur", &["grass", "poison"]).await;
    mount_detail(&server, 2, "ivysaur", &["grass", "poison"]).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = Api::with_base_url(server.uri());
    let cache = DetailCache::new(api.clone());
    let root = fetch_evolution_tree(&api, &cache, 1).await.unwrap();

    assert!(root.types.is_some());
    assert!(root.children[0].types.is_some());
    assert!(root.children[0].children[0].types.is_none());
}

#[tokio::test]
async fn species_without_chain_reference_yields_no_tree() {
    let server = MockServer::start().await;
    mount_species(&server, 151, "mew", None).await;

    let api = Api::with_base_url(server.uri());
    let cache = DetailCache::new(api.clone());
    assert!(fetch_evolution_tree(&api, &cache, 151).await.is_none());
}

#[tokio::test]
async fn chain_fetch_failure_yields_no_tree() {
    let server = MockServer::start().await;
    let chain_url = format!("{}/evolution-chain/404", server.uri());
    mount_species(&server, 1, "bulbasaur", Some(chain_url)).await;

    let api = Api::with_base_url(server.uri());
    let cache = DetailCache::new(api.clone());
    assert!(fetch_evolution_tree(&api, &cache, 1).await.is_none());
}

#[tokio::test]
async fn species_fetch_parses_english_text_and_swallows_failure() {
    let server = MockServer::start().await;
    mount_species(&server, 1, "bulbasaur", None).await;

    let api = Api::with_base_url(server.uri());
    let species = fetch_species(&api, 1).await.expect("species should load");
    assert_eq!(
        species.flavor_text.as_deref(),
        Some("A seed was planted on its back.")
    );
    assert_eq!(species.genus.as_deref(), Some("Seed Pokemon"));
    assert!(species.evolution_chain_url.is_none());

    // Unmocked id: the wrapper converts the 404 into None.
    assert!(fetch_species(&api, 999).await.is_none());
}
