//! Integration Tests for the caching client
//!
//! Runs the client against a local fake PokeAPI that counts requests per path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pokedex::{ClientError, Config, PokeClient};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

// == Fake Upstream ==

#[derive(Clone)]
struct Upstream {
    base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl Upstream {
    /// Counts a request and returns how many times `path` has been seen.
    fn record(&self, path: &str) -> usize {
        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(path.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

async fn spawn_upstream() -> Upstream {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let upstream = Upstream {
        base_url: format!("http://{}/api/v2", addr),
        hits: Arc::new(Mutex::new(HashMap::new())),
    };

    let app = Router::new()
        .route("/api/v2/location-area", get(location_areas))
        .route("/api/v2/location-area/:name", get(location_area))
        .route("/api/v2/pokemon/:name", get(pokemon))
        .route("/api/v2/pokemon-species/:name", get(species))
        .with_state(upstream.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    upstream
}

async fn location_areas(
    State(upstream): State<Upstream>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let offset: u64 = query
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    upstream.record(&format!("/location-area?offset={}", offset));

    let page_url = |offset: u64| format!("{}/location-area?offset={}&limit=20", upstream.base_url, offset);
    let (next, previous) = if offset == 0 {
        (json!(page_url(20)), Value::Null)
    } else {
        (Value::Null, json!(page_url(0)))
    };

    let results: Vec<Value> = (offset + 1..=offset + 20)
        .map(|id| {
            json!({
                "name": format!("area-{}", id),
                "url": format!("{}/location-area/{}/", upstream.base_url, id),
            })
        })
        .collect();

    Json(json!({
        "count": 40,
        "next": next,
        "previous": previous,
        "results": results,
    }))
}

async fn location_area(State(upstream): State<Upstream>, Path(name): Path<String>) -> Response {
    upstream.record(&format!("/location-area/{}", name));

    match name.as_str() {
        "canalave-city-area" | "1" => Json(json!({
            "id": 1,
            "name": "canalave-city-area",
            "pokemon_encounters": [
                {"pokemon": {"name": "tentacool", "url": ""}, "version_details": []},
                {"pokemon": {"name": "staryu", "url": ""}, "version_details": []}
            ]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn pokemon_json(id: u32, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "base_experience": 112,
        "height": 4,
        "weight": 60,
        "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}],
        "sprites": {"front_default": null, "back_default": null, "front_shiny": null, "back_shiny": null},
        "stats": [{"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": ""}}]
    })
}

async fn pokemon(State(upstream): State<Upstream>, Path(name): Path<String>) -> Response {
    let seen = upstream.record(&format!("/pokemon/{}", name));

    match name.as_str() {
        "pikachu" | "25" => Json(pokemon_json(25, "pikachu")).into_response(),
        // Malformed on the first request only
        "glitch" if seen == 1 => (StatusCode::OK, "{\"id\": 0, \"name\": ").into_response(),
        "glitch" => Json(pokemon_json(0, "glitch")).into_response(),
        "blank" => Json(pokemon_json(1, "")).into_response(),
        "missingno" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "slowpoke" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(pokemon_json(79, "slowpoke")).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn species(State(upstream): State<Upstream>, Path(name): Path<String>) -> Response {
    upstream.record(&format!("/pokemon-species/{}", name));

    match name.as_str() {
        "pikachu" | "25" => Json(json!({
            "id": 25,
            "name": "pikachu",
            "flavor_text_entries": [
                {"flavor_text": "Quand plusieurs\nde ces POKéMON", "language": {"name": "fr", "url": ""}, "version": null},
                {"flavor_text": "When several of\nthese POKéMON\u{c}gather", "language": {"name": "en", "url": ""}, "version": null}
            ]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

// == Helper Functions ==

fn test_config(upstream: &Upstream) -> Config {
    Config {
        base_url: upstream.base_url.clone(),
        request_timeout: Duration::from_millis(500),
        cache_ttl: Duration::from_secs(60),
        reap_interval: None,
    }
}

fn create_client(upstream: &Upstream) -> PokeClient {
    PokeClient::from_config(&test_config(upstream)).unwrap()
}

// == List Page Tests ==

#[tokio::test]
async fn test_list_first_page_miss_then_hit() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let first = assert_ok!(client.list_location_areas(None).await);
    assert_eq!(upstream.hits("/location-area?offset=0"), 1);

    let second = assert_ok!(client.list_location_areas(None).await);
    assert_eq!(upstream.hits("/location-area?offset=0"), 1, "Second call should be served from cache");

    assert_eq!(first, second);
    assert_eq!(first.results.len(), 20);
    assert_eq!(first.results[0].name, "area-1");
    assert!(first.previous.is_none());

    let stats = client.cache_stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_list_pages_forward_and_back() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let first = assert_ok!(client.list_location_areas(None).await);
    let next_url = first.next.clone().expect("first page should have a next link");

    let second = assert_ok!(client.list_location_areas(Some(&next_url)).await);
    assert_eq!(second.results[0].name, "area-21");
    assert!(second.next.is_none());

    let previous_url = second.previous.clone().expect("second page should have a previous link");
    let back = assert_ok!(client.list_location_areas(Some(&previous_url)).await);
    assert_eq!(back.results, first.results);

    // Same URL again is a cache hit
    assert_ok!(client.list_location_areas(Some(&next_url)).await);
    assert_eq!(upstream.hits("/location-area?offset=20"), 1);
}

// == Item Lookup Tests ==

#[tokio::test]
async fn test_get_item_case_variants_share_cache_entry() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let first = assert_ok!(client.get_pokemon("Pikachu").await);
    let second = assert_ok!(client.get_pokemon("pikachu").await);
    let third = assert_ok!(client.get_pokemon("  PIKACHU ").await);

    assert_eq!(upstream.hits("/pokemon/pikachu"), 1);
    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(first.name, "pikachu");
    assert_eq!(first.type_names(), vec!["electric"]);

    let stats = client.cache_stats().await;
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.total_entries, 1);
}

#[tokio::test]
async fn test_get_item_not_found() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let err = assert_err!(client.get_pokemon("DoesNotExist").await);
    match err {
        ClientError::NotFound { resource, identifier } => {
            assert_eq!(resource, "pokemon");
            assert_eq!(identifier, "doesnotexist");
        }
        other => panic!("expected NotFound, got {:?}", other),
    }

    // Failures are not cached
    assert_err!(client.get_pokemon("doesnotexist").await);
    assert_eq!(upstream.hits("/pokemon/doesnotexist"), 2);
}

#[tokio::test]
async fn test_reserved_characters_stay_in_identifier() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    for identifier in ["pikachu/", "pikachu?x", "pikachu#x", "../location-area/1"] {
        let err = assert_err!(client.get_pokemon(identifier).await);
        assert!(
            matches!(err, ClientError::NotFound { resource: "pokemon", .. }),
            "expected NotFound for {:?}, got {:?}",
            identifier,
            err
        );
    }

    // Each identifier reached the pokemon route as a single decoded segment
    assert_eq!(upstream.hits("/pokemon/pikachu/"), 1);
    assert_eq!(upstream.hits("/pokemon/pikachu?x"), 1);
    assert_eq!(upstream.hits("/pokemon/pikachu#x"), 1);
    assert_eq!(upstream.hits("/pokemon/../location-area/1"), 1);
    assert_eq!(upstream.hits("/pokemon/pikachu"), 0);
    assert_eq!(upstream.hits("/location-area/1"), 0);
    assert_eq!(client.cache_stats().await.total_entries, 0);
}

#[tokio::test]
async fn test_get_item_server_error_is_remote() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let err = assert_err!(client.get_pokemon("missingno").await);
    assert!(
        matches!(err, ClientError::Remote { status: 500, .. }),
        "expected Remote(500), got {:?}",
        err
    );
}

#[tokio::test]
async fn test_get_item_timeout_is_transport_error() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let err = assert_err!(client.get_pokemon("slowpoke").await);
    assert!(
        matches!(err, ClientError::Transport { .. }),
        "expected Transport, got {:?}",
        err
    );
    assert_eq!(client.cache_stats().await.total_entries, 0);
}

#[tokio::test]
async fn test_malformed_payload_is_not_cached() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let err = assert_err!(client.get_pokemon("glitch").await);
    assert!(matches!(err, ClientError::Decode { .. }), "expected Decode, got {:?}", err);
    assert_eq!(client.cache_stats().await.total_entries, 0);

    // Re-fetched rather than replaying the bad payload
    let pokemon = assert_ok!(client.get_pokemon("glitch").await);
    assert_eq!(pokemon.name, "glitch");
    assert_eq!(upstream.hits("/pokemon/glitch"), 2);

    assert_ok!(client.get_pokemon("glitch").await);
    assert_eq!(upstream.hits("/pokemon/glitch"), 2);
}

#[tokio::test]
async fn test_invalid_record_is_not_cached() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let err = assert_err!(client.get_pokemon("blank").await);
    assert!(matches!(err, ClientError::Decode { .. }), "expected Decode, got {:?}", err);

    assert_err!(client.get_pokemon("blank").await);
    assert_eq!(upstream.hits("/pokemon/blank"), 2);
}

#[tokio::test]
async fn test_get_location_area() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let area = assert_ok!(client.get_location_area("Canalave-City-Area").await);
    assert_eq!(area.id, 1);
    assert_eq!(area.pokemon_names().collect::<Vec<_>>(), vec!["tentacool", "staryu"]);

    let err = assert_err!(client.get_location_area("nowhere").await);
    assert!(matches!(
        err,
        ClientError::NotFound { resource: "location-area", .. }
    ));
}

#[tokio::test]
async fn test_flavor_text_uses_species_cache() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let english = assert_ok!(client.flavor_text("Pikachu", "en").await);
    assert_eq!(english.as_deref(), Some("When several of these POKéMON gather"));

    let japanese = assert_ok!(client.flavor_text("pikachu", "ja").await);
    assert!(japanese.is_none());

    assert_eq!(upstream.hits("/pokemon-species/pikachu"), 1);

    let err = assert_err!(client.flavor_text("doesnotexist", "en").await);
    assert!(matches!(
        err,
        ClientError::NotFound { resource: "pokemon-species", .. }
    ));
}

// == Expiry Tests ==

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let upstream = spawn_upstream().await;
    let config = Config {
        cache_ttl: Duration::from_millis(200),
        reap_interval: Some(Duration::from_secs(60)),
        ..test_config(&upstream)
    };
    let client = PokeClient::from_config(&config).unwrap();

    assert_ok!(client.get_pokemon("pikachu").await);
    assert_ok!(client.get_pokemon("pikachu").await);
    assert_eq!(upstream.hits("/pokemon/pikachu"), 1);

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_ok!(client.get_pokemon("pikachu").await);
    assert_eq!(upstream.hits("/pokemon/pikachu"), 2);
}

#[tokio::test]
async fn test_reaper_sweeps_client_cache() {
    let upstream = spawn_upstream().await;
    let config = Config {
        cache_ttl: Duration::from_millis(100),
        reap_interval: Some(Duration::from_millis(50)),
        ..test_config(&upstream)
    };
    let client = PokeClient::from_config(&config).unwrap();

    assert_ok!(client.get_pokemon("pikachu").await);
    assert_ok!(client.list_location_areas(None).await);
    assert_eq!(client.cache_stats().await.total_entries, 2);

    tokio::time::sleep(Duration::from_millis(400)).await;

    let stats = client.cache_stats().await;
    assert_eq!(stats.total_entries, 0);
    assert_eq!(stats.reaped, 2);

    client.shutdown();
}

// == Isolation & Concurrency Tests ==

#[tokio::test]
async fn test_independent_clients_do_not_share_cache() {
    let upstream = spawn_upstream().await;
    let first = create_client(&upstream);
    let second = create_client(&upstream);

    assert_ok!(first.get_pokemon("pikachu").await);
    assert_ok!(second.get_pokemon("pikachu").await);

    assert_eq!(upstream.hits("/pokemon/pikachu"), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_same_key() {
    let upstream = spawn_upstream().await;
    let client = create_client(&upstream);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let client = client.clone();
            let name = if i % 2 == 0 { "pikachu" } else { "PIKACHU" };
            tokio::spawn(async move { client.get_pokemon(name).await })
        })
        .collect();

    for handle in handles {
        let pokemon = assert_ok!(handle.await.expect("Task should not panic"));
        assert_eq!(pokemon.id, 25);
    }

    // Racing misses may each fetch, but never more than once per caller
    let fetches = upstream.hits("/pokemon/pikachu");
    assert!((1..=16).contains(&fetches), "unexpected fetch count {}", fetches);

    assert_ok!(client.get_pokemon("pikachu").await);
    assert_eq!(upstream.hits("/pokemon/pikachu"), fetches);
    assert_eq!(client.cache_stats().await.total_entries, 1);
}
