//! Integration tests for the translation backend.
//!
//! Each test spins up the real HTTP server against mock inference
//! deployments and a throwaway database, then exercises the API the way a
//! frontend would.

use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use puente::api::{self, AppState};
use puente::config::Config;
use puente::inference::InferenceClient;
use puente::languages::LanguageRegistry;
use puente::router::TranslationRouter;
use puente::speech::{decode_waveform, SpeechService};
use puente::store::{NewTranslationRecord, TranslationStore};
use puente::translation::TranslationService;

// ==================== Test Helpers ====================

/// Create a test config pointing every deployment at the mock servers.
fn create_test_config(native: &MockServer, raw: &MockServer, temp_dir: &TempDir) -> Config {
    Config {
        native_model_url: native.uri(),
        native_model_name: "nllb-native".to_string(),
        raw_model_url: raw.uri(),
        raw_model_name: "nllb".to_string(),
        tts_model_url: raw.uri(),
        tts_model_name: "tts".to_string(),
        asr_model_url: raw.uri(),
        asr_model_name: "asr".to_string(),
        pivot_code: "spa_Latn".to_string(),
        database_path: temp_dir
            .path()
            .join("test.db")
            .to_str()
            .unwrap()
            .to_string(),
        port: 0,
    }
}

/// Start the full application on an ephemeral port. Returns the base URL
/// and a handle to the underlying store for seeding and assertions.
async fn spawn_app(native: &MockServer, raw: &MockServer) -> (String, TranslationStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(native, raw, &temp_dir);

    let store = TranslationStore::new(&config.database_path).expect("Failed to create store");
    let client = InferenceClient::new();
    let registry = LanguageRegistry::with_defaults();

    let router = TranslationRouter::new(client.clone(), &config);
    let translation = TranslationService::new(store.clone(), router, registry.clone());
    let speech = SpeechService::new(
        store.clone(),
        client,
        registry,
        config.tts_deployment(),
        config.asr_deployment(),
    );

    let app = api::create_router(AppState {
        translation: Arc::new(translation),
        speech: Arc::new(speech),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });

    (format!("http://{}", addr), store, temp_dir)
}

fn prediction_response(text: &str, model: &str) -> serde_json::Value {
    json!({
        "model_name": model,
        "model_version": "1",
        "outputs": [
            { "name": "output_text", "shape": [1, 1], "datatype": "BYTES", "data": [text] }
        ]
    })
}

async fn never_called(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

fn seed_validated(store: &TranslationStore, src: &str, dst: &str, src_code: &str, dst_code: &str) {
    let row = store
        .insert(NewTranslationRecord {
            src_text: src,
            dst_text: dst,
            src_lang_code: src_code,
            dst_lang_code: dst_code,
            model_name: Some("nllb"),
            model_version: Some("1"),
            user: None,
        })
        .expect("insert");
    store
        .set_review(row.id, Some(true), Some(true))
        .expect("review");
}

// ==================== Health and Registry Tests ====================

#[tokio::test]
async fn test_health_endpoint() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;
    let (base_url, _store, _temp_dir) = spawn_app(&native, &raw).await;

    let response = reqwest::get(format!("{}/api/health", base_url))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_languages_endpoint_lists_native_languages() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;
    let (base_url, _store, _temp_dir) = spawn_app(&native, &raw).await;

    let languages: Vec<serde_json::Value> = reqwest::get(format!("{}/api/languages", base_url))
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("should be JSON");

    let rap = languages
        .iter()
        .find(|l| l["code"] == "rap_Latn")
        .expect("Rapa Nui should be listed");
    assert_eq!(rap["is_native"], true);
    assert!(languages.iter().any(|l| l["code"] == "spa_Latn"));
}

// ==================== End-to-End Translation Tests ====================

#[tokio::test]
async fn test_spanish_to_rapa_nui_single_native_call() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;

    // Pivot source to native destination: one call on the native deployment
    Mock::given(method("POST"))
        .and(body_string_contains("Hola"))
        .and(body_string_contains("rap_Latn"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(prediction_response("Iorana", "nllb-native")),
        )
        .expect(1)
        .mount(&native)
        .await;
    never_called(&raw).await;

    let (base_url, store, _temp_dir) = spawn_app(&native, &raw).await;

    let response: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/translate", base_url))
        .json(&json!({
            "src_text": "Hola",
            "src_lang": "spa_Latn",
            "dst_lang": "rap_Latn"
        }))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("should be JSON");

    assert_eq!(response["dst_text"], "Iorana");
    assert_eq!(response["model_name"], "nllb-native");
    assert_eq!(store.pair_count().unwrap(), 1);
}

#[tokio::test]
async fn test_french_to_rapa_nui_pivots_through_spanish() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;

    // First hop: raw deployment, French into the pivot
    Mock::given(method("POST"))
        .and(body_string_contains("Bonjour"))
        .and(body_string_contains("spa_Latn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction_response("Hola", "nllb")))
        .expect(1)
        .mount(&raw)
        .await;

    // Second hop: native deployment, pivot into Rapa Nui, fed the first
    // hop's output
    Mock::given(method("POST"))
        .and(body_string_contains("Hola"))
        .and(body_string_contains("rap_Latn"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(prediction_response("Iorana", "nllb-native")),
        )
        .expect(1)
        .mount(&native)
        .await;

    let (base_url, _store, _temp_dir) = spawn_app(&native, &raw).await;

    let response: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/translate", base_url))
        .json(&json!({
            "src_text": "Bonjour",
            "src_lang": "fra_Latn",
            "dst_lang": "rap_Latn"
        }))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("should be JSON");

    // Text and model identity come from the second hop
    assert_eq!(response["dst_text"], "Iorana");
    assert_eq!(response["model_name"], "nllb-native");
}

#[tokio::test]
async fn test_identity_request_returns_text_unchanged() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;
    never_called(&native).await;
    never_called(&raw).await;

    let (base_url, store, _temp_dir) = spawn_app(&native, &raw).await;

    let response: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/translate", base_url))
        .json(&json!({
            "src_text": "Hola",
            "src_lang": "spa_Latn",
            "dst_lang": "spa_Latn"
        }))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("should be JSON");

    assert_eq!(response["dst_text"], "Hola");
    assert_eq!(store.pair_count().unwrap(), 0);
}

// ==================== Cache Tests ====================

#[tokio::test]
async fn test_validated_cache_short_circuits_inference() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;
    never_called(&native).await;
    never_called(&raw).await;

    let (base_url, store, _temp_dir) = spawn_app(&native, &raw).await;
    seed_validated(&store, "Hola", "Iorana", "spa_Latn", "rap_Latn");

    let response: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/translate", base_url))
        .json(&json!({
            "src_text": "hola",
            "src_lang": "spa_Latn",
            "dst_lang": "rap_Latn"
        }))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("should be JSON");

    assert_eq!(response["dst_text"], "Iorana");
    // Cache-served responses carry no model identity
    assert!(response["model_name"].is_null());
    // The hit still persisted a fresh tracking row
    assert_eq!(store.pair_count().unwrap(), 2);
}

#[tokio::test]
async fn test_cache_serves_reverse_direction() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;
    never_called(&native).await;
    never_called(&raw).await;

    let (base_url, store, _temp_dir) = spawn_app(&native, &raw).await;
    seed_validated(&store, "Hola", "Iorana", "spa_Latn", "rap_Latn");

    // Ask for the pair in the opposite direction to how it was stored
    let response: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/translate", base_url))
        .json(&json!({
            "src_text": "iorana",
            "src_lang": "rap_Latn",
            "dst_lang": "spa_Latn"
        }))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("should be JSON");

    assert_eq!(response["dst_text"], "Hola");
    assert_eq!(response["dst_lang"], "spa_Latn");
}

// ==================== Error Path Tests ====================

#[tokio::test]
async fn test_missing_src_lang_returns_400_naming_field() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;
    never_called(&native).await;
    never_called(&raw).await;

    let (base_url, _store, _temp_dir) = spawn_app(&native, &raw).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/translate", base_url))
        .json(&json!({
            "src_text": "Hola",
            "dst_lang": "rap_Latn"
        }))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.expect("should be JSON");
    assert!(body["error"].as_str().unwrap().contains("src_lang"));
}

#[tokio::test]
async fn test_inference_failure_returns_502_without_endpoint() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;
    never_called(&raw).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "not ready" })))
        .expect(1)
        .mount(&native)
        .await;

    let (base_url, store, _temp_dir) = spawn_app(&native, &raw).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/translate", base_url))
        .json(&json!({
            "src_text": "Hola",
            "src_lang": "spa_Latn",
            "dst_lang": "rap_Latn"
        }))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await.expect("should be JSON");
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains(&native.uri()));

    // A failed route persists nothing
    assert_eq!(store.pair_count().unwrap(), 0);
}

// ==================== Speech Tests ====================

#[tokio::test]
async fn test_text_to_speech_roundtrip_and_cache() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;
    never_called(&native).await;

    // The deployment may be hit once; the second request must be cached
    Mock::given(method("POST"))
        .and(body_string_contains("Iorana"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model_name": "tts-rap",
            "model_version": "2",
            "outputs": [
                { "name": "waveform", "shape": [1, 3], "datatype": "FP32", "data": [0.0, 0.5, -0.5] }
            ]
        })))
        .expect(1)
        .mount(&raw)
        .await;

    let (base_url, _store, _temp_dir) = spawn_app(&native, &raw).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let response: serde_json::Value = client
            .post(format!("{}/api/text-to-speech", base_url))
            .json(&json!({ "text": "Iorana", "lang": "rap_Latn" }))
            .send()
            .await
            .expect("request should succeed")
            .json()
            .await
            .expect("should be JSON");

        let audio = response["audio"].as_str().expect("audio present");
        assert_eq!(decode_waveform(audio), Some(vec![0.0, 0.5, -0.5]));
        assert_eq!(response["model_name"], "tts-rap");
    }
}

#[tokio::test]
async fn test_speech_to_text_endpoint() {
    let native = MockServer::start().await;
    let raw = MockServer::start().await;
    never_called(&native).await;

    Mock::given(method("POST"))
        .and(body_string_contains("sampling_rate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(prediction_response("iorana korua", "asr-rap")),
        )
        .expect(1)
        .mount(&raw)
        .await;

    let (base_url, _store, _temp_dir) = spawn_app(&native, &raw).await;

    let audio = puente::speech::encode_waveform(&[0.0, 0.1, -0.1]);
    let response: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/speech-to-text", base_url))
        .json(&json!({ "audio": audio, "lang": "rap_Latn", "sampling_rate": 16000 }))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("should be JSON");

    assert_eq!(response["text"], "iorana korua");
    assert_eq!(response["model_name"], "asr-rap");
}
