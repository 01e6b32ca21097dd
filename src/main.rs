use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use puente::api::{self, AppState};
use puente::config::Config;
use puente::inference::InferenceClient;
use puente::languages::LanguageRegistry;
use puente::router::TranslationRouter;
use puente::speech::SpeechService;
use puente::store::TranslationStore;
use puente::translation::TranslationService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("puente=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!(pivot = %config.pivot_code, "starting translation backend");

    let store = TranslationStore::new(&config.database_path)
        .with_context(|| format!("failed to open database at {}", config.database_path))?;
    let client = InferenceClient::new();
    let registry = LanguageRegistry::with_defaults();

    let router = TranslationRouter::new(client.clone(), &config);
    let translation = TranslationService::new(store.clone(), router, registry.clone());
    let speech = SpeechService::new(
        store,
        client,
        registry,
        config.tts_deployment(),
        config.asr_deployment(),
    );

    let app = api::create_router(AppState {
        translation: Arc::new(translation),
        speech: Arc::new(speech),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
