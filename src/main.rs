use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use impostor::config::ServerConfig;
use impostor::state::persist::ConfigStore;
use impostor::state::AppState;
use impostor::words::{open_word_cache, LlmWordGenerator, WordGenerator, WordService};
use impostor::{autosave, llm};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "impostor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Impostor...");

    let config = ServerConfig::from_env();

    // Initialize LLM providers
    let llm_config = llm::LlmConfig::from_env();
    let generator: Option<Arc<dyn WordGenerator>> = match llm_config.build_manager() {
        Ok(manager) => {
            tracing::info!("LLM providers initialized successfully");
            Some(Arc::new(LlmWordGenerator::new(
                manager,
                llm_config.difficulty,
                llm_config.default_timeout,
                llm_config.default_max_tokens,
            )))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to initialize LLM providers: {}. Using cached and built-in words only.",
                e
            );
            None
        }
    };

    let cache = open_word_cache(config.word_cache_path()).await;
    let words = WordService::new(cache, generator).with_generation_timeout(config.generation_timeout);
    let state = Arc::new(AppState::with_words(Arc::new(words)));

    // Restore the last setup configuration
    let store = ConfigStore::new(config.config_path());
    match store.load().await {
        Ok(Some(saved)) => match state.import_config(saved).await {
            Ok(()) => tracing::info!("Restored configuration from {}", store.path().display()),
            Err(e) => tracing::warn!("Ignoring stored configuration: {}", e),
        },
        Ok(None) => tracing::info!("No stored configuration, starting with defaults"),
        Err(e) => tracing::warn!("Failed to load configuration: {}", e),
    }

    // Spawn background task persisting configuration changes
    autosave::spawn_config_autosave(state.clone(), store, config.autosave_interval);

    let app = impostor::router(state, "static");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
