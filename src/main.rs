use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use reality_check::adapters::{
    api_router, FailoverAIProvider, InMemoryTranscriptStore, OpenAIConfig, OpenAIProvider,
    PostgresTranscriptStore, ProviderModelGateway, SessionHandlers,
};
use reality_check::application::SessionOrchestrator;
use reality_check::config::{AppConfig, ConfigError, ServerConfig, ValidationError};
use reality_check::ports::{AIProvider, TranscriptStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate().map_err(ConfigError::from)?;

    let provider = build_provider(&config)?;
    let gateway = Arc::new(ProviderModelGateway::new(
        provider,
        config.gateway.settings(&config.ai),
    ));
    let store = build_store(&config).await?;
    let orchestrator = Arc::new(SessionOrchestrator::new(
        store,
        gateway,
        config.ai.default_model.clone(),
    ));

    let app = with_layers(api_router(SessionHandlers::new(orchestrator)), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Reality Check listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_provider(config: &AppConfig) -> Result<Arc<dyn AIProvider>, BoxError> {
    let key = config
        .ai
        .openai_api_key
        .as_ref()
        .ok_or(ValidationError::MissingRequired("OPENAI_API_KEY"))?;

    let primary = OpenAIProvider::new(
        OpenAIConfig::from_secret(key.clone())
            .with_model(config.ai.default_model.clone())
            .with_base_url(config.ai.base_url.clone()),
    )?;
    let mut provider = FailoverAIProvider::new(Arc::new(primary));

    if let (true, Some(url), Some(key)) = (
        config.ai.has_fallback(),
        config.ai.fallback_base_url.as_ref(),
        config.ai.fallback_key(),
    ) {
        let secondary = OpenAIProvider::new(
            OpenAIConfig::from_secret(key.clone())
                .with_model(config.ai.default_model.clone())
                .with_base_url(url.clone())
                .with_name("openai-fallback"),
        )?;
        provider = provider.with_fallback(Arc::new(secondary));
        tracing::info!(fallback_url = %url, "Secondary completion endpoint enabled");
    }

    Ok(Arc::new(provider))
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn TranscriptStore>, BoxError> {
    match &config.database {
        Some(database) => {
            let pool = database.connect().await?;
            if database.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
            }
            tracing::info!("Using PostgreSQL transcript store");
            Ok(Arc::new(PostgresTranscriptStore::new(pool)))
        }
        None => {
            tracing::warn!("No database configured, sessions are kept in memory");
            Ok(Arc::new(InMemoryTranscriptStore::new()))
        }
    }
}

fn with_layers(router: Router, server: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    }
    .allow_methods(Any)
    .allow_headers(Any);

    router
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
