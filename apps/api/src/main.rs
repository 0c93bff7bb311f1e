mod config;
mod errors;
mod llm_client;
mod pipeline;
mod routes;
mod state;
mod synonyms;
mod table;
mod tokenize;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::synonyms::SynonymDict;
use crate::tokenize::CharClassTokenizer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.rust_log.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting adwriter API v{}", env!("CARGO_PKG_VERSION"));

    // Load the synonym dictionary; absence is non-fatal
    let synonyms = Arc::new(SynonymDict::load(&config.synonym_dict_path));
    if synonyms.is_empty() {
        warn!(
            "No synonym dictionary at {} — substitution runs as a no-op",
            config.synonym_dict_path.display()
        );
    } else {
        info!("Synonym dictionary loaded: {} entries", synonyms.len());
    }

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    ));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        llm,
        tokenizer: Arc::new(CharClassTokenizer),
        synonyms,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
