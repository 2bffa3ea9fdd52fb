use std::sync::Arc;

use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lead_qualifier::adapters::ai::{OpenAIConfig, OpenAIProvider, PromptReplyGenerator};
use lead_qualifier::adapters::http::{app_router, ConversationAppState};
use lead_qualifier::adapters::postgres::PostgresConversationRepository;
use lead_qualifier::adapters::vector::{InMemoryVectorIndex, PineconeConfig, PineconeIndex, ReasonSeeder};
use lead_qualifier::application::{GetConversationStatusHandler, HandleInboundHandler};
use lead_qualifier::config::{AppConfig, ServerConfig, VectorIndexConfig};
use lead_qualifier::domain::funnel::{FunnelStateMachine, SimilarityClassifier};
use lead_qualifier::ports::{ConversationRepository, EmbeddingProvider, VectorIndex};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    info!(
        environment = ?config.server.environment,
        chat_model = %config.ai.chat_model,
        "Starting lead qualifier"
    );

    // ── Database ─────────────────────────────────────────────────────────
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    let repository: Arc<dyn ConversationRepository> = Arc::new(PostgresConversationRepository::new(pool));

    // ── AI ───────────────────────────────────────────────────────────────
    let api_key = config.ai.openai_api_key.clone().unwrap_or_default();
    let openai = Arc::new(OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(&config.ai.chat_model)
            .with_embedding_model(&config.ai.embedding_model)
            .with_base_url(&config.ai.base_url)
            .with_timeout(config.ai.timeout()),
    )?);

    let replies = Arc::new(
        PromptReplyGenerator::new(openai.clone())
            .with_temperature(config.ai.temperature)
            .with_max_completion_tokens(config.ai.max_completion_tokens),
    );
    let classifier = build_classifier(&config.vector_index, openai).await;
    info!(semantic = classifier.has_semantic_backend(), "Reason classifier ready");

    let funnel = FunnelStateMachine::new(replies, classifier)
        .with_threshold(config.funnel.qualification_threshold);

    // ── HTTP ─────────────────────────────────────────────────────────────
    let session_timeout = config.funnel.session_timeout();
    let state = ConversationAppState::new(
        Arc::new(HandleInboundHandler::new(repository.clone(), funnel, session_timeout)),
        Arc::new(GetConversationStatusHandler::new(repository, session_timeout)),
    );

    // Turns are never cut short here; outbound calls carry their own timeouts.
    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server));

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Picks the semantic backend and seeds it.
///
/// Pinecone when configured and reachable, otherwise an in-process index.
/// A seeded hosted index may already hold the examples, so a failed seed
/// only downgrades to keywords for the in-process index.
async fn build_classifier(
    config: &VectorIndexConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> SimilarityClassifier {
    let hosted = if config.has_pinecone() {
        let pinecone = PineconeConfig::new(config.api_key.clone().unwrap_or_default(), &config.index_name)
            .with_control_plane_url(&config.control_plane_url)
            .with_dimension(config.dimension)
            .with_serverless(&config.cloud, &config.region);

        match PineconeIndex::connect(pinecone).await {
            Ok(index) => {
                info!(index = %config.index_name, "Connected to Pinecone");
                Some(Arc::new(index) as Arc<dyn VectorIndex>)
            }
            Err(e) => {
                warn!(stage = "index_connect", error = %e, "Pinecone unavailable, using in-memory index");
                None
            }
        }
    } else {
        None
    };

    match hosted {
        Some(index) => {
            ReasonSeeder::new(embedder.clone(), index.clone()).seed().await;
            SimilarityClassifier::semantic(embedder, index)
        }
        None => {
            let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new());
            if ReasonSeeder::new(embedder.clone(), index.clone()).seed().await {
                SimilarityClassifier::semantic(embedder, index)
            } else {
                warn!("Reason classification limited to keyword heuristic");
                SimilarityClassifier::keyword_only()
            }
        }
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = config.cors_origins_list();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
