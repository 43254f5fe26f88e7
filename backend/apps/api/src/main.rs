//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::extract::State;
use axum::{
    Json, Router, http,
    http::{HeaderName, Method, header},
    routing::get,
};
use newsletter::domain::repository::ChallengeStore;
use newsletter::presentation::router::newsletter_router_memory;
use newsletter::{
    MemoryChallengeStore, NewsletterConfig, PgNewsletterStore, ServerKeypair, newsletter_router,
};
use serde_json::json;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kernel::error::app_error::AppResult;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,newsletter=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Server keypair: load from the environment, or run with an ephemeral
    // one. The private key itself is never logged.
    let keypair = match env::var("SERVER_PRIVATE_KEY_B64") {
        Ok(encoded) => {
            let keypair = ServerKeypair::from_base64(&encoded)
                .map_err(|e| anyhow::anyhow!("SERVER_PRIVATE_KEY_B64 rejected: {e}"))?;
            tracing::info!("Loaded server keypair from environment");
            keypair
        }
        Err(_) => {
            let keypair = ServerKeypair::generate();
            tracing::warn!(
                "SERVER_PRIVATE_KEY_B64 not set, generated ephemeral keypair; \
                 clients must refetch the public key after every restart"
            );
            keypair
        }
    };
    tracing::info!(public_key = %keypair.public_key_b64(), "Server public key ready");
    let keypair = Arc::new(keypair);

    let config = Arc::new(if cfg!(debug_assertions) {
        NewsletterConfig::development()
    } else {
        NewsletterConfig::default()
    });

    // Challenges are short-lived and stay in memory regardless of the
    // database backend
    let challenges = Arc::new(MemoryChallengeStore::new());

    // Database connection is optional: without it the API still serves
    // sign-ups into the in-memory store (degraded mode)
    let (newsletter_routes, pool) = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            // Startup cleanup: errors here should not prevent server startup
            let store = PgNewsletterStore::new(pool.clone());
            match store.cleanup_stale().await {
                Ok(rate_limits) => {
                    tracing::info!(
                        rate_limits_deleted = rate_limits,
                        "Startup cleanup completed"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Startup cleanup failed, continuing anyway");
                }
            }

            let routes =
                newsletter_router(challenges.clone(), store, keypair.clone(), config.clone());
            (routes, Some(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, running with in-memory stores");
            let routes =
                newsletter_router_memory(challenges.clone(), keypair.clone(), config.clone());
            (routes, None)
        }
    };

    // Background sweep keeps the challenge registry bounded
    let sweep_store = challenges.clone();
    let sweep_interval = config.sweep_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_store.sweep().await {
                tracing::warn!(error = %e, "Challenge sweep failed");
            }
        }
    });

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-security-token"),
            HeaderName::from_static("x-fingerprint"),
            HeaderName::from_static("x-challenge-solution"),
            HeaderName::from_static("x-request-signature"),
            HeaderName::from_static("x-request-id"),
        ]))
        .allow_credentials(true);

    // Build router
    let ops = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(OpsState { pool });

    let app = Router::new()
        .merge(newsletter_routes)
        .merge(ops)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// State for the liveness endpoints
#[derive(Clone)]
struct OpsState {
    pool: Option<PgPool>,
}

/// GET /
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Newsletter security API",
        "status": "healthy",
    }))
}

/// GET /health
///
/// Always 200; a broken database is reported in the body, not as a
/// failing probe.
async fn health(State(state): State<OpsState>) -> Json<serde_json::Value> {
    let database = match &state.pool {
        Some(pool) => match ping(pool).await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                "error"
            }
        },
        None => "in-memory",
    };

    let status = if database == "error" {
        "degraded"
    } else {
        "healthy"
    };

    Json(json!({
        "status": status,
        "database": database,
    }))
}

/// Lightweight database connectivity probe
async fn ping(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
