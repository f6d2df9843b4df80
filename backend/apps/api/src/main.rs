//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are
//! rendered by the auth crate.

use anyhow::Context;
use auth::{
    AuthAppState, AuthConfig, AuthMetrics, MemorySessionStore, PgAuditRepository, RaoidcClient,
    RaoidcConfig, auth_router, session_router,
};
use axum::{
    Router,
    extract::State,
    http::{self, Method, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// How often expired sessions are swept from the in-memory store
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,audit=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection (audit trail)
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_config = load_auth_config()?;
    tracing::info!(
        app_base_url = %auth_config.app_base_url,
        raoidc_base_url = %auth_config.raoidc.base_url,
        session_ttl_secs = auth_config.session_ttl.as_secs(),
        features = ?auth_config.enabled_features,
        "Auth configuration loaded"
    );

    // Sessions live in process memory; sweep expired ones in the background
    let sessions = MemorySessionStore::new(auth_config.session_ttl);
    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let deleted = sweeper.cleanup_expired().await;
            if deleted > 0 {
                tracing::info!(sessions_deleted = deleted, "Session cleanup completed");
            }
        }
    });

    let provider = RaoidcClient::new(Arc::new(auth_config.raoidc.clone()))?;
    let metrics = AuthMetrics::new()?;

    let state = AuthAppState::new(
        sessions,
        provider,
        PgAuditRepository::new(pool.clone()),
        auth_config,
        metrics,
    );

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

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
            header::ACCEPT,
            http::HeaderName::from_static(auth::middleware::CSRF_HEADER),
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(state.metrics.clone())
        .merge(auth_router(state.clone()))
        .merge(session_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("LISTEN_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Read auth settings from the environment
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let app_base_url = Url::parse(&env::var("APP_BASE_URL").context("APP_BASE_URL must be set")?)
        .context("APP_BASE_URL is not a URL")?;
    let raoidc_base_url = Url::parse(
        &env::var("AUTH_RAOIDC_BASE_URL").context("AUTH_RAOIDC_BASE_URL must be set")?,
    )
    .context("AUTH_RAOIDC_BASE_URL is not a URL")?;
    let client_id = env::var("AUTH_RAOIDC_CLIENT_ID").context("AUTH_RAOIDC_CLIENT_ID must be set")?;
    let rascl_logout_url =
        env::var("AUTH_RASCL_LOGOUT_URL").context("AUTH_RASCL_LOGOUT_URL must be set")?;

    let mut raoidc = RaoidcConfig::new(raoidc_base_url, client_id);
    if let Ok(secs) = env::var("AUTH_RAOIDC_TIMEOUT_SECS") {
        raoidc.http_timeout = Duration::from_secs(
            secs.parse().context("AUTH_RAOIDC_TIMEOUT_SECS must be an integer")?,
        );
    }
    if let Ok(issuer) = env::var("AUTH_RAOIDC_ISSUER") {
        raoidc.issuer = issuer;
    }

    let mut config = if cfg!(debug_assertions) {
        AuthConfig::development(app_base_url, raoidc, &rascl_logout_url)
    } else {
        // In production, load secret from environment
        let secret_b64 = env::var("SESSION_SECRET").context("SESSION_SECRET must be set in production")?;
        let secret_bytes = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;
        let mut config = AuthConfig::new(app_base_url, raoidc, rascl_logout_url);
        config.session_secret = secret_bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes"))?;
        config
    };

    if let Ok(secs) = env::var("SESSION_TTL_SECS") {
        config.session_ttl =
            Duration::from_secs(secs.parse().context("SESSION_TTL_SECS must be an integer")?);
    }

    if let Ok(features) = env::var("ENABLED_FEATURES") {
        config.enabled_features = features
            .split(',')
            .map(str::trim)
            .filter(|feature| !feature.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(config)
}

/// GET /metrics
async fn render_metrics(State(metrics): State<Arc<AuthMetrics>>) -> impl IntoResponse {
    match metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
