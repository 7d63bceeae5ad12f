use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod classifier;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod store;

use classifier::EmotionClassifier;
use config::{Config, StorageBackend};
use store::{EntryStore, FileEntryStore, PgEntryStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub db: Option<PgPool>,
    pub config: Arc<Config>,
    pub classifier: Arc<EmotionClassifier>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emojournal_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    let config = Arc::new(config);

    // Entry store: flat file (single-tenant) or Postgres (multi-tenant)
    let (store, db): (Arc<dyn EntryStore>, Option<PgPool>) = match &config.storage {
        StorageBackend::File { path } => {
            tracing::info!(path = %path, "Using the file-backed entry store");
            (Arc::new(FileEntryStore::new(path.clone())), None)
        }
        StorageBackend::Postgres { database_url } => {
            let pool = db::create_pool(database_url).await;

            // Run migrations
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");

            tracing::info!("Database migrations applied");

            (Arc::new(PgEntryStore::new(pool.clone())), Some(pool))
        }
    };

    let classifier = Arc::new(EmotionClassifier::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_api_url.clone(),
    ));
    if !classifier.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set; /analyze will report the classifier as unconfigured");
    }

    let state = AppState {
        store,
        db,
        config: config.clone(),
        classifier,
    };

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let journal_routes = Router::new()
        .route("/analyze", post(handlers::entries::analyze))
        .route("/save", post(handlers::entries::save_entry))
        .route("/history", get(handlers::entries::list_history))
        .route("/history7", get(handlers::entries::history7))
        .route("/history90", get(handlers::entries::history90))
        .route("/stats", get(handlers::entries::stats));

    // File mode has no sign-in: every request runs as the fixed local user.
    // Postgres mode mounts the account routes and gates the journal behind
    // a bearer session.
    let app = match &config.storage {
        StorageBackend::File { .. } => public_routes.merge(
            journal_routes.layer(middleware::from_fn(auth::middleware::attach_local_user)),
        ),
        StorageBackend::Postgres { .. } => {
            let account_routes = Router::new()
                .route("/auth/register", post(handlers::auth::register))
                .route("/auth/login", post(handlers::auth::login));

            let protected_routes = journal_routes
                .route("/auth/me", get(handlers::auth::me))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth::middleware::require_auth,
                ));

            public_routes.merge(account_routes).merge(protected_routes)
        }
    };

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .unwrap()];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = app
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
