pub mod db;
pub mod error;
pub mod importer;
pub mod models;
pub mod routes;

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recallbox_core::{IntervalPlan, Scheduler};

use crate::db::{CardStore, SqliteStore};

/// Shared application state.
///
/// The store handle sits behind a mutex, which serializes every
/// read-modify-write of review state within this process; across
/// processes the state store stays last-write-wins.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<SqliteStore>>,
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn new(store: SqliteStore, scheduler: Scheduler) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            scheduler: Arc::new(scheduler),
        }
    }
}

/// Build the API router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/cards",
            get(routes::cards::list).post(routes::cards::create),
        )
        .route(
            "/api/cards/:id",
            get(routes::cards::get_card)
                .put(routes::cards::update)
                .delete(routes::cards::remove),
        )
        .route("/api/modules", get(routes::cards::modules))
        .route("/api/export", get(routes::cards::export))
        .route("/api/import", post(routes::cards::import_json))
        .route("/api/import/csv", post(routes::cards::import_csv))
        .route("/api/review/due", get(routes::review::due))
        .route("/api/review/:id", get(routes::review::get_state))
        .route("/api/review/:id/complete", post(routes::review::complete))
        .route("/api/review/:id/reset", post(routes::review::reset))
        .route("/api/diff", post(routes::diff::diff))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse a comma-separated day-gap list, e.g. `3,6,12`.
fn plan_from_env(raw: Option<&str>) -> IntervalPlan {
    match raw {
        Some(text) => {
            let gaps: Vec<i64> = text
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect();
            if gaps.is_empty() {
                IntervalPlan::default()
            } else {
                IntervalPlan::new(gaps)
            }
        }
        None => IntervalPlan::default(),
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "recallbox.db".to_string());
    tracing::info!("Opening card store at {}", db_path);
    let store = SqliteStore::open(&db_path)?;

    let plan = plan_from_env(std::env::var("REVIEW_PLAN").ok().as_deref());
    tracing::info!("Review plan: {:?} days", plan.gaps());
    let scheduler = Scheduler::new(plan);

    // Optional seed file, loaded once per start; existing cards keep
    // their position and review progress.
    if let Ok(cards_path) = std::env::var("CARDS_PATH") {
        let cards = importer::load_cards_file(Path::new(&cards_path))?;
        let imported = store.upsert_cards(&cards)?;
        tracing::info!("Loaded {} cards from {}", imported, cards_path);
    }

    let state = AppState::new(store, scheduler);
    let app = app(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
