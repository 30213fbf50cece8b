use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hrp_core::config::Settings;
use hrp_core::enrich::polygon::PolygonBrandingClient;
use hrp_core::enrich::{DisabledEnrichment, EnrichmentClient};
use hrp_core::optimize::hrp::HrpBackendClient;
use hrp_core::orchestrator::{FormSnapshot, SubmissionOrchestrator, SubmitError};
use hrp_core::suggest::keyword::KeywordLookupClient;
use hrp_core::suggest::{SuggestionBatch, SymbolSuggester};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let optimizer = Arc::new(HrpBackendClient::from_settings(&settings)?);
    let enricher: Arc<dyn EnrichmentClient> = match PolygonBrandingClient::from_settings(&settings)
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "branding lookups disabled; rows will render without logos");
            Arc::new(DisabledEnrichment)
        }
    };
    let lookup = Arc::new(KeywordLookupClient::from_settings(&settings)?);

    let state = AppState {
        form: Arc::new(SubmissionOrchestrator::new(optimizer, enricher)),
        suggester: Arc::new(SymbolSuggester::new(lookup)),
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, optimizer = settings.optimizer_base_url(), "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// One form per process; the page is a single-user tool.
#[derive(Clone)]
struct AppState {
    form: Arc<SubmissionOrchestrator>,
    suggester: Arc<SymbolSuggester>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/form", get(get_form))
        .route("/form/slots/:index", put(put_slot).delete(delete_slot))
        .route("/form/submit", post(submit_form))
        .route("/suggest", get(get_suggestions))
        .route("/suggest/clear", post(clear_suggestions))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_form(State(state): State<AppState>) -> Json<FormSnapshot> {
    Json(state.form.snapshot().await)
}

#[derive(Debug, Deserialize)]
struct SlotBody {
    text: String,
}

async fn put_slot(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(body): Json<SlotBody>,
) -> StatusCode {
    match state.form.set_slot(index, body.text).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::NOT_FOUND,
    }
}

async fn delete_slot(State(state): State<AppState>, Path(index): Path<usize>) -> StatusCode {
    match state.form.clear_slot(index).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::NOT_FOUND,
    }
}

/// Runs a full cycle. The body is always the form snapshot; the status tells the outcome.
async fn submit_form(State(state): State<AppState>) -> (StatusCode, Json<FormSnapshot>) {
    let status = match state.form.submit().await {
        Ok(_) => StatusCode::OK,
        Err(SubmitError::Busy) => StatusCode::CONFLICT,
        Err(SubmitError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        Err(err @ SubmitError::Backend(_)) => {
            sentry_anyhow::capture_anyhow(&anyhow::Error::new(err));
            StatusCode::BAD_GATEWAY
        }
    };

    (status, Json(state.form.snapshot().await))
}

#[derive(Debug, Deserialize)]
struct SuggestParams {
    #[serde(default)]
    q: String,
}

async fn get_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<SuggestionBatch> {
    Json(state.suggester.suggest(&params.q).await)
}

async fn clear_suggestions(State(state): State<AppState>) -> StatusCode {
    state.suggester.clear().await;
    StatusCode::NO_CONTENT
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
