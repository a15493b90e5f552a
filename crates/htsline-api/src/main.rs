//! htsline-api - HTTP API server for htsline.
//!
//! Wires the catalog, matcher, rate aggregator, and duty calculator behind
//! the transport endpoints and owns process bootstrap: environment loading,
//! tracing, catalog load, and backend construction.

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use htsline_catalog::{Catalog, SemanticMatcher};
use htsline_core::defaults;
use htsline_duty::FeeSchedule;
use htsline_inference::{OllamaBackend, OpenAIBackend};
use htsline_rates::{RateAggregator, RemedySearchSource, SurchargeSource};

use handlers::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically and keep the
/// log ordered when a request fans out into several rate lookups.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .ok();

    let catalog_path = std::env::var("HTSLINE_CATALOG_PATH")
        .unwrap_or_else(|_| defaults::CATALOG_PATH.to_string());
    let catalog = Arc::new(Catalog::load(&catalog_path)?);
    info!(
        subsystem = "api",
        result_count = catalog.len(),
        "Catalog ready from {}",
        catalog_path
    );

    let embedder = Arc::new(OllamaBackend::from_env());
    let generator = Arc::new(OpenAIBackend::from_env()?);

    let matcher = Arc::new(SemanticMatcher::new(catalog.clone(), embedder.clone()));
    let aggregator = Arc::new(RateAggregator::new(
        catalog.clone(),
        Arc::new(RemedySearchSource::from_env()),
        Arc::new(SurchargeSource::emergency_powers(generator.clone())),
        Arc::new(SurchargeSource::reciprocal(generator.clone())),
    ));

    let state = AppState {
        catalog,
        matcher,
        aggregator,
        schedule: FeeSchedule::from_env(),
    };

    let app = handlers::router(state).layer(
        tower::ServiceBuilder::new()
            .layer(tower_http::request_id::SetRequestIdLayer::x_request_id(
                MakeRequestUuidV7,
            ))
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .layer(tower_http::request_id::PropagateRequestIdLayer::x_request_id())
            .layer(tower_http::cors::CorsLayer::permissive()),
    );

    let port = std::env::var("HTSLINE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(defaults::SERVER_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(subsystem = "api", "Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
