//! HTTP front for the search pipeline.
//!
//! - `GET /` lists the selectable niches and region codes
//! - `GET /buscar?nicho=<id>&uf=<code>` runs one query

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::models::ResultRecord;
use crate::scrapers::{BidSource, NicheFilter};
use crate::taxonomy::{self, Catalog, ALL_NICHES};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn BidSource>,
}

/// Query string of `/buscar`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default = "default_niche")]
    pub nicho: String,
    #[serde(default)]
    pub uf: String,
}

fn default_niche() -> String {
    ALL_NICHES.to_string()
}

/// Always reports success; a failed query has already become an empty list.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<ResultRecord>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(catalog))
        .route("/buscar", get(search))
        .with_state(state)
}

async fn catalog() -> Json<Catalog> {
    Json(taxonomy::catalog())
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let filter = NicheFilter::new(params.nicho, params.uf);
    info!(
        "Search request for {} (niche: '{}', region: '{}')",
        state.source.source_name(),
        filter.niche_id,
        filter.region_code
    );

    let data = state.source.search(filter).await;
    Json(SearchResponse {
        success: true,
        data,
    })
}

/// `host` may be an IP address or a resolvable name such as `localhost`.
async fn bind(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))
}

/// Start the web server.
pub async fn serve(config: &ServerConfig, source: Arc<dyn BidSource>) -> anyhow::Result<()> {
    let app = create_router(AppState { source });

    let listener = bind(config).await?;
    info!("Starting server at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
