use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderName, HeaderValue, Method, header},
    response::IntoResponse,
    routing::get,
};
use platform_api::Outcome;
use products_directory::EmployeeDirectory;
use serde::Serialize;
use serde_json::{Map, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn EmployeeDirectory>,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "directory server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/employees", get(list_all).post(create_employee))
        .route("/employees/search", get(search_everyone))
        .route("/employees/search/{fragment}", get(search_by_name))
        .route("/employees/highestSalary", get(highest_salary))
        .route(
            "/employees/topTenHighestEarningEmployeeNames",
            get(top_ten_earners),
        )
        .route("/employees/{id}", get(get_by_id).delete(delete_by_id))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

async fn list_all(State(state): State<AppState>) -> impl IntoResponse {
    state.directory.list_all().await.json()
}

async fn search_everyone(State(state): State<AppState>) -> impl IntoResponse {
    state.directory.search_by_name("").await.json()
}

async fn search_by_name(
    State(state): State<AppState>,
    Path(fragment): Path<String>,
) -> impl IntoResponse {
    state.directory.search_by_name(&fragment).await.json()
}

async fn get_by_id(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    state.directory.get_by_id(&id).await.json()
}

async fn highest_salary(State(state): State<AppState>) -> impl IntoResponse {
    state.directory.highest_salary().await.json()
}

async fn top_ten_earners(State(state): State<AppState>) -> impl IntoResponse {
    state.directory.top_ten_earners().await.json()
}

async fn create_employee(
    State(state): State<AppState>,
    Json(input): Json<Map<String, Value>>,
) -> Outcome<String> {
    state.directory.create_employee(input).await
}

async fn delete_by_id(State(state): State<AppState>, Path(id): Path<String>) -> Outcome<String> {
    state.directory.delete_by_id(&id).await
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        upstream: state.config.upstream.base_url.to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    upstream: String,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
