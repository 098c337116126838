//! # API server
//!
//! Assembles the axum router, mounts the Swagger UI, configures CORS and
//! binds the listener. Owned and started by the `folio-app` binary.

use std::future::Future;

use axum::Router;
use folio_monitor::runtime::MonitorHandle;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use crate::routes::{control, network, status};

// ============================================================
//  Shared state
// ============================================================

/// Injected into every handler through axum's `State` extractor.
///
/// # Invariants
/// - Handlers only reach monitor state through the handle's command channel
///   and published status.
#[derive(Clone)]
pub struct AppState {
    pub monitor: MonitorHandle,
}

// ============================================================
//  OpenAPI document
// ============================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio monitor API",
        version = "0.1.0",
        description = "Control surface of the portfolio monitor: status, refresh, alert reset, audio, display and network profiles.",
        license(name = "MIT")
    ),
    tags(
        (name = "Status", description = "Read-only monitor state"),
        (name = "Control", description = "Device commands applied by the monitor loop"),
        (name = "Networks", description = "Stored network profiles")
    )
)]
pub struct ApiDoc;

// ============================================================
//  Router and server
// ============================================================

/// # Summary
/// Full application router: API routes, Swagger UI and CORS.
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(status::get_status))
        .routes(routes!(control::refresh))
        .routes(routes!(control::reset_alerts))
        .routes(routes!(control::toggle_access_point))
        .routes(routes!(control::set_volume))
        .routes(routes!(control::set_brightness))
        .routes(routes!(control::self_test))
        .routes(routes!(network::add_network))
        .routes(routes!(network::remove_network))
        .with_state(state)
        .split_for_parts();

    // Local appliance, any origin may call it.
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// # Summary
/// Binds `bind_addr` and serves until `shutdown` resolves.
///
/// # Arguments
/// * `state` - shared state injected by the binary.
/// * `bind_addr` - listen address, e.g. `"0.0.0.0:8080"`.
/// * `shutdown` - graceful shutdown signal.
///
/// # Returns
/// The bind or serve error, if any.
pub async fn start_server<F>(state: AppState, bind_addr: &str, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Folio API listening on {}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}
