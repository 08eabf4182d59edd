//! Router assembly and server entry point.

use anyhow::Result;
use axum::{
    http::{HeaderName, HeaderValue},
    middleware,
    routing::get,
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::info;
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::cli::globals::GlobalArgs;

pub mod handlers;
pub mod oauth;
mod openapi;
pub mod principal;
pub mod state;
pub mod token;

pub use state::AuthState;

/// Build the application router around shared auth state.
#[must_use]
pub fn router(auth_state: Arc<AuthState>) -> Router {
    let protected = Router::new()
        .route("/me", get(handlers::me::me))
        .route_layer(middleware::from_fn(principal::require_auth));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health::health))
        .route("/login", get(handlers::login::login))
        .route("/callback", get(handlers::callback::callback))
        .merge(protected)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http())
                .layer(Extension(auth_state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, globals: &GlobalArgs) -> Result<()> {
    let auth_state = Arc::new(AuthState::new(globals)?);

    let app = router(auth_state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
