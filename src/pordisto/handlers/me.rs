use axum::{response::Json, Extension};
use serde::Serialize;
use utoipa::ToSchema;

use crate::pordisto::principal::Principal;

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub email: String,
}

/// Identify the authenticated principal.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The verified email behind the credential", body = MeResponse),
        (status = 401, description = "Missing or invalid bearer credential"),
    ),
    tag = "me"
)]
pub async fn me(Extension(principal): Extension<Principal>) -> Json<MeResponse> {
    Json(MeResponse {
        email: principal.email().to_string(),
    })
}
