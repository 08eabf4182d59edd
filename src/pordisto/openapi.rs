use utoipa::OpenApi;

/// OpenAPI document for the login gateway.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::pordisto::handlers::health::health,
        crate::pordisto::handlers::login::login,
        crate::pordisto::handlers::callback::callback,
        crate::pordisto::handlers::me::me,
    ),
    components(schemas(crate::pordisto::handlers::me::MeResponse)),
    tags(
        (name = "auth", description = "OAuth2 login flow"),
        (name = "me", description = "Authenticated principal"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
