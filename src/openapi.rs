//! OpenAPI documentation configuration.
//!
//! The generated document is served at `/api/docs` via the Scalar UI.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Security scheme for authenticated endpoints (Bearer JWT).
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer_auth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token authentication. Obtain a token from `POST /api/users/login` \
                            and include it in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OrbitFund API",
        description = "Crowdfunding submission intake for space missions: user accounts, \
                       mission proposal submissions with media uploads, and an admin review surface."
    ),
    paths(
        api::handlers::users::register,
        api::handlers::users::login,
        api::handlers::users::verify_admin,
        api::handlers::submissions::submit,
        api::handlers::approvals::pending_ids,
        api::handlers::approvals::submission_details,
        api::handlers::health::health,
    ),
    components(schemas(
        api::models::users::RegisterRequest,
        api::models::users::RegisterResponse,
        api::models::users::LoginRequest,
        api::models::users::LoginResponse,
        api::models::users::AdminStatusResponse,
        api::models::submissions::SubmissionResponse,
        api::models::submissions::SubmissionDetailsResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration, login, and admin verification"),
        (name = "submissions", description = "Mission proposal intake"),
        (name = "approvals", description = "Admin review of pending submissions"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds_and_covers_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        assert!(paths.contains(&"/api/users/register"));
        assert!(paths.contains(&"/api/users/login"));
        assert!(paths.contains(&"/api/users/verify-admin"));
        assert!(paths.contains(&"/api/submissions"));
        assert!(paths.contains(&"/api/approvals/pending-ids"));
        assert!(paths.contains(&"/api/approvals/{id}"));
        assert!(paths.contains(&"/api/health"));
    }
}
