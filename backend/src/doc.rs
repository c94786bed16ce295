//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the
//! request and response schemas they use, and the session cookie security
//! scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, FieldError, UserView, VoteValue};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::posts::{
    PaginatedPosts, PostBody, PostDetailsView, PostView, VoteBody,
};
use crate::inbound::http::users::{
    ChangePasswordBody, ForgotPasswordBody, LoginBody, RegisterBody, UserResponse,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by register, login and change-password.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Forum backend API",
        description = "Accounts, sessions, posts and votes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::me,
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::forgot_password,
        crate::inbound::http::users::change_password,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::posts::vote,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        FieldError,
        UserView,
        UserResponse,
        RegisterBody,
        LoginBody,
        ForgotPasswordBody,
        ChangePasswordBody,
        PostBody,
        VoteBody,
        PostView,
        PostDetailsView,
        PaginatedPosts,
        VoteValue,
        ProbeStatus,
    )),
    tags(
        (name = "users", description = "Registration, sessions and password resets"),
        (name = "posts", description = "Posts and votes"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
