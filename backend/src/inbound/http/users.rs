//! Account API handlers.
//!
//! ```text
//! GET  /api/v1/me
//! POST /api/v1/register {"email":"a@b.com","username":"bob","password":"secret"}
//! POST /api/v1/login {"usernameOrEmail":"bob","password":"secret"}
//! POST /api/v1/logout
//! POST /api/v1/forgot-password {"email":"a@b.com"}
//! POST /api/v1/change-password {"token":"...","newPassword":"secret2"}
//! ```
//!
//! Account mutations answer `200` with a [`UserResponse`] envelope. A
//! rejected input is reported in `errors`, so clients check that before
//! reading `user`. Infrastructure failures still use the domain `Error`
//! shape and a non-2xx status.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::domain::{AccountOutcome, Error, FieldError, UserView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    /// Contact address; must contain `@`.
    #[schema(example = "bob@example.com")]
    pub email: String,
    /// Login name; longer than two characters and without `@`.
    #[schema(example = "bob")]
    pub username: String,
    /// Plaintext password; longer than three characters.
    #[schema(example = "secret")]
    pub password: String,
}

impl From<RegisterBody> for RegisterRequest {
    fn from(body: RegisterBody) -> Self {
        Self {
            email: body.email,
            username: body.username,
            password: body.password,
        }
    }
}

/// Login body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    /// Username, or email when the value contains `@`.
    #[schema(example = "bob")]
    pub username_or_email: String,
    /// Plaintext password.
    #[schema(example = "secret")]
    pub password: String,
}

impl From<LoginBody> for LoginRequest {
    fn from(body: LoginBody) -> Self {
        Self {
            username_or_email: body.username_or_email,
            password: body.password,
        }
    }
}

/// Body for `POST /api/v1/forgot-password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ForgotPasswordBody {
    /// Address the reset link should go to.
    #[schema(example = "bob@example.com")]
    pub email: String,
}

/// Body for `POST /api/v1/change-password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    /// Token from the reset link.
    pub token: String,
    /// Replacement password; longer than three characters.
    pub new_password: String,
}

impl From<ChangePasswordBody> for ChangePasswordRequest {
    fn from(body: ChangePasswordBody) -> Self {
        Self {
            token: body.token,
            new_password: body.new_password,
        }
    }
}

/// Envelope returned by account mutations.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct UserResponse {
    /// Present when the input was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Present when the caller is now signed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserView>,
}

/// Bind the session on success and build the response envelope.
fn settle(session: &SessionContext, outcome: AccountOutcome) -> ApiResult<UserResponse> {
    match outcome {
        AccountOutcome::Authenticated(user) => {
            let id = user.id();
            session.persist_user(&id)?;
            Ok(UserResponse {
                errors: None,
                user: Some(user.view_for(Some(&id))),
            })
        }
        AccountOutcome::Rejected(error) => Ok(UserResponse {
            errors: Some(vec![error]),
            user: None,
        }),
    }
}

/// Return the signed-in user, or `null` for anonymous callers.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user or null", body = UserView),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "me"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Option<UserView>>> {
    let Some(id) = session.user_id()? else {
        return Ok(web::Json(None));
    };
    let user = state.accounts_query.me(&id).await?;
    Ok(web::Json(user.map(|found| found.view_for(Some(&id)))))
}

/// Create an account and sign in as it.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterBody,
    responses(
        (status = 200, description = "Registered user or field errors", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie on success"))),
        (status = 400, description = "Malformed body", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "register"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterBody>,
) -> ApiResult<web::Json<UserResponse>> {
    let outcome = state.accounts.register(payload.into_inner().into()).await?;
    settle(&session, outcome).map(web::Json)
}

/// Sign in with a username or email and a password.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Signed-in user or field errors", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie on success"))),
        (status = 400, description = "Malformed body", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<UserResponse>> {
    let outcome = state.accounts.login(payload.into_inner().into()).await?;
    settle(&session, outcome).map(web::Json)
}

/// End the session. Always reports `true`.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 200, description = "Session cleared", body = bool)),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(true)
}

/// Send a reset link if the address belongs to an account.
///
/// Answers `true` either way so callers cannot probe for registered
/// addresses.
#[utoipa::path(
    post,
    path = "/api/v1/forgot-password",
    request_body = ForgotPasswordBody,
    responses(
        (status = 200, description = "Request accepted", body = bool),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "forgotPassword"
)]
#[post("/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordBody>,
) -> ApiResult<web::Json<bool>> {
    let accepted = state.accounts.forgot_password(&payload.email).await?;
    Ok(web::Json(accepted))
}

/// Redeem a reset token, set a new password, and sign in.
#[utoipa::path(
    post,
    path = "/api/v1/change-password",
    request_body = ChangePasswordBody,
    responses(
        (status = 200, description = "Signed-in user or field errors", body = UserResponse),
        (status = 400, description = "Malformed body", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[post("/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ChangePasswordBody>,
) -> ApiResult<web::Json<UserResponse>> {
    let outcome = state
        .accounts
        .change_password(payload.into_inner().into())
        .await?;
    settle(&session, outcome).map(web::Json)
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
