use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::auth::{auth::AuthUser, jwt::generate_access_token};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::model::user::User;
use crate::service::accounts::authenticate;
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "jane@company.com")]
    pub email: String,
    #[schema(example = "secret")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(store, config, payload), fields(email = %payload.email))]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> AppResult<impl Responder> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password required"));
    }

    let user = authenticate(store.get_ref(), &payload.email, &payload.password)
        .await
        .inspect_err(|e| info!(error = %e, "Login rejected"))?;

    let access_token = generate_access_token(&user, &config.jwt_secret, config.access_token_ttl)?;
    info!(user_id = user.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse { access_token }))
}

/// The authenticated user's own account
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser, store: web::Data<dyn Store>) -> AppResult<impl Responder> {
    let user = store
        .get_user(auth.user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(HttpResponse::Ok().json(user))
}
