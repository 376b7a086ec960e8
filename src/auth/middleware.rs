use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

use crate::auth::auth::{AuthUser, bearer_token};
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::store::Store;

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(json!({ "message": message }));
    req.into_response(resp.map_into_boxed_body())
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let store = req
        .app_data::<Data<dyn Store>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Store missing"))?;

    let token = match bearer_token(req.request()) {
        Some(t) => t.to_owned(),
        None => return Ok(unauthorized(req, "Missing or malformed Authorization header")),
    };

    let claims = match verify_token(&token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return Ok(unauthorized(req, "Invalid or expired token"));
        }
    };

    // roles and liveness come from the stored account, not the claims
    let user = match store.get_user(claims.user_id).await? {
        Some(user) if user.is_active => user,
        _ => {
            tracing::debug!(user_id = claims.user_id, "Token for a deleted or inactive user");
            return Ok(unauthorized(req, "Account no longer active"));
        }
    };

    req.extensions_mut().insert(AuthUser::from(&user));

    next.call(req).await
}
