use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};

use crate::admin::{EntityKind, registered, view_for};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Admin view descriptions for the entity kinds enabled in configuration
#[utoipa::path(
    get,
    path = "/api/admin/registry",
    responses(
        (status = 200, description = "Registered admin views", body = Object, example = json!([{
            "entity": "user",
            "list_display": ["email", "is_staff", "is_active"],
            "list_filter": ["email", "is_staff", "is_active"],
            "search_fields": ["email"],
            "ordering": ["email"],
            "inlines": []
        }])),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn registry(auth: AuthUser, config: web::Data<Config>) -> AppResult<impl Responder> {
    auth.require_staff()?;
    Ok(HttpResponse::Ok().json(registered(&config.admin_entities)))
}

/// One admin view, if its entity kind is enabled
#[utoipa::path(
    get,
    path = "/api/admin/registry/{entity}",
    params(("entity" = String, Path, description = "Entity kind, e.g. `form` or `timekeeping`")),
    responses(
        (status = 200, description = "Admin view", body = Object),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown or unregistered entity")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn registry_entry(
    auth: AuthUser,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> AppResult<impl Responder> {
    auth.require_staff()?;
    let view = EntityKind::from_str(path.as_str())
        .ok()
        .filter(|entity| config.admin_entities.contains(entity))
        .and_then(view_for)
        .ok_or(AppError::NotFound("admin view"))?;
    Ok(HttpResponse::Ok().json(view))
}
