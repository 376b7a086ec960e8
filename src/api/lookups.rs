//! Positions and skills. Both are flat name tables with the same handlers.

use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::lookup::{Lookup, LookupKind, NewLookup};
use crate::service::directory::create_lookup;
use crate::store::Store;

async fn create(
    kind: LookupKind,
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<NewLookup>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;
    let lookup = create_lookup(store.get_ref(), kind, &payload.name).await?;
    tracing::info!(kind = kind.label(), id = lookup.id, "Lookup created");
    Ok(HttpResponse::Created().json(lookup))
}

async fn list(kind: LookupKind, store: web::Data<dyn Store>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(store.list_lookups(kind).await?))
}

async fn delete(
    kind: LookupKind,
    auth: AuthUser,
    store: web::Data<dyn Store>,
    id: u64,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;
    if !store.delete_lookup(kind, id).await? {
        return Err(AppError::NotFound(kind.label()));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

#[utoipa::path(
    post,
    path = "/api/positions",
    request_body = NewLookup,
    responses(
        (status = 201, description = "Position created", body = Lookup),
        (status = 400, description = "Invalid name")
    ),
    security(("bearer_auth" = [])),
    tag = "Directory"
)]
pub async fn create_position(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<NewLookup>,
) -> AppResult<impl Responder> {
    create(LookupKind::Position, auth, store, payload).await
}

#[utoipa::path(
    get,
    path = "/api/positions",
    responses((status = 200, description = "Positions ordered by name", body = [Lookup])),
    security(("bearer_auth" = [])),
    tag = "Directory"
)]
pub async fn list_positions(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
) -> AppResult<impl Responder> {
    list(LookupKind::Position, store).await
}

#[utoipa::path(
    delete,
    path = "/api/positions/{id}",
    params(("id" = u64, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Position not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Directory"
)]
pub async fn delete_position(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    delete(LookupKind::Position, auth, store, path.into_inner()).await
}

#[utoipa::path(
    post,
    path = "/api/skills",
    request_body = NewLookup,
    responses(
        (status = 201, description = "Skill created", body = Lookup),
        (status = 400, description = "Invalid name")
    ),
    security(("bearer_auth" = [])),
    tag = "Directory"
)]
pub async fn create_skill(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<NewLookup>,
) -> AppResult<impl Responder> {
    create(LookupKind::Skill, auth, store, payload).await
}

#[utoipa::path(
    get,
    path = "/api/skills",
    responses((status = 200, description = "Skills ordered by name", body = [Lookup])),
    security(("bearer_auth" = [])),
    tag = "Directory"
)]
pub async fn list_skills(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
) -> AppResult<impl Responder> {
    list(LookupKind::Skill, store).await
}

#[utoipa::path(
    delete,
    path = "/api/skills/{id}",
    params(("id" = u64, Path, description = "Skill ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Skill not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Directory"
)]
pub async fn delete_skill(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    delete(LookupKind::Skill, auth, store, path.into_inner()).await
}
