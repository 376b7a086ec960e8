use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::division::{Division, DivisionUpdate, NewDivision};
use crate::service::directory;
use crate::store::Store;

#[utoipa::path(
    post,
    path = "/api/divisions",
    request_body = NewDivision,
    responses(
        (status = 201, description = "Division created", body = Division),
        (status = 400, description = "Invalid name"),
        (status = 404, description = "Manager or parent not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn create_division(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<NewDivision>,
) -> AppResult<impl Responder> {
    auth.require_staff()?;
    let division = directory::create_division(store.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(division))
}

#[utoipa::path(
    get,
    path = "/api/divisions",
    responses(
        (status = 200, description = "All divisions ordered by name", body = [Division])
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn list_divisions(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
) -> AppResult<impl Responder> {
    let divisions = store.list_divisions().await?;
    Ok(HttpResponse::Ok().json(divisions))
}

#[utoipa::path(
    get,
    path = "/api/divisions/{id}",
    params(("id" = u64, Path, description = "Division ID")),
    responses(
        (status = 200, description = "Division found", body = Division),
        (status = 404, description = "Division not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn get_division(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    let division = store
        .get_division(path.into_inner())
        .await?
        .ok_or(AppError::NotFound("division"))?;
    Ok(HttpResponse::Ok().json(division))
}

/// Partial update; send `null` for `manager_id` or `parent_id` to clear it
#[utoipa::path(
    put,
    path = "/api/divisions/{id}",
    params(("id" = u64, Path, description = "Division ID")),
    request_body = DivisionUpdate,
    responses(
        (status = 200, description = "Division updated", body = Division),
        (status = 400, description = "Invalid name or cyclic parent"),
        (status = 404, description = "Division, manager or parent not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn update_division(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<DivisionUpdate>,
) -> AppResult<impl Responder> {
    auth.require_staff()?;
    let division =
        directory::update_division(store.get_ref(), path.into_inner(), payload.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(division))
}

/// Parents from the direct one up to the root
#[utoipa::path(
    get,
    path = "/api/divisions/{id}/ancestors",
    params(("id" = u64, Path, description = "Division ID")),
    responses(
        (status = 200, description = "Ancestor chain", body = [Division]),
        (status = 404, description = "Division not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn ancestors(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    let chain = directory::ancestors(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(chain))
}

/// Children and forms of the division keep their rows with the reference cleared
#[utoipa::path(
    delete,
    path = "/api/divisions/{id}",
    params(("id" = u64, Path, description = "Division ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Division not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn delete_division(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    auth.require_staff()?;
    if !store.delete_division(path.into_inner()).await? {
        return Err(AppError::NotFound("division"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
