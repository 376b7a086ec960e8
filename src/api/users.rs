use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::page::{Page, Paginated, UserPage};
use crate::model::user::{ExtraFields, User, UserFilter, UserFlags};
use crate::service::accounts::{create_staffuser, create_superuser, create_user};
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "jane@company.com", format = "email")]
    pub email: String,
    /// Omit to create an account that cannot log in
    pub password: Option<String>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

#[derive(Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Substring match on email
    pub search: Option<String>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Create a user account (staff only; superusers only for elevated accounts)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing email or invalid flags"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn create(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<CreateUser>,
) -> AppResult<impl Responder> {
    auth.require_staff()?;

    let payload = payload.into_inner();
    let extra = ExtraFields {
        is_staff: payload.is_staff,
        is_active: payload.is_active,
        is_superuser: payload.is_superuser,
    };
    let password = payload.password.as_deref();

    let user = if payload.is_superuser == Some(true) {
        auth.require_superuser()?;
        create_superuser(store.get_ref(), &payload.email, password, extra).await?
    } else if payload.is_staff == Some(true) {
        create_staffuser(store.get_ref(), &payload.email, password, extra).await?
    } else {
        create_user(store.get_ref(), &payload.email, password, extra).await?
    };

    Ok(HttpResponse::Created().json(user))
}

/// Paginated user list, ordered by email
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Paginated user list", body = UserPage),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn list(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<UserListQuery>,
) -> AppResult<impl Responder> {
    auth.require_staff()?;

    let query = query.into_inner();
    let page = Page::new(query.page, query.per_page);
    let filter = UserFilter {
        search: query.search,
        is_staff: query.is_staff,
        is_active: query.is_active,
    };

    let (users, total) = store.list_users(&filter, page).await?;
    Ok(HttpResponse::Ok().json(Paginated::new(users, page, total)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn get(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    let user_id = path.into_inner();
    if user_id != auth.user_id {
        auth.require_staff()?;
    }

    let user = store
        .get_user(user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Change role flags. Granting or revoking superuser, or touching a superuser
/// account at all, needs a superuser.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    request_body = UserFlags,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<UserFlags>,
) -> AppResult<impl Responder> {
    auth.require_staff()?;
    let user_id = path.into_inner();
    let flags = payload.into_inner();
    let target = store
        .get_user(user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    if flags.is_superuser.is_some() || target.is_superuser {
        auth.require_superuser()?;
    }

    let user = store
        .update_user_flags(user_id, flags)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Delete a user. Forms, notifications, divisions and time records keep
/// their rows with the reference cleared.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn delete(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    auth.require_staff()?;
    let user_id = path.into_inner();
    if user_id == auth.user_id {
        return Err(AppError::validation("Cannot delete your own account"));
    }
    let target = store
        .get_user(user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    if target.is_superuser {
        auth.require_superuser()?;
    }

    if !store.delete_user(user_id).await? {
        return Err(AppError::NotFound("user"));
    }
    tracing::info!(user_id, deleted_by = auth.user_id, "User deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
