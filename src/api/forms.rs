use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::form::{Form, FormFilter, NewForm, StatusChange};
use crate::model::page::{FormPage, Page, Paginated};
use crate::service::workflow::{can_view, submit, transition};
use crate::store::Store;

/// Submit a request form. It starts out pending.
#[utoipa::path(
    post,
    path = "/api/forms",
    request_body = NewForm,
    responses(
        (status = 201, description = "Form submitted", body = Form),
        (status = 400, description = "Invalid title, content or date range"),
        (status = 404, description = "Recipient or division not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Form"
)]
pub async fn create_form(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<NewForm>,
) -> AppResult<impl Responder> {
    let form = submit(store.get_ref(), auth.user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(form))
}

/// List forms, newest first. Non-staff users only see forms they sent or
/// received.
#[utoipa::path(
    get,
    path = "/api/forms",
    params(FormFilter),
    responses(
        (status = 200, description = "Paginated form list", body = FormPage)
    ),
    security(("bearer_auth" = [])),
    tag = "Form"
)]
pub async fn list_forms(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<FormFilter>,
) -> AppResult<impl Responder> {
    let mut filter = query.into_inner();
    let page = Page::new(filter.page, filter.per_page);

    if auth.require_staff().is_err() {
        let own = Some(auth.user_id);
        match (filter.sender_id, filter.recipient_id) {
            (None, None) => filter.sender_id = own,
            (s, r) if s == own || r == own => {}
            _ => return Err(AppError::forbidden("Can only list your own forms")),
        }
    }

    let (forms, total) = store.list_forms(&filter, page).await?;
    Ok(HttpResponse::Ok().json(Paginated::new(forms, page, total)))
}

#[utoipa::path(
    get,
    path = "/api/forms/{id}",
    params(("id" = u64, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form found", body = Form),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Form not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Form"
)]
pub async fn get_form(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    let form = store
        .get_form(path.into_inner())
        .await?
        .ok_or(AppError::NotFound("form"))?;

    if !can_view(store.get_ref(), &auth, &form).await? {
        return Err(AppError::forbidden("Not a party to this form"));
    }
    Ok(HttpResponse::Ok().json(form))
}

/// Move a pending form to approved, rejected, forwarded or canceled
#[utoipa::path(
    put,
    path = "/api/forms/{id}/status",
    params(("id" = u64, Path, description = "Form ID")),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Status updated", body = Form),
        (status = 403, description = "Actor may not make this transition"),
        (status = 404, description = "Form not found"),
        (status = 409, description = "Form is no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Form"
)]
pub async fn update_status(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<StatusChange>,
) -> AppResult<impl Responder> {
    let form = transition(store.get_ref(), &auth, path.into_inner(), payload.status).await?;
    Ok(HttpResponse::Ok().json(form))
}

#[utoipa::path(
    delete,
    path = "/api/forms/{id}",
    params(("id" = u64, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Form not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Form"
)]
pub async fn delete_form(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    auth.require_staff()?;
    let form_id = path.into_inner();

    if !store.delete_form(form_id).await? {
        return Err(AppError::NotFound("form"));
    }
    tracing::info!(form_id, deleted_by = auth.user_id, "Form deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
