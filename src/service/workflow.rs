//! Form submission and the approval state machine.
//!
//! A form starts `pending`. From there an approver (the recipient, the
//! division manager or staff) may approve, reject, forward or cancel it, and
//! the sender may cancel it. Every other state is final. Each accepted
//! transition drops a notification into the other party's feed.

use tracing::{info, warn};

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::form::{Form, FormStatus, NewForm};
use crate::service::notifications::notify;
use crate::store::Store;

/// The form write has already committed; a failed notification is only logged.
async fn notify_after_commit(
    store: &dyn Store,
    sender_id: u64,
    recipient_id: u64,
    form_id: u64,
    notification_type: &str,
    content: &str,
) {
    let sent = notify(
        store,
        Some(sender_id),
        recipient_id,
        Some(form_id),
        notification_type,
        content,
    )
    .await;
    if let Err(e) = sent {
        warn!(error = %e, form_id, recipient_id, notification_type, "Notification not delivered");
    }
}

pub async fn submit(store: &dyn Store, sender_id: u64, new: NewForm) -> AppResult<Form> {
    new.validate()?;

    if let Some(id) = new.recipient_id {
        store.get_user(id).await?.ok_or(AppError::NotFound("recipient"))?;
    }
    if let Some(id) = new.division_id {
        store.get_division(id).await?.ok_or(AppError::NotFound("division"))?;
    }

    let form = store.insert_form(sender_id, new).await?;
    info!(form_id = form.id, sender_id, form_type = %form.form_type, "Form submitted");

    if let Some(recipient_id) = form.recipient_id {
        let content = format!("{}: {}", form.form_type.label(), form.title);
        notify_after_commit(store, sender_id, recipient_id, form.id, "submitted", &content).await;
    }
    Ok(form)
}

async fn is_approver(store: &dyn Store, actor: &AuthUser, form: &Form) -> AppResult<bool> {
    if actor.is_staff || actor.is_superuser || form.recipient_id == Some(actor.user_id) {
        return Ok(true);
    }
    let Some(division_id) = form.division_id else {
        return Ok(false);
    };
    let manager = store
        .get_division(division_id)
        .await?
        .and_then(|d| d.manager_id);
    Ok(manager == Some(actor.user_id))
}

/// Parties to a form, its division manager and staff may read it.
pub async fn can_view(store: &dyn Store, actor: &AuthUser, form: &Form) -> AppResult<bool> {
    Ok(form.sender_id == Some(actor.user_id) || is_approver(store, actor, form).await?)
}

pub async fn transition(
    store: &dyn Store,
    actor: &AuthUser,
    form_id: u64,
    target: FormStatus,
) -> AppResult<Form> {
    let form = store
        .get_form(form_id)
        .await?
        .ok_or(AppError::NotFound("form"))?;

    if !form.status.can_transition_to(target) {
        return Err(AppError::InvalidTransition {
            from: form.status,
            to: target,
        });
    }

    let is_sender = form.sender_id == Some(actor.user_id);
    let allowed = is_approver(store, actor, &form).await?
        || (is_sender && target == FormStatus::Canceled);
    if !allowed {
        return Err(AppError::forbidden(format!(
            "Not allowed to mark this form {}",
            target.label()
        )));
    }

    if !store
        .update_form_status(form_id, FormStatus::Pending, target)
        .await?
    {
        // lost a race against another approver
        let current = store
            .get_form(form_id)
            .await?
            .ok_or(AppError::NotFound("form"))?;
        warn!(form_id, current = current.status.label(), "Concurrent form transition");
        return Err(AppError::InvalidTransition {
            from: current.status,
            to: target,
        });
    }

    let form = Form {
        status: target,
        ..form
    };
    info!(form_id, actor = actor.user_id, status = target.label(), "Form status changed");

    let notify_id = if is_sender {
        form.recipient_id
    } else {
        form.sender_id
    };
    if let Some(recipient_id) = notify_id.filter(|id| *id != actor.user_id) {
        let content = format!("{} {}", form.title, target.label());
        notify_after_commit(
            store,
            actor.user_id,
            recipient_id,
            form.id,
            target.label(),
            &content,
        )
        .await;
    }
    Ok(form)
}
