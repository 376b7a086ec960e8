//! Account factory: email normalization, password hashing and the
//! staff/superuser flag rules.

use tracing::info;

use crate::auth::password::{hash_password, unusable_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::model::user::{ExtraFields, NewUser, User};
use crate::store::Store;

/// Trims the address and lowercases the domain part. The local part is
/// left untouched since mailbox names may be case sensitive.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub async fn create_user(
    store: &dyn Store,
    email: &str,
    password: Option<&str>,
    extra: ExtraFields,
) -> AppResult<User> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AppError::validation("Users must have an email address"));
    }

    let password = match password {
        Some(p) => hash_password(p)?,
        None => unusable_password(),
    };

    let user = store
        .insert_user(NewUser {
            email,
            password,
            is_staff: extra.is_staff.unwrap_or(false),
            is_active: extra.is_active.unwrap_or(true),
            is_superuser: extra.is_superuser.unwrap_or(false),
        })
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => AppError::Conflict("Email already exists".into()),
            other => other,
        })?;

    info!(user_id = user.id, is_staff = user.is_staff, "User created");
    Ok(user)
}

pub async fn create_staffuser(
    store: &dyn Store,
    email: &str,
    password: Option<&str>,
    extra: ExtraFields,
) -> AppResult<User> {
    let extra = ExtraFields {
        is_staff: Some(extra.is_staff.unwrap_or(true)),
        is_active: Some(extra.is_active.unwrap_or(true)),
        ..extra
    };
    if extra.is_staff != Some(true) {
        return Err(AppError::validation("Staff user must have is_staff=True."));
    }
    create_user(store, email, password, extra).await
}

pub async fn create_superuser(
    store: &dyn Store,
    email: &str,
    password: Option<&str>,
    extra: ExtraFields,
) -> AppResult<User> {
    let extra = ExtraFields {
        is_staff: Some(extra.is_staff.unwrap_or(true)),
        is_active: Some(extra.is_active.unwrap_or(true)),
        is_superuser: Some(extra.is_superuser.unwrap_or(true)),
    };
    if extra.is_staff != Some(true) {
        return Err(AppError::validation("Superuser must have is_staff=True."));
    }
    if extra.is_superuser != Some(true) {
        return Err(AppError::validation("Superuser must have is_superuser=True."));
    }
    create_user(store, email, password, extra).await
}

/// Checks credentials. Unknown email, wrong password and inactive account
/// all fail the same way.
pub async fn authenticate(store: &dyn Store, email: &str, password: &str) -> AppResult<User> {
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let user = store
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(password, &user.password) {
        return Err(invalid());
    }
    if !user.is_active {
        return Err(invalid());
    }
    Ok(user)
}

/// Creates the configured superuser unless an account with that email exists.
pub async fn bootstrap_superuser(store: &dyn Store, email: &str, password: &str) -> AppResult<()> {
    if store.find_user_by_email(&normalize_email(email)).await?.is_some() {
        return Ok(());
    }
    let user = create_superuser(store, email, Some(password), ExtraFields::default()).await?;
    info!(user_id = user.id, "Bootstrap superuser created");
    Ok(())
}
