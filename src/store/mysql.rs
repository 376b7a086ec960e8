use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, MySqlPool};

use super::Store;
use crate::error::{AppError, AppResult};
use crate::model::{
    division::{DIVISION_CYCLE, Division, NewDivision, closes_cycle},
    form::{Form, FormFilter, FormStatus, NewForm, parse_form_status, parse_form_type},
    lookup::{Lookup, LookupKind},
    notification::{NewNotification, Notification},
    page::Page,
    time_keeping::TimeKeeping,
    user::{NewUser, User, UserFilter, UserFlags},
};

const USER_COLUMNS: &str = "id, email, password, is_staff, is_active, is_superuser, created_at";
const FORM_COLUMNS: &str = "id, title, sender_id, recipient_id, division_id, content, form_type, \
     status, created_at, compensation_from, compensation_to, leave_from, leave_to, checkin_time, \
     checkout_time";
const NOTIFICATION_COLUMNS: &str =
    "id, created_at, sender_id, recipient_id, is_read, form_id, notification_type, content";
const TIME_KEEPING_COLUMNS: &str = "id, user_id, date, checkin_time, checkout_time";

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Bool(bool),
    Owned(String),
}

/// Form row as stored: enum columns are plain codes until checked.
#[derive(FromRow)]
struct FormRow {
    id: u64,
    title: String,
    sender_id: Option<u64>,
    recipient_id: Option<u64>,
    division_id: Option<u64>,
    content: String,
    form_type: String,
    status: String,
    created_at: DateTime<Utc>,
    compensation_from: Option<NaiveDate>,
    compensation_to: Option<NaiveDate>,
    leave_from: Option<NaiveDate>,
    leave_to: Option<NaiveDate>,
    checkin_time: Option<NaiveTime>,
    checkout_time: Option<NaiveTime>,
}

impl TryFrom<FormRow> for Form {
    type Error = AppError;

    fn try_from(row: FormRow) -> AppResult<Self> {
        Ok(Form {
            id: row.id,
            title: row.title,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            division_id: row.division_id,
            content: row.content,
            form_type: parse_form_type(row.form_type.trim())?,
            status: parse_form_status(row.status.trim())?,
            created_at: row.created_at,
            compensation_from: row.compensation_from,
            compensation_to: row.compensation_to,
            leave_from: row.leave_from,
            leave_to: row.leave_to,
            checkin_time: row.checkin_time,
            checkout_time: row.checkout_time,
        })
    }
}

/// Logs at the failure site and classifies constraint violations.
fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!("{context}: duplicate entry"));
            }
            if db_err.is_foreign_key_violation() {
                return AppError::NotFound("referenced record");
            }
        }
        tracing::error!(error = %e, "{context}");
        AppError::Database(e)
    }
}

fn where_clause(conditions: &[&str]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

macro_rules! bind_all {
    ($query:expr, $args:expr) => {{
        let mut q = $query;
        for arg in $args {
            q = match arg {
                FilterValue::U64(v) => q.bind(*v),
                FilterValue::Bool(v) => q.bind(*v),
                FilterValue::Owned(s) => q.bind(s.clone()),
            };
        }
        q
    }};
}

#[async_trait]
impl Store for MySqlStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password, is_staff, is_active, is_superuser)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert user"))?;

        self.get_user(result.last_insert_id())
            .await?
            .ok_or(AppError::NotFound("user"))
    }

    async fn get_user(&self, id: u64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch user"))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch user by email"))
    }

    async fn list_users(&self, filter: &UserFilter, page: Page) -> AppResult<(Vec<User>, u64)> {
        let mut conditions = Vec::new();
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(search) = filter.search.as_deref() {
            conditions.push("email LIKE ?");
            args.push(FilterValue::Owned(format!("%{search}%")));
        }
        if let Some(v) = filter.is_staff {
            conditions.push("is_staff = ?");
            args.push(FilterValue::Bool(v));
        }
        if let Some(v) = filter.is_active {
            conditions.push("is_active = ?");
            args.push(FilterValue::Bool(v));
        }
        let where_sql = where_clause(&conditions);

        let count_sql = format!("SELECT COUNT(*) FROM users{where_sql}");
        let total = bind_all!(sqlx::query_scalar::<_, i64>(&count_sql), &args)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;

        let data_sql =
            format!("SELECT {USER_COLUMNS} FROM users{where_sql} ORDER BY email LIMIT ? OFFSET ?");
        let users = bind_all!(sqlx::query_as::<_, User>(&data_sql), &args)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch user list"))?;

        Ok((users, total.max(0) as u64))
    }

    async fn update_user_flags(&self, id: u64, flags: UserFlags) -> AppResult<Option<User>> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_staff = COALESCE(?, is_staff),
                is_active = COALESCE(?, is_active),
                is_superuser = COALESCE(?, is_superuser)
            WHERE id = ?
            "#,
        )
        .bind(flags.is_staff)
        .bind(flags.is_active)
        .bind(flags.is_superuser)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update user flags"))?;

        // affected rows is zero when nothing changed, so re-read instead
        self.get_user(id).await
    }

    async fn delete_user(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_division(&self, division: NewDivision) -> AppResult<Division> {
        let result =
            sqlx::query("INSERT INTO divisions (name, manager_id, parent_id) VALUES (?, ?, ?)")
                .bind(&division.name)
                .bind(division.manager_id)
                .bind(division.parent_id)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to insert division"))?;

        Ok(Division {
            id: result.last_insert_id(),
            name: division.name,
            manager_id: division.manager_id,
            parent_id: division.parent_id,
        })
    }

    async fn get_division(&self, id: u64) -> AppResult<Option<Division>> {
        sqlx::query_as::<_, Division>(
            "SELECT id, name, manager_id, parent_id FROM divisions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch division"))
    }

    async fn list_divisions(&self) -> AppResult<Vec<Division>> {
        sqlx::query_as::<_, Division>(
            "SELECT id, name, manager_id, parent_id FROM divisions ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch division list"))
    }

    async fn update_division(&self, division: &Division) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start division update"))?;

        // row locks serialize concurrent reparents until commit
        let rows: Vec<(u64, Option<u64>)> =
            sqlx::query_as("SELECT id, parent_id FROM divisions FOR UPDATE")
                .fetch_all(&mut *tx)
                .await
                .map_err(db_error("Failed to lock divisions"))?;
        let parents: HashMap<u64, Option<u64>> = rows.into_iter().collect();
        if !parents.contains_key(&division.id) {
            return Ok(false);
        }
        let parent_of = |id: u64| parents.get(&id).copied().flatten();
        if closes_cycle(division.id, division.parent_id, parent_of) {
            return Err(AppError::validation(DIVISION_CYCLE));
        }

        sqlx::query("UPDATE divisions SET name = ?, manager_id = ?, parent_id = ? WHERE id = ?")
            .bind(&division.name)
            .bind(division.manager_id)
            .bind(division.parent_id)
            .bind(division.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to update division"))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit division update"))?;
        Ok(true)
    }

    async fn delete_division(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM divisions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete division"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_lookup(&self, kind: LookupKind, name: &str) -> AppResult<Lookup> {
        let sql = format!("INSERT INTO {} (name) VALUES (?)", kind.table());
        let result = sqlx::query(&sql)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to insert lookup"))?;
        Ok(Lookup {
            id: result.last_insert_id(),
            name: name.to_string(),
        })
    }

    async fn list_lookups(&self, kind: LookupKind) -> AppResult<Vec<Lookup>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY name", kind.table());
        sqlx::query_as::<_, Lookup>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch lookup list"))
    }

    async fn delete_lookup(&self, kind: LookupKind, id: u64) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete lookup"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_form(&self, sender_id: u64, form: NewForm) -> AppResult<Form> {
        let form_type = form.form_type.unwrap_or_default();
        let result = sqlx::query(
            r#"
            INSERT INTO forms
                (title, sender_id, recipient_id, division_id, content, form_type, status,
                 compensation_from, compensation_to, leave_from, leave_to,
                 checkin_time, checkout_time)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(form.title.trim())
        .bind(sender_id)
        .bind(form.recipient_id)
        .bind(form.division_id)
        .bind(&form.content)
        .bind(form_type.to_string())
        .bind(FormStatus::Pending.to_string())
        .bind(form.compensation_from)
        .bind(form.compensation_to)
        .bind(form.leave_from)
        .bind(form.leave_to)
        .bind(form.checkin_time)
        .bind(form.checkout_time)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create form"))?;

        self.get_form(result.last_insert_id())
            .await?
            .ok_or(AppError::NotFound("form"))
    }

    async fn get_form(&self, id: u64) -> AppResult<Option<Form>> {
        let row = sqlx::query_as::<_, FormRow>(&format!(
            "SELECT {FORM_COLUMNS} FROM forms WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch form"))?;

        row.map(Form::try_from).transpose()
    }

    async fn list_forms(&self, filter: &FormFilter, page: Page) -> AppResult<(Vec<Form>, u64)> {
        let mut conditions = Vec::new();
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(v) = filter.sender_id {
            conditions.push("sender_id = ?");
            args.push(FilterValue::U64(v));
        }
        if let Some(v) = filter.recipient_id {
            conditions.push("recipient_id = ?");
            args.push(FilterValue::U64(v));
        }
        if let Some(v) = filter.division_id {
            conditions.push("division_id = ?");
            args.push(FilterValue::U64(v));
        }
        if let Some(v) = filter.status {
            conditions.push("status = ?");
            args.push(FilterValue::Owned(v.to_string()));
        }
        if let Some(v) = filter.form_type {
            conditions.push("form_type = ?");
            args.push(FilterValue::Owned(v.to_string()));
        }
        let where_sql = where_clause(&conditions);

        let count_sql = format!("SELECT COUNT(*) FROM forms{where_sql}");
        let total = bind_all!(sqlx::query_scalar::<_, i64>(&count_sql), &args)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count forms"))?;

        let data_sql = format!(
            "SELECT {FORM_COLUMNS} FROM forms{where_sql} \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let rows = bind_all!(sqlx::query_as::<_, FormRow>(&data_sql), &args)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch form list"))?;

        let forms = rows
            .into_iter()
            .map(Form::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((forms, total.max(0) as u64))
    }

    async fn update_form_status(
        &self,
        id: u64,
        from: FormStatus,
        to: FormStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE forms SET status = ? WHERE id = ? AND status = ?")
            .bind(to.to_string())
            .bind(id)
            .bind(from.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update form status"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_form(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM forms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete form"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_notification(&self, notification: NewNotification) -> AppResult<Notification> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications
                (sender_id, recipient_id, form_id, notification_type, content)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(notification.sender_id)
        .bind(notification.recipient_id)
        .bind(notification.form_id)
        .bind(&notification.notification_type)
        .bind(&notification.content)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create notification"))?;

        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?"
        ))
        .bind(result.last_insert_id())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to fetch notification"))
    }

    async fn list_notifications(
        &self,
        recipient_id: u64,
        unread_only: bool,
    ) -> AppResult<Vec<Notification>> {
        let unread_sql = if unread_only { " AND is_read = FALSE" } else { "" };
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE recipient_id = ?{unread_sql} ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Notification>(&sql)
            .bind(recipient_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch notifications"))
    }

    async fn mark_notification_read(&self, id: u64, recipient_id: u64) -> AppResult<bool> {
        // matched rows, not changed rows: marking twice still succeeds
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE id = ? AND recipient_id = ?",
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to fetch notification"))?;
        if found == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = ? AND recipient_id = ?")
            .bind(id)
            .bind(recipient_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to mark notification read"))?;
        Ok(true)
    }

    async fn count_unread(&self, recipient_id: u64) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count unread notifications"))?;
        Ok(count.max(0) as u64)
    }

    async fn get_time_keeping(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> AppResult<Option<TimeKeeping>> {
        sqlx::query_as::<_, TimeKeeping>(&format!(
            "SELECT {TIME_KEEPING_COLUMNS} FROM time_keeping WHERE user_id = ? AND date = ?"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch time keeping"))
    }

    async fn insert_check_in(
        &self,
        user_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> AppResult<TimeKeeping> {
        let result = sqlx::query(
            "INSERT INTO time_keeping (user_id, date, checkin_time) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(date)
        .bind(time)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(TimeKeeping {
                id: done.last_insert_id(),
                user_id: Some(user_id),
                date,
                checkin_time: Some(time),
                checkout_time: None,
            }),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict("Already checked in today".into()))
            }
            Err(e) => Err(db_error("Check-in failed")(e)),
        }
    }

    async fn set_check_out(&self, user_id: u64, date: NaiveDate, time: NaiveTime) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE time_keeping
            SET checkout_time = ?
            WHERE user_id = ?
            AND date = ?
            AND checkout_time IS NULL
            "#,
        )
        .bind(time)
        .bind(user_id)
        .bind(date)
        .execute(&self.pool)
        .await
        .map_err(db_error("Check-out failed"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_time_keeping(
        &self,
        user_id: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<TimeKeeping>> {
        let sql = format!(
            "SELECT {TIME_KEEPING_COLUMNS} FROM time_keeping \
             WHERE user_id = ? AND (? IS NULL OR date >= ?) AND (? IS NULL OR date <= ?) \
             ORDER BY date"
        );
        sqlx::query_as::<_, TimeKeeping>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(from)
            .bind(to)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch time keeping list"))
    }
}
