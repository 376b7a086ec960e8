//! Persistence seam.
//!
//! Every entity lives in one relational store. References between rows are
//! `Option` ids: deleting a row nulls the references pointing at it instead
//! of cascading. Two implementations exist, [`MySqlStore`] for production and
//! [`MemoryStore`] for tests and local runs.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::error::AppResult;
use crate::model::{
    division::{Division, NewDivision},
    form::{Form, FormFilter, FormStatus, NewForm},
    lookup::{Lookup, LookupKind},
    notification::{NewNotification, Notification},
    page::Page,
    time_keeping::TimeKeeping,
    user::{NewUser, User, UserFilter, UserFlags},
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;
    async fn get_user(&self, id: u64) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Ordered by email.
    async fn list_users(&self, filter: &UserFilter, page: Page) -> AppResult<(Vec<User>, u64)>;
    async fn update_user_flags(&self, id: u64, flags: UserFlags) -> AppResult<Option<User>>;
    /// Nulls every reference to the user. Returns false when nothing was deleted.
    async fn delete_user(&self, id: u64) -> AppResult<bool>;

    // divisions
    async fn insert_division(&self, division: NewDivision) -> AppResult<Division>;
    async fn get_division(&self, id: u64) -> AppResult<Option<Division>>;
    async fn list_divisions(&self) -> AppResult<Vec<Division>>;
    /// Writes the full row; callers merge partial updates first. Re-checks the
    /// parent chain under a lock and fails with `Validation` on a cycle.
    async fn update_division(&self, division: &Division) -> AppResult<bool>;
    async fn delete_division(&self, id: u64) -> AppResult<bool>;

    // positions and skills
    async fn insert_lookup(&self, kind: LookupKind, name: &str) -> AppResult<Lookup>;
    async fn list_lookups(&self, kind: LookupKind) -> AppResult<Vec<Lookup>>;
    async fn delete_lookup(&self, kind: LookupKind, id: u64) -> AppResult<bool>;

    // forms
    async fn insert_form(&self, sender_id: u64, form: NewForm) -> AppResult<Form>;
    async fn get_form(&self, id: u64) -> AppResult<Option<Form>>;
    /// Newest first.
    async fn list_forms(&self, filter: &FormFilter, page: Page) -> AppResult<(Vec<Form>, u64)>;
    /// Compare-and-set on the status column. Returns false when the row is
    /// missing or no longer in `from`.
    async fn update_form_status(&self, id: u64, from: FormStatus, to: FormStatus)
    -> AppResult<bool>;
    async fn delete_form(&self, id: u64) -> AppResult<bool>;

    // notifications
    async fn insert_notification(&self, notification: NewNotification) -> AppResult<Notification>;
    /// Oldest first.
    async fn list_notifications(&self, recipient_id: u64, unread_only: bool)
    -> AppResult<Vec<Notification>>;
    async fn mark_notification_read(&self, id: u64, recipient_id: u64) -> AppResult<bool>;
    async fn count_unread(&self, recipient_id: u64) -> AppResult<u64>;

    // time keeping
    async fn get_time_keeping(&self, user_id: u64, date: NaiveDate)
    -> AppResult<Option<TimeKeeping>>;
    /// Fails with `Conflict` when the user already has a record for `date`.
    async fn insert_check_in(&self, user_id: u64, date: NaiveDate, time: NaiveTime)
    -> AppResult<TimeKeeping>;
    /// Only touches a record whose check-out is still empty.
    async fn set_check_out(&self, user_id: u64, date: NaiveDate, time: NaiveTime) -> AppResult<bool>;
    /// Ordered by date.
    async fn list_time_keeping(
        &self,
        user_id: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<TimeKeeping>>;
}
