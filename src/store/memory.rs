use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};

use super::Store;
use crate::error::{AppError, AppResult};
use crate::model::{
    division::{DIVISION_CYCLE, Division, NewDivision, closes_cycle},
    form::{Form, FormFilter, FormStatus, NewForm},
    lookup::{Lookup, LookupKind},
    notification::{NewNotification, Notification},
    page::Page,
    time_keeping::TimeKeeping,
    user::{NewUser, User, UserFilter, UserFlags},
};

#[derive(Default)]
struct Tables {
    next_id: u64,
    users: BTreeMap<u64, User>,
    divisions: BTreeMap<u64, Division>,
    positions: BTreeMap<u64, Lookup>,
    skills: BTreeMap<u64, Lookup>,
    forms: BTreeMap<u64, Form>,
    notifications: BTreeMap<u64, Notification>,
    time_keeping: BTreeMap<u64, TimeKeeping>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn lookups(&mut self, kind: LookupKind) -> &mut BTreeMap<u64, Lookup> {
        match kind {
            LookupKind::Position => &mut self.positions,
            LookupKind::Skill => &mut self.skills,
        }
    }
}

/// Process-local store behind a single lock. Mirrors the `ON DELETE SET NULL`
/// behaviour of the SQL schema by hand.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("memory store poisoned".into()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("memory store poisoned".into()))
    }
}

fn paginate<T: Clone>(rows: Vec<T>, page: Page) -> (Vec<T>, u64) {
    let total = rows.len() as u64;
    let data = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.per_page as usize)
        .collect();
    (data, total)
}

fn clear(slot: &mut Option<u64>, id: u64) {
    if *slot == Some(id) {
        *slot = None;
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut t = self.write()?;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already exists".into()));
        }
        let id = t.next_id();
        let row = User {
            id,
            email: user.email,
            password: user.password,
            is_staff: user.is_staff,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            created_at: Utc::now(),
        };
        t.users.insert(id, row.clone());
        Ok(row)
    }

    async fn get_user(&self, id: u64) -> AppResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.read()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, filter: &UserFilter, page: Page) -> AppResult<(Vec<User>, u64)> {
        let t = self.read()?;
        let mut rows: Vec<User> = t
            .users
            .values()
            .filter(|u| {
                filter
                    .search
                    .as_deref()
                    .is_none_or(|s| u.email.contains(s))
            })
            .filter(|u| filter.is_staff.is_none_or(|v| u.is_staff == v))
            .filter(|u| filter.is_active.is_none_or(|v| u.is_active == v))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(paginate(rows, page))
    }

    async fn update_user_flags(&self, id: u64, flags: UserFlags) -> AppResult<Option<User>> {
        let mut t = self.write()?;
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = flags.is_staff {
            user.is_staff = v;
        }
        if let Some(v) = flags.is_active {
            user.is_active = v;
        }
        if let Some(v) = flags.is_superuser {
            user.is_superuser = v;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: u64) -> AppResult<bool> {
        let mut t = self.write()?;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        for d in t.divisions.values_mut() {
            clear(&mut d.manager_id, id);
        }
        for f in t.forms.values_mut() {
            clear(&mut f.sender_id, id);
            clear(&mut f.recipient_id, id);
        }
        for n in t.notifications.values_mut() {
            clear(&mut n.sender_id, id);
            clear(&mut n.recipient_id, id);
        }
        for r in t.time_keeping.values_mut() {
            clear(&mut r.user_id, id);
        }
        Ok(true)
    }

    async fn insert_division(&self, division: NewDivision) -> AppResult<Division> {
        let mut t = self.write()?;
        let id = t.next_id();
        let row = Division {
            id,
            name: division.name,
            manager_id: division.manager_id,
            parent_id: division.parent_id,
        };
        t.divisions.insert(id, row.clone());
        Ok(row)
    }

    async fn get_division(&self, id: u64) -> AppResult<Option<Division>> {
        Ok(self.read()?.divisions.get(&id).cloned())
    }

    async fn list_divisions(&self) -> AppResult<Vec<Division>> {
        let mut rows: Vec<Division> = self.read()?.divisions.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn update_division(&self, division: &Division) -> AppResult<bool> {
        let mut t = self.write()?;
        if !t.divisions.contains_key(&division.id) {
            return Ok(false);
        }
        let parent_of = |id: u64| t.divisions.get(&id).and_then(|d| d.parent_id);
        if closes_cycle(division.id, division.parent_id, parent_of) {
            return Err(AppError::validation(DIVISION_CYCLE));
        }
        match t.divisions.get_mut(&division.id) {
            Some(row) => {
                *row = division.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_division(&self, id: u64) -> AppResult<bool> {
        let mut t = self.write()?;
        if t.divisions.remove(&id).is_none() {
            return Ok(false);
        }
        for d in t.divisions.values_mut() {
            clear(&mut d.parent_id, id);
        }
        for f in t.forms.values_mut() {
            clear(&mut f.division_id, id);
        }
        Ok(true)
    }

    async fn insert_lookup(&self, kind: LookupKind, name: &str) -> AppResult<Lookup> {
        let mut t = self.write()?;
        let id = t.next_id();
        let row = Lookup {
            id,
            name: name.to_string(),
        };
        t.lookups(kind).insert(id, row.clone());
        Ok(row)
    }

    async fn list_lookups(&self, kind: LookupKind) -> AppResult<Vec<Lookup>> {
        let mut t = self.write()?;
        let mut rows: Vec<Lookup> = t.lookups(kind).values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn delete_lookup(&self, kind: LookupKind, id: u64) -> AppResult<bool> {
        Ok(self.write()?.lookups(kind).remove(&id).is_some())
    }

    async fn insert_form(&self, sender_id: u64, form: NewForm) -> AppResult<Form> {
        let mut t = self.write()?;
        let id = t.next_id();
        let row = Form {
            id,
            title: form.title.trim().to_string(),
            sender_id: Some(sender_id),
            recipient_id: form.recipient_id,
            division_id: form.division_id,
            content: form.content,
            form_type: form.form_type.unwrap_or_default(),
            status: FormStatus::Pending,
            created_at: Utc::now(),
            compensation_from: form.compensation_from,
            compensation_to: form.compensation_to,
            leave_from: form.leave_from,
            leave_to: form.leave_to,
            checkin_time: form.checkin_time,
            checkout_time: form.checkout_time,
        };
        t.forms.insert(id, row.clone());
        Ok(row)
    }

    async fn get_form(&self, id: u64) -> AppResult<Option<Form>> {
        Ok(self.read()?.forms.get(&id).cloned())
    }

    async fn list_forms(&self, filter: &FormFilter, page: Page) -> AppResult<(Vec<Form>, u64)> {
        let t = self.read()?;
        let mut rows: Vec<Form> = t
            .forms
            .values()
            .filter(|f| filter.sender_id.is_none_or(|v| f.sender_id == Some(v)))
            .filter(|f| filter.recipient_id.is_none_or(|v| f.recipient_id == Some(v)))
            .filter(|f| filter.division_id.is_none_or(|v| f.division_id == Some(v)))
            .filter(|f| filter.status.is_none_or(|v| f.status == v))
            .filter(|f| filter.form_type.is_none_or(|v| f.form_type == v))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(rows, page))
    }

    async fn update_form_status(
        &self,
        id: u64,
        from: FormStatus,
        to: FormStatus,
    ) -> AppResult<bool> {
        let mut t = self.write()?;
        match t.forms.get_mut(&id) {
            Some(form) if form.status == from => {
                form.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_form(&self, id: u64) -> AppResult<bool> {
        let mut t = self.write()?;
        if t.forms.remove(&id).is_none() {
            return Ok(false);
        }
        for n in t.notifications.values_mut() {
            clear(&mut n.form_id, id);
        }
        Ok(true)
    }

    async fn insert_notification(&self, notification: NewNotification) -> AppResult<Notification> {
        let mut t = self.write()?;
        let id = t.next_id();
        let row = Notification {
            id,
            created_at: Utc::now(),
            sender_id: notification.sender_id,
            recipient_id: Some(notification.recipient_id),
            is_read: false,
            form_id: notification.form_id,
            notification_type: notification.notification_type,
            content: notification.content,
        };
        t.notifications.insert(id, row.clone());
        Ok(row)
    }

    async fn list_notifications(
        &self,
        recipient_id: u64,
        unread_only: bool,
    ) -> AppResult<Vec<Notification>> {
        let t = self.read()?;
        let mut rows: Vec<Notification> = t
            .notifications
            .values()
            .filter(|n| n.recipient_id == Some(recipient_id))
            .filter(|n| !unread_only || !n.is_read)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn mark_notification_read(&self, id: u64, recipient_id: u64) -> AppResult<bool> {
        let mut t = self.write()?;
        match t.notifications.get_mut(&id) {
            Some(n) if n.recipient_id == Some(recipient_id) => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_unread(&self, recipient_id: u64) -> AppResult<u64> {
        let t = self.read()?;
        Ok(t.notifications
            .values()
            .filter(|n| n.recipient_id == Some(recipient_id) && !n.is_read)
            .count() as u64)
    }

    async fn get_time_keeping(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> AppResult<Option<TimeKeeping>> {
        let t = self.read()?;
        Ok(t.time_keeping
            .values()
            .find(|r| r.user_id == Some(user_id) && r.date == date)
            .cloned())
    }

    async fn insert_check_in(
        &self,
        user_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> AppResult<TimeKeeping> {
        let mut t = self.write()?;
        if t.time_keeping
            .values()
            .any(|r| r.user_id == Some(user_id) && r.date == date)
        {
            return Err(AppError::Conflict("Already checked in today".into()));
        }
        let id = t.next_id();
        let row = TimeKeeping {
            id,
            user_id: Some(user_id),
            date,
            checkin_time: Some(time),
            checkout_time: None,
        };
        t.time_keeping.insert(id, row.clone());
        Ok(row)
    }

    async fn set_check_out(&self, user_id: u64, date: NaiveDate, time: NaiveTime) -> AppResult<bool> {
        let mut t = self.write()?;
        let open = t.time_keeping.values_mut().find(|r| {
            r.user_id == Some(user_id) && r.date == date && r.checkout_time.is_none()
        });
        match open {
            Some(r) => {
                r.checkout_time = Some(time);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_time_keeping(
        &self,
        user_id: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<TimeKeeping>> {
        let t = self.read()?;
        let mut rows: Vec<TimeKeeping> = t
            .time_keeping
            .values()
            .filter(|r| r.user_id == Some(user_id))
            .filter(|r| from.is_none_or(|d| r.date >= d))
            .filter(|r| to.is_none_or(|d| r.date <= d))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }
}
