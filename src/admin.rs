//! Static description of the administrative views, one entry per entity.

use std::str::FromStr;

use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EntityKind {
    User,
    Form,
    Division,
    Notification,
    Position,
    Skill,
    #[strum(to_string = "timekeeping", serialize = "time_keeping")]
    #[serde(rename = "timekeeping")]
    TimeKeeping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminView {
    pub entity: EntityKind,
    pub list_display: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub ordering: &'static [&'static str],
    pub inlines: &'static [EntityKind],
}

pub const ADMIN_VIEWS: &[AdminView] = &[
    AdminView {
        entity: EntityKind::User,
        list_display: &["email", "is_staff", "is_active"],
        list_filter: &["email", "is_staff", "is_active"],
        search_fields: &["email"],
        ordering: &["email"],
        inlines: &[],
    },
    AdminView {
        entity: EntityKind::Form,
        list_display: &["title", "sender", "recipient", "form_type", "status", "created_at"],
        list_filter: &["form_type", "status"],
        search_fields: &["title"],
        ordering: &["-created_at"],
        inlines: &[EntityKind::Notification],
    },
    AdminView {
        entity: EntityKind::Division,
        list_display: &["name", "manager", "parent"],
        list_filter: &[],
        search_fields: &["name"],
        ordering: &["name"],
        inlines: &[EntityKind::Division],
    },
    AdminView {
        entity: EntityKind::Notification,
        list_display: &["created_at", "recipient", "notification_type", "is_read"],
        list_filter: &["is_read"],
        search_fields: &["content"],
        ordering: &["created_at"],
        inlines: &[],
    },
    AdminView {
        entity: EntityKind::Position,
        list_display: &["name"],
        list_filter: &[],
        search_fields: &["name"],
        ordering: &["name"],
        inlines: &[],
    },
    AdminView {
        entity: EntityKind::Skill,
        list_display: &["name"],
        list_filter: &[],
        search_fields: &["name"],
        ordering: &["name"],
        inlines: &[],
    },
    AdminView {
        entity: EntityKind::TimeKeeping,
        list_display: &["user", "date", "checkin_time", "checkout_time"],
        list_filter: &["date"],
        search_fields: &[],
        ordering: &["date"],
        inlines: &[],
    },
];

pub fn view_for(entity: EntityKind) -> Option<&'static AdminView> {
    ADMIN_VIEWS.iter().find(|v| v.entity == entity)
}

/// The views for the given entity kinds, in registry order.
pub fn registered(entities: &[EntityKind]) -> Vec<&'static AdminView> {
    ADMIN_VIEWS
        .iter()
        .filter(|v| entities.contains(&v.entity))
        .collect()
}

/// Parses a comma separated list such as `user,form,division`.
pub fn parse_entity_list(value: &str) -> Result<Vec<EntityKind>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| EntityKind::from_str(s).map_err(|_| format!("unknown entity '{s}'")))
        .collect()
}
