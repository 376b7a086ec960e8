use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The two flat name tables of the organization directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Position,
    Skill,
}

impl LookupKind {
    pub fn table(&self) -> &'static str {
        match self {
            LookupKind::Position => "positions",
            LookupKind::Skill => "skills",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LookupKind::Position => "position",
            LookupKind::Skill => "skill",
        }
    }
}

/// A position (e.g. Developer) or a skill (e.g. Python).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Lookup {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Developer")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewLookup {
    #[schema(example = "Python")]
    pub name: String,
}
