use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Division {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Education Team")]
    pub name: String,
    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<u64>,
    #[schema(example = json!(null), nullable = true)]
    pub parent_id: Option<u64>,
}

pub const DIVISION_CYCLE: &str = "parent assignment would create a cycle in the division tree";

/// Walks up from `parent_id` through `parent_of`. True when the chain comes
/// back to `id` or loops on itself.
pub fn closes_cycle(id: u64, parent_id: Option<u64>, parent_of: impl Fn(u64) -> Option<u64>) -> bool {
    let mut seen = HashSet::new();
    let mut cursor = parent_id;
    while let Some(current) = cursor {
        if current == id || !seen.insert(current) {
            return true;
        }
        cursor = parent_of(current);
    }
    false
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewDivision {
    #[schema(example = "Education Team")]
    pub name: String,
    pub manager_id: Option<u64>,
    pub parent_id: Option<u64>,
}

/// Partial update. For the nullable references, an absent key leaves the
/// value alone while an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DivisionUpdate {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<u64>)]
    pub manager_id: Option<Option<u64>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<u64>)]
    pub parent_id: Option<Option<u64>>,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<u64>::deserialize(deserializer).map(Some)
    }
}
