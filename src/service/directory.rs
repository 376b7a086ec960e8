use std::collections::HashSet;

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::division::{DIVISION_CYCLE, Division, DivisionUpdate, NewDivision};
use crate::model::lookup::{Lookup, LookupKind};
use crate::store::Store;

const NAME_MAX: usize = 50;

fn check_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    if name.chars().count() > NAME_MAX {
        return Err(AppError::validation(format!(
            "name must be at most {NAME_MAX} characters"
        )));
    }
    Ok(name.to_string())
}

async fn check_manager(store: &dyn Store, manager_id: Option<u64>) -> AppResult<()> {
    if let Some(id) = manager_id {
        store.get_user(id).await?.ok_or(AppError::NotFound("manager"))?;
    }
    Ok(())
}

/// Walks up from `parent_id`; the chain must end at a root without passing
/// through `division_id`.
async fn check_parent(store: &dyn Store, division_id: u64, parent_id: Option<u64>) -> AppResult<()> {
    let mut seen = HashSet::new();
    let mut cursor = parent_id;
    while let Some(id) = cursor {
        if id == division_id {
            return Err(AppError::validation(DIVISION_CYCLE));
        }
        if !seen.insert(id) {
            // a pre-existing loop that does not involve this division
            return Err(AppError::validation("division tree already contains a cycle"));
        }
        let parent = store
            .get_division(id)
            .await?
            .ok_or(AppError::NotFound("parent division"))?;
        cursor = parent.parent_id;
    }
    Ok(())
}

pub async fn create_division(store: &dyn Store, new: NewDivision) -> AppResult<Division> {
    let name = check_name(&new.name)?;
    check_manager(store, new.manager_id).await?;
    if let Some(parent_id) = new.parent_id {
        store
            .get_division(parent_id)
            .await?
            .ok_or(AppError::NotFound("parent division"))?;
    }

    let division = store.insert_division(NewDivision { name, ..new }).await?;
    info!(division_id = division.id, "Division created");
    Ok(division)
}

pub async fn update_division(
    store: &dyn Store,
    id: u64,
    update: DivisionUpdate,
) -> AppResult<Division> {
    let mut division = store
        .get_division(id)
        .await?
        .ok_or(AppError::NotFound("division"))?;

    if let Some(name) = update.name.as_deref() {
        division.name = check_name(name)?;
    }
    if let Some(manager_id) = update.manager_id {
        check_manager(store, manager_id).await?;
        division.manager_id = manager_id;
    }
    if let Some(parent_id) = update.parent_id {
        check_parent(store, id, parent_id).await?;
        division.parent_id = parent_id;
    }

    if !store.update_division(&division).await? {
        return Err(AppError::NotFound("division"));
    }
    Ok(division)
}

/// The chain of parents from the direct parent up to the root.
pub async fn ancestors(store: &dyn Store, id: u64) -> AppResult<Vec<Division>> {
    let division = store
        .get_division(id)
        .await?
        .ok_or(AppError::NotFound("division"))?;

    let mut chain: Vec<Division> = Vec::new();
    let mut cursor = division.parent_id;
    while let Some(parent_id) = cursor {
        if parent_id == id || chain.iter().any(|d| d.id == parent_id) {
            return Err(AppError::Internal(format!(
                "division {id} has a cyclic parent chain"
            )));
        }
        let Some(parent) = store.get_division(parent_id).await? else {
            break;
        };
        cursor = parent.parent_id;
        chain.push(parent);
    }
    Ok(chain)
}

pub async fn create_lookup(store: &dyn Store, kind: LookupKind, name: &str) -> AppResult<Lookup> {
    let name = check_name(name)?;
    store.insert_lookup(kind, &name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::NewUser;
    use crate::store::MemoryStore;

    async fn division(store: &MemoryStore, name: &str, parent_id: Option<u64>) -> Division {
        create_division(
            store,
            NewDivision {
                name: name.into(),
                manager_id: None,
                parent_id,
            },
        )
        .await
        .unwrap()
    }

    fn reparent(parent_id: Option<u64>) -> DivisionUpdate {
        DivisionUpdate {
            parent_id: Some(parent_id),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn self_parent_is_rejected() {
        let store = MemoryStore::new();
        let root = division(&store, "Root", None).await;
        let err = update_division(&store, root.id, reparent(Some(root.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[actix_web::test]
    async fn indirect_cycle_is_rejected() {
        let store = MemoryStore::new();
        let a = division(&store, "A", None).await;
        let b = division(&store, "B", Some(a.id)).await;
        let c = division(&store, "C", Some(b.id)).await;

        let err = update_division(&store, a.id, reparent(Some(c.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.get_division(a.id).await.unwrap().unwrap().parent_id, None);
    }

    #[actix_web::test]
    async fn store_rejects_a_cycle_that_slipped_past_the_walk() {
        // two reparents validated against the same snapshot: A under B, B under A
        let store = MemoryStore::new();
        let a = division(&store, "A", None).await;
        let b = division(&store, "B", None).await;

        let a_under_b = Division {
            parent_id: Some(b.id),
            ..a.clone()
        };
        let b_under_a = Division {
            parent_id: Some(a.id),
            ..b.clone()
        };
        assert!(store.update_division(&a_under_b).await.unwrap());
        let err = store.update_division(&b_under_a).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.get_division(b.id).await.unwrap().unwrap().parent_id, None);
        assert_eq!(ancestors(&store, a.id).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn moving_a_subtree_elsewhere_is_allowed() {
        let store = MemoryStore::new();
        let a = division(&store, "A", None).await;
        let b = division(&store, "B", Some(a.id)).await;
        let other = division(&store, "Other", None).await;

        let moved = update_division(&store, b.id, reparent(Some(other.id)))
            .await
            .unwrap();
        assert_eq!(moved.parent_id, Some(other.id));

        let detached = update_division(&store, b.id, reparent(None)).await.unwrap();
        assert_eq!(detached.parent_id, None);
    }

    #[actix_web::test]
    async fn ancestors_walk_to_the_root() {
        let store = MemoryStore::new();
        let a = division(&store, "A", None).await;
        let b = division(&store, "B", Some(a.id)).await;
        let c = division(&store, "C", Some(b.id)).await;

        let chain: Vec<u64> = ancestors(&store, c.id)
            .await
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(chain, vec![b.id, a.id]);
    }

    #[actix_web::test]
    async fn missing_references_are_reported() {
        let store = MemoryStore::new();
        let err = create_division(
            &store,
            NewDivision {
                name: "Ops".into(),
                manager_id: Some(99),
                parent_id: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound("manager")));

        let err = create_division(
            &store,
            NewDivision {
                name: "Ops".into(),
                manager_id: None,
                parent_id: Some(42),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound("parent division")));
    }

    #[actix_web::test]
    async fn deleting_manager_or_parent_nulls_references() {
        let store = MemoryStore::new();
        let manager = store
            .insert_user(NewUser {
                email: "m@corp.io".into(),
                password: String::new(),
                is_staff: false,
                is_active: true,
                is_superuser: false,
            })
            .await
            .unwrap();
        let parent = division(&store, "Parent", None).await;
        let child = create_division(
            &store,
            NewDivision {
                name: "Child".into(),
                manager_id: Some(manager.id),
                parent_id: Some(parent.id),
            },
        )
        .await
        .unwrap();

        assert!(store.delete_user(manager.id).await.unwrap());
        assert!(store.delete_division(parent.id).await.unwrap());

        let child = store.get_division(child.id).await.unwrap().unwrap();
        assert_eq!(child.manager_id, None);
        assert_eq!(child.parent_id, None);
    }

    #[actix_web::test]
    async fn lookup_names_are_validated() {
        let store = MemoryStore::new();
        assert!(create_lookup(&store, LookupKind::Skill, " ").await.is_err());
        assert!(
            create_lookup(&store, LookupKind::Skill, &"x".repeat(51))
                .await
                .is_err()
        );
        let skill = create_lookup(&store, LookupKind::Skill, " Rust ").await.unwrap();
        assert_eq!(skill.name, "Rust");
        assert!(store.list_lookups(LookupKind::Position).await.unwrap().is_empty());
    }
}
