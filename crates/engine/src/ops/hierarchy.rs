//! Re-parenting. Both entry points share the same checks: a category can
//! not become its own parent, nor the child of one of its descendants.

use uuid::Uuid;

use crate::{Category, CategoryPatch, CategorySnapshot, EngineError, ResultEngine};

use super::Engine;

impl Engine {
    /// Make `parent_name` the parent of `child_name`.
    pub async fn assign_parent(
        &self,
        snapshot: &mut CategorySnapshot,
        child_name: &str,
        parent_name: &str,
    ) -> ResultEngine<Category> {
        let child = snapshot.require(child_name)?.clone();
        let parent = snapshot.require(parent_name)?.clone();
        self.set_parent_checked(snapshot, child, Some(parent)).await
    }

    /// Like [`assign_parent`](Self::assign_parent), but `None` detaches the
    /// category and makes it a root.
    pub async fn reassign_parent(
        &self,
        snapshot: &mut CategorySnapshot,
        child_name: &str,
        parent_name: Option<&str>,
    ) -> ResultEngine<Category> {
        let child = snapshot.require(child_name)?.clone();
        let parent = match parent_name {
            Some(parent_name) => Some(snapshot.require(parent_name)?.clone()),
            None => None,
        };
        self.set_parent_checked(snapshot, child, parent).await
    }

    /// Id-based re-parenting. Validates against a snapshot loaded from the
    /// store for this call.
    pub async fn set_category_parent_by_id(
        &self,
        company_id: &str,
        category_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> ResultEngine<Category> {
        let mut snapshot = self.category_snapshot(company_id).await?;
        let child = snapshot
            .get(category_id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(format!("category {category_id}")))?;
        let parent = match parent_id {
            Some(parent_id) => Some(
                snapshot
                    .get(parent_id)
                    .cloned()
                    .ok_or_else(|| EngineError::KeyNotFound(format!("category {parent_id}")))?,
            ),
            None => None,
        };
        self.set_parent_checked(&mut snapshot, child, parent).await
    }

    async fn set_parent_checked(
        &self,
        snapshot: &mut CategorySnapshot,
        child: Category,
        parent: Option<Category>,
    ) -> ResultEngine<Category> {
        if let Some(parent) = &parent {
            if parent.id == child.id {
                return Err(EngineError::SelfParent(child.name));
            }
            if snapshot.would_create_cycle(child.id, parent.id) {
                return Err(EngineError::CycleDetected {
                    child: child.name,
                    parent: parent.name.clone(),
                });
            }
        }

        let parent_id = parent.map(|parent| parent.id);
        self.store
            .update_category(child.id, snapshot.company_id(), CategoryPatch::parent(parent_id))
            .await?;
        tracing::info!(
            company_id = %snapshot.company_id(),
            category_id = %child.id,
            parent_id = ?parent_id,
            "category parent set"
        );

        let updated = Category { parent_id, ..child };
        snapshot.upsert(updated.clone());
        Ok(updated)
    }
}
