//! Batch sequencer.
//!
//! Operations run strictly in request order, one at a time. A failing step
//! never stops the batch and never undoes earlier steps: every request gets
//! exactly one [`BatchStep`] in the response.

use crate::{
    BatchStep, CategoryOperation, CategorySnapshot, OperationOutcome, OperationRequest,
};

use super::Engine;

impl Engine {
    /// Apply `requests` to the categories of `company_id`, starting from
    /// `snapshot`.
    ///
    /// The snapshot is threaded through the steps: each handler sees the
    /// effects of the steps before it, and after a create the snapshot is
    /// reloaded from the store so later steps can address the new category.
    pub async fn run_batch(
        &self,
        company_id: &str,
        snapshot: CategorySnapshot,
        requests: Vec<OperationRequest>,
    ) -> Vec<BatchStep> {
        let mut snapshot = if snapshot.company_id() == company_id {
            snapshot
        } else {
            CategorySnapshot::new(company_id, snapshot.into_categories())
        };

        let mut steps = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let result = match CategoryOperation::parse(&request, company_id) {
                Ok(operation) => {
                    tracing::debug!(company_id, index, action = operation.action(), "batch step");
                    self.apply_operation(&mut snapshot, operation).await
                }
                Err(err) => OperationOutcome::failed(&err),
            };

            if let Some(error) = &result.error {
                tracing::warn!(company_id, index, action = %request.action, %error, "batch step failed");
            }
            steps.push(BatchStep {
                action: request.action,
                name: request.name,
                result,
            });
        }
        steps
    }

    async fn apply_operation(
        &self,
        snapshot: &mut CategorySnapshot,
        operation: CategoryOperation,
    ) -> OperationOutcome {
        let invalidates = operation.invalidates_snapshot();
        let outcome: OperationOutcome = match operation {
            CategoryOperation::Create {
                name,
                category_type,
            } => self
                .create_category(snapshot.company_id(), &name, &category_type)
                .await
                .into(),
            CategoryOperation::Rename { old_name, new_name } => self
                .rename_category(snapshot, &old_name, &new_name)
                .await
                .into(),
            CategoryOperation::ChangeType { name, new_type } => self
                .change_category_type(snapshot, &name, &new_type)
                .await
                .into(),
            CategoryOperation::Delete { name } => {
                self.delete_category(snapshot, &name).await.into()
            }
            CategoryOperation::AssignParent {
                child_name,
                parent_name,
            } => self
                .assign_parent(snapshot, &child_name, &parent_name)
                .await
                .into(),
            CategoryOperation::ReassignParent {
                child_name,
                parent_name,
            } => self
                .reassign_parent(snapshot, &child_name, parent_name.as_deref())
                .await
                .into(),
        };

        if invalidates {
            self.refresh_snapshot(snapshot).await;
        }
        outcome
    }

    /// Replace `snapshot` with the store's current view. On failure the old
    /// snapshot is kept; later steps then validate against stale data.
    async fn refresh_snapshot(&self, snapshot: &mut CategorySnapshot) {
        let company_id = snapshot.company_id().to_string();
        match self.category_snapshot(&company_id).await {
            Ok(fresh) => {
                tracing::debug!(company_id = %company_id, categories = fresh.len(), "category snapshot refreshed");
                *snapshot = fresh;
            }
            Err(err) => {
                tracing::warn!(company_id = %company_id, %err, "failed to refresh category snapshot")
            }
        }
    }
}
