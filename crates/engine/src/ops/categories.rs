use uuid::Uuid;

use crate::{
    Category, CategoryNode, CategoryPatch, CategorySnapshot, CategoryType, EngineError,
    ResultEngine, util::normalize_required_name,
};

use super::Engine;

impl Engine {
    /// Every category of the company, roots first, then by type and name.
    pub async fn list_categories(&self, company_id: &str) -> ResultEngine<Vec<Category>> {
        self.store.list_categories(company_id).await
    }

    /// A fresh snapshot of the company's categories.
    pub async fn category_snapshot(&self, company_id: &str) -> ResultEngine<CategorySnapshot> {
        let categories = self.store.list_categories(company_id).await?;
        Ok(CategorySnapshot::new(company_id, categories))
    }

    /// The company's chart of accounts as a forest.
    pub async fn category_tree(&self, company_id: &str) -> ResultEngine<Vec<CategoryNode>> {
        Ok(self.category_snapshot(company_id).await?.tree())
    }

    pub(super) async fn require_category(
        &self,
        company_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<Category> {
        self.store
            .find_category(category_id, company_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("category {category_id}")))
    }

    /// Add a new root category.
    ///
    /// Name collisions are left to the store: a duplicate name surfaces as
    /// the store's own error.
    pub async fn create_category(
        &self,
        company_id: &str,
        name: &str,
        category_type: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        let category_type = CategoryType::try_from(category_type)?;
        let category = self
            .store
            .insert_category(company_id, &name, category_type)
            .await?;
        tracing::info!(company_id, category_id = %category.id, "category created");
        Ok(category)
    }

    /// Rename the category called `old_name` in `snapshot`.
    ///
    /// Children and transactions point at the id, so nothing else changes.
    pub async fn rename_category(
        &self,
        snapshot: &mut CategorySnapshot,
        old_name: &str,
        new_name: &str,
    ) -> ResultEngine<Category> {
        let target = snapshot.require(old_name)?.clone();
        let updated = self
            .rename_resolved(snapshot.company_id(), target, new_name)
            .await?;
        snapshot.upsert(updated.clone());
        Ok(updated)
    }

    pub async fn rename_category_by_id(
        &self,
        company_id: &str,
        category_id: Uuid,
        new_name: &str,
    ) -> ResultEngine<Category> {
        let target = self.require_category(company_id, category_id).await?;
        self.rename_resolved(company_id, target, new_name).await
    }

    async fn rename_resolved(
        &self,
        company_id: &str,
        target: Category,
        new_name: &str,
    ) -> ResultEngine<Category> {
        let new_name = normalize_required_name(new_name, "category")?;
        if new_name == target.name {
            return Ok(target);
        }
        self.store
            .update_category(target.id, company_id, CategoryPatch::name(new_name.clone()))
            .await?;
        tracing::info!(company_id, category_id = %target.id, "category renamed");
        Ok(Category {
            name: new_name,
            ..target
        })
    }

    /// Change the type of the category called `name`.
    ///
    /// The change is local: parent and children keep their own types.
    pub async fn change_category_type(
        &self,
        snapshot: &mut CategorySnapshot,
        name: &str,
        new_type: &str,
    ) -> ResultEngine<Category> {
        let target = snapshot.require(name)?.clone();
        let updated = self
            .change_type_resolved(snapshot.company_id(), target, new_type)
            .await?;
        snapshot.upsert(updated.clone());
        Ok(updated)
    }

    pub async fn change_category_type_by_id(
        &self,
        company_id: &str,
        category_id: Uuid,
        new_type: &str,
    ) -> ResultEngine<Category> {
        let target = self.require_category(company_id, category_id).await?;
        self.change_type_resolved(company_id, target, new_type)
            .await
    }

    async fn change_type_resolved(
        &self,
        company_id: &str,
        target: Category,
        new_type: &str,
    ) -> ResultEngine<Category> {
        let category_type = CategoryType::try_from(new_type)?;
        self.store
            .update_category(
                target.id,
                company_id,
                CategoryPatch::category_type(category_type),
            )
            .await?;
        tracing::info!(company_id, category_id = %target.id, %category_type, "category type changed");
        Ok(Category {
            category_type,
            ..target
        })
    }

    /// Delete the category called `name` and return the company's remaining
    /// categories in store order.
    ///
    /// Refuses categories that still have children or are referenced by a
    /// transaction. On success `snapshot` is replaced by the returned list.
    pub async fn delete_category(
        &self,
        snapshot: &mut CategorySnapshot,
        name: &str,
    ) -> ResultEngine<Vec<Category>> {
        let target = snapshot.require(name)?.clone();
        let company_id = snapshot.company_id().to_string();
        let categories = self.delete_resolved(&company_id, target).await?;
        *snapshot = CategorySnapshot::new(company_id, categories.clone());
        Ok(categories)
    }

    pub async fn delete_category_by_id(
        &self,
        company_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<Vec<Category>> {
        let target = self.require_category(company_id, category_id).await?;
        self.delete_resolved(company_id, target).await
    }

    async fn delete_resolved(
        &self,
        company_id: &str,
        target: Category,
    ) -> ResultEngine<Vec<Category>> {
        let children = self.store.list_children(target.id, company_id).await?;
        if !children.is_empty() {
            return Err(EngineError::HasChildren {
                name: target.name,
                count: children.len(),
            });
        }

        let references = self
            .store
            .find_transactions_referencing(target.id, company_id, 1)
            .await?;
        if !references.is_empty() {
            return Err(EngineError::InUse(target.name));
        }

        self.store.delete_category(target.id, company_id).await?;
        tracing::info!(company_id, category_id = %target.id, "category deleted");

        self.store.list_categories(company_id).await
    }
}
