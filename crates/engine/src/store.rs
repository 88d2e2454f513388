//! Category Store Adapter.
//!
//! [`CategoryStore`] is the only way the handlers reach persistence. It runs
//! company-scoped reads and writes and carries no business rules: every
//! validation lives in the handlers. [`SqlCategoryStore`] is the sea-orm
//! implementation used by the application.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue, Condition, DatabaseConnection, Order, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
    sea_query::{Expr, NullOrdering},
};
use uuid::Uuid;

use crate::{
    Category, CategoryType, EngineError, ResultEngine, categories,
    transactions::{self, TransactionRef},
};

/// Partial update of a category row. `None` leaves a column untouched; for
/// `parent_id`, `Some(None)` detaches the category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub category_type: Option<CategoryType>,
    pub parent_id: Option<Option<Uuid>>,
}

impl CategoryPatch {
    pub fn name(name: String) -> Self {
        Self {
            name: Some(name),
            ..Default::default()
        }
    }

    pub fn category_type(category_type: CategoryType) -> Self {
        Self {
            category_type: Some(category_type),
            ..Default::default()
        }
    }

    pub fn parent(parent_id: Option<Uuid>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category_type.is_none() && self.parent_id.is_none()
    }
}

/// Company-scoped persistence for categories.
///
/// Implementations must filter every query by `company_id`: a row of another
/// company is indistinguishable from a missing one.
#[async_trait]
pub trait CategoryStore: Send + Sync + std::fmt::Debug {
    /// Every category of the company, ordered by `parent_id` (roots first),
    /// then type, then name.
    async fn list_categories(&self, company_id: &str) -> ResultEngine<Vec<Category>>;

    async fn find_category(&self, id: Uuid, company_id: &str) -> ResultEngine<Option<Category>>;

    async fn insert_category(
        &self,
        company_id: &str,
        name: &str,
        category_type: CategoryType,
    ) -> ResultEngine<Category>;

    /// Fails with `KeyNotFound` when no row of the company has `id`.
    async fn update_category(
        &self,
        id: Uuid,
        company_id: &str,
        patch: CategoryPatch,
    ) -> ResultEngine<()>;

    /// Fails with `KeyNotFound` when no row of the company has `id`.
    async fn delete_category(&self, id: Uuid, company_id: &str) -> ResultEngine<()>;

    async fn list_children(&self, parent_id: Uuid, company_id: &str)
    -> ResultEngine<Vec<Category>>;

    /// Transactions of the company whose selected or corresponding category
    /// is `category_id`, at most `limit` of them.
    async fn find_transactions_referencing(
        &self,
        category_id: Uuid,
        company_id: &str,
        limit: u64,
    ) -> ResultEngine<Vec<TransactionRef>>;
}

#[derive(Clone, Debug)]
pub struct SqlCategoryStore {
    database: DatabaseConnection,
}

impl SqlCategoryStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

fn models_into_categories(models: Vec<categories::Model>) -> ResultEngine<Vec<Category>> {
    models.into_iter().map(Category::try_from).collect()
}

#[async_trait]
impl CategoryStore for SqlCategoryStore {
    async fn list_categories(&self, company_id: &str) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::CompanyId.eq(company_id))
            .order_by_with_nulls(categories::Column::ParentId, Order::Asc, NullOrdering::First)
            .order_by_asc(categories::Column::CategoryType)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        models_into_categories(models)
    }

    async fn find_category(&self, id: Uuid, company_id: &str) -> ResultEngine<Option<Category>> {
        categories::Entity::find_by_id(id)
            .filter(categories::Column::CompanyId.eq(company_id))
            .one(&self.database)
            .await?
            .map(Category::try_from)
            .transpose()
    }

    async fn insert_category(
        &self,
        company_id: &str,
        name: &str,
        category_type: CategoryType,
    ) -> ResultEngine<Category> {
        let active = categories::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            company_id: ActiveValue::Set(company_id.to_string()),
            name: ActiveValue::Set(name.to_string()),
            category_type: ActiveValue::Set(category_type.as_str().to_string()),
            parent_id: ActiveValue::Set(None),
        };
        let model = active.insert(&self.database).await?;
        Category::try_from(model)
    }

    async fn update_category(
        &self,
        id: Uuid,
        company_id: &str,
        patch: CategoryPatch,
    ) -> ResultEngine<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut update = categories::Entity::update_many()
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::CompanyId.eq(company_id));
        if let Some(name) = patch.name {
            update = update.col_expr(categories::Column::Name, Expr::value(name));
        }
        if let Some(category_type) = patch.category_type {
            update = update.col_expr(
                categories::Column::CategoryType,
                Expr::value(category_type.as_str()),
            );
        }
        if let Some(parent_id) = patch.parent_id {
            update = update.col_expr(categories::Column::ParentId, Expr::value(parent_id));
        }

        let result = update.exec(&self.database).await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("category {id}")));
        }
        Ok(())
    }

    async fn delete_category(&self, id: Uuid, company_id: &str) -> ResultEngine<()> {
        let result = categories::Entity::delete_many()
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::CompanyId.eq(company_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("category {id}")));
        }
        Ok(())
    }

    async fn list_children(
        &self,
        parent_id: Uuid,
        company_id: &str,
    ) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::ParentId.eq(parent_id))
            .filter(categories::Column::CompanyId.eq(company_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        models_into_categories(models)
    }

    async fn find_transactions_referencing(
        &self,
        category_id: Uuid,
        company_id: &str,
        limit: u64,
    ) -> ResultEngine<Vec<TransactionRef>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::CompanyId.eq(company_id))
            .filter(
                Condition::any()
                    .add(transactions::Column::SelectedCategoryId.eq(category_id))
                    .add(transactions::Column::CorrespondingCategoryId.eq(category_id)),
            )
            .limit(limit)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(TransactionRef::from).collect())
    }
}
