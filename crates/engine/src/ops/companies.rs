use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{Company, EngineError, ResultEngine, companies, util::normalize_required_name};

use super::Engine;

impl Engine {
    /// Add a new company and return its id.
    ///
    /// Company names are unique case-insensitively so that operators can
    /// tell companies apart in listings.
    pub async fn create_company(&self, name: &str) -> ResultEngine<String> {
        let name = normalize_required_name(name, "company")?;

        let exists = companies::Entity::find()
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
            .one(&self.database)
            .await?
            .is_some();
        if exists {
            return Err(EngineError::ExistingKey(name));
        }

        let id = Uuid::new_v4().to_string();
        let active = companies::ActiveModel {
            id: ActiveValue::Set(id.clone()),
            name: ActiveValue::Set(name),
            created_at: ActiveValue::Set(Utc::now()),
        };
        active.insert(&self.database).await?;
        tracing::info!(company_id = %id, "company created");
        Ok(id)
    }

    /// Return a company by id.
    pub async fn company(&self, company_id: &str) -> ResultEngine<Company> {
        companies::Entity::find_by_id(company_id.to_string())
            .one(&self.database)
            .await?
            .map(Company::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("company '{company_id}'")))
    }

    /// Every company, oldest first.
    pub async fn list_companies(&self) -> ResultEngine<Vec<Company>> {
        let models = companies::Entity::find()
            .order_by_asc(companies::Column::CreatedAt)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Company::from).collect())
    }
}
