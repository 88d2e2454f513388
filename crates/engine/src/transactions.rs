//! Read-only view of the transactions table.
//!
//! The engine never writes transactions; it only needs to know whether a
//! category is still referenced before deleting it.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// A transaction that points at a category through either side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRef {
    pub id: Uuid,
    pub selected_category_id: Option<Uuid>,
    pub corresponding_category_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: String,
    pub selected_category_id: Option<Uuid>,
    pub corresponding_category_id: Option<Uuid>,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Company,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TransactionRef {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            selected_category_id: model.selected_category_id,
            corresponding_category_id: model.corresponding_category_id,
        }
    }
}
