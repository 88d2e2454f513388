//! Chart-of-accounts rows, one table shared by every company.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{Category, CategoryType, EngineError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: String,
    pub name: String,
    pub category_type: String,
    pub parent_id: Option<Uuid>,
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
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Parent,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            category_type: CategoryType::try_from(model.category_type.as_str()).map_err(|_| {
                EngineError::InvalidStoredValue(format!(
                    "category {} has type '{}'",
                    model.id, model.category_type
                ))
            })?,
            parent_id: model.parent_id,
        })
    }
}
