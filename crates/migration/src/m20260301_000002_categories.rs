use sea_orm_migration::prelude::*;

use super::m20260301_000001_companies::Companies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Categories {
    Table,
    Id,
    CompanyId,
    Name,
    CategoryType,
    ParentId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::CompanyId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::CategoryType).string().not_null())
                    .col(ColumnDef::new(Categories::ParentId).blob())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-company_id")
                            .from(Categories::Table, Categories::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-parent_id")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create leaves name collisions to this index.
        manager
            .create_index(
                Index::create()
                    .name("idx-categories-company_id-name-unique")
                    .table(Categories::Table)
                    .col(Categories::CompanyId)
                    .col(Categories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-company_id-parent_id")
                    .table(Categories::Table)
                    .col(Categories::CompanyId)
                    .col(Categories::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}
