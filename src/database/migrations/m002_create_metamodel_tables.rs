use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EaDomains::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EaDomains::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(EaDomains::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(EaDomains::Description).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EaElementTypes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EaElementTypes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(EaElementTypes::DomainId).string().not_null())
                    .col(ColumnDef::new(EaElementTypes::Name).string().not_null())
                    .col(ColumnDef::new(EaElementTypes::Description).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ea_element_types_domain_id")
                            .from(EaElementTypes::Table, EaElementTypes::DomainId)
                            .to(EaDomains::Table, EaDomains::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EaRelationshipTypes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EaRelationshipTypes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(EaRelationshipTypes::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(EaRelationshipTypes::Description).text())
                    .col(ColumnDef::new(EaRelationshipTypes::Directional).boolean().not_null().default(true))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EaRelationshipTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EaElementTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EaDomains::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum EaDomains {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum EaElementTypes {
    Table,
    Id,
    DomainId,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum EaRelationshipTypes {
    Table,
    Id,
    Name,
    Description,
    Directional,
}
