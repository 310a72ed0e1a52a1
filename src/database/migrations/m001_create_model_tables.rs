use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EaModels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EaModels::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(EaModels::Name).string().not_null())
                    .col(ColumnDef::new(EaModels::Description).text())
                    .col(ColumnDef::new(EaModels::Version).string().not_null().default("1.0"))
                    .col(ColumnDef::new(EaModels::LifecycleState).string().not_null().default("current"))
                    .col(ColumnDef::new(EaModels::Status).string().not_null().default("draft"))
                    .col(ColumnDef::new(EaModels::Properties).json().not_null())
                    .col(ColumnDef::new(EaModels::VersionedFrom).string())
                    .col(ColumnDef::new(EaModels::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(EaModels::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EaElements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EaElements::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(EaElements::ModelId).string().not_null())
                    .col(ColumnDef::new(EaElements::TypeId).string().not_null())
                    .col(ColumnDef::new(EaElements::Name).string().not_null())
                    .col(ColumnDef::new(EaElements::Description).text())
                    .col(ColumnDef::new(EaElements::Status).string().not_null().default("draft"))
                    .col(ColumnDef::new(EaElements::PositionX).double())
                    .col(ColumnDef::new(EaElements::PositionY).double())
                    .col(ColumnDef::new(EaElements::Properties).json().not_null())
                    .col(ColumnDef::new(EaElements::ExternalId).string())
                    .col(ColumnDef::new(EaElements::ExternalSource).string())
                    .col(ColumnDef::new(EaElements::VersionedFrom).string())
                    .col(ColumnDef::new(EaElements::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(EaElements::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ea_elements_model_id")
                            .from(EaElements::Table, EaElements::ModelId)
                            .to(EaModels::Table, EaModels::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Endpoints carry no foreign keys: the engine owns that invariant and
        // must be able to observe violations when cloning.
        manager
            .create_table(
                Table::create()
                    .table(EaRelationships::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EaRelationships::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(EaRelationships::ModelId).string().not_null())
                    .col(ColumnDef::new(EaRelationships::RelationshipTypeId).string().not_null())
                    .col(ColumnDef::new(EaRelationships::SourceElementId).string().not_null())
                    .col(ColumnDef::new(EaRelationships::TargetElementId).string().not_null())
                    .col(ColumnDef::new(EaRelationships::IsDirectional).boolean().not_null().default(true))
                    .col(ColumnDef::new(EaRelationships::Name).string())
                    .col(ColumnDef::new(EaRelationships::Description).text())
                    .col(ColumnDef::new(EaRelationships::Status).string().not_null().default("draft"))
                    .col(ColumnDef::new(EaRelationships::Properties).json().not_null())
                    .col(ColumnDef::new(EaRelationships::VersionedFrom).string())
                    .col(ColumnDef::new(EaRelationships::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(EaRelationships::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ea_relationships_model_id")
                            .from(EaRelationships::Table, EaRelationships::ModelId)
                            .to(EaModels::Table, EaModels::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EaViews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EaViews::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(EaViews::ModelId).string().not_null())
                    .col(ColumnDef::new(EaViews::Name).string().not_null())
                    .col(ColumnDef::new(EaViews::Description).text())
                    .col(ColumnDef::new(EaViews::ViewType).string().not_null().default("diagram"))
                    .col(ColumnDef::new(EaViews::Configuration).json().not_null())
                    .col(ColumnDef::new(EaViews::VersionedFrom).string())
                    .col(ColumnDef::new(EaViews::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(EaViews::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ea_views_model_id")
                            .from(EaViews::Table, EaViews::ModelId)
                            .to(EaModels::Table, EaModels::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ea_models_versioned_from")
                    .table(EaModels::Table)
                    .col(EaModels::VersionedFrom)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ea_elements_model_id")
                    .table(EaElements::Table)
                    .col(EaElements::ModelId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ea_relationships_model_id")
                    .table(EaRelationships::Table)
                    .col(EaRelationships::ModelId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ea_relationships_source")
                    .table(EaRelationships::Table)
                    .col(EaRelationships::SourceElementId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ea_relationships_target")
                    .table(EaRelationships::Table)
                    .col(EaRelationships::TargetElementId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ea_views_model_id")
                    .table(EaViews::Table)
                    .col(EaViews::ModelId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EaViews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EaRelationships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EaElements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EaModels::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum EaModels {
    Table,
    Id,
    Name,
    Description,
    Version,
    LifecycleState,
    Status,
    Properties,
    VersionedFrom,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EaElements {
    Table,
    Id,
    ModelId,
    TypeId,
    Name,
    Description,
    Status,
    PositionX,
    PositionY,
    Properties,
    ExternalId,
    ExternalSource,
    VersionedFrom,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EaRelationships {
    Table,
    Id,
    ModelId,
    RelationshipTypeId,
    SourceElementId,
    TargetElementId,
    IsDirectional,
    Name,
    Description,
    Status,
    Properties,
    VersionedFrom,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EaViews {
    Table,
    Id,
    ModelId,
    Name,
    Description,
    ViewType,
    Configuration,
    VersionedFrom,
    CreatedAt,
    UpdatedAt,
}
