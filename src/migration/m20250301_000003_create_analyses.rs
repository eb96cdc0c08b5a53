//! Create analyses table.
//!
//! `confidence_score` carries no range check; analyzer output is stored as-is.

use sea_orm_migration::prelude::*;

use super::m20250301_000002_create_images::Images;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Analyses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Analyses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Analyses::ImageId).integer().not_null())
                    .col(ColumnDef::new(Analyses::VehicleType).string().not_null())
                    .col(ColumnDef::new(Analyses::LicensePlate).string().not_null())
                    .col(ColumnDef::new(Analyses::ConfidenceScore).double().not_null())
                    .col(
                        ColumnDef::new(Analyses::DamageDetected)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Analyses::DamageDetails).text().not_null())
                    .col(
                        ColumnDef::new(Analyses::ProcessedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Analyses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Analyses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Analyses::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_analyses_image")
                            .from(Analyses::Table, Analyses::ImageId)
                            .to(Images::Table, Images::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_analyses_image")
                    .table(Analyses::Table)
                    .col(Analyses::ImageId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_analyses_deleted_at")
                    .table(Analyses::Table)
                    .col(Analyses::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Analyses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Analyses {
    Table,
    Id,
    ImageId,
    VehicleType,
    LicensePlate,
    ConfidenceScore,
    DamageDetected,
    DamageDetails,
    ProcessedAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
