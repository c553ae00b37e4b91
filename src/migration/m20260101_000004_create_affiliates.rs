use sea_orm_migration::prelude::*;

use super::m20260101_000001_create_users::Users;
use super::m20260101_000002_create_catalog::Courses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Affiliates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Affiliates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Affiliates::UserId).integer().not_null().unique_key())
                    .col(ColumnDef::new(Affiliates::UniqueCode).string_len(8).not_null().unique_key())
                    .col(ColumnDef::new(Affiliates::Status).string().not_null().default("active"))
                    .col(ColumnDef::new(Affiliates::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affiliates_user")
                            .from(Affiliates::Table, Affiliates::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AffiliateCourses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AffiliateCourses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AffiliateCourses::AffiliateId).integer().not_null())
                    .col(ColumnDef::new(AffiliateCourses::CourseId).integer().not_null())
                    .col(ColumnDef::new(AffiliateCourses::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affiliate_courses_affiliate")
                            .from(AffiliateCourses::Table, AffiliateCourses::AffiliateId)
                            .to(Affiliates::Table, Affiliates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affiliate_courses_course")
                            .from(AffiliateCourses::Table, AffiliateCourses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_affiliate_courses_pair")
                    .table(AffiliateCourses::Table)
                    .col(AffiliateCourses::AffiliateId)
                    .col(AffiliateCourses::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AffiliateCourses::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Affiliates::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Affiliates {
    Table,
    Id,
    UserId,
    UniqueCode,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum AffiliateCourses {
    Table,
    Id,
    AffiliateId,
    CourseId,
    CreatedAt,
}
