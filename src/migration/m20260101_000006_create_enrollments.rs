use sea_orm_migration::prelude::*;

use super::m20260101_000001_create_users::Users;
use super::m20260101_000002_create_catalog::{Contents, Courses};
use super::m20260101_000005_create_orders::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EnrolledCourses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EnrolledCourses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EnrolledCourses::UserId).integer().not_null())
                    .col(ColumnDef::new(EnrolledCourses::CourseId).integer().not_null())
                    .col(ColumnDef::new(EnrolledCourses::OrderId).integer().not_null())
                    .col(ColumnDef::new(EnrolledCourses::EnrolledDate).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrolled_courses_user")
                            .from(EnrolledCourses::Table, EnrolledCourses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrolled_courses_course")
                            .from(EnrolledCourses::Table, EnrolledCourses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrolled_courses_order")
                            .from(EnrolledCourses::Table, EnrolledCourses::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrolled_courses_pair")
                    .table(EnrolledCourses::Table)
                    .col(EnrolledCourses::UserId)
                    .col(EnrolledCourses::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContentProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentProgress::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContentProgress::UserId).integer().not_null())
                    .col(ColumnDef::new(ContentProgress::ContentId).integer().not_null())
                    .col(ColumnDef::new(ContentProgress::Completed).boolean().not_null().default(false))
                    .col(ColumnDef::new(ContentProgress::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_progress_user")
                            .from(ContentProgress::Table, ContentProgress::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_progress_content")
                            .from(ContentProgress::Table, ContentProgress::ContentId)
                            .to(Contents::Table, Contents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_content_progress_pair")
                    .table(ContentProgress::Table)
                    .col(ContentProgress::UserId)
                    .col(ContentProgress::ContentId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ContentProgress::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(EnrolledCourses::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum EnrolledCourses {
    Table,
    Id,
    UserId,
    CourseId,
    OrderId,
    EnrolledDate,
}

#[derive(DeriveIden)]
pub enum ContentProgress {
    Table,
    Id,
    UserId,
    ContentId,
    Completed,
    UpdatedAt,
}
