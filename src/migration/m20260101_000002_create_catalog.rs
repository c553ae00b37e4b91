use sea_orm_migration::prelude::*;

use super::m20260101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Courses::Description).text().null())
                    .col(ColumnDef::new(Courses::Cover).text().null())
                    .col(ColumnDef::new(Courses::CourseType).string().not_null())
                    .col(ColumnDef::new(Courses::InstructorId).integer().null())
                    .col(ColumnDef::new(Courses::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_instructor")
                            .from(Courses::Table, Courses::InstructorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Chapters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Chapters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Chapters::CourseId).integer().not_null())
                    .col(ColumnDef::new(Chapters::Title).string().not_null())
                    .col(ColumnDef::new(Chapters::SortOrder).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chapters_course")
                            .from(Chapters::Table, Chapters::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contents::ChapterId).integer().not_null())
                    .col(ColumnDef::new(Contents::Title).string().not_null())
                    .col(ColumnDef::new(Contents::ContentType).string().not_null())
                    .col(ColumnDef::new(Contents::Path).text().not_null())
                    .col(ColumnDef::new(Contents::SortOrder).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contents_chapter")
                            .from(Contents::Table, Contents::ChapterId)
                            .to(Chapters::Table, Chapters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chapters_course")
                    .table(Chapters::Table)
                    .col(Chapters::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contents_chapter")
                    .table(Contents::Table)
                    .col(Contents::ChapterId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Contents::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Chapters::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Courses::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Courses {
    Table,
    Id,
    Title,
    Slug,
    Description,
    Cover,
    CourseType,
    InstructorId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Chapters {
    Table,
    Id,
    CourseId,
    Title,
    SortOrder,
}

#[derive(DeriveIden)]
pub enum Contents {
    Table,
    Id,
    ChapterId,
    Title,
    ContentType,
    Path,
    SortOrder,
}
