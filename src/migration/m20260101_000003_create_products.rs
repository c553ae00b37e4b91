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
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Title).string().not_null())
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(ColumnDef::new(Products::Price).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Products::ProductType).string().not_null())
                    .col(ColumnDef::new(Products::Cover).text().null())
                    .col(ColumnDef::new(Products::InstructorId).integer().null())
                    .col(ColumnDef::new(Products::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_instructor")
                            .from(Products::Table, Products::InstructorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductDetails::ProductId).integer().not_null())
                    .col(ColumnDef::new(ProductDetails::CourseId).integer().not_null())
                    .col(ColumnDef::new(ProductDetails::Price).big_integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_details_product")
                            .from(ProductDetails::Table, ProductDetails::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_details_course")
                            .from(ProductDetails::Table, ProductDetails::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Une paire (product, course) ne peut être liée qu'une fois
        manager
            .create_index(
                Index::create()
                    .name("idx_product_details_pair")
                    .table(ProductDetails::Table)
                    .col(ProductDetails::ProductId)
                    .col(ProductDetails::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProductDetails::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Products::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    Title,
    Description,
    Price,
    ProductType,
    Cover,
    InstructorId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ProductDetails {
    Table,
    Id,
    ProductId,
    CourseId,
    Price,
}
