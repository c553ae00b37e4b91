use sea_orm_migration::prelude::*;

use super::m20260101_000001_create_users::Users;
use super::m20260101_000002_create_catalog::Courses;
use super::m20260101_000003_create_products::Products;
use super::m20260101_000004_create_affiliates::Affiliates;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::UserId).integer().not_null())
                    .col(ColumnDef::new(Orders::Status).string().not_null().default("pending"))
                    .col(ColumnDef::new(Orders::AffiliateId).integer().null())
                    .col(ColumnDef::new(Orders::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_affiliate")
                            .from(Orders::Table, Orders::AffiliateId)
                            .to(Affiliates::Table, Affiliates::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderLines::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderLines::OrderId).integer().not_null())
                    .col(ColumnDef::new(OrderLines::ProductId).integer().not_null())
                    .col(ColumnDef::new(OrderLines::CourseId).integer().null())
                    .col(ColumnDef::new(OrderLines::Status).string().not_null().default("pending"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_lines_order")
                            .from(OrderLines::Table, OrderLines::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_lines_product")
                            .from(OrderLines::Table, OrderLines::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_lines_course")
                            .from(OrderLines::Table, OrderLines::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::OrderId).integer().not_null())
                    .col(ColumnDef::new(Payments::Method).string().not_null())
                    .col(ColumnDef::new(Payments::Status).string().not_null())
                    .col(ColumnDef::new(Payments::ReferenceNumber).string().not_null())
                    .col(ColumnDef::new(Payments::Amount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Payments::IdempotencyKey).string().null().unique_key())
                    .col(ColumnDef::new(Payments::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_order")
                            .from(Payments::Table, Payments::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_status")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Payments::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(OrderLines::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Orders::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Orders {
    Table,
    Id,
    UserId,
    Status,
    AffiliateId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum OrderLines {
    Table,
    Id,
    OrderId,
    ProductId,
    CourseId,
    Status,
}

#[derive(DeriveIden)]
pub enum Payments {
    Table,
    Id,
    OrderId,
    Method,
    Status,
    ReferenceNumber,
    Amount,
    IdempotencyKey,
    CreatedAt,
}
