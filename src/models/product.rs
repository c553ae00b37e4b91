use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[sea_orm(string_value = "bundle")]
    Bundle,
    #[sea_orm(string_value = "course")]
    Course,
    #[sea_orm(string_value = "merchandise")]
    Merchandise,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub price: i64, // en centimes
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub cover: Option<String>,
    pub instructor_id: Option<i32>, // propriétaire, vérifié côté serveur
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_detail::Entity")]
    ProductDetail,

    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLine,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::InstructorId",
        to = "super::users::Column::Id"
    )]
    Instructor,
}

impl Related<super::product_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductDetail.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLine.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_detail::Relation::Course.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_detail::Relation::Product.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
