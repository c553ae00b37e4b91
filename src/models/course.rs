use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String, // stable, utilisé pour la recherche publique
    pub description: Option<String>,
    pub cover: Option<String>, // data-URL inline
    #[serde(rename = "type")]
    pub course_type: String,
    pub instructor_id: Option<i32>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::chapter::Entity")]
    Chapter,

    #[sea_orm(has_many = "super::product_detail::Entity")]
    ProductDetail,

    #[sea_orm(has_many = "super::enrolled_course::Entity")]
    EnrolledCourse,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::InstructorId",
        to = "super::users::Column::Id"
    )]
    Instructor,
}

impl Related<super::chapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapter.def()
    }
}

impl Related<super::product_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductDetail.def()
    }
}

impl Related<super::enrolled_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EnrolledCourse.def()
    }
}

// Un cours est vendu par plusieurs produits (via product_details)
impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_detail::Relation::Product.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_detail::Relation::Course.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
