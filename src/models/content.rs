use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    #[sea_orm(string_value = "VIDEO")]
    Video,
    #[sea_orm(string_value = "PDF")]
    Pdf,
    #[sea_orm(string_value = "ARTICLE")]
    Article,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub chapter_id: i32,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub path: String,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chapter::Entity",
        from = "Column::ChapterId",
        to = "super::chapter::Column::Id"
    )]
    Chapter,

    #[sea_orm(has_many = "super::content_progress::Entity")]
    ContentProgress,
}

impl Related<super::chapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapter.def()
    }
}

impl Related<super::content_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentProgress.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
