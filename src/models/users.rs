use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Rôle fixé à l'inscription, utilisé pour les contrôles d'autorisation
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "instructor")]
    Instructor,
    #[sea_orm(string_value = "affiliate")]
    Affiliate,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Instructor => "instructor",
            UserRole::Affiliate => "affiliate",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)] // Ne jamais exposer le hash en JSON
    pub password_hash: String, // Format: pbkdf2:sha256:iterations$salt$hash
    pub role: UserRole,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Order,

    #[sea_orm(has_many = "super::enrolled_course::Entity")]
    EnrolledCourse,

    #[sea_orm(has_one = "super::affiliate::Entity")]
    Affiliate,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::enrolled_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EnrolledCourse.def()
    }
}

impl Related<super::affiliate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Affiliate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Projection publique d'un utilisateur (sans le hash)
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime,
}

impl From<Model> for PublicUser {
    fn from(user: Model) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
