use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String, // Identifiant de connexion unique
    pub username: Option<String>, // Affichage seulement, pas utilisé pour le login
    #[serde(skip_serializing)]
    pub password_hash: String, // Format: pbkdf2:sha256:iterations$salt$hash
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::dashboard_preference::Entity")]
    DashboardPreference,

    #[sea_orm(has_many = "super::event::Entity")]
    Event,

    #[sea_orm(has_many = "super::plot::Entity")]
    Plot,
}

impl Related<super::dashboard_preference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DashboardPreference.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::plot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
