use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Statuts autorisés pour un événement de calendrier
pub const EVENT_STATUSES: [&str; 3] = ["not_started", "in_progress", "completed"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[serde(skip_serializing)]
    pub user_id: i32,
    pub title: String,
    pub notes: String,
    pub start_dt: DateTimeUtc, // Toujours UTC, invariant: end_dt >= start_dt
    pub end_dt: DateTimeUtc,
    pub all_day: bool,
    pub location: String,
    pub status: String, // not_started | in_progress | completed
    pub completed: bool,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
