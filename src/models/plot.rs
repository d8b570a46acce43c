use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Types de parcelles autorisés
pub const PLOT_TYPES: [&str; 4] = ["point", "rectangle", "circle", "polygon"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plot")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[serde(skip_serializing)]
    pub owner_id: i32,
    #[serde(rename = "type")]
    #[sea_orm(column_name = "type")]
    pub plot_type: String, // point | rectangle | circle | polygon
    // Géométrie en JSON: GeoJSON-like pour point/rectangle/polygon,
    // {center: [lng, lat], radiusMeters: n} pour circle
    pub geometry: Json,
    pub name: String,
    pub notes: String,
    pub growth_stage: String,
    pub planted_at: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,

    #[sea_orm(has_many = "super::crop_media::Entity")]
    CropMedia,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::crop_media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CropMedia.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
