use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use crate::utils::growth_stages::StageStorage;

/// Représentation de stockage des growth_stages, fixée au niveau du schéma.
/// La colonne est un TEXT délimité par `|` ; si elle migre un jour vers du
/// JSONB, seul ce const change (pas d'inspection du backend à l'exécution).
pub const GROWTH_STAGES_STORAGE: StageStorage = StageStorage::DelimitedString;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crop")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub image: Option<String>, // Chemin relatif sous MEDIA_ROOT (admin/debug)
    pub image_path: Option<String>, // Override manuel: URL absolue
    pub spacing: Option<f64>,
    pub harvest_time: Option<String>,
    pub growth_stages: Option<String>, // Ex: "Seedling|Vegetative|Flowering|Harvest"
    pub pest_notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
