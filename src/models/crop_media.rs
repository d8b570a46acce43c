use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Une photo attachée à une parcelle. Vit et meurt avec son plot parent:
// la suppression du plot supprime les lignes (et les fichiers, best-effort).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crop_media")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub plot_id: i32,
    pub image: String, // Chemin relatif sous MEDIA_ROOT: plot_images/<owner>/<plot>/<fichier>
    pub caption: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plot::Entity",
        from = "Column::PlotId",
        to = "super::plot::Column::Id"
    )]
    Plot,
}

impl Related<super::plot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
