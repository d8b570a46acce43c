// DTOs partagés entre services et routes
use serde::Serialize;

// 1 résultat du proxy Perenual, ramené au schéma Crop local.
// Perenual ne fournit pas spacing/harvest_time/growth_stages/pest_notes
// dans sa liste: on renvoie des null/[] pour garder la forme stable.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedCrop {
    pub id: Option<i64>,
    pub name: String,
    pub image_path: String, // Jamais vide en sortie (placeholder en dernier recours)
    pub spacing: Option<f64>,
    pub harvest_time: Option<String>,
    pub growth_stages: Vec<String>,
    pub pest_notes: Option<String>,
}

// Réponse du proxy: {page, count, results}
#[derive(Debug, Serialize)]
pub struct ExternalCropsResponse {
    pub page: u32,
    pub count: usize,
    pub results: Vec<NormalizedCrop>,
}
