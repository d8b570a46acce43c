use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::models::dto::NormalizedCrop;

const BASE_URL: &str = "https://perenual.com/api";

// Fallback statique final pour que l'app cliente affiche toujours quelque chose
pub const PLACEHOLDER_IMG: &str = "https://via.placeholder.com/300x200?text=No+Image";

pub const DEFAULT_LIMIT: u32 = 24;
pub const MAX_LIMIT: u32 = 50;

const LIST_TIMEOUT: Duration = Duration::from_secs(12);
const DETAILS_TIMEOUT: Duration = Duration::from_secs(8);

pub struct ExternalCropsService;

impl ExternalCropsService {
    /// Appelle /species-list avec la recherche et la page demandées.
    /// Aucun retry: tout échec (réseau ou statut non-2xx) remonte en
    /// une erreur unique, avec le statut upstream quand il existe.
    pub async fn search_species(
        client: &Client,
        key: &str,
        q: &str,
        page: u32,
    ) -> Result<Vec<Value>, String> {
        let page_param = page.to_string();
        let mut request = client
            .get(format!("{}/species-list", BASE_URL))
            .timeout(LIST_TIMEOUT)
            .query(&[("key", key), ("page", page_param.as_str())]);

        if !q.is_empty() {
            request = request.query(&[("q", q)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("Upstream error: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Upstream error: status {}", status));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| format!("Upstream error: {}", e))?;

        Ok(payload
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Ramène un enregistrement Perenual au schéma Crop local.
    /// Nom: common_name, sinon premier scientific_name (liste ou scalaire),
    /// sinon "Unknown". Image: regular_url, sinon thumbnail, sinon vide
    /// (le placeholder est appliqué dans une passe finale séparée).
    pub fn normalize_item(item: &Value) -> NormalizedCrop {
        let name = item
            .get("common_name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| match item.get("scientific_name") {
                Some(Value::Array(names)) => names
                    .first()
                    .and_then(Value::as_str)
                    .map(str::to_string),
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_else(|| "Unknown".to_string());

        NormalizedCrop {
            id: item.get("id").and_then(Value::as_i64),
            name,
            image_path: Self::pick_image(item),
            spacing: None,
            harvest_time: None,
            growth_stages: Vec::new(),
            pest_notes: None,
        }
    }

    // Extraction best-effort d'une URL d'image (liste ou détail)
    fn pick_image(item: &Value) -> String {
        let img = item.get("default_image").unwrap_or(&Value::Null);

        img.get("regular_url")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                img.get("thumbnail")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Appelle /species/details/{id} pour tenter d'obtenir une meilleure image.
    /// L'appelant absorbe l'échec: un Err ne fait jamais échouer la requête.
    pub async fn fetch_details_image(
        client: &Client,
        key: &str,
        plant_id: i64,
    ) -> Result<Option<String>, reqwest::Error> {
        let response = client
            .get(format!("{}/species/details/{}", BASE_URL, plant_id))
            .timeout(DETAILS_TIMEOUT)
            .query(&[("key", key)])
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        let url = Self::pick_image(&data);

        Ok(if url.is_empty() { None } else { Some(url) })
    }

    /// Passe finale, toujours appliquée: tout résultat encore sans image
    /// reçoit le placeholder fixe
    pub fn apply_placeholder(results: &mut [NormalizedCrop]) {
        for row in results.iter_mut() {
            if row.image_path.is_empty() {
                row.image_path = PLACEHOLDER_IMG.to_string();
            }
        }
    }

    /// Borne le limit client à 1..=50 (défaut: 24)
    pub fn clamp_limit(limit: Option<u32>) -> usize {
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_common_name_and_thumbnail() {
        let item = json!({"id": 3, "common_name": "Apple", "default_image": {"thumbnail": "x"}});
        let crop = ExternalCropsService::normalize_item(&item);
        assert_eq!(crop.id, Some(3));
        assert_eq!(crop.name, "Apple");
        assert_eq!(crop.image_path, "x");
        assert!(crop.growth_stages.is_empty());
        assert!(crop.spacing.is_none());
    }

    #[test]
    fn test_regular_url_preferred_over_thumbnail() {
        let item = json!({
            "common_name": "Pear",
            "default_image": {"regular_url": "big.jpg", "thumbnail": "small.jpg"}
        });
        let crop = ExternalCropsService::normalize_item(&item);
        assert_eq!(crop.image_path, "big.jpg");
    }

    #[test]
    fn test_scientific_name_list_fallback() {
        let item = json!({"scientific_name": ["Malus domestica", "Malus pumila"]});
        let crop = ExternalCropsService::normalize_item(&item);
        assert_eq!(crop.name, "Malus domestica");
    }

    #[test]
    fn test_scientific_name_scalar_fallback() {
        let item = json!({"common_name": "", "scientific_name": "Solanum lycopersicum"});
        let crop = ExternalCropsService::normalize_item(&item);
        assert_eq!(crop.name, "Solanum lycopersicum");
    }

    #[test]
    fn test_no_name_anywhere_yields_unknown() {
        let crop = ExternalCropsService::normalize_item(&json!({"id": 9}));
        assert_eq!(crop.name, "Unknown");
    }

    #[test]
    fn test_missing_image_left_empty_then_placeholder_applied() {
        let mut results = vec![
            ExternalCropsService::normalize_item(&json!({"common_name": "Basil"})),
            ExternalCropsService::normalize_item(
                &json!({"common_name": "Mint", "default_image": {"thumbnail": "m.jpg"}}),
            ),
        ];
        assert_eq!(results[0].image_path, "");

        ExternalCropsService::apply_placeholder(&mut results);
        assert_eq!(results[0].image_path, PLACEHOLDER_IMG);
        assert_eq!(results[1].image_path, "m.jpg");
    }

    #[test]
    fn test_limit_clamped_to_configured_maximum() {
        assert_eq!(ExternalCropsService::clamp_limit(None), 24);
        assert_eq!(ExternalCropsService::clamp_limit(Some(0)), 1);
        assert_eq!(ExternalCropsService::clamp_limit(Some(200)), 50);
        assert_eq!(ExternalCropsService::clamp_limit(Some(10)), 10);
    }
}
