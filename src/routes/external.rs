use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::env;

use crate::middleware::AuthUser;
use crate::models::dto::{ExternalCropsResponse, NormalizedCrop};
use crate::services::external_crops_service::ExternalCropsService;

// Query params: /api/external/crops/?q=apple&page=1&limit=24&details=1
#[derive(Deserialize)]
pub struct ExternalCropsQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub details: Option<String>,
}

/// GET /api/external/crops/ - Recherche dans l'API Perenual, résultats
/// ramenés au schéma Crop local (PROTÉGÉE)
#[get("/crops/")]
pub async fn external_crops_search(
    _auth_user: AuthUser,
    query: web::Query<ExternalCropsQuery>,
) -> HttpResponse {
    // Clé obligatoire: sans elle on échoue tout de suite, pas de retry
    let key = match env::var("PERENUAL_KEY") {
        Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
        _ => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "PERENUAL_KEY missing (set env var)"
            }));
        }
    };

    let q = query.q.clone().unwrap_or_default().trim().to_string();
    let page = query.page.unwrap_or(1).max(1);
    let limit = ExternalCropsService::clamp_limit(query.limit);
    let use_details = matches!(query.details.as_deref(), Some("1") | Some("true") | Some("True"));

    let client = reqwest::Client::new();

    // 1. Appel liste (un seul, pas de retry)
    let items = match ExternalCropsService::search_species(&client, &key, &q, page).await {
        Ok(items) => items,
        Err(e) => {
            return HttpResponse::BadGateway().json(serde_json::json!({ "error": e }));
        }
    };

    // 2. Normaliser et tronquer à 'limit' (la page Perenual peut faire 30)
    let mut results: Vec<NormalizedCrop> = items
        .iter()
        .take(limit)
        .map(ExternalCropsService::normalize_item)
        .collect();

    // 3. Enrichissement best-effort: un appel détail par résultat sans image,
    //    l'échec d'un appel est absorbé
    if use_details {
        for row in results.iter_mut() {
            if !row.image_path.is_empty() {
                continue;
            }
            let Some(plant_id) = row.id else { continue };

            match ExternalCropsService::fetch_details_image(&client, &key, plant_id).await {
                Ok(Some(url)) => row.image_path = url,
                Ok(None) | Err(_) => {}
            }
        }
    }

    // 4. Passe finale: placeholder pour tout résultat encore sans image
    ExternalCropsService::apply_placeholder(&mut results);

    HttpResponse::Ok().json(ExternalCropsResponse {
        page,
        count: results.len(),
        results,
    })
}

pub fn external_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/external")
            .service(external_crops_search)
    );
}
