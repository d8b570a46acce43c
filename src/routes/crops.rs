use actix_web::{web, HttpRequest, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set, ActiveModelTrait, ModelTrait};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::crop::{self, Entity as Crop, ActiveModel as CropActiveModel, GROWTH_STAGES_STORAGE};
use crate::utils::growth_stages::{self, GrowthStagesInput, StoredStages};
use crate::utils::media;

// DTO pour la création et le PUT. Les alias camelCase viennent des
// anciens clients mobiles et restent acceptés en entrée.
#[derive(Deserialize, Validate)]
pub struct CropRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub spacing: Option<f64>,
    #[serde(alias = "harvestTime")]
    pub harvest_time: Option<String>,
    pub growth_stages: Option<Value>,
    #[serde(alias = "pestNotes")]
    pub pest_notes: Option<String>,
    pub image: Option<String>,
    #[serde(alias = "imagePath")]
    pub image_path: Option<String>,
}

// DTO pour le PATCH: tout champ omis conserve la valeur stockée
#[derive(Deserialize, Validate)]
pub struct CropPatchRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub spacing: Option<f64>,
    #[serde(alias = "harvestTime")]
    pub harvest_time: Option<String>,
    pub growth_stages: Option<Value>,
    #[serde(alias = "pestNotes")]
    pub pest_notes: Option<String>,
    pub image: Option<String>,
    #[serde(alias = "imagePath")]
    pub image_path: Option<String>,
}

#[derive(Serialize)]
pub struct CropResponse {
    pub id: i32,
    pub name: String,
    pub spacing: Option<f64>,
    pub harvest_time: Option<String>,
    pub growth_stages: Vec<String>, // Toujours une liste en sortie
    pub pest_notes: Option<String>,
    pub image: Option<String>,
    pub image_path: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: String, // URL affichable, jamais null
}

// Priorité: fichier stocké -> override image_path -> chaîne vide
fn to_response(req: &HttpRequest, model: crop::Model) -> CropResponse {
    let image_url = match model.image.as_deref().filter(|s| !s.is_empty()) {
        Some(path) => media::absolute_media_url(req, path),
        None => model.image_path.clone().unwrap_or_default(),
    };

    let stages = model
        .growth_stages
        .as_ref()
        .map(|s| growth_stages::expand(&StoredStages::Text(s.clone())))
        .unwrap_or_default();

    CropResponse {
        id: model.id,
        name: model.name,
        spacing: model.spacing,
        harvest_time: model.harvest_time,
        growth_stages: stages,
        pest_notes: model.pest_notes,
        image: model.image,
        image_path: model.image_path,
        image_url,
    }
}

// Entrée growth_stages (liste ou chaîne) -> valeur de colonne TEXT
fn stages_to_column(value: &Value) -> Result<String, String> {
    let input = GrowthStagesInput::from_value(value)?;
    Ok(match growth_stages::normalize(input, GROWTH_STAGES_STORAGE) {
        StoredStages::Text(s) => s,
        StoredStages::List(stages) => stages.join("|"),
    })
}

/// GET /api/crops/ - Liste des cultures, triées par nom (PROTÉGÉE)
pub async fn list_crops(
    req: HttpRequest,
    _auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let crops = Crop::find()
        .order_by_asc(crop::Column::Name)
        .all(db.get_ref())
        .await;

    match crops {
        Ok(crops) => {
            let response: Vec<CropResponse> =
                crops.into_iter().map(|c| to_response(&req, c)).collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// POST /api/crops/ - Créer une culture, pas de restriction de propriété (PROTÉGÉE)
pub async fn create_crop(
    req: HttpRequest,
    _auth_user: AuthUser,
    body: web::Json<CropRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    let stages_column = match &body.growth_stages {
        Some(value) => match stages_to_column(value) {
            Ok(column) => Some(column),
            Err(msg) => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "growth_stages": [msg]
                }));
            }
        },
        None => None,
    };

    let new_crop = CropActiveModel {
        name: Set(body.name.clone()),
        spacing: Set(body.spacing),
        harvest_time: Set(body.harvest_time.clone()),
        growth_stages: Set(stages_column),
        pest_notes: Set(body.pest_notes.clone()),
        image: Set(body.image.clone()),
        image_path: Set(body.image_path.clone()),
        ..Default::default()
    };

    match new_crop.insert(db.get_ref()).await {
        Ok(model) => HttpResponse::Created().json(to_response(&req, model)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// GET /api/crops/{id}/ (PROTÉGÉE)
pub async fn get_crop(
    req: HttpRequest,
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match Crop::find_by_id(path.into_inner()).one(db.get_ref()).await {
        Ok(Some(model)) => HttpResponse::Ok().json(to_response(&req, model)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "detail": "Not found." })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// PUT /api/crops/{id}/ - Remplacement complet (PROTÉGÉE)
pub async fn update_crop(
    req: HttpRequest,
    _auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CropRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let existing = match Crop::find_by_id(path.into_inner()).one(db.get_ref()).await {
        Ok(Some(model)) => model,
        Ok(None) => return HttpResponse::NotFound().json(serde_json::json!({ "detail": "Not found." })),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    let stages_column = match &body.growth_stages {
        Some(value) => match stages_to_column(value) {
            Ok(column) => Some(column),
            Err(msg) => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "growth_stages": [msg]
                }));
            }
        },
        None => None,
    };

    let mut active: CropActiveModel = existing.into();
    active.name = Set(body.name.clone());
    active.spacing = Set(body.spacing);
    active.harvest_time = Set(body.harvest_time.clone());
    active.growth_stages = Set(stages_column);
    active.pest_notes = Set(body.pest_notes.clone());
    active.image = Set(body.image.clone());
    active.image_path = Set(body.image_path.clone());

    match active.update(db.get_ref()).await {
        Ok(model) => HttpResponse::Ok().json(to_response(&req, model)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// PATCH /api/crops/{id}/ - Mise à jour partielle (PROTÉGÉE)
pub async fn patch_crop(
    req: HttpRequest,
    _auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CropPatchRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let existing = match Crop::find_by_id(path.into_inner()).one(db.get_ref()).await {
        Ok(Some(model)) => model,
        Ok(None) => return HttpResponse::NotFound().json(serde_json::json!({ "detail": "Not found." })),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    let mut active: CropActiveModel = existing.into();
    if let Some(name) = &body.name {
        active.name = Set(name.clone());
    }
    if let Some(spacing) = body.spacing {
        active.spacing = Set(Some(spacing));
    }
    if let Some(harvest_time) = &body.harvest_time {
        active.harvest_time = Set(Some(harvest_time.clone()));
    }
    if let Some(value) = &body.growth_stages {
        match stages_to_column(value) {
            Ok(column) => active.growth_stages = Set(Some(column)),
            Err(msg) => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "growth_stages": [msg]
                }));
            }
        }
    }
    if let Some(pest_notes) = &body.pest_notes {
        active.pest_notes = Set(Some(pest_notes.clone()));
    }
    if let Some(image) = &body.image {
        active.image = Set(Some(image.clone()));
    }
    if let Some(image_path) = &body.image_path {
        active.image_path = Set(Some(image_path.clone()));
    }

    match active.update(db.get_ref()).await {
        Ok(model) => HttpResponse::Ok().json(to_response(&req, model)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// DELETE /api/crops/{id}/ (PROTÉGÉE)
pub async fn delete_crop(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let existing = match Crop::find_by_id(path.into_inner()).one(db.get_ref()).await {
        Ok(Some(model)) => model,
        Ok(None) => return HttpResponse::NotFound().json(serde_json::json!({ "detail": "Not found." })),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    match existing.delete(db.get_ref()).await {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

pub fn crops_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/crops")
            .route("/", web::get().to(list_crops))
            .route("/", web::post().to(create_crop))
            .route("/{id}/", web::get().to(get_crop))
            .route("/{id}/", web::put().to(update_crop))
            .route("/{id}/", web::patch().to(patch_crop))
            .route("/{id}/", web::delete().to(delete_crop)),
    );
}
