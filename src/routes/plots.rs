use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use futures::{StreamExt, TryStreamExt};
use sea_orm::{
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, ColumnTrait, Set, ActiveModelTrait,
    ModelTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::crop_media::{self, Entity as CropMedia, ActiveModel as MediaActiveModel};
use crate::models::plot::{self, Entity as Plot, ActiveModel as PlotActiveModel, PLOT_TYPES};
use crate::utils::geometry::validate_geometry;
use crate::utils::media;

// DTO pour la création et le PUT
#[derive(Deserialize, Validate)]
pub struct PlotRequest {
    #[serde(rename = "type")]
    pub plot_type: String,
    pub geometry: Value,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub growth_stage: String,
    pub planted_at: Option<NaiveDate>,
}

// DTO pour le PATCH: tout champ omis conserve la valeur stockée
#[derive(Deserialize, Validate)]
pub struct PlotPatchRequest {
    #[serde(rename = "type")]
    pub plot_type: Option<String>,
    pub geometry: Option<Value>,
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub notes: Option<String>,
    pub growth_stage: Option<String>,
    pub planted_at: Option<NaiveDate>,
}

// Filtre optionnel ?mine=1
#[derive(Deserialize)]
pub struct PlotListQuery {
    pub mine: Option<String>,
}

#[derive(Serialize)]
pub struct MediaResponse {
    pub id: i32,
    pub url: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct PlotResponse {
    pub id: i32,
    #[serde(rename = "type")]
    pub plot_type: String,
    pub geometry: Value,
    pub name: String,
    pub notes: String,
    pub growth_stage: String,
    pub planted_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub images: Vec<MediaResponse>,
}

fn media_to_response(req: &HttpRequest, model: crop_media::Model) -> MediaResponse {
    MediaResponse {
        id: model.id,
        url: media::absolute_media_url(req, &model.image),
        caption: model.caption,
        created_at: model.created_at,
    }
}

fn to_response(req: &HttpRequest, model: plot::Model, images: Vec<crop_media::Model>) -> PlotResponse {
    PlotResponse {
        id: model.id,
        plot_type: model.plot_type,
        geometry: model.geometry,
        name: model.name,
        notes: model.notes,
        growth_stage: model.growth_stage,
        planted_at: model.planted_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
        images: images.into_iter().map(|m| media_to_response(req, m)).collect(),
    }
}

fn check_plot_type(plot_type: &str) -> Result<(), String> {
    if PLOT_TYPES.contains(&plot_type) {
        Ok(())
    } else {
        Err(format!("type must be one of: {}", PLOT_TYPES.join(", ")))
    }
}

/// GET /api/plots/?mine=1 - Liste des parcelles avec leurs photos (PROTÉGÉE)
pub async fn list_plots(
    req: HttpRequest,
    auth_user: AuthUser,
    query: web::Query<PlotListQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let mut select = Plot::find().find_with_related(CropMedia);

    if matches!(query.mine.as_deref(), Some("1") | Some("true") | Some("True") | Some("yes")) {
        select = select.filter(plot::Column::OwnerId.eq(auth_user.user_id));
    }

    let plots = select
        .order_by_asc(plot::Column::Id)
        .all(db.get_ref())
        .await;

    match plots {
        Ok(plots) => {
            let response: Vec<PlotResponse> = plots
                .into_iter()
                .map(|(plot, images)| to_response(&req, plot, images))
                .collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// POST /api/plots/ - Créer une parcelle, propriété = demandeur (PROTÉGÉE)
pub async fn create_plot(
    req: HttpRequest,
    auth_user: AuthUser,
    body: web::Json<PlotRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    if let Err(msg) = check_plot_type(&body.plot_type) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "type": [msg] }));
    }

    if let Err(msg) = validate_geometry(&body.plot_type, &body.geometry) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "geometry": [msg] }));
    }

    let now = Utc::now();
    let new_plot = PlotActiveModel {
        owner_id: Set(auth_user.user_id),
        plot_type: Set(body.plot_type.clone()),
        geometry: Set(body.geometry.clone()),
        name: Set(body.name.clone()),
        notes: Set(body.notes.clone()),
        growth_stage: Set(body.growth_stage.clone()),
        planted_at: Set(body.planted_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_plot.insert(db.get_ref()).await {
        Ok(model) => HttpResponse::Created().json(to_response(&req, model, Vec::new())),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// GET /api/plots/{id}/ - Lecture ouverte à tout utilisateur connecté (PROTÉGÉE)
pub async fn get_plot(
    req: HttpRequest,
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let plot = match Plot::find_by_id(path.into_inner()).one(db.get_ref()).await {
        Ok(Some(plot)) => plot,
        Ok(None) => return HttpResponse::NotFound().json(serde_json::json!({ "detail": "Not found." })),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    let images = plot
        .find_related(CropMedia)
        .all(db.get_ref())
        .await
        .unwrap_or_default();

    HttpResponse::Ok().json(to_response(&req, plot, images))
}

// Une parcelle d'un autre propriétaire est absente pour la mutation (404)
async fn find_owned(
    db: &DatabaseConnection,
    user_id: i32,
    plot_id: i32,
) -> Result<Option<plot::Model>, sea_orm::DbErr> {
    Plot::find_by_id(plot_id)
        .filter(plot::Column::OwnerId.eq(user_id))
        .one(db)
        .await
}

/// PUT /api/plots/{id}/ - Remplacement complet, propriétaire seulement (PROTÉGÉE)
pub async fn update_plot(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<PlotRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let existing = match find_owned(db.get_ref(), auth_user.user_id, path.into_inner()).await {
        Ok(Some(plot)) => plot,
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

    if let Err(msg) = check_plot_type(&body.plot_type) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "type": [msg] }));
    }

    if let Err(msg) = validate_geometry(&body.plot_type, &body.geometry) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "geometry": [msg] }));
    }

    let plot_id = existing.id;
    let mut active: PlotActiveModel = existing.into();
    active.plot_type = Set(body.plot_type.clone());
    active.geometry = Set(body.geometry.clone());
    active.name = Set(body.name.clone());
    active.notes = Set(body.notes.clone());
    active.growth_stage = Set(body.growth_stage.clone());
    active.planted_at = Set(body.planted_at);
    active.updated_at = Set(Utc::now());

    let updated = match active.update(db.get_ref()).await {
        Ok(model) => model,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    let images = CropMedia::find()
        .filter(crop_media::Column::PlotId.eq(plot_id))
        .all(db.get_ref())
        .await
        .unwrap_or_default();

    HttpResponse::Ok().json(to_response(&req, updated, images))
}

/// PATCH /api/plots/{id}/ - Mise à jour partielle: la géométrie est
/// revalidée contre le type effectif (PROTÉGÉE)
pub async fn patch_plot(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<PlotPatchRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let existing = match find_owned(db.get_ref(), auth_user.user_id, path.into_inner()).await {
        Ok(Some(plot)) => plot,
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

    let effective_type = body.plot_type.clone().unwrap_or_else(|| existing.plot_type.clone());
    if let Err(msg) = check_plot_type(&effective_type) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "type": [msg] }));
    }

    if body.plot_type.is_some() || body.geometry.is_some() {
        let effective_geometry = body.geometry.as_ref().unwrap_or(&existing.geometry);
        if let Err(msg) = validate_geometry(&effective_type, effective_geometry) {
            return HttpResponse::BadRequest().json(serde_json::json!({ "geometry": [msg] }));
        }
    }

    let plot_id = existing.id;
    let mut active: PlotActiveModel = existing.into();
    if let Some(plot_type) = &body.plot_type {
        active.plot_type = Set(plot_type.clone());
    }
    if let Some(geometry) = &body.geometry {
        active.geometry = Set(geometry.clone());
    }
    if let Some(name) = &body.name {
        active.name = Set(name.clone());
    }
    if let Some(notes) = &body.notes {
        active.notes = Set(notes.clone());
    }
    if let Some(growth_stage) = &body.growth_stage {
        active.growth_stage = Set(growth_stage.clone());
    }
    if let Some(planted_at) = body.planted_at {
        active.planted_at = Set(Some(planted_at));
    }
    active.updated_at = Set(Utc::now());

    let updated = match active.update(db.get_ref()).await {
        Ok(model) => model,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    let images = CropMedia::find()
        .filter(crop_media::Column::PlotId.eq(plot_id))
        .all(db.get_ref())
        .await
        .unwrap_or_default();

    HttpResponse::Ok().json(to_response(&req, updated, images))
}

/// DELETE /api/plots/{id}/ - Supprime la parcelle et ses photos (PROTÉGÉE)
pub async fn delete_plot(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let existing = match find_owned(db.get_ref(), auth_user.user_id, path.into_inner()).await {
        Ok(Some(plot)) => plot,
        Ok(None) => return HttpResponse::NotFound().json(serde_json::json!({ "detail": "Not found." })),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    let media_rows = CropMedia::find()
        .filter(crop_media::Column::PlotId.eq(existing.id))
        .all(db.get_ref())
        .await
        .unwrap_or_default();

    // Fichiers supprimés en best-effort, les lignes font foi
    for row in &media_rows {
        let _ = std::fs::remove_file(media::media_root().join(&row.image));
    }

    if let Err(e) = CropMedia::delete_many()
        .filter(crop_media::Column::PlotId.eq(existing.id))
        .exec(db.get_ref())
        .await
    {
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        }));
    }

    match existing.delete(db.get_ref()).await {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// POST /api/plots/{id}/media/ - Upload multipart d'une photo (PROTÉGÉE)
/// Seul chemin qui répond 403 (et non 404) sur un propriétaire différent
pub async fn upload_media(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    mut payload: Multipart,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let plot = match Plot::find_by_id(path.into_inner()).one(db.get_ref()).await {
        Ok(Some(plot)) => plot,
        Ok(None) => return HttpResponse::NotFound().json(serde_json::json!({ "detail": "Not found." })),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if plot.owner_id != auth_user.user_id {
        return HttpResponse::Forbidden().json(serde_json::json!({ "detail": "Not allowed." }));
    }

    // 1. Lire les parts multipart (image obligatoire, caption optionnelle)
    let mut image: Option<(String, web::BytesMut)> = None;
    let mut caption = String::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("upload")
                    .to_string();

                let mut data = web::BytesMut::new();
                while let Some(chunk) = field.next().await {
                    match chunk {
                        Ok(bytes) => data.extend_from_slice(&bytes),
                        Err(e) => {
                            return HttpResponse::BadRequest().json(serde_json::json!({
                                "error": format!("Failed to read upload: {}", e)
                            }));
                        }
                    }
                }

                image = Some((filename, data));
            }
            "caption" => {
                let mut data = web::BytesMut::new();
                while let Some(chunk) = field.next().await {
                    if let Ok(bytes) = chunk {
                        data.extend_from_slice(&bytes);
                    }
                }
                caption = String::from_utf8_lossy(&data).to_string();
            }
            _ => {
                // Part inconnue: drainer pour passer à la suivante
                while let Some(_chunk) = field.next().await {}
            }
        }
    }

    let (filename, data) = match image {
        Some(image) => image,
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "detail": "image is required (multipart)."
            }));
        }
    };

    // 2. Écrire le fichier sous MEDIA_ROOT/plot_images/<owner>/<plot>/
    let stored_name = format!("{}_{}", Uuid::new_v4(), media::sanitize_filename(&filename));
    let relative = media::plot_media_path(plot.owner_id, plot.id, &stored_name);
    let full_path = media::media_root().join(&relative);

    if let Some(parent) = full_path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to store file: {}", e)
            }));
        }
    }

    if let Err(e) = tokio::fs::write(&full_path, &data).await {
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to store file: {}", e)
        }));
    }

    // 3. Enregistrer la ligne crop_media
    let new_media = MediaActiveModel {
        plot_id: Set(plot.id),
        image: Set(relative),
        caption: Set(caption),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_media.insert(db.get_ref()).await {
        Ok(model) => HttpResponse::Created().json(media_to_response(&req, model)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

pub fn plots_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/plots")
            .route("/", web::get().to(list_plots))
            .route("/", web::post().to(create_plot))
            .route("/{id}/", web::get().to(get_plot))
            .route("/{id}/", web::put().to(update_plot))
            .route("/{id}/", web::patch().to(patch_plot))
            .route("/{id}/", web::delete().to(delete_plot))
            .route("/{id}/media/", web::post().to(upload_media)),
    );
}
