use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryFilter, ColumnTrait, Set, ActiveModelTrait};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::AuthUser;
use crate::models::dashboard_preference::{
    self,
    Entity as DashboardPreference,
    ActiveModel as PreferenceActiveModel,
};
use crate::utils::widgets::{validate_widgets, Widget};

// DTO d'entrée: widgets en Option pour distinguer "absent" (PATCH)
// de "présent mais invalide"
#[derive(Deserialize)]
pub struct DashboardUpdateRequest {
    pub widgets: Option<Value>,
}

#[derive(Serialize)]
pub struct PreferenceResponse {
    pub widgets: Value,
    pub updated_at: DateTime<Utc>,
}

impl From<dashboard_preference::Model> for PreferenceResponse {
    fn from(model: dashboard_preference::Model) -> Self {
        PreferenceResponse {
            widgets: model.widgets,
            updated_at: model.updated_at,
        }
    }
}

/// Get-or-create idempotent, invoqué à la lecture: la ligne singleton
/// de l'utilisateur est créée vide à son premier accès au dashboard
async fn get_or_create(db: &DatabaseConnection, user_id: i32) -> Result<dashboard_preference::Model, DbErr> {
    if let Some(pref) = DashboardPreference::find()
        .filter(dashboard_preference::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(pref);
    }

    let new_pref = PreferenceActiveModel {
        user_id: Set(user_id),
        widgets: Set(serde_json::json!([])),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };

    new_pref.insert(db).await
}

// Remplacement atomique de la liste complète (pas de merge)
async fn save_widgets(
    db: &DatabaseConnection,
    user_id: i32,
    widgets: Vec<Widget>,
) -> Result<dashboard_preference::Model, DbErr> {
    let pref = get_or_create(db, user_id).await?;

    let mut active: PreferenceActiveModel = pref.into();
    active.widgets = Set(serde_json::to_value(&widgets).unwrap_or_else(|_| serde_json::json!([])));
    active.updated_at = Set(Utc::now());
    active.update(db).await
}

/// GET /api/dashboard/ - Préférences de l'utilisateur (PROTÉGÉE)
pub async fn get_dashboard(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match get_or_create(db.get_ref(), auth_user.user_id).await {
        Ok(pref) => HttpResponse::Ok().json(PreferenceResponse::from(pref)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// POST/PUT /api/dashboard/ - Remplace toute la liste de widgets (PROTÉGÉE)
pub async fn replace_dashboard(
    auth_user: AuthUser,
    body: web::Json<DashboardUpdateRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let widgets_value = match &body.widgets {
        Some(value) => value,
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "widgets": ["This field is required."]
            }));
        }
    };

    let widgets = match validate_widgets(widgets_value) {
        Ok(widgets) => widgets,
        Err(msg) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "widgets": [msg]
            }));
        }
    };

    match save_widgets(db.get_ref(), auth_user.user_id, widgets).await {
        Ok(pref) => HttpResponse::Ok().json(PreferenceResponse::from(pref)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// PATCH /api/dashboard/ - Mise à jour partielle: un champ omis
/// conserve la valeur stockée (PROTÉGÉE)
pub async fn patch_dashboard(
    auth_user: AuthUser,
    body: web::Json<DashboardUpdateRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let widgets_value = match &body.widgets {
        Some(value) => value,
        // Rien à modifier: renvoyer l'état courant
        None => return get_dashboard(auth_user, db).await,
    };

    let widgets = match validate_widgets(widgets_value) {
        Ok(widgets) => widgets,
        Err(msg) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "widgets": [msg]
            }));
        }
    };

    match save_widgets(db.get_ref(), auth_user.user_id, widgets).await {
        Ok(pref) => HttpResponse::Ok().json(PreferenceResponse::from(pref)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

pub fn dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/dashboard/")
            .route(web::get().to(get_dashboard))
            .route(web::post().to(replace_dashboard))
            .route(web::put().to(replace_dashboard))
            .route(web::patch().to(patch_dashboard)),
    );
}
