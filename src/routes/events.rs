use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, ColumnTrait, Condition, Set,
    ActiveModelTrait, ModelTrait,
};
use serde::Deserialize;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::event::{self, Entity as Event, ActiveModel as EventActiveModel, EVENT_STATUSES};

// DTO pour la création et le PUT (remplacement complet)
#[derive(Deserialize, Validate)]
pub struct EventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    pub start_dt: DateTime<Utc>,
    pub end_dt: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: String,
    pub status: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

// DTO pour le PATCH: tout champ omis conserve la valeur stockée
#[derive(Deserialize, Validate)]
pub struct EventPatchRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub notes: Option<String>,
    pub start_dt: Option<DateTime<Utc>>,
    pub end_dt: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub completed: Option<bool>,
}

// Bornes optionnelles de la recherche par plage
#[derive(Deserialize)]
pub struct EventRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Invariant d'un événement: end_dt >= start_dt
fn check_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), String> {
    if end < start {
        Err("end_dt must not precede start_dt".to_string())
    } else {
        Ok(())
    }
}

fn check_status(status: &str) -> Result<(), String> {
    if EVENT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!("status must be one of: {}", EVENT_STATUSES.join(", ")))
    }
}

/// Chevauchement en sémantique demi-ouverte:
/// un événement matche si start_dt < query.end ET end_dt > query.start.
/// Une seule borne fournie filtre sur ce côté uniquement.
fn overlap_condition(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Condition {
    let mut condition = Condition::all();
    if let Some(end) = end {
        condition = condition.add(event::Column::StartDt.lt(end));
    }
    if let Some(start) = start {
        condition = condition.add(event::Column::EndDt.gt(start));
    }
    condition
}

fn parse_bound(raw: &Option<String>, field: &str) -> Result<Option<DateTime<Utc>>, String> {
    match raw {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| format!("{} must be an ISO-8601 datetime", field)),
        None => Ok(None),
    }
}

/// GET /api/events/?start=ISO&end=ISO - Événements chevauchant la plage (PROTÉGÉE)
pub async fn list_events(
    auth_user: AuthUser,
    query: web::Query<EventRangeQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let start_dt = match parse_bound(&query.start, "start") {
        Ok(dt) => dt,
        Err(msg) => return HttpResponse::BadRequest().json(serde_json::json!({ "start": [msg] })),
    };
    let end_dt = match parse_bound(&query.end, "end") {
        Ok(dt) => dt,
        Err(msg) => return HttpResponse::BadRequest().json(serde_json::json!({ "end": [msg] })),
    };

    let events = Event::find()
        .filter(event::Column::UserId.eq(auth_user.user_id))
        .filter(overlap_condition(start_dt, end_dt))
        .order_by_asc(event::Column::StartDt)
        .all(db.get_ref())
        .await;

    match events {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// POST /api/events/ - Créer un événement, propriété = demandeur (PROTÉGÉE)
pub async fn create_event(
    auth_user: AuthUser,
    body: web::Json<EventRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    let status = body.status.clone().unwrap_or_else(|| "not_started".to_string());
    if let Err(msg) = check_status(&status) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "status": [msg] }));
    }

    if let Err(msg) = check_range(body.start_dt, body.end_dt) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "end_dt": [msg] }));
    }

    let new_event = EventActiveModel {
        user_id: Set(auth_user.user_id),
        title: Set(body.title.clone()),
        notes: Set(body.notes.clone()),
        start_dt: Set(body.start_dt),
        end_dt: Set(body.end_dt),
        all_day: Set(body.all_day),
        location: Set(body.location.clone()),
        status: Set(status),
        completed: Set(body.completed),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_event.insert(db.get_ref()).await {
        Ok(event) => HttpResponse::Created().json(event),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

// Un événement d'un autre utilisateur est traité comme absent (404, jamais 403)
async fn find_owned(
    db: &DatabaseConnection,
    user_id: i32,
    event_id: i32,
) -> Result<Option<event::Model>, sea_orm::DbErr> {
    Event::find_by_id(event_id)
        .filter(event::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// GET /api/events/{id}/ (PROTÉGÉE)
pub async fn get_event(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match find_owned(db.get_ref(), auth_user.user_id, path.into_inner()).await {
        Ok(Some(event)) => HttpResponse::Ok().json(event),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "detail": "Not found." })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// PUT /api/events/{id}/ - Remplacement complet (PROTÉGÉE)
pub async fn update_event(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<EventRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let existing = match find_owned(db.get_ref(), auth_user.user_id, path.into_inner()).await {
        Ok(Some(event)) => event,
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

    let status = body.status.clone().unwrap_or_else(|| "not_started".to_string());
    if let Err(msg) = check_status(&status) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "status": [msg] }));
    }

    if let Err(msg) = check_range(body.start_dt, body.end_dt) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "end_dt": [msg] }));
    }

    let mut active: EventActiveModel = existing.into();
    active.title = Set(body.title.clone());
    active.notes = Set(body.notes.clone());
    active.start_dt = Set(body.start_dt);
    active.end_dt = Set(body.end_dt);
    active.all_day = Set(body.all_day);
    active.location = Set(body.location.clone());
    active.status = Set(status);
    active.completed = Set(body.completed);
    active.updated_at = Set(Utc::now());

    match active.update(db.get_ref()).await {
        Ok(event) => HttpResponse::Ok().json(event),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// PATCH /api/events/{id}/ - Mise à jour partielle: start/end effectifs =
/// nouvelle valeur si fournie, sinon valeur stockée (PROTÉGÉE)
pub async fn patch_event(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<EventPatchRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let existing = match find_owned(db.get_ref(), auth_user.user_id, path.into_inner()).await {
        Ok(Some(event)) => event,
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

    if let Some(status) = &body.status {
        if let Err(msg) = check_status(status) {
            return HttpResponse::BadRequest().json(serde_json::json!({ "status": [msg] }));
        }
    }

    let effective_start = body.start_dt.unwrap_or(existing.start_dt);
    let effective_end = body.end_dt.unwrap_or(existing.end_dt);
    if let Err(msg) = check_range(effective_start, effective_end) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "end_dt": [msg] }));
    }

    let mut active: EventActiveModel = existing.into();
    if let Some(title) = &body.title {
        active.title = Set(title.clone());
    }
    if let Some(notes) = &body.notes {
        active.notes = Set(notes.clone());
    }
    active.start_dt = Set(effective_start);
    active.end_dt = Set(effective_end);
    if let Some(all_day) = body.all_day {
        active.all_day = Set(all_day);
    }
    if let Some(location) = &body.location {
        active.location = Set(location.clone());
    }
    if let Some(status) = &body.status {
        active.status = Set(status.clone());
    }
    if let Some(completed) = body.completed {
        active.completed = Set(completed);
    }
    active.updated_at = Set(Utc::now());

    match active.update(db.get_ref()).await {
        Ok(event) => HttpResponse::Ok().json(event),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// DELETE /api/events/{id}/ (PROTÉGÉE)
pub async fn delete_event(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let existing = match find_owned(db.get_ref(), auth_user.user_id, path.into_inner()).await {
        Ok(Some(event)) => event,
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

pub fn events_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("/", web::get().to(list_events))
            .route("/", web::post().to(create_event))
            .route("/{id}/", web::get().to(get_event))
            .route("/{id}/", web::put().to(update_event))
            .route("/{id}/", web::patch().to(patch_event))
            .route("/{id}/", web::delete().to(delete_event)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DbBackend, QueryTrait};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_check_range_accepts_end_after_start() {
        assert!(check_range(ts(10), ts(20)).is_ok());
        assert!(check_range(ts(10), ts(10)).is_ok());
    }

    #[test]
    fn test_check_range_rejects_end_before_start() {
        let err = check_range(ts(20), ts(10)).unwrap_err();
        assert_eq!(err, "end_dt must not precede start_dt");
    }

    #[test]
    fn test_check_status_values() {
        assert!(check_status("not_started").is_ok());
        assert!(check_status("in_progress").is_ok());
        assert!(check_status("completed").is_ok());
        assert!(check_status("done").is_err());
    }

    #[test]
    fn test_parse_bound_accepts_iso8601() {
        let parsed = parse_bound(&Some("2025-06-01T10:00:00Z".to_string()), "start").unwrap();
        assert_eq!(parsed, Some(ts(1748772000)));
        assert_eq!(parse_bound(&None, "start").unwrap(), None);
    }

    #[test]
    fn test_parse_bound_rejects_garbage() {
        let err = parse_bound(&Some("tomorrow".to_string()), "end").unwrap_err();
        assert_eq!(err, "end must be an ISO-8601 datetime");
    }

    // La requête générée doit utiliser des bornes strictes (< et >):
    // un événement qui touche seulement la borne ne matche pas
    #[test]
    fn test_overlap_query_uses_strict_bounds() {
        let sql = Event::find()
            .filter(overlap_condition(Some(ts(5)), Some(ts(15))))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""event"."start_dt" <"#));
        assert!(sql.contains(r#""event"."end_dt" >"#));
        assert!(!sql.contains("<="));
        assert!(!sql.contains(">="));
    }

    #[test]
    fn test_single_bound_filters_one_side_only() {
        let sql_start_only = Event::find()
            .filter(overlap_condition(Some(ts(5)), None))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql_start_only.contains(r#""event"."end_dt" >"#));
        assert!(!sql_start_only.contains(r#""event"."start_dt" <"#));

        let sql_end_only = Event::find()
            .filter(overlap_condition(None, Some(ts(15))))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql_end_only.contains(r#""event"."start_dt" <"#));
        assert!(!sql_end_only.contains(r#""event"."end_dt" >"#));
    }

    #[test]
    fn test_no_bounds_means_no_range_filter() {
        let sql = Event::find()
            .filter(overlap_condition(None, None))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(!sql.contains("start_dt\" <"));
        assert!(!sql.contains("end_dt\" >"));
    }
}
