pub mod health;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod crops;
pub mod plots;
pub mod external;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(dashboard::dashboard_routes)
            .configure(events::events_routes)
            .configure(crops::crops_routes)
            .configure(plots::plots_routes)
            .configure(external::external_routes)
    );
}
