// Route exports
pub mod mapping;

use actix_web::web;

pub use mapping::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(mapping::configure),
    );
}
