use actix_web::web;

use crate::{handlers::{projects, resume}, middlewares::rate_limit::RateLimit};

/// Public read-only surface. `featured` is registered before `{project_id}`
/// so it is never taken for an id.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(RateLimit)
            .service(
                web::resource("/projects")
                    .route(web::get().to(projects::list_projects))
            )
            .service(
                web::resource("/projects/featured")
                    .route(web::get().to(projects::featured_projects))
            )
            .service(
                web::resource("/projects/{project_id}")
                    .route(web::get().to(projects::get_project))
            )
            .service(
                web::resource("/stats")
                    .route(web::get().to(projects::portfolio_stats))
            )
            .service(
                web::resource("/resume/status")
                    .route(web::get().to(resume::resume_status))
            )
            .service(
                web::resource("/resume/download")
                    .route(web::get().to(resume::resume_download))
            )
    );
}
