use actix_web::web;

use crate::handlers::admin;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::resource("")
                    .route(web::get().to(admin::admin_index))
            )
            .service(
                web::resource("/projects")
                    .route(web::get().to(admin::list_projects))
                    .route(web::post().to(admin::create_project))
            )
            .service(
                web::resource("/projects/{project_id}")
                    .route(web::get().to(admin::get_project))
                    .route(web::patch().to(admin::update_project))
                    .route(web::delete().to(admin::delete_project))
            )
            .service(
                web::resource("/projects/{project_id}/image")
                    .route(web::put().to(admin::upload_project_image))
                    .route(web::delete().to(admin::delete_project_image))
            )
            .service(
                web::resource("/resumes")
                    .route(web::get().to(admin::list_resumes))
                    .route(web::post().to(admin::upload_resume))
            )
            .service(
                web::resource("/resumes/{resume_id}")
                    .route(web::get().to(admin::get_resume))
                    .route(web::patch().to(admin::update_resume))
                    .route(web::delete().to(admin::delete_resume))
            )
    );
}
