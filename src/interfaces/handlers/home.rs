use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Portfolio CMS API!",
        "status": "Ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "projects": "/api/projects",
            "featured_projects": "/api/projects/featured",
            "stats": "/api/stats",
            "resume_status": "/api/resume/status",
            "resume_download": "/api/resume/download",
            "health": "/health"
        }
    }))
}
