use std::collections::HashMap;

use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        admin_site::AdminSiteResponse,
        media::{MediaKind, ProjectImageUpload, UploadedFile},
        project::{NewProjectRequest, UpdateProjectRequest},
        resume::{ResumeFilter, ResumeUpload, UpdateResumeRequest},
    },
    errors::AppError,
    use_cases::extractors::AdminAccess,
    utils::{media_url::RequestOrigin, valid_id::valid_id},
    AppState,
};

#[instrument(skip(_admin, state))]
pub async fn admin_index(
    _admin: AdminAccess,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(AdminSiteResponse::from(&state.admin.site)))
}

// ───── Projects ────────────────────────────────────────────────────

#[instrument(skip(_admin, state, query, origin))]
pub async fn list_projects(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let search = query.get("search").cloned();
    let featured_only = query.contains_key("featured");

    let projects = state
        .project_handler
        .search_projects(search, featured_only, &origin)
        .await?;

    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(_admin, state, data, origin))]
pub async fn create_project(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    data: web::Json<NewProjectRequest>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let project = state
        .project_handler
        .create_project(data.into_inner(), &origin)
        .await?;

    Ok(HttpResponse::Created().json(project))
}

#[instrument(skip(_admin, project_id, state, origin))]
pub async fn get_project(
    _admin: AdminAccess,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let id = valid_id(&project_id, "Project")?;
    let project = state.project_handler.get_project(id, &origin).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_admin, project_id, state, data, origin))]
pub async fn update_project(
    _admin: AdminAccess,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateProjectRequest>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let id = valid_id(&project_id, "Project")?;
    let project = state
        .project_handler
        .update_project(id, data.into_inner(), &origin)
        .await?;

    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_admin, project_id, state))]
pub async fn delete_project(
    _admin: AdminAccess,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_id(&project_id, "Project")?;
    state.project_handler.delete_project(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_admin, project_id, state, form, origin))]
pub async fn upload_project_image(
    _admin: AdminAccess,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    form: MultipartForm<ProjectImageUpload>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let id = valid_id(&project_id, "Project")?;
    let form = form.into_inner();
    let upload = UploadedFile::from_temp_file(form.image, MediaKind::Image).await?;

    let project = state
        .project_handler
        .replace_image(id, upload, &origin)
        .await?;

    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_admin, project_id, state, origin))]
pub async fn delete_project_image(
    _admin: AdminAccess,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let id = valid_id(&project_id, "Project")?;
    let project = state.project_handler.remove_image(id, &origin).await?;
    Ok(HttpResponse::Ok().json(project))
}

// ───── Resumes ─────────────────────────────────────────────────────

/// `is_active` accepts `true`/`false` (or `1`/`0`); anything else is a 400.
fn parse_active_flag(raw: Option<&String>) -> Result<Option<bool>, AppError> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(None),
        Some("true" | "1") => Ok(Some(true)),
        Some("false" | "0") => Ok(Some(false)),
        Some(other) => Err(AppError::InvalidInput(format!(
            "is_active must be true or false, got '{}'",
            other
        ))),
    }
}

#[instrument(skip(_admin, state, query, origin))]
pub async fn list_resumes(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let filter = ResumeFilter::all()
        .with_search(query.get("search").cloned())
        .with_active(parse_active_flag(query.get("is_active"))?);

    let resumes = state.resume_handler.list_resumes(&filter, &origin).await?;
    Ok(HttpResponse::Ok().json(resumes))
}

#[instrument(skip(_admin, resume_id, state, origin))]
pub async fn get_resume(
    _admin: AdminAccess,
    resume_id: web::Path<String>,
    state: web::Data<AppState>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let id = valid_id(&resume_id, "Resume")?;
    let resume = state.resume_handler.get_resume(id, &origin).await?;
    Ok(HttpResponse::Ok().json(resume))
}

#[instrument(skip(_admin, state, form, origin))]
pub async fn upload_resume(
    _admin: AdminAccess,
    state: web::Data<AppState>,
    form: MultipartForm<ResumeUpload>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let form = form.into_inner();
    let title = form.title.map(|t| t.into_inner());
    let is_active = form.is_active.map(|a| a.into_inner());
    let upload = UploadedFile::from_temp_file(form.file, MediaKind::Pdf).await?;

    let resume = state
        .resume_handler
        .upload_resume(upload, title, is_active, &origin)
        .await?;

    Ok(HttpResponse::Created().json(resume))
}

#[instrument(skip(_admin, resume_id, state, data, origin))]
pub async fn update_resume(
    _admin: AdminAccess,
    resume_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateResumeRequest>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let id = valid_id(&resume_id, "Resume")?;
    let resume = state
        .resume_handler
        .update_resume(id, data.into_inner(), &origin)
        .await?;

    Ok(HttpResponse::Ok().json(resume))
}

#[instrument(skip(_admin, resume_id, state))]
pub async fn delete_resume(
    _admin: AdminAccess,
    resume_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_id(&resume_id, "Resume")?;
    state.resume_handler.delete_resume(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
