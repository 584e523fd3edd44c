use std::collections::HashMap;

use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, utils::{media_url::RequestOrigin, valid_id::valid_id}, AppState};

/// `?featured` is a presence flag: any value, even empty, filters.
#[instrument(skip(state, query, origin))]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let featured_only = query.contains_key("featured");

    let projects = state
        .project_handler
        .list_projects(featured_only, &origin)
        .await?;

    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(project_id, state, origin))]
pub async fn get_project(
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let id = valid_id(&project_id, "Project")?;
    let project = state.project_handler.get_project(id, &origin).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(state, origin))]
pub async fn featured_projects(
    state: web::Data<AppState>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let projects = state.project_handler.featured_projects(&origin).await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(state))]
pub async fn portfolio_stats(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let stats = state.project_handler.stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}
