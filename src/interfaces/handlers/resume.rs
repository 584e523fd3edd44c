use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, utils::media_url::RequestOrigin, AppState};

#[instrument(skip(state, origin))]
pub async fn resume_status(
    state: web::Data<AppState>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let status = state.resume_handler.status(&origin).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[instrument(skip(state, origin))]
pub async fn resume_download(
    state: web::Data<AppState>,
    origin: RequestOrigin,
) -> Result<impl Responder, AppError> {
    let download = state.resume_handler.download(&origin).await?;
    Ok(HttpResponse::Ok().json(download))
}
