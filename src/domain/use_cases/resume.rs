use std::sync::Arc;

use validator::Validate;

use crate::{
    constants::{RESUME_DIR, RESUME_DOWNLOAD_FILENAME},
    entities::{
        media::UploadedFile,
        resume::{
            Resume, ResumeAdminResponse, ResumeDownloadResponse, ResumeFilter, ResumeInsert,
            ResumeStatusResponse,
            UpdateResumeRequest, DEFAULT_RESUME_TITLE,
        },
    },
    errors::AppError,
    repositories::resume::ResumeRepository,
    storage::StorageBackend,
    utils::media_url::{resolve_stored_url, RequestOrigin},
};

pub struct ResumeHandler {
    pub resume_repo: Arc<dyn ResumeRepository>,
    pub storage: Arc<dyn StorageBackend>,
}

impl ResumeHandler {
    pub fn new(resume_repo: Arc<dyn ResumeRepository>, storage: Arc<dyn StorageBackend>) -> Self {
        ResumeHandler { resume_repo, storage }
    }

    fn file_url(&self, resume: &Resume, origin: &RequestOrigin) -> Option<String> {
        resolve_stored_url(self.storage.as_ref(), resume.file_key(), origin)
    }

    /// Reports whether a downloadable resume is published.
    pub async fn status(&self, origin: &RequestOrigin) -> Result<ResumeStatusResponse, AppError> {
        let Some(resume) = self.resume_repo.get_active_resume().await? else {
            return Ok(ResumeStatusResponse::unavailable());
        };

        let url = self.file_url(&resume, origin);
        Ok(ResumeStatusResponse {
            available: url.is_some(),
            title: Some(resume.title),
            uploaded_at: Some(resume.uploaded_at),
            url,
        })
    }

    /// Where the active resume can be fetched from. The file is never proxied.
    pub async fn download(&self, origin: &RequestOrigin) -> Result<ResumeDownloadResponse, AppError> {
        let resume = self
            .resume_repo
            .get_active_resume()
            .await?
            .ok_or_else(|| AppError::NotFound("No resume available".into()))?;

        let key = resume
            .file_key()
            .ok_or_else(|| AppError::NotFound("Resume file not found".into()))?;

        if !self.storage.exists(key).await? {
            tracing::warn!(resume_id = resume.id, key = %key, "Active resume file is missing from storage");
            return Err(AppError::NotFound("Resume file not found".into()));
        }

        let url = self
            .file_url(&resume, origin)
            .ok_or_else(|| AppError::NotFound("Resume file not found".into()))?;

        Ok(ResumeDownloadResponse {
            url,
            filename: RESUME_DOWNLOAD_FILENAME.to_string(),
        })
    }

    // ───── Administration ──────────────────────────────────────────

    pub async fn list_resumes(
        &self,
        filter: &ResumeFilter,
        origin: &RequestOrigin,
    ) -> Result<Vec<ResumeAdminResponse>, AppError> {
        let resumes = self.resume_repo.list_resumes(filter).await?;
        Ok(resumes
            .iter()
            .map(|r| r.to_admin_response(self.file_url(r, origin)))
            .collect())
    }

    pub async fn get_resume(&self, id: i64, origin: &RequestOrigin) -> Result<ResumeAdminResponse, AppError> {
        let resume = self.resume_repo.get_resume_by_id(id).await?;
        Ok(resume.to_admin_response(self.file_url(&resume, origin)))
    }

    pub async fn upload_resume(
        &self,
        upload: UploadedFile,
        title: Option<String>,
        is_active: Option<bool>,
        origin: &RequestOrigin,
    ) -> Result<ResumeAdminResponse, AppError> {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_RESUME_TITLE.to_string());

        let key = self.storage.store(RESUME_DIR, &upload.file_name, upload.bytes).await?;

        let insert = ResumeInsert {
            title,
            file: key.clone(),
            is_active: is_active.unwrap_or(true),
        };

        let created = match self.create_record(&insert).await {
            Ok(resume) => resume,
            Err(e) => {
                self.discard_file(&key).await;
                return Err(e);
            }
        };

        tracing::info!(resume_id = created.id, active = created.is_active, "Resume uploaded");
        Ok(created.to_admin_response(self.file_url(&created, origin)))
    }

    async fn create_record(&self, insert: &ResumeInsert) -> Result<Resume, AppError> {
        insert.validate()?;
        self.resume_repo.create_resume(insert).await
    }

    pub async fn update_resume(
        &self,
        id: i64,
        request: UpdateResumeRequest,
        origin: &RequestOrigin,
    ) -> Result<ResumeAdminResponse, AppError> {
        request.validate()?;

        if request.title.is_unchanged() && request.is_active.is_unchanged() {
            return Err(AppError::InvalidInput("No fields to update".into()));
        }

        let updated = self.resume_repo.update_resume(id, &request).await?;
        tracing::info!(resume_id = id, active = updated.is_active, "Resume updated");
        Ok(updated.to_admin_response(self.file_url(&updated, origin)))
    }

    pub async fn delete_resume(&self, id: i64) -> Result<(), AppError> {
        let deleted = self.resume_repo.delete_resume(id).await?;

        if let Some(key) = deleted.file_key() {
            self.discard_file(key).await;
        }

        tracing::info!(resume_id = id, "Resume deleted");
        Ok(())
    }

    async fn discard_file(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete stored resume file");
        }
    }
}
