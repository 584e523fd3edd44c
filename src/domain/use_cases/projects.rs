use std::sync::Arc;

use validator::Validate;

use crate::{
    constants::{FEATURED_PROJECTS_LIMIT, PROJECT_IMAGE_DIR},
    entities::{
        media::UploadedFile,
        project::{
            NewProjectRequest, Project, ProjectDetailResponse, ProjectFilter, ProjectInsert,
            ProjectListResponse, UpdateProjectRequest,
        },
        stats::PortfolioStats,
    },
    errors::AppError,
    repositories::project::ProjectRepository,
    storage::StorageBackend,
    utils::media_url::{resolve_stored_url, RequestOrigin},
};

pub struct ProjectHandler {
    pub project_repo: Arc<dyn ProjectRepository>,
    pub storage: Arc<dyn StorageBackend>,
}

impl ProjectHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepository>, storage: Arc<dyn StorageBackend>) -> Self {
        ProjectHandler { project_repo, storage }
    }

    fn image_url(&self, project: &Project, origin: &RequestOrigin) -> Option<String> {
        resolve_stored_url(self.storage.as_ref(), project.image_key(), origin)
    }

    fn detail(&self, project: &Project, origin: &RequestOrigin) -> ProjectDetailResponse {
        project.to_detail_response(self.image_url(project, origin))
    }

    fn summaries(&self, projects: &[Project], origin: &RequestOrigin) -> Vec<ProjectListResponse> {
        projects
            .iter()
            .map(|p| p.to_list_response(self.image_url(p, origin)))
            .collect()
    }

    /// Lists every project in display order, optionally only featured ones.
    pub async fn list_projects(
        &self,
        featured_only: bool,
        origin: &RequestOrigin,
    ) -> Result<Vec<ProjectListResponse>, AppError> {
        let filter = if featured_only { ProjectFilter::featured() } else { ProjectFilter::all() };
        let projects = self.project_repo.list_projects(&filter).await?;
        Ok(self.summaries(&projects, origin))
    }

    pub async fn get_project(&self, id: i64, origin: &RequestOrigin) -> Result<ProjectDetailResponse, AppError> {
        let project = self.project_repo.get_project_by_id(id).await?;
        Ok(self.detail(&project, origin))
    }

    /// The first featured projects in display order, for the homepage.
    pub async fn featured_projects(&self, origin: &RequestOrigin) -> Result<Vec<ProjectListResponse>, AppError> {
        let filter = ProjectFilter::featured().with_limit(FEATURED_PROJECTS_LIMIT);
        let projects = self.project_repo.list_projects(&filter).await?;
        Ok(self.summaries(&projects, origin))
    }

    pub async fn stats(&self) -> Result<PortfolioStats, AppError> {
        let total_projects = self.project_repo.count_projects(false).await?;
        let featured_projects = self.project_repo.count_projects(true).await?;

        Ok(PortfolioStats { total_projects, featured_projects })
    }

    pub async fn check_connection(&self) -> Result<(), AppError> {
        self.project_repo.check_connection().await
    }

    // ───── Administration ──────────────────────────────────────────

    pub async fn search_projects(
        &self,
        search: Option<String>,
        featured_only: bool,
        origin: &RequestOrigin,
    ) -> Result<Vec<ProjectDetailResponse>, AppError> {
        let filter = ProjectFilter { featured_only, ..ProjectFilter::all() }.with_search(search);
        let projects = self.project_repo.list_projects(&filter).await?;

        Ok(projects.iter().map(|p| self.detail(p, origin)).collect())
    }

    pub async fn create_project(
        &self,
        request: NewProjectRequest,
        origin: &RequestOrigin,
    ) -> Result<ProjectDetailResponse, AppError> {
        let insert = ProjectInsert::try_from(request)?;
        let project = self.project_repo.create_project(&insert).await?;

        tracing::info!(project_id = project.id, title = %project.title, "Project created");
        Ok(self.detail(&project, origin))
    }

    pub async fn update_project(
        &self,
        id: i64,
        request: UpdateProjectRequest,
        origin: &RequestOrigin,
    ) -> Result<ProjectDetailResponse, AppError> {
        let patch = request.normalized();
        patch.validate()?;

        if patch.is_empty() {
            return Err(AppError::InvalidInput("No fields to update".into()));
        }

        let project = self.project_repo.update_project(id, &patch).await?;
        tracing::info!(project_id = project.id, "Project updated");
        Ok(self.detail(&project, origin))
    }

    /// Stores a new image and points the project at it. The previous file
    /// is removed only after the record references the new one.
    pub async fn replace_image(
        &self,
        id: i64,
        upload: UploadedFile,
        origin: &RequestOrigin,
    ) -> Result<ProjectDetailResponse, AppError> {
        let existing = self.project_repo.get_project_by_id(id).await?;

        let key = self
            .storage
            .store(PROJECT_IMAGE_DIR, &upload.file_name, upload.bytes)
            .await?;

        let updated = match self.project_repo.set_project_image(id, Some(key.clone())).await {
            Ok(project) => project,
            Err(e) => {
                self.discard_file(&key).await;
                return Err(e);
            }
        };

        if let Some(old_key) = existing.image_key() {
            if old_key != key {
                self.discard_file(old_key).await;
            }
        }

        tracing::info!(project_id = id, key = %key, "Project image replaced");
        Ok(self.detail(&updated, origin))
    }

    pub async fn remove_image(&self, id: i64, origin: &RequestOrigin) -> Result<ProjectDetailResponse, AppError> {
        let existing = self.project_repo.get_project_by_id(id).await?;
        let updated = self.project_repo.set_project_image(id, None).await?;

        if let Some(old_key) = existing.image_key() {
            self.discard_file(old_key).await;
        }

        Ok(self.detail(&updated, origin))
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), AppError> {
        let deleted = self.project_repo.delete_project(id).await?;

        if let Some(key) = deleted.image_key() {
            self.discard_file(key).await;
        }

        tracing::info!(project_id = id, "Project deleted");
        Ok(())
    }

    /// Orphaned files are logged rather than failing the request.
    async fn discard_file(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete stored project image");
        }
    }
}
