use async_trait::async_trait;
use sqlx::{self, PgPool, Postgres, QueryBuilder};

use crate::{
    entities::project::{Project, ProjectFilter, ProjectInsert, UpdateProjectRequest},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = "id, title, description, short_description, github_url, live_url, \
    image, technologies, featured, display_order, created_at, updated_at";

/// Display order shared by every project listing. `id` makes it total.
const DEFAULT_ORDER: &str = " ORDER BY display_order ASC, created_at DESC, id DESC";

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, AppError>;
    async fn get_project_by_id(&self, id: i64) -> Result<Project, AppError>;
    async fn count_projects(&self, featured_only: bool) -> Result<i64, AppError>;
    async fn create_project(&self, project: &ProjectInsert) -> Result<Project, AppError>;
    async fn update_project(&self, id: i64, patch: &UpdateProjectRequest) -> Result<Project, AppError>;
    async fn set_project_image(&self, id: i64, image: Option<String>) -> Result<Project, AppError>;
    /// Returns the removed row so its stored image can be cleaned up.
    async fn delete_project(&self, id: i64) -> Result<Project, AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

fn project_not_found() -> AppError {
    AppError::NotFound("Project not found".into())
}

/// Escapes LIKE wildcards so search text is matched literally.
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE TRUE"));

        if filter.featured_only {
            builder.push(" AND featured = TRUE");
        }

        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            builder.push(" AND (title ILIKE ").push_bind(pattern.clone());
            builder.push(" OR description ILIKE ").push_bind(pattern.clone());
            builder.push(" OR technologies ILIKE ").push_bind(pattern);
            builder.push(")");
        }

        builder.push(DEFAULT_ORDER);

        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ").push_bind(limit.max(0));
        }

        let projects = builder
            .build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn get_project_by_id(&self, id: i64) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(project_not_found)
    }

    async fn count_projects(&self, featured_only: bool) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM projects
            WHERE ($1::boolean IS FALSE OR featured = TRUE)
            "#
        )
        .bind(featured_only)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn create_project(&self, project: &ProjectInsert) -> Result<Project, AppError> {
        let created = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (
                title, description, short_description, github_url, live_url,
                technologies, featured, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.short_description)
        .bind(&project.github_url)
        .bind(&project.live_url)
        .bind(&project.technologies)
        .bind(project.featured)
        .bind(project.display_order)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_project(&self, id: i64, patch: &UpdateProjectRequest) -> Result<Project, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE projects SET updated_at = NOW()");

        if let Some(title) = patch.title.value_ref() {
            builder.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = patch.description.value_ref() {
            builder.push(", description = ").push_bind(description.clone());
        }
        // Text columns are NOT NULL, so null clears them to ''.
        if let Some(value) = patch.short_description.as_ref_option() {
            builder.push(", short_description = ").push_bind(value.cloned().unwrap_or_default());
        }
        match patch.github_url.as_ref_option() {
            Some(Some(url)) => {
                builder.push(", github_url = ").push_bind(url.clone());
            }
            Some(None) => {
                builder.push(", github_url = NULL");
            }
            None => {}
        }
        match patch.live_url.as_ref_option() {
            Some(Some(url)) => {
                builder.push(", live_url = ").push_bind(url.clone());
            }
            Some(None) => {
                builder.push(", live_url = NULL");
            }
            None => {}
        }
        if let Some(value) = patch.technologies.as_ref_option() {
            builder.push(", technologies = ").push_bind(value.cloned().unwrap_or_default());
        }
        if let Some(featured) = patch.featured.value_ref() {
            builder.push(", featured = ").push_bind(*featured);
        }
        if let Some(order) = patch.order.value_ref() {
            builder.push(", display_order = ").push_bind(*order);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(" RETURNING {PROJECT_COLUMNS}"));

        builder
            .build_query_as::<Project>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(project_not_found)
    }

    async fn set_project_image(&self, id: i64, image: Option<String>) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET image = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(image)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(project_not_found)
    }

    async fn delete_project(&self, id: i64) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            "DELETE FROM projects WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(project_not_found)
    }
}
