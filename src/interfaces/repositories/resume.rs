use async_trait::async_trait;
use sqlx::{self, PgPool, Postgres, QueryBuilder, Transaction};

use crate::{
    entities::resume::{Resume, ResumeFilter, ResumeInsert, UpdateResumeRequest},
    errors::AppError,
    repositories::{project::like_pattern, sqlx_repo::SqlxResumeRepo},
};

const RESUME_COLUMNS: &str = "id, title, file, uploaded_at, is_active";

/// Storage of resume records. Every write keeps at most one row active.
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// Most recently uploaded active resume, if any.
    async fn get_active_resume(&self) -> Result<Option<Resume>, AppError>;
    /// Newest first.
    async fn list_resumes(&self, filter: &ResumeFilter) -> Result<Vec<Resume>, AppError>;
    async fn get_resume_by_id(&self, id: i64) -> Result<Resume, AppError>;
    async fn create_resume(&self, resume: &ResumeInsert) -> Result<Resume, AppError>;
    async fn update_resume(&self, id: i64, patch: &UpdateResumeRequest) -> Result<Resume, AppError>;
    async fn delete_resume(&self, id: i64) -> Result<Resume, AppError>;
}

impl SqlxResumeRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxResumeRepo { pool }
    }

    /// Deactivates every active resume other than `keep`.
    ///
    /// The table lock serialises concurrent activations: the second writer
    /// waits here and then sees the first writer's row as active.
    async fn deactivate_others(
        tx: &mut Transaction<'_, Postgres>,
        keep: Option<i64>,
    ) -> Result<(), AppError> {
        sqlx::query("LOCK TABLE resumes IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut **tx)
            .await?;

        let result = match keep {
            Some(id) => {
                sqlx::query("UPDATE resumes SET is_active = FALSE WHERE is_active AND id <> $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?
            }
            None => {
                sqlx::query("UPDATE resumes SET is_active = FALSE WHERE is_active")
                    .execute(&mut **tx)
                    .await?
            }
        };

        if result.rows_affected() > 0 {
            tracing::info!(
                deactivated = result.rows_affected(),
                "Deactivated previously active resume"
            );
        }
        Ok(())
    }
}

fn resume_not_found() -> AppError {
    AppError::NotFound("Resume not found".into())
}

#[async_trait]
impl ResumeRepository for SqlxResumeRepo {
    async fn get_active_resume(&self) -> Result<Option<Resume>, AppError> {
        let resume = sqlx::query_as::<_, Resume>(&format!(
            r#"
            SELECT {RESUME_COLUMNS}
            FROM resumes
            WHERE is_active = TRUE
            ORDER BY uploaded_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(resume)
    }

    async fn list_resumes(&self, filter: &ResumeFilter) -> Result<Vec<Resume>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {RESUME_COLUMNS} FROM resumes WHERE TRUE"));

        if let Some(search) = &filter.search {
            builder.push(" AND title ILIKE ").push_bind(like_pattern(search));
        }
        if let Some(is_active) = filter.is_active {
            builder.push(" AND is_active = ").push_bind(is_active);
        }
        builder.push(" ORDER BY uploaded_at DESC, id DESC");

        let resumes = builder
            .build_query_as::<Resume>()
            .fetch_all(&self.pool)
            .await?;

        Ok(resumes)
    }

    async fn get_resume_by_id(&self, id: i64) -> Result<Resume, AppError> {
        sqlx::query_as::<_, Resume>(&format!("SELECT {RESUME_COLUMNS} FROM resumes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(resume_not_found)
    }

    async fn create_resume(&self, resume: &ResumeInsert) -> Result<Resume, AppError> {
        let mut tx = self.pool.begin().await?;

        if resume.is_active {
            Self::deactivate_others(&mut tx, None).await?;
        }

        let created = sqlx::query_as::<_, Resume>(&format!(
            r#"
            INSERT INTO resumes (title, file, is_active)
            VALUES ($1, $2, $3)
            RETURNING {RESUME_COLUMNS}
            "#
        ))
        .bind(&resume.title)
        .bind(&resume.file)
        .bind(resume.is_active)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update_resume(&self, id: i64, patch: &UpdateResumeRequest) -> Result<Resume, AppError> {
        let mut tx = self.pool.begin().await?;

        if patch.is_active.value_ref() == Some(&true) {
            Self::deactivate_others(&mut tx, Some(id)).await?;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE resumes SET id = id");
        if let Some(title) = patch.title.value_ref() {
            builder.push(", title = ").push_bind(title.clone());
        }
        if let Some(is_active) = patch.is_active.value_ref() {
            builder.push(", is_active = ").push_bind(*is_active);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(" RETURNING {RESUME_COLUMNS}"));

        // Dropping `tx` on the error path rolls back the deactivation.
        let updated = builder
            .build_query_as::<Resume>()
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(resume_not_found)?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_resume(&self, id: i64) -> Result<Resume, AppError> {
        sqlx::query_as::<_, Resume>(&format!(
            "DELETE FROM resumes WHERE id = $1 RETURNING {RESUME_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(resume_not_found)
    }
}
