use std::sync::Arc;

use zeroize::Zeroizing;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod telemetry;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{db, limiter, storage, utils};

use limiter::rate_limiter::RateLimiterStore;
use repositories::{
    project::ProjectRepository,
    resume::ResumeRepository,
    sqlx_repo::{SqlxProjectRepo, SqlxResumeRepo},
};
use settings::{AdminSiteConfig, AppConfig};
use storage::StorageBackend;
use use_cases::{projects::ProjectHandler, resume::ResumeHandler};

/// Static admin configuration shared with the admin extractor and handlers.
pub struct AdminState {
    pub site: AdminSiteConfig,
    pub token: Zeroizing<String>,
}

pub struct AppState {
    pub project_handler: ProjectHandler,
    pub resume_handler: ResumeHandler,
    pub admin: AdminState,
    /// `None` when rate limiting is disabled.
    pub rate_limiter: Option<RateLimiterStore>,
    pub trust_x_forwarded_for: bool,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: sqlx::PgPool, storage: Arc<dyn StorageBackend>) -> Self {
        Self::from_parts(
            config,
            Arc::new(SqlxProjectRepo::new(pool.clone())),
            Arc::new(SqlxResumeRepo::new(pool)),
            storage,
        )
    }

    /// Wires the state from already built collaborators.
    pub fn from_parts(
        config: &AppConfig,
        project_repo: Arc<dyn ProjectRepository>,
        resume_repo: Arc<dyn ResumeRepository>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let rate_limiter = (config.rate_limit_per_hour > 0)
            .then(|| RateLimiterStore::per_hour(config.rate_limit_per_hour));

        AppState {
            project_handler: ProjectHandler::new(project_repo, storage.clone()),
            resume_handler: ResumeHandler::new(resume_repo, storage),
            admin: AdminState {
                site: config.admin_site.clone(),
                token: Zeroizing::new(config.admin_token.clone()),
            },
            rate_limiter,
            trust_x_forwarded_for: config.trust_x_forwarded_for,
        }
    }
}
