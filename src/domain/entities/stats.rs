use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub total_projects: i64,
    pub featured_projects: i64,
}
