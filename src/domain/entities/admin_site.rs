use serde::{Deserialize, Serialize};

use crate::settings::AdminSiteConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminResource {
    pub name: String,
    pub path: String,
    pub list_display: Vec<String>,
    pub search_fields: Vec<String>,
    pub list_filter: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSiteResponse {
    pub site_header: String,
    pub site_title: String,
    pub index_title: String,
    pub resources: Vec<AdminResource>,
}

impl From<&AdminSiteConfig> for AdminSiteResponse {
    fn from(config: &AdminSiteConfig) -> Self {
        AdminSiteResponse {
            site_header: config.site_header.clone(),
            site_title: config.site_title.clone(),
            index_title: config.index_title.clone(),
            resources: vec![
                AdminResource {
                    name: "Projects".into(),
                    path: "/admin/projects".into(),
                    list_display: fields(&["title", "short_description", "featured", "order", "created_at"]),
                    search_fields: fields(&["title", "description", "technologies"]),
                    list_filter: fields(&["featured"]),
                },
                AdminResource {
                    name: "Resumes".into(),
                    path: "/admin/resumes".into(),
                    list_display: fields(&["title", "file", "is_active", "uploaded_at"]),
                    search_fields: fields(&["title"]),
                    list_filter: fields(&["is_active"]),
                },
            ],
        }
    }
}

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
