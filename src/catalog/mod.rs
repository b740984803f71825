//! Project Catalog
//!
//! Read-only listing of portfolio projects from a static JSON file:
//! free-text and facet filtering, recency/title ordering and pagination.
//! The avatar gate does not depend on this module.

mod model;
mod query;
mod routes;
mod store;

pub use model::{Project, ProjectLinks, ProjectStatus, Tag, Tech};
pub use query::{
    filter_projects, paginate, sort_projects, PageMeta, Paginated, ProjectListParams,
    ProjectQuery, SortOrder, DEFAULT_PAGE_LIMIT, FEATURED_COUNT,
};
pub use routes::{featured_projects, list_projects, project_by_slug, FeaturedProjects};
pub use store::CatalogStore;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project not found: {slug}")]
    ProjectNotFound { slug: String },
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::ProjectNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            CatalogError::ProjectNotFound { .. } => "Project not found",
            _ => {
                tracing::error!(error = %self, "Catalog unavailable");
                "Catalog unavailable"
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}
