//! Catalog HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::model::Project;
use super::query::{Paginated, ProjectListParams, ProjectQuery};
use super::store::CatalogStore;
use super::CatalogError;

/// Body of the featured listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedProjects {
    pub items: Vec<Project>,
}

/// Route: GET /api/projects
pub async fn list_projects(
    State(catalog): State<CatalogStore>,
    Query(params): Query<ProjectListParams>,
) -> Result<Json<Paginated<Project>>, CatalogError> {
    let query = ProjectQuery::from(params);
    Ok(Json(catalog.list(&query).await?))
}

/// Route: GET /api/projects/featured
pub async fn featured_projects(
    State(catalog): State<CatalogStore>,
) -> Result<Json<FeaturedProjects>, CatalogError> {
    let items = catalog.featured().await?;
    Ok(Json(FeaturedProjects { items }))
}

/// Route: GET /api/projects/:slug
pub async fn project_by_slug(
    State(catalog): State<CatalogStore>,
    Path(slug): Path<String>,
) -> Result<Json<Project>, CatalogError> {
    Ok(Json(catalog.by_slug(&slug).await?))
}
