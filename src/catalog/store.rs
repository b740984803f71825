//! Lazily loaded, read-only project catalog

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::model::Project;
use super::query::{filter_projects, paginate, sort_projects, Paginated, ProjectQuery, SortOrder, FEATURED_COUNT};
use super::CatalogError;

/// Catalog backed by a JSON file, read on first use and kept for the life
/// of the process. A failed load is not cached; the next call retries.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: Arc<PathBuf>,
    projects: Arc<OnceCell<Arc<Vec<Project>>>>,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            projects: Arc::new(OnceCell::new()),
        }
    }

    /// Build a store around records already in memory
    pub fn from_projects(projects: Vec<Project>) -> Self {
        Self {
            path: Arc::new(PathBuf::new()),
            projects: Arc::new(OnceCell::new_with(Some(Arc::new(projects)))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All projects in file order
    pub async fn load(&self) -> Result<Arc<Vec<Project>>, CatalogError> {
        self.projects
            .get_or_try_init(|| async {
                let raw = tokio::fs::read_to_string(self.path.as_path())
                    .await
                    .map_err(|e| match e.kind() {
                        std::io::ErrorKind::NotFound => CatalogError::FileNotFound {
                            path: self.path.display().to_string(),
                        },
                        _ => CatalogError::Io(e),
                    })?;
                let projects: Vec<Project> = serde_json::from_str(&raw)?;
                tracing::info!(
                    path = %self.path.display(),
                    count = projects.len(),
                    "Project catalog loaded"
                );
                Ok::<_, CatalogError>(Arc::new(projects))
            })
            .await
            .map(Arc::clone)
    }

    /// Filter, sort and paginate
    pub async fn list(&self, query: &ProjectQuery) -> Result<Paginated<Project>, CatalogError> {
        let all = self.load().await?;
        let mut matched = filter_projects(&all, query);
        sort_projects(&mut matched, query.sort);

        let page = paginate(&matched, query.page, query.limit);
        Ok(Paginated {
            items: page.items.into_iter().cloned().collect(),
            meta: page.meta,
        })
    }

    /// The most recent featured projects
    pub async fn featured(&self) -> Result<Vec<Project>, CatalogError> {
        let all = self.load().await?;
        let query = ProjectQuery {
            featured: Some(true),
            ..Default::default()
        };
        let mut matched = filter_projects(&all, &query);
        sort_projects(&mut matched, SortOrder::Recent);

        Ok(matched.into_iter().take(FEATURED_COUNT).cloned().collect())
    }

    /// Look up one project by slug
    pub async fn by_slug(&self, slug: &str) -> Result<Project, CatalogError> {
        let all = self.load().await?;
        all.iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| CatalogError::ProjectNotFound {
                slug: slug.to_string(),
            })
    }
}
