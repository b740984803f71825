//! Filtering, sorting and pagination over the catalog

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::model::Project;

/// Default page size for project listings
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Number of projects returned by the featured listing
pub const FEATURED_COUNT: usize = 3;

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently updated (or created) first
    #[default]
    Recent,
    /// Alphabetical by title
    Title,
}

/// Raw listing parameters as they arrive in the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub q: Option<String>,
    pub tags: Option<String>,
    pub tech: Option<String>,
    pub featured: Option<String>,
    pub sort: Option<String>,
}

/// Parsed listing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectQuery {
    pub page: usize,
    pub limit: usize,
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub tech: Vec<String>,
    pub featured: Option<bool>,
    pub sort: SortOrder,
}

impl Default for ProjectQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            search: None,
            tags: Vec::new(),
            tech: Vec::new(),
            featured: None,
            sort: SortOrder::Recent,
        }
    }
}

impl From<ProjectListParams> for ProjectQuery {
    fn from(params: ProjectListParams) -> Self {
        let page = params
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1);
        let limit = params
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .max(1);

        Self {
            page,
            limit,
            search: params
                .q
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty()),
            tags: split_list(params.tags.as_deref()),
            tech: split_list(params.tech.as_deref()),
            featured: params.featured.map(|f| f == "true"),
            sort: match params.sort.as_deref() {
                Some("title") => SortOrder::Title,
                _ => SortOrder::Recent,
            },
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Apply featured, free-text, tag and tech filters
pub fn filter_projects<'a>(projects: &'a [Project], query: &ProjectQuery) -> Vec<&'a Project> {
    let search = query.search.as_ref().map(|s| s.to_lowercase());
    let tags = lowercase_set(&query.tags);
    let tech = lowercase_set(&query.tech);

    projects
        .iter()
        .filter(|p| query.featured.map_or(true, |f| p.featured == f))
        .filter(|p| search.as_deref().map_or(true, |needle| matches_search(p, needle)))
        .filter(|p| tags.is_empty() || p.tags.iter().any(|t| tags.contains(&t.name.to_lowercase())))
        .filter(|p| tech.is_empty() || p.tech.iter().any(|t| tech.contains(&t.name.to_lowercase())))
        .collect()
}

fn lowercase_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

fn matches_search(project: &Project, needle: &str) -> bool {
    project.title.to_lowercase().contains(needle)
        || project.short_description.to_lowercase().contains(needle)
        || project.full_description.to_lowercase().contains(needle)
        || project.tags.iter().any(|t| t.name.to_lowercase().contains(needle))
        || project.tech.iter().any(|t| t.name.to_lowercase().contains(needle))
}

/// Sort in place; the sort is stable so ties keep catalog order
pub fn sort_projects(projects: &mut [&Project], order: SortOrder) {
    match order {
        SortOrder::Title => {
            projects.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
        SortOrder::Recent => projects.sort_by(|a, b| recency(b).cmp(&recency(a))),
    }
}

/// Milliseconds since epoch of the last update; unknown dates count as epoch
fn recency(project: &Project) -> i64 {
    project
        .updated_at
        .as_deref()
        .or(project.created_at.as_deref())
        .and_then(parse_timestamp)
        .unwrap_or(0)
}

fn parse_timestamp(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Page metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: usize,
    pub page: usize,
    pub pages: usize,
    pub limit: usize,
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Slice out one page; the requested page is clamped into `[1, pages]`
pub fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> Paginated<T> {
    let limit = limit.max(1);
    let total = items.len();
    let pages = total.div_ceil(limit).max(1);
    let current = page.clamp(1, pages);
    let start = ((current - 1) * limit).min(total);
    let end = (start + limit).min(total);

    Paginated {
        items: items[start..end].to_vec(),
        meta: PageMeta {
            total,
            page: current,
            pages,
            limit,
        },
    }
}
