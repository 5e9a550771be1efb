//! Faceted driver search with pagination.
//!
//! Facets combine with AND; values inside one facet combine with OR. An empty
//! facet imposes nothing. Keyword matching is a case-insensitive substring
//! test over the name and description in every language; whitespace, `-` and
//! `_` are ignored so `wifi` finds "Wi-Fi".

use crate::catalog::{
    CatalogStore, CategoryId, DevelopmentStatus, DriverRecord, Keyword, Priority,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilter {
    pub keyword: Option<String>,
    pub categories: BTreeSet<CategoryId>,
    pub development_status: BTreeSet<DevelopmentStatus>,
    pub priority: BTreeSet<Priority>,
    pub hardware_brands: BTreeSet<String>,
    pub macos_versions: BTreeSet<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// 1-indexed page request.
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.page == 0 {
            return Err(SearchError::InvalidPagination {
                field: "page",
                value: self.page,
            });
        }
        if self.page_size == 0 {
            return Err(SearchError::InvalidPagination {
                field: "pageSize",
                value: self.page_size,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("invalid pagination: {field} must be at least 1, got {value}")]
    InvalidPagination { field: &'static str, value: usize },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Match counts per category, over all pages.
    pub by_category: BTreeMap<CategoryId, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<'a> {
    pub drivers: Vec<&'a DriverRecord>,
    pub total: usize,
    pub pagination: Pagination,
    pub stats: SearchStats,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.parsed_keyword().is_none()
            && self.categories.is_empty()
            && self.development_status.is_empty()
            && self.priority.is_empty()
            && self.hardware_brands.is_empty()
            && self.macos_versions.is_empty()
    }

    /// True when `driver` satisfies every facet of this filter.
    pub fn matches(&self, driver: &DriverRecord) -> bool {
        self.matches_with_keyword(driver, self.parsed_keyword().as_ref())
    }

    fn parsed_keyword(&self) -> Option<Keyword> {
        self.keyword.as_deref().and_then(Keyword::parse)
    }

    fn matches_with_keyword(&self, driver: &DriverRecord, keyword: Option<&Keyword>) -> bool {
        if let Some(keyword) = keyword {
            if !(driver.name.matches_keyword(keyword) || driver.description.matches_keyword(keyword))
            {
                return false;
            }
        }
        if !self.categories.is_empty() && !self.categories.contains(&driver.category) {
            return false;
        }
        if !self.development_status.is_empty()
            && !self.development_status.contains(&driver.development_status)
        {
            return false;
        }
        if !self.priority.is_empty() && !self.priority.contains(&driver.priority) {
            return false;
        }
        if !self.hardware_brands.is_empty()
            && !self
                .hardware_brands
                .iter()
                .any(|brand| driver.supports_brand(brand))
        {
            return false;
        }
        if !self.macos_versions.is_empty()
            && !self
                .macos_versions
                .iter()
                .any(|version| driver.supports_macos(version))
        {
            return false;
        }
        true
    }
}

/// Run `filter` over `store` and return the requested page.
///
/// `total` and `stats` cover every match; `drivers` holds only the page
/// slice, which is empty once `page` runs past `total_pages`.
pub fn search<'a>(
    store: &'a CatalogStore,
    filter: &SearchFilter,
    page: PageRequest,
) -> Result<SearchResult<'a>, SearchError> {
    page.validate()?;

    let keyword = filter.parsed_keyword();
    let matches: Vec<&DriverRecord> = store
        .drivers()
        .iter()
        .filter(|driver| filter.matches_with_keyword(driver, keyword.as_ref()))
        .collect();

    let mut stats = SearchStats::default();
    for driver in &matches {
        *stats.by_category.entry(driver.category.clone()).or_default() += 1;
    }

    let total = matches.len();
    let total_pages = total.div_ceil(page.page_size);
    let offset = (page.page - 1).saturating_mul(page.page_size);
    let drivers: Vec<&DriverRecord> = matches
        .into_iter()
        .skip(offset)
        .take(page.page_size)
        .collect();

    log::debug!(
        "search matched {} of {} drivers; page {}/{} holds {}",
        total,
        store.len(),
        page.page,
        total_pages,
        drivers.len()
    );

    Ok(SearchResult {
        drivers,
        total,
        pagination: Pagination {
            page: page.page,
            page_size: page.page_size,
            total_pages,
        },
        stats,
    })
}
