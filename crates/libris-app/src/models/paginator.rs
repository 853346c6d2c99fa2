//! Page-number links for long lists.

use sqlx::{Row, SqlitePool};

use crate::error::Result;

/// Tables whose rows can be counted for pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counted {
    /// The catalog.
    Books,
    /// Authors.
    Authors,
}

impl Counted {
    fn table(&self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Authors => "authors",
        }
    }
}

/// Counts the rows of a table.
pub async fn total_rows(pool: &SqlitePool, counted: Counted) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", counted.table());
    let row = sqlx::query(&sql).fetch_one(pool).await?;
    Ok(row.get(0))
}

/// One entry of the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// A page number; `true` marks the current page.
    Page(i64, bool),
    /// Skipped pages.
    Gap,
}

/// The links shown under a paged list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Rows per page.
    pub limit: i64,
    /// Current page, clamped to the available pages.
    pub page: i64,
    /// Number of the last page.
    pub last_page: i64,
    /// Page before the current one.
    pub previous: Option<i64>,
    /// Page after the current one.
    pub next: Option<i64>,
    /// Numbers around the current page, with the first and last page always
    /// present and gaps where pages were skipped.
    pub links: Vec<PageLink>,
}

impl Pagination {
    /// Returns whether everything fits on one page.
    #[must_use]
    pub fn is_single_page(&self) -> bool {
        self.last_page <= 1
    }
}

/// Largest number of rows shown on one page.
pub const MAX_LIMIT: i64 = 100;

/// Largest number of page links shown on each side of the current page.
pub const MAX_LINKS: i64 = 10;

/// Builds the links for page `page` of `total` rows, showing `links` pages on
/// each side of the current one.
///
/// `limit` is clamped to `1..=MAX_LIMIT` and `links` to `0..=MAX_LINKS`.
#[must_use]
pub fn links(limit: i64, page: i64, links: i64, total: i64) -> Pagination {
    let limit = limit.clamp(1, MAX_LIMIT);
    let total = total.max(0);
    let last_page = (total / limit + i64::from(total % limit != 0)).max(1);
    let page = page.clamp(1, last_page);
    let links = links.clamp(0, MAX_LINKS);

    let start = page.saturating_sub(links).max(1);
    let end = page.saturating_add(links).min(last_page);

    let mut strip = Vec::new();
    if start > 1 {
        strip.push(PageLink::Page(1, false));
        if start > 2 {
            strip.push(PageLink::Gap);
        }
    }
    strip.extend((start..=end).map(|n| PageLink::Page(n, n == page)));
    if end < last_page {
        if end < last_page - 1 {
            strip.push(PageLink::Gap);
        }
        strip.push(PageLink::Page(last_page, false));
    }

    Pagination {
        limit,
        page,
        last_page,
        previous: (page > 1).then_some(page - 1),
        next: (page < last_page).then_some(page + 1),
        links: strip,
    }
}
