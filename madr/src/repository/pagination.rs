//! Pagination and filtering for list queries
//!
//! Filters are declared per list endpoint as [`FilterCondition`]s and pushed
//! onto a `sqlx::QueryBuilder` as bound parameters. Column names come from
//! code, never from the request. Every listing is ordered by ascending id and
//! windowed with a fixed page size.
//!
//! # Example
//!
//! ```rust,ignore
//! let filters = vec![
//!     FilterCondition::contains("title", "casmurro"),
//!     FilterCondition::eq("year", 1899),
//! ];
//! let page = Pagination::page(2, PAGE_SIZE);
//!
//! let mut query = QueryBuilder::new("SELECT id, title, year, novelist_id FROM books");
//! push_filters(&mut query, &filters);
//! push_window(&mut query, &page);
//! ```

use std::fmt;

use sqlx::{QueryBuilder, Sqlite};

/// Fixed number of rows per page
pub const PAGE_SIZE: u64 = 20;

/// Escape character used in generated LIKE patterns
const LIKE_ESCAPE: char = '\\';

/// Offset/limit window over an ordered listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Window for a 1-indexed page number
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        let offset = page_number.saturating_sub(1).saturating_mul(page_size);
        Self {
            offset,
            limit: page_size,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::page(1, PAGE_SIZE)
    }
}

/// Comparison applied by a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equal,
    Like,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::Like => write!(f, "LIKE"),
        }
    }
}

/// Value bound for a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    String(String),
    Integer(i64),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

/// One `column <op> value` predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub field: &'static str,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterCondition {
    /// Exact match
    pub fn eq(field: &'static str, value: impl Into<FilterValue>) -> Self {
        Self {
            field,
            operator: FilterOperator::Equal,
            value: value.into(),
        }
    }

    /// Case-insensitive substring match; wildcards in `term` match literally
    pub fn contains(field: &'static str, term: &str) -> Self {
        Self {
            field,
            operator: FilterOperator::Like,
            value: FilterValue::String(format!("%{}%", escape_like(&term.to_lowercase()))),
        }
    }
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Append ` WHERE ... AND ...` for the given filters; no-op when empty
pub fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filters: &[FilterCondition]) {
    for (i, filter) in filters.iter().enumerate() {
        query.push(if i == 0 { " WHERE " } else { " AND " });

        match filter.operator {
            FilterOperator::Equal => {
                query.push(filter.field).push(" = ");
            }
            FilterOperator::Like => {
                query.push("lower(").push(filter.field).push(") LIKE ");
            }
        }

        match &filter.value {
            FilterValue::String(s) => query.push_bind(s.clone()),
            FilterValue::Integer(n) => query.push_bind(*n),
        };

        if filter.operator == FilterOperator::Like {
            query.push(format!(" ESCAPE '{}'", LIKE_ESCAPE));
        }
    }
}

/// Append the ordering and the page window
pub fn push_window(query: &mut QueryBuilder<'_, Sqlite>, pagination: &Pagination) {
    // SQLite binds integers as i64
    let limit = i64::try_from(pagination.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(pagination.offset).unwrap_or(i64::MAX);

    query
        .push(" ORDER BY id ASC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_windows() {
        assert_eq!(Pagination::page(1, PAGE_SIZE), Pagination::new(0, 20));
        assert_eq!(Pagination::page(2, PAGE_SIZE), Pagination::new(20, 20));
        assert_eq!(Pagination::page(0, PAGE_SIZE), Pagination::new(0, 20));
        assert_eq!(Pagination::default(), Pagination::new(0, 20));
    }

    #[test]
    fn test_huge_page_stays_past_the_end() {
        let window = Pagination::page(i64::MAX as u64, PAGE_SIZE);
        assert_eq!(window.offset, u64::MAX);

        let wrapping = Pagination::page((1 << 62) + 1, PAGE_SIZE);
        assert_eq!(wrapping.offset, u64::MAX);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("dom casmurro"), "dom casmurro");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\x"), "c:\\\\x");
    }

    #[test]
    fn test_contains_lowercases_and_wraps() {
        let filter = FilterCondition::contains("title", "CaSa_");
        assert_eq!(filter.operator, FilterOperator::Like);
        assert_eq!(filter.value, FilterValue::String("%casa\\_%".into()));
    }

    #[test]
    fn test_query_shape() {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT id FROM books");
        push_filters(
            &mut query,
            &[
                FilterCondition::contains("title", "a"),
                FilterCondition::eq("year", 1899),
            ],
        );
        push_window(&mut query, &Pagination::page(3, PAGE_SIZE));

        assert_eq!(
            query.sql(),
            "SELECT id FROM books WHERE lower(title) LIKE ? ESCAPE '\\' AND year = ? ORDER BY id ASC LIMIT ? OFFSET ?"
        );
    }

    #[test]
    fn test_no_filters_adds_no_where() {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT id FROM novelists");
        push_filters(&mut query, &[]);
        assert_eq!(query.sql(), "SELECT id FROM novelists");
    }

    #[tokio::test]
    async fn test_wildcards_match_literally() {
        let pool = crate::database::connect_in_memory().await.unwrap();
        for name in ["50% off", "500 off", "a_b", "axb"] {
            sqlx::query("INSERT INTO novelists (name) VALUES (?)")
                .bind(name)
                .execute(&pool)
                .await
                .unwrap();
        }

        async fn names(pool: &sqlx::SqlitePool, term: &str) -> Vec<String> {
            let mut query = QueryBuilder::<Sqlite>::new("SELECT name FROM novelists");
            push_filters(&mut query, &[FilterCondition::contains("name", term)]);
            push_window(&mut query, &Pagination::default());
            query
                .build_query_scalar()
                .fetch_all(pool)
                .await
                .unwrap()
        }

        assert_eq!(names(&pool, "0%").await, vec!["50% off"]);
        assert_eq!(names(&pool, "a_").await, vec!["a_b"]);
        assert_eq!(names(&pool, "OFF").await, vec!["50% off", "500 off"]);
    }
}
