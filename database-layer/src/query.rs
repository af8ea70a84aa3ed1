//! Query builder utilities shared by the PostgreSQL store.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Encode, FromRow, Postgres, QueryBuilder, Type};
use uuid::Uuid;

use crate::record::{Condition, RecordFilter};

/// A normalized page request: `page >= 1`, `1 <= page_size <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    pub const DEFAULT_SIZE: u32 = 20;
    pub const MAX_SIZE: u32 = 100;

    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(Self::DEFAULT_SIZE)
                .clamp(1, Self::MAX_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// Total page count for `total` rows, at least one.
    pub fn total_pages(&self, total: u64) -> u32 {
        let pages = total.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Paginated query builder for consistent query construction.
///
/// ```rust,ignore
/// let mut query = PaginatedQuery::new("SELECT * FROM appointments WHERE 1=1");
/// query
///     .filter_eq("doctor_id", Some(doctor_id))
///     .filter_status(Some("REQUESTED"))
///     .order_by("created_at", "DESC")
///     .paginate(Some(Page::default()));
///
/// let rows: Vec<Appointment> = query.build().fetch_all(&pool).await?;
/// ```
pub struct PaginatedQuery<'a> {
    query: QueryBuilder<'a, Postgres>,
    page: Option<Page>,
}

impl<'a> PaginatedQuery<'a> {
    /// The base statement must end in a `WHERE` clause so filters can append `AND ...`.
    pub fn new(base_query: impl Into<String>) -> Self {
        Self {
            query: QueryBuilder::new(base_query),
            page: None,
        }
    }

    /// Add an equality filter (only if value is Some)
    pub fn filter_eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        if let Some(val) = value {
            self.query.push(format!(" AND {column} = "));
            self.query.push_bind(val);
        }
        self
    }

    /// Add an `= ANY(...)` filter. An empty set matches nothing.
    pub fn filter_in(&mut self, column: &str, values: Vec<Uuid>) -> &mut Self {
        if values.is_empty() {
            return self.filter_never();
        }
        self.query.push(format!(" AND {column} = ANY("));
        self.query.push_bind(values);
        self.query.push(")");
        self
    }

    /// Case-insensitive match on the `status` column.
    pub fn filter_status(&mut self, status: Option<String>) -> &mut Self {
        self.filter_text("status", status)
    }

    /// Case-insensitive match on a text column.
    pub fn filter_text(&mut self, column: &str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.query.push(format!(" AND lower({column}) = lower("));
            self.query.push_bind(value);
            self.query.push(")");
        }
        self
    }

    pub fn filter_never(&mut self) -> &mut Self {
        self.query.push(" AND FALSE");
        self
    }

    /// Translate every predicate of a [`RecordFilter`]. Paging is applied separately.
    pub fn apply(&mut self, filter: &RecordFilter) -> &mut Self {
        self.apply_on(filter, "status")
    }

    /// Like [`PaginatedQuery::apply`], matching the filter's status against `status_column`.
    pub fn apply_on(&mut self, filter: &RecordFilter, status_column: &str) -> &mut Self {
        for condition in &filter.conditions {
            match condition {
                Condition::Eq(column, id) => {
                    self.filter_eq(column.as_str(), Some(*id));
                }
                Condition::In(column, ids) => {
                    self.filter_in(column.as_str(), ids.clone());
                }
                Condition::Never => {
                    self.filter_never();
                }
            }
        }
        self.filter_text(status_column, filter.status.clone())
    }

    /// Add ORDER BY clause
    pub fn order_by(&mut self, column: &str, direction: &str) -> &mut Self {
        self.query.push(format!(" ORDER BY {column} {direction}, id {direction}"));
        self
    }

    /// Apply pagination
    pub fn paginate(&mut self, page: Option<Page>) -> &mut Self {
        if let Some(page) = page {
            self.query.push(" LIMIT ");
            self.query.push_bind(i64::try_from(page.limit()).unwrap_or(i64::MAX));
            self.query.push(" OFFSET ");
            self.query.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
            self.page = Some(page);
        }
        self
    }

    /// Build the final query
    pub fn build<T>(&mut self) -> sqlx::query::QueryAs<'_, Postgres, T, PgArguments>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        self.query.build_query_as()
    }

    /// Build a `SELECT COUNT(*)` style query
    pub fn build_scalar(&mut self) -> sqlx::query::QueryScalar<'_, Postgres, i64, PgArguments> {
        self.query.build_query_scalar()
    }

    /// Build a statement without a result set (`UPDATE` / `DELETE`)
    pub fn build_statement(&mut self) -> sqlx::query::Query<'_, Postgres, PgArguments> {
        self.query.build()
    }

    pub fn page(&self) -> Option<Page> {
        self.page
    }

    pub fn sql(&self) -> &str {
        self.query.sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Column;

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(Page::default(), Page { page: 1, page_size: 20 });
        assert_eq!(Page::new(Some(0), Some(500)), Page { page: 1, page_size: 100 });
        assert_eq!(Page::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(None, Some(10));
        assert_eq!(page.total_pages(0), 1);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
    }

    #[test]
    fn test_paginated_query_builder() {
        let mut query = PaginatedQuery::new("SELECT * FROM appointments WHERE 1=1");
        query
            .filter_eq("doctor_id", Some(Uuid::new_v4()))
            .filter_status(Some("requested".to_string()))
            .order_by("created_at", "DESC")
            .paginate(Some(Page::new(Some(2), Some(10))));

        assert_eq!(query.page(), Some(Page { page: 2, page_size: 10 }));
        assert_eq!(
            query.sql(),
            "SELECT * FROM appointments WHERE 1=1 AND doctor_id = $1 AND lower(status) = lower($2) \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn test_filter_eq_with_none() {
        let mut query = PaginatedQuery::new("SELECT * FROM invoices WHERE 1=1");
        query.filter_eq("patient_id", None::<Uuid>);
        assert_eq!(query.sql(), "SELECT * FROM invoices WHERE 1=1");
    }

    #[test]
    fn record_filter_translates_to_sql() {
        let filter = RecordFilter::eq(Column::PatientId, Uuid::new_v4())
            .and_in(Column::CreatedBy, vec![Uuid::new_v4()]);
        let mut query = PaginatedQuery::new("SELECT * FROM lab_results WHERE 1=1");
        query.apply(&filter);
        assert_eq!(
            query.sql(),
            "SELECT * FROM lab_results WHERE 1=1 AND patient_id = $1 AND created_by = ANY($2)"
        );
    }

    #[test]
    fn empty_membership_matches_nothing() {
        let mut query = PaginatedQuery::new("SELECT * FROM patients WHERE 1=1");
        query.filter_in("assigned_doctor_id", Vec::new());
        assert_eq!(query.sql(), "SELECT * FROM patients WHERE 1=1 AND FALSE");
    }

    #[test]
    fn status_can_target_another_text_column() {
        let filter = RecordFilter::all().and_status(Some("doctor"));
        let mut query = PaginatedQuery::new("SELECT * FROM users WHERE 1=1");
        query.apply_on(&filter, "role");
        assert_eq!(query.sql(), "SELECT * FROM users WHERE 1=1 AND lower(role) = lower($1)");
    }
}
