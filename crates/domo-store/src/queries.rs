//! Query builder for stored measurements.
//!
//! [`MeasurementQuery`] follows the builder pattern for ergonomic
//! construction of filtered, paginated reads. By default queries return
//! results newest first (ordered by `inserted_at` descending, ties broken
//! by row id descending).
//!
//! # Example
//!
//! ```
//! use domo_store::{MeasurementQuery, Store};
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_in_memory()?;
//! let yesterday = OffsetDateTime::now_utc() - Duration::hours(24);
//!
//! let query = MeasurementQuery::new()
//!     .sensor(1)
//!     .since(yesterday)
//!     .limit(50);
//!
//! let measurements = store.query_measurements(&query)?;
//! # Ok::<(), domo_store::Error>(())
//! ```

use time::OffsetDateTime;

use crate::error::Result;
use crate::store::format_timestamp;

/// Fluent query builder for stored measurements.
#[derive(Debug, Default, Clone)]
pub struct MeasurementQuery {
    /// Filter by sensor ID.
    pub sensor_id: Option<i64>,
    /// Filter measurements recorded at or after this time.
    pub since: Option<OffsetDateTime>,
    /// Filter measurements recorded at or before this time.
    pub until: Option<OffsetDateTime>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Order by inserted_at descending (newest first).
    pub newest_first: bool,
}

impl MeasurementQuery {
    /// Create a new query with default settings: no filters, newest first.
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Filter by sensor ID.
    pub fn sensor(mut self, sensor_id: i64) -> Self {
        self.sensor_id = Some(sensor_id);
        self
    }

    /// Filter to measurements recorded at or after this time.
    pub fn since(mut self, time: OffsetDateTime) -> Self {
        self.since = Some(time);
        self
    }

    /// Filter to measurements recorded at or before this time.
    pub fn until(mut self, time: OffsetDateTime) -> Self {
        self.until = Some(time);
        self
    }

    /// Limit the maximum number of results returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first N results. Use with `limit()` for pagination.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Order results oldest first (ascending), for chronological processing.
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Build the SQL WHERE clause and parameters.
    pub(crate) fn build_where(&self) -> Result<(String, Vec<Box<dyn rusqlite::ToSql>>)> {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(sensor_id) = self.sensor_id {
            conditions.push("sensor_id = ?");
            params.push(Box::new(sensor_id));
        }

        if let Some(since) = self.since {
            conditions.push("inserted_at >= ?");
            params.push(Box::new(format_timestamp(since)?));
        }

        if let Some(until) = self.until {
            conditions.push("inserted_at <= ?");
            params.push(Box::new(format_timestamp(until)?));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        Ok((where_clause, params))
    }

    /// Build the full SQL query.
    pub(crate) fn build_sql(&self) -> Result<String> {
        let (where_clause, _) = self.build_where()?;
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT id, sensor_id, value, inserted_at \
             FROM measurements {} ORDER BY inserted_at {}, id {}",
            where_clause, order, order
        );

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_sql() {
        let sql = MeasurementQuery::new().build_sql().unwrap();
        assert_eq!(
            sql,
            "SELECT id, sensor_id, value, inserted_at \
             FROM measurements  ORDER BY inserted_at DESC, id DESC"
        );
    }

    #[test]
    fn test_filters_and_pagination() {
        let sql = MeasurementQuery::new()
            .sensor(1)
            .limit(20)
            .offset(40)
            .build_sql()
            .unwrap();
        assert!(sql.contains("WHERE sensor_id = ?"));
        assert!(sql.ends_with("LIMIT 20 OFFSET 40"));
    }

    #[test]
    fn test_oldest_first_ordering() {
        let sql = MeasurementQuery::new().oldest_first().build_sql().unwrap();
        assert!(sql.contains("ORDER BY inserted_at ASC, id ASC"));
    }

    #[test]
    fn test_time_range_parameters() {
        let now = OffsetDateTime::now_utc();
        let (where_clause, params) = MeasurementQuery::new()
            .since(now)
            .until(now)
            .build_where()
            .unwrap();
        assert!(where_clause.contains("inserted_at >= ?"));
        assert!(where_clause.contains("inserted_at <= ?"));
        assert_eq!(params.len(), 2);
    }
}
