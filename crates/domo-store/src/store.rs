//! Main store implementation.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tracing::{debug, info};

use domo_types::{Bucket, Category, Scale};

use crate::error::{Error, Result};
use crate::models::{NewInvoice, StoredMeasurement};
use crate::queries::MeasurementQuery;
use crate::retry::{RetryConfig, with_busy_retry};
use crate::schema;

/// Stored timestamp layout: UTC, second precision.
///
/// Fixed width, so lexicographic order of the stored text matches
/// chronological order; same-second ties are broken by row id.
pub(crate) const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Stored invoice date layout.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Format a timestamp for storage.
pub(crate) fn format_timestamp(at: OffsetDateTime) -> Result<String> {
    at.to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| Error::InvalidTimestamp(e.to_string()))
}

/// Parse a stored timestamp back into a UTC datetime.
fn parse_timestamp(s: &str) -> Result<OffsetDateTime> {
    PrimitiveDateTime::parse(s, TIMESTAMP_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|_| Error::InvalidTimestamp(s.to_string()))
}

/// SQLite-based store for measurements and billing aggregates.
///
/// The store tolerates one writer plus concurrent readers: the database
/// runs in WAL mode with a busy timeout, and residual lock contention is
/// retried with bounded backoff before an error reaches the caller.
pub struct Store {
    conn: Connection,
    retry: RetryConfig,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        // WAL keeps readers unblocked while the single writer commits
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.busy_timeout(Duration::from_millis(100))?;

        schema::initialize(&conn)?;

        Ok(Self {
            conn,
            retry: RetryConfig::default(),
        })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self {
            conn,
            retry: RetryConfig::default(),
        })
    }
}

// Measurement operations
impl Store {
    /// Append one measurement. Durable when this returns.
    ///
    /// Returns the new row id. Rejects a non-positive `sensor_id` or a
    /// non-finite `value` with [`Error::InvalidArgument`] before touching
    /// storage. Transient lock contention is retried with bounded backoff.
    pub fn insert_measurement(
        &self,
        sensor_id: i64,
        value: f64,
        at: OffsetDateTime,
    ) -> Result<i64> {
        if sensor_id <= 0 {
            return Err(Error::InvalidArgument(format!(
                "sensor_id must be positive, got {sensor_id}"
            )));
        }
        if !value.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "value must be finite, got {value}"
            )));
        }

        let inserted_at = format_timestamp(at)?;

        with_busy_retry(&self.retry, "insert_measurement", || {
            self.conn.execute(
                "INSERT INTO measurements (sensor_id, value, inserted_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![sensor_id, value, inserted_at],
            )?;
            Ok(self.conn.last_insert_rowid())
        })
    }

    /// Query measurements with filters.
    pub fn query_measurements(&self, query: &MeasurementQuery) -> Result<Vec<StoredMeasurement>> {
        let sql = query.build_sql()?;
        let (_, params) = query.build_where()?;

        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut measurements = Vec::new();
        for row in rows {
            let (id, sensor_id, value, inserted_at) = row?;
            measurements.push(StoredMeasurement {
                id,
                sensor_id,
                value,
                inserted_at: parse_timestamp(&inserted_at)?,
            });
        }

        Ok(measurements)
    }

    /// The most recent measurements, newest first.
    ///
    /// Ordered by `inserted_at` descending, same-second ties broken by
    /// row id descending. A `limit` of zero is [`Error::InvalidArgument`].
    pub fn recent(&self, limit: u32) -> Result<Vec<StoredMeasurement>> {
        if limit == 0 {
            return Err(Error::InvalidArgument(
                "limit must be positive".to_string(),
            ));
        }
        self.query_measurements(&MeasurementQuery::new().limit(limit))
    }

    /// Count measurements, optionally for one sensor.
    pub fn count_measurements(&self, sensor_id: Option<i64>) -> Result<u64> {
        let count: i64 = match sensor_id {
            Some(id) => self.conn.query_row(
                "SELECT COUNT(*) FROM measurements WHERE sensor_id = ?",
                [id],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM measurements", [], |row| row.get(0))?,
        };

        Ok(count as u64)
    }
}

// Invoice operations
impl Store {
    /// Insert one invoice row on behalf of the seeding collaborator.
    pub fn insert_invoice(&self, invoice: &NewInvoice) -> Result<i64> {
        if invoice.housing_id <= 0 {
            return Err(Error::InvalidArgument(format!(
                "housing_id must be positive, got {}",
                invoice.housing_id
            )));
        }
        if !invoice.amount.is_finite() || !invoice.consumption.is_finite() {
            return Err(Error::InvalidArgument(
                "amount and consumption must be finite".to_string(),
            ));
        }

        let invoice_date = invoice
            .invoice_date
            .format(DATE_FORMAT)
            .map_err(|e| Error::InvalidTimestamp(e.to_string()))?;

        with_busy_retry(&self.retry, "insert_invoice", || {
            self.conn.execute(
                "INSERT INTO invoices (housing_id, category, invoice_date, amount, consumption)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    invoice.housing_id,
                    invoice.category.as_str(),
                    invoice_date,
                    invoice.amount,
                    invoice.consumption,
                ],
            )?;
            Ok(self.conn.last_insert_rowid())
        })
    }

    /// Total consumption per invoice category.
    ///
    /// Read-only and idempotent: two calls with no intervening writes
    /// return identical results.
    pub fn consumption_by_category(&self) -> Result<BTreeMap<Category, f64>> {
        let rows = self.sum_grouped(
            "SELECT category, SUM(consumption) FROM invoices GROUP BY category ORDER BY category",
        )?;

        let mut totals = BTreeMap::new();
        for (key, total) in rows {
            let category = key
                .parse::<Category>()
                .map_err(|e| Error::Corrupt(e.to_string()))?;
            totals.insert(category, total);
        }

        Ok(totals)
    }

    /// Total billed amount per bucket at the given scale.
    ///
    /// Month and year buckets are ordered ascending by key; category
    /// buckets are ordered by category text for a stable result.
    pub fn amounts_by_scale(&self, scale: Scale) -> Result<Vec<Bucket>> {
        let sql = match scale {
            Scale::Monthly => {
                "SELECT strftime('%Y-%m', invoice_date) AS bucket, SUM(amount)
                 FROM invoices GROUP BY bucket ORDER BY bucket"
            }
            Scale::Yearly => {
                "SELECT strftime('%Y', invoice_date) AS bucket, SUM(amount)
                 FROM invoices GROUP BY bucket ORDER BY bucket"
            }
            Scale::ByCategory => {
                "SELECT category AS bucket, SUM(amount)
                 FROM invoices GROUP BY bucket ORDER BY bucket"
            }
        };

        let buckets = self
            .sum_grouped(sql)?
            .into_iter()
            .map(|(key, total)| Bucket { key, total })
            .collect();

        Ok(buckets)
    }

    /// Run a grouped-sum query returning (group key, total) pairs.
    fn sum_grouped(&self, sql: &str) -> Result<Vec<(String, f64)>> {
        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
