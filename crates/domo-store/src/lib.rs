//! SQLite persistence for domo sensor measurements and billing aggregates.
//!
//! This crate provides the single shared mutable resource of the system:
//! an append-only measurement log plus read-side aggregation queries over
//! the invoices table. Writes are durable when the call returns, and
//! transient lock contention is retried with bounded backoff instead of
//! being surfaced to the caller on first failure.
//!
//! # Example
//!
//! ```no_run
//! use domo_store::{MeasurementQuery, Store};
//! use time::OffsetDateTime;
//!
//! let store = Store::open_default()?;
//! store.insert_measurement(1, 21.4, OffsetDateTime::now_utc())?;
//!
//! // Query recent measurements, newest first
//! let query = MeasurementQuery::new().sensor(1).limit(20);
//! let measurements = store.query_measurements(&query)?;
//! # Ok::<(), domo_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod retry;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{NewInvoice, StoredMeasurement};
pub use queries::MeasurementQuery;
pub use retry::RetryConfig;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/domo/data.db`
/// - macOS: `~/Library/Application Support/domo/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\domo\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("domo")
        .join("data.db")
}
