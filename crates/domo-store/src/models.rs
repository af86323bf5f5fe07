//! Data models for stored data.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use domo_types::Category;

/// A measurement stored in the database.
///
/// Immutable once written: measurements are only ever inserted and read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMeasurement {
    /// Database row ID, strictly increasing in insertion order.
    pub id: i64,
    /// Identifier of the sensor that produced this value.
    pub sensor_id: i64,
    /// Measured value (e.g. temperature in Celsius).
    pub value: f64,
    /// When this measurement was recorded (UTC, second precision).
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
}

/// An invoice row to insert on behalf of the seeding collaborator.
///
/// This core only aggregates invoices; the insert path exists so the
/// external seeder (and tests) have an ingestion entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    /// Housing entity the invoice belongs to.
    pub housing_id: i64,
    /// Billing category.
    pub category: Category,
    /// Invoice date.
    pub invoice_date: Date,
    /// Billed amount.
    pub amount: f64,
    /// Metered consumption for the billing period.
    pub consumption: f64,
}
