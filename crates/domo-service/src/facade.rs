//! Read-side aggregation for presentation callers.
//!
//! These operations are what routes and dashboards consume. Storage
//! errors propagate to the caller so a presentation layer can distinguish
//! "no data" from "backend unavailable".

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use domo_store::{Result, StoredMeasurement};
use domo_types::{Action, Bucket, Category, Scale, evaluate};

use crate::state::AppState;

/// A stored measurement together with the actuator decision derived for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementWithAction {
    /// Database row ID.
    pub id: i64,
    /// Identifier of the sensor that produced this value.
    pub sensor_id: i64,
    /// Measured value.
    pub value: f64,
    /// When this measurement was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
    /// Decision derived from the threshold in effect at query time.
    pub action: Action,
}

impl MeasurementWithAction {
    fn derive(measurement: StoredMeasurement, threshold: f64) -> Self {
        let action = evaluate(measurement.value, threshold);
        Self {
            id: measurement.id,
            sensor_id: measurement.sensor_id,
            value: measurement.value,
            inserted_at: measurement.inserted_at,
            action,
        }
    }
}

/// The latest measurements, newest first, each with its actuator decision.
///
/// Decisions are recomputed per row from the threshold passed to this
/// call, never read from storage; changing the threshold changes how
/// history is displayed without rewriting data.
pub async fn recent_with_actions(
    state: &AppState,
    limit: u32,
    threshold: f64,
) -> Result<Vec<MeasurementWithAction>> {
    let store = state.store.lock().await;
    let measurements = store.recent(limit)?;

    Ok(measurements
        .into_iter()
        .map(|m| MeasurementWithAction::derive(m, threshold))
        .collect())
}

/// Total consumption per invoice category.
pub async fn consumption_by_category(state: &AppState) -> Result<BTreeMap<Category, f64>> {
    state.store.lock().await.consumption_by_category()
}

/// Total billed amount per bucket at the given scale, ordered by key.
pub async fn economies(state: &AppState, scale: Scale) -> Result<Vec<Bucket>> {
    state.store.lock().await.amounts_by_scale(scale)
}
