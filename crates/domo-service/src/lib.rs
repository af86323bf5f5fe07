//! Measurement simulator and read-side query facade.
//!
//! This crate drives synthetic sensor load against the shared store and
//! exposes the read-side aggregations consumed by presentation callers:
//!
//! - A background [`Simulator`] task inserts one synthetic measurement per
//!   tick, derives the actuator decision from the configured threshold, and
//!   logs the outcome. Per-tick storage failures are logged and skipped;
//!   the loop only stops on an explicit stop request.
//! - The [`facade`] module serves latest-measurements-with-actions and
//!   billing/consumption aggregations, recomputing actuator decisions at
//!   read time.
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/domo/service.toml`:
//!
//! ```toml
//! [storage]
//! path = "~/.local/share/domo/data.db"
//!
//! [simulation]
//! sensor_id = 1
//! interval_secs = 10
//! threshold = 25.0
//! value_min = 20.0
//! value_max = 35.0
//! ```

pub mod config;
pub mod facade;
pub mod simulator;
pub mod state;

pub use config::{Config, ConfigError, SimulationConfig, StorageConfig, ValidationError};
pub use facade::MeasurementWithAction;
pub use simulator::Simulator;
pub use state::{AppState, SimulatorState};
