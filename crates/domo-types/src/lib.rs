//! Core data types for the domo monitoring service.
//!
//! This crate holds the pure, dependency-light pieces of the system:
//! the actuator [`Action`], invoice [`Category`] and aggregation [`Scale`]
//! enums, and the threshold evaluator that maps a measurement value to an
//! actuation decision.
//!
//! # Example
//!
//! ```
//! use domo_types::{Action, Thresholds};
//!
//! let thresholds = Thresholds::default(); // 25.0 degrees
//! assert_eq!(thresholds.evaluate(30.0), Action::Engaged);
//! assert_eq!(thresholds.evaluate(25.0), Action::Idle);
//! ```

mod error;
mod thresholds;
mod types;

pub use error::{ParseError, ParseResult};
pub use thresholds::{DEFAULT_THRESHOLD, ThresholdConfig, Thresholds, evaluate};
pub use types::{Action, Bucket, Category, Scale};
