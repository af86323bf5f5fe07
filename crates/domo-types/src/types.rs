//! Shared enums and aggregation types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Actuator decision derived from a measurement value.
///
/// Decisions are always recomputed at read time from the threshold in
/// effect at query time; they are never persisted alongside measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// The actuator is driven (value strictly above the threshold).
    Engaged,
    /// The actuator is off.
    Idle,
}

impl Action {
    /// Whether this decision drives the actuator.
    pub fn is_engaged(self) -> bool {
        matches!(self, Action::Engaged)
    }

    /// Stable text form used in logs and serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Engaged => "engaged",
            Action::Idle => "idle",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "engaged" => Ok(Action::Engaged),
            "idle" => Ok(Action::Idle),
            other => Err(ParseError::UnknownAction(other.to_string())),
        }
    }
}

/// Invoice category for billing and consumption aggregates.
///
/// Stored as lowercase text in the invoices table. Ordered so that grouped
/// results have a stable, deterministic key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electricity,
    Water,
    Waste,
}

impl Category {
    /// Stable text form matching the stored column value.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Electricity => "electricity",
            Category::Water => "water",
            Category::Waste => "waste",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electricity" => Ok(Category::Electricity),
            "water" => Ok(Category::Water),
            "waste" => Ok(Category::Waste),
            other => Err(ParseError::UnknownCategory(other.to_string())),
        }
    }
}

/// Time scale for billing aggregation queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// Group by `YYYY-MM` of the invoice date.
    Monthly,
    /// Group by `YYYY` of the invoice date.
    Yearly,
    /// Group by invoice category.
    ByCategory,
}

/// One row of a grouped aggregation: the grouping key and its total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Grouping key: a month (`2024-03`), a year (`2024`), or a category.
    pub key: String,
    /// Sum over the group.
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip() {
        assert_eq!("engaged".parse::<Action>().unwrap(), Action::Engaged);
        assert_eq!("idle".parse::<Action>().unwrap(), Action::Idle);
        assert_eq!(Action::Engaged.to_string(), "engaged");
        assert!(Action::Engaged.is_engaged());
        assert!(!Action::Idle.is_engaged());
    }

    #[test]
    fn test_category_round_trip() {
        for c in [Category::Electricity, Category::Water, Category::Waste] {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let err = "gas".parse::<Category>().unwrap_err();
        assert!(matches!(err, ParseError::UnknownCategory(s) if s == "gas"));
    }

    #[test]
    fn test_category_ordering_is_stable() {
        let mut cats = vec![Category::Waste, Category::Electricity, Category::Water];
        cats.sort();
        assert_eq!(
            cats,
            vec![Category::Electricity, Category::Water, Category::Waste]
        );
    }
}
