//! Min/max aggregation over projected array values.

use crate::error::{HarvestError, Result};

/// Extremes of a non-empty numeric sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremes {
    /// Smallest value seen.
    pub min: f64,
    /// Largest value seen.
    pub max: f64,
}

impl Extremes {
    /// Divides both extremes by `divisor`.
    #[must_use]
    pub fn scaled_down(self, divisor: f64) -> Self {
        Self {
            min: self.min / divisor,
            max: self.max / divisor,
        }
    }
}

/// Computes the minimum and maximum of `values` in one full pass.
///
/// `what` names the sequence in the error message.
///
/// # Errors
///
/// Returns `HarvestError::EmptyAggregation` if `values` is empty.
pub fn min_max(values: &[f64], what: &str) -> Result<Extremes> {
    let (first, rest) = values
        .split_first()
        .ok_or_else(|| HarvestError::EmptyAggregation {
            what: what.to_string(),
        })?;

    Ok(rest.iter().fold(
        Extremes {
            min: *first,
            max: *first,
        },
        |acc, &v| Extremes {
            min: acc.min.min(v),
            max: acc.max.max(v),
        },
    ))
}
