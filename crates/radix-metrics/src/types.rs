//! Core types for the metrics registry.
//!
//! - [`MetricName`]: A validated exposition-format metric name
//! - [`Metric`]: A named gauge value with its help text and origin
//! - [`MetricOrigin`]: Whether a metric was declared up front or discovered

use crate::error::{HarvestError, Result};
use crate::extract::Endpoint;

/// A validated metric name.
///
/// Metric names must:
/// - Be non-empty
/// - Contain only ASCII alphanumeric characters, underscores, and colons
/// - Start with a letter, underscore, or colon
/// - Be at most 256 characters long
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricName(String);

impl MetricName {
    /// Maximum allowed length for a metric name.
    pub const MAX_LENGTH: usize = 256;

    /// Creates a new validated metric name.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::InvalidMetricName` if the name is invalid.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        let invalid = |reason: String| HarvestError::InvalidMetricName {
            name: name.clone(),
            reason,
        };

        let Some(first) = name.chars().next() else {
            return Err(invalid("metric name cannot be empty".to_string()));
        };

        if name.len() > Self::MAX_LENGTH {
            return Err(invalid(format!(
                "metric name exceeds maximum length of {} characters",
                Self::MAX_LENGTH
            )));
        }

        if !first.is_ascii_alphabetic() && first != '_' && first != ':' {
            return Err(invalid(
                "metric name must start with a letter, underscore or colon".to_string(),
            ));
        }

        if let Some(c) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != ':')
        {
            return Err(invalid(format!("invalid character '{c}' in metric name")));
        }

        Ok(Self(name))
    }

    /// Returns the metric name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `MetricName` and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MetricName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for MetricName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Where a registered metric came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricOrigin {
    /// Declared up front with a fixed name.
    Static,
    /// Discovered at runtime from a flattened field of an endpoint payload.
    Dynamic(Endpoint),
}

/// A single gauge held by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Help text written next to the sample.
    pub help: String,
    /// The current value.
    pub value: f64,
    /// Where the metric came from.
    pub origin: MetricOrigin,
}

impl Metric {
    /// Creates a static metric with a zero value.
    #[must_use]
    pub fn declared(help: impl Into<String>) -> Self {
        Self {
            help: help.into(),
            value: 0.0,
            origin: MetricOrigin::Static,
        }
    }

    /// Creates a dynamic metric discovered from the given endpoint.
    #[must_use]
    pub fn discovered(endpoint: Endpoint, value: f64) -> Self {
        Self {
            help: format!("Value of a numeric field served by {}", endpoint.path()),
            value,
            origin: MetricOrigin::Dynamic(endpoint),
        }
    }
}
