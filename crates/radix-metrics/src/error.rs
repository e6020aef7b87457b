//! Error types for the radix-metrics crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::extract::Endpoint;

/// Errors that can occur while harvesting node metrics.
///
/// Every variant is fatal to the run: the harvest stops at the first error
/// and no exposition file is written.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The HTTP request failed, timed out, or returned a non-success status.
    #[error("transport error for {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// The reason the request failed.
        reason: String,
    },

    /// The response payload is not valid JSON.
    #[error("malformed JSON payload")]
    MalformedInput {
        /// The underlying decode error.
        #[from]
        source: serde_json::Error,
    },

    /// The JSON document cannot be flattened.
    #[error("cannot flatten document: {reason}")]
    Flatten {
        /// The reason flattening failed.
        reason: String,
    },

    /// An expected field is absent or has the wrong type.
    #[error("projection of '{path}' failed: {reason}")]
    Projection {
        /// The dotted path that was projected.
        path: String,
        /// The reason the projection failed.
        reason: String,
    },

    /// An aggregation was requested over zero elements.
    #[error("cannot aggregate empty sequence: {what}")]
    EmptyAggregation {
        /// What was being aggregated.
        what: String,
    },

    /// A metric name is already registered.
    #[error("metric name collision: {name}")]
    NameCollision {
        /// The colliding metric name.
        name: String,
    },

    /// The metric name does not fit the exposition format.
    #[error("invalid metric name '{name}': {reason}")]
    InvalidMetricName {
        /// The rejected name.
        name: String,
        /// The reason the name is invalid.
        reason: String,
    },

    /// A static metric was set without being declared.
    #[error("metric not found: {name}")]
    MetricNotFound {
        /// The metric name that was not found.
        name: String,
    },

    /// Encoding the registry to text failed.
    #[error("encode error: {reason}")]
    Encode {
        /// The reason encoding failed.
        reason: String,
    },

    /// Writing the exposition file failed.
    #[error("failed to write {}", path.display())]
    Io {
        /// The file that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A harvest stage failed.
    #[error("{endpoint} stage failed")]
    Stage {
        /// The endpoint whose stage failed.
        endpoint: Endpoint,
        /// The error raised by the stage.
        source: Box<HarvestError>,
    },
}

impl HarvestError {
    /// Wraps this error with the endpoint whose stage raised it.
    #[must_use]
    pub fn in_stage(self, endpoint: Endpoint) -> Self {
        Self::Stage {
            endpoint,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, unwrapping any stage context.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;
