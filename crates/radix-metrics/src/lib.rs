//! Harvests a Radix node's status API into Prometheus gauges.
#![forbid(unsafe_code)]
//!
//! One harvest queries four endpoints of a running node, turns the numeric
//! parts of each payload into gauges, and writes them as a Prometheus text
//! exposition file for a node-exporter textfile collector.
//!
//! # Pipeline
//!
//! - **Fetch**: [`client::HttpFetcher`] requests each [`Endpoint`] in order
//! - **Extract**: [`extract`] projects fields out of the JSON payloads and
//!   flattens `/system/info` into dynamically named gauges
//! - **Write**: [`exposition::write_textfile`] atomically replaces
//!   `radix_info.prom`, and only after every endpoint succeeded
//!
//! # Example
//!
//! ```rust
//! use radix_metrics::{extract, Endpoint, MetricRegistry};
//!
//! let mut registry = MetricRegistry::with_static_gauges().unwrap();
//! extract(Endpoint::Peers, br#"[{"address":"a"},{"address":"b"}]"#, &mut registry).unwrap();
//!
//! assert_eq!(registry.get("radix_validator_peers_count"), Some(2.0));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod aggregate;
pub mod client;
pub mod error;
pub mod exposition;
pub mod extract;
pub mod flatten;
pub mod harvest;
pub mod registry;
pub mod types;

// Re-export main types at crate root
pub use client::{HttpFetcher, Method, NodeFetcher};
pub use error::{HarvestError, Result};
pub use extract::{extract, Endpoint};
pub use harvest::{collect, harvest, HarvestConfig, HarvestReport};
pub use registry::MetricRegistry;
pub use types::{Metric, MetricName, MetricOrigin};
