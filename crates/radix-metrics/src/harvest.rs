//! One complete harvest: fetch, extract, write.
//!
//! The endpoints are processed in [`Endpoint::ALL`] order. The first failure
//! aborts the run before anything is written, so the textfile on disk is
//! always a complete snapshot of a single poll.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::client::{NodeFetcher, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::Result;
use crate::exposition::write_textfile;
use crate::extract::{extract, Endpoint};
use crate::registry::MetricRegistry;

/// Settings for a harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// Base URL of the node API.
    pub base_url: String,
    /// Directory receiving `radix_info.prom`.
    pub output_dir: PathBuf,
    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("."),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Outcome of a successful harvest.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestReport {
    /// Path of the written textfile.
    pub path: PathBuf,
    /// Total number of metrics written.
    pub metrics: usize,
    /// Number of metrics discovered in `/system/info`.
    pub dynamic_metrics: usize,
}

/// Queries every endpoint in order and collects the resulting gauges.
///
/// # Errors
///
/// Returns the first error raised, wrapped in `HarvestError::Stage` naming
/// the endpoint.
pub async fn collect<F: NodeFetcher>(fetcher: &F) -> Result<MetricRegistry> {
    let mut registry = MetricRegistry::with_static_gauges()?;

    for endpoint in Endpoint::ALL {
        let started = Instant::now();
        run_stage(fetcher, endpoint, &mut registry)
            .await
            .map_err(|e| e.in_stage(endpoint))?;
        debug!(
            %endpoint,
            elapsed_ms = started.elapsed().as_millis(),
            "stage complete"
        );
    }

    Ok(registry)
}

async fn run_stage<F: NodeFetcher>(
    fetcher: &F,
    endpoint: Endpoint,
    registry: &mut MetricRegistry,
) -> Result<()> {
    let body = fetcher.fetch(endpoint.method(), endpoint.path()).await?;
    extract(endpoint, &body, registry)
}

/// Runs a full harvest and writes the textfile into `config.output_dir`.
///
/// Nothing is written unless every stage succeeds.
///
/// # Errors
///
/// Returns the first stage error, or the error raised while writing.
pub async fn harvest<F: NodeFetcher>(fetcher: &F, config: &HarvestConfig) -> Result<HarvestReport> {
    info!(base_url = %config.base_url, "harvesting node metrics");

    let registry = collect(fetcher).await?;
    let path = write_textfile(&registry, &config.output_dir)?;

    Ok(HarvestReport {
        path,
        metrics: registry.len(),
        dynamic_metrics: registry.dynamic_count(),
    })
}
