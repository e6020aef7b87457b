//! Prometheus text exposition of a [`MetricRegistry`].
//!
//! The registry is copied into a `prometheus-client` registry of unlabeled
//! `f64` gauges and encoded with its text encoder. [`write_textfile`] places
//! the result where a node-exporter textfile collector picks it up.
//!
//! # Example
//!
//! ```rust
//! use radix_metrics::exposition::encode;
//! use radix_metrics::registry::{MetricRegistry, PEERS_COUNT};
//!
//! let mut registry = MetricRegistry::with_static_gauges().unwrap();
//! registry.set(PEERS_COUNT, 3.0).unwrap();
//!
//! let text = encode(&registry).unwrap();
//! assert!(text.contains("# TYPE radix_validator_peers_count gauge"));
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU64;

use prometheus_client::encoding::text;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{HarvestError, Result};
use crate::registry::MetricRegistry;

/// Name of the exposition file inside the output directory.
pub const TEXTFILE_NAME: &str = "radix_info.prom";

/// Encodes every metric of `registry` in the Prometheus text format.
///
/// # Errors
///
/// Returns `HarvestError::Encode` if the encoder fails.
pub fn encode(registry: &MetricRegistry) -> Result<String> {
    let mut exposition = Registry::default();
    for (name, metric) in registry.iter() {
        let gauge = Gauge::<f64, AtomicU64>::default();
        gauge.set(metric.value);
        exposition.register(name.as_str(), metric.help.as_str(), gauge);
    }

    let mut buffer = String::new();
    text::encode(&mut buffer, &exposition).map_err(|e| HarvestError::Encode {
        reason: e.to_string(),
    })?;
    Ok(buffer)
}

/// Writes `registry` to `<dir>/radix_info.prom` and returns the file path.
///
/// The text is written to a temporary file in `dir` and renamed over the
/// target, so a reader sees either the previous file or the complete new one.
///
/// # Errors
///
/// Returns `HarvestError::Encode` if encoding fails and `HarvestError::Io` if
/// the file cannot be written.
pub fn write_textfile(registry: &MetricRegistry, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(TEXTFILE_NAME);
    let body = encode(registry)?;

    let io_err = |source: std::io::Error| HarvestError::Io {
        path: path.clone(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(body.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(&path).map_err(|e| io_err(e.error))?;

    info!(path = %path.display(), metrics = registry.len(), "wrote metrics textfile");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Endpoint;
    use crate::registry::{PEERS_COUNT, STAKE_TOTAL};

    /// Parses `name value` sample lines, skipping comments.
    fn samples(text: &str) -> Vec<(String, f64)> {
        text.lines()
            .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
            .map(|line| {
                let (name, value) = line.split_once(' ').unwrap();
                (name.to_string(), value.parse().unwrap())
            })
            .collect()
    }

    fn populated() -> MetricRegistry {
        let mut registry = MetricRegistry::with_static_gauges().unwrap();
        registry.set(PEERS_COUNT, 3.0).unwrap();
        registry.set(STAKE_TOTAL, 42.5).unwrap();
        registry
            .register_dynamic("radix_info_epochManager_epoch", Endpoint::SystemInfo, 1234.0)
            .unwrap();
        registry
    }

    mod encode_tests {
        use super::*;

        #[test]
        fn one_sample_per_metric() {
            let registry = populated();
            let text = encode(&registry).unwrap();
            assert_eq!(samples(&text).len(), registry.len());
        }

        #[test]
        fn samples_carry_values() {
            let text = encode(&populated()).unwrap();
            let samples = samples(&text);

            let value = |name: &str| {
                samples
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| *v)
            };
            assert_eq!(value("radix_validator_peers_count"), Some(3.0));
            assert_eq!(value("radix_validator_stake_total"), Some(42.5));
            assert_eq!(value("radix_info_epochManager_epoch"), Some(1234.0));
            assert_eq!(value("radix_validator_delegators_count"), Some(0.0));
        }

        #[test]
        fn samples_are_name_ordered() {
            let text = encode(&populated()).unwrap();
            let names: Vec<_> = samples(&text).into_iter().map(|(n, _)| n).collect();
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted);
        }

        #[test]
        fn metrics_are_typed_as_gauges() {
            let text = encode(&populated()).unwrap();
            assert!(text.contains("# TYPE radix_validator_peers_count gauge"));
            assert!(text.contains("# HELP radix_validator_peers_count Count of Validator Peers"));
            assert!(!text.contains('{'), "samples must not carry labels");
        }

        #[test]
        fn empty_registry_has_no_samples() {
            let text = encode(&MetricRegistry::new()).unwrap();
            assert!(samples(&text).is_empty());
        }
    }

    mod textfile_tests {
        use super::*;

        #[test]
        fn writes_into_directory() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_textfile(&populated(), dir.path()).unwrap();

            assert_eq!(path, dir.path().join("radix_info.prom"));
            let text = std::fs::read_to_string(&path).unwrap();
            assert!(text.contains("radix_validator_peers_count"));
        }

        #[test]
        fn overwrites_previous_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(TEXTFILE_NAME);
            std::fs::write(&path, "stale_metric 1\n").unwrap();

            write_textfile(&populated(), dir.path()).unwrap();

            let text = std::fs::read_to_string(&path).unwrap();
            assert!(!text.contains("stale_metric"));
        }

        #[test]
        fn leaves_no_temporary_files() {
            let dir = tempfile::tempdir().unwrap();
            write_textfile(&populated(), dir.path()).unwrap();

            let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
            assert_eq!(entries.len(), 1);
        }

        #[test]
        fn missing_directory_is_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("does-not-exist");

            let err = write_textfile(&populated(), &missing).unwrap_err();

            assert!(matches!(err, HarvestError::Io { .. }));
        }
    }
}
