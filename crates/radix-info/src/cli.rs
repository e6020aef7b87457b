//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::Parser;
use radix_metrics::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use radix_metrics::HarvestConfig;

/// Exports a Radix node's status as a Prometheus textfile.
#[derive(Parser, Debug, Clone)]
#[command(name = "radix-info")]
#[command(version, about, long_about = None)]
#[command(override_usage = "radix-info -b baseUrl outputPath")]
pub struct Cli {
    /// Base URL of the node API.
    #[arg(short, long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory receiving `radix_info.prom`.
    #[arg(default_value = ".")]
    pub output_dir: PathBuf,
}

impl Cli {
    /// Converts the parsed arguments into a harvest configuration.
    ///
    /// The request timeout is fixed at [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn into_config(self) -> HarvestConfig {
        HarvestConfig {
            base_url: self.base_url,
            output_dir: self.output_dir,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
