//! The per-run metric registry.
//!
//! The registry is append-only: metrics are declared or discovered and their
//! values set, but never removed. Names are unique; a second registration of
//! an existing name is a [`HarvestError::NameCollision`].

use std::collections::BTreeMap;

use crate::error::{HarvestError, Result};
use crate::extract::Endpoint;
use crate::types::{Metric, MetricName, MetricOrigin};

/// A gauge whose name is fixed in advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticGauge {
    /// Full metric name.
    pub name: &'static str,
    /// Help text.
    pub help: &'static str,
}

/// Number of peers the node is connected to.
pub const PEERS_COUNT: StaticGauge = StaticGauge {
    name: "radix_validator_peers_count",
    help: "Count of Validator Peers",
};

/// Size of the next epoch's validator set.
pub const NEXT_VALIDATORS_COUNT: StaticGauge = StaticGauge {
    name: "radix_validator_next_validators_count",
    help: "Count of validators in the next epoch",
};

/// Smallest stake in the next validator set, in whole tokens.
pub const NEXT_VALIDATORS_STAKE_MIN: StaticGauge = StaticGauge {
    name: "radix_validator_next_validators_stake_min",
    help: "Minimum stake of the next epoch's validators",
};

/// Largest stake in the next validator set, in whole tokens.
pub const NEXT_VALIDATORS_STAKE_MAX: StaticGauge = StaticGauge {
    name: "radix_validator_next_validators_stake_max",
    help: "Maximum stake of the next epoch's validators",
};

/// Total stake reported by the validator, as served.
pub const STAKE_TOTAL: StaticGauge = StaticGauge {
    name: "radix_validator_stake_total",
    help: "Total stake delegated to this validator",
};

/// Number of delegators staking to the validator.
pub const DELEGATORS_COUNT: StaticGauge = StaticGauge {
    name: "radix_validator_delegators_count",
    help: "Count of delegators staking to this validator",
};

/// Every static gauge, in declaration order.
pub const STATIC_GAUGES: [StaticGauge; 6] = [
    PEERS_COUNT,
    NEXT_VALIDATORS_COUNT,
    NEXT_VALIDATORS_STAKE_MIN,
    NEXT_VALIDATORS_STAKE_MAX,
    STAKE_TOTAL,
    DELEGATORS_COUNT,
];

/// Named gauges collected during one harvest, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    metrics: BTreeMap<MetricName, Metric>,
}

impl MetricRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every entry of [`STATIC_GAUGES`] declared at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the static table holds an invalid or repeated name.
    pub fn with_static_gauges() -> Result<Self> {
        let mut registry = Self::new();
        for gauge in STATIC_GAUGES {
            registry.declare(gauge)?;
        }
        Ok(registry)
    }

    /// Declares a static gauge with a zero value.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::NameCollision` if the name is taken, or
    /// `HarvestError::InvalidMetricName` if it is malformed.
    pub fn declare(&mut self, gauge: StaticGauge) -> Result<()> {
        let name = MetricName::new(gauge.name)?;
        self.insert(name, Metric::declared(gauge.help))
    }

    /// Sets the value of a declared static gauge.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::MetricNotFound` if the gauge was never declared.
    pub fn set(&mut self, gauge: StaticGauge, value: f64) -> Result<()> {
        let metric = self
            .metrics
            .get_mut(gauge.name)
            .filter(|metric| metric.origin == MetricOrigin::Static)
            .ok_or_else(|| HarvestError::MetricNotFound {
                name: gauge.name.to_string(),
            })?;
        metric.value = value;
        Ok(())
    }

    /// Registers a metric discovered in the payload of `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::InvalidMetricName` if `name` is malformed, or
    /// `HarvestError::NameCollision` if it is already registered, whether
    /// statically or dynamically.
    pub fn register_dynamic(&mut self, name: &str, endpoint: Endpoint, value: f64) -> Result<()> {
        let name = MetricName::new(name)?;
        self.insert(name, Metric::discovered(endpoint, value))
    }

    fn insert(&mut self, name: MetricName, metric: Metric) -> Result<()> {
        if self.metrics.contains_key(&name) {
            return Err(HarvestError::NameCollision {
                name: name.into_inner(),
            });
        }
        tracing::trace!(name = %name, value = metric.value, "registered metric");
        self.metrics.insert(name, metric);
        Ok(())
    }

    /// Returns the current value of a metric.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(|m| m.value)
    }

    /// Returns the full metric entry for `name`.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name)
    }

    /// Iterates over all metrics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&MetricName, &Metric)> {
        self.metrics.iter()
    }

    /// Returns the number of registered metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns true if no metric is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Returns the number of metrics discovered at runtime.
    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        self.metrics
            .values()
            .filter(|m| matches!(m.origin, MetricOrigin::Dynamic(_)))
            .count()
    }
}
