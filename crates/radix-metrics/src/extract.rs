//! Per-endpoint extraction routines.
//!
//! Each routine takes the raw payload served by one node endpoint, decodes it
//! and writes the resulting gauges into the registry:
//!
//! | Endpoint | Gauges |
//! |---|---|
//! | `GET /system/info` | one per numeric field of the flattened document |
//! | `GET /system/peers` | `radix_validator_peers_count` |
//! | `GET /system/epochproof` | next validator count, stake min and max |
//! | `POST /node/validator` | total stake, delegator count |

use std::fmt;

use serde_json::Value;
use tracing::{debug, trace};

use crate::aggregate::min_max;
use crate::client::Method;
use crate::error::{HarvestError, Result};
use crate::flatten::{flatten, kind, Denylist};
use crate::registry::{
    MetricRegistry, DELEGATORS_COUNT, NEXT_VALIDATORS_COUNT, NEXT_VALIDATORS_STAKE_MAX,
    NEXT_VALIDATORS_STAKE_MIN, PEERS_COUNT, STAKE_TOTAL,
};

/// Prefix of every metric discovered in `/system/info`.
pub const SYSTEM_INFO_PREFIX: &str = "radix_";

/// Stakes in the epoch proof are fixed-point with 18 decimals.
pub const STAKE_SCALE: f64 = 1e18;

/// A node endpoint queried during a harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// General node status document.
    SystemInfo,
    /// List of connected peers.
    Peers,
    /// Proof of the current epoch, including the next validator set.
    EpochProof,
    /// Status of the validator run by this node.
    Validator,
}

impl Endpoint {
    /// Every endpoint, in harvest order.
    pub const ALL: [Self; 4] = [Self::SystemInfo, Self::Peers, Self::EpochProof, Self::Validator];

    /// Path of the endpoint below the node's base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SystemInfo => "/system/info",
            Self::Peers => "/system/peers",
            Self::EpochProof => "/system/epochproof",
            Self::Validator => "/node/validator",
        }
    }

    /// HTTP method used to query the endpoint.
    ///
    /// The validator endpoint only answers POST requests.
    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::SystemInfo | Self::Peers | Self::EpochProof => Method::Get,
            Self::Validator => Method::Post,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SystemInfo => "system info",
            Self::Peers => "peers",
            Self::EpochProof => "epoch proof",
            Self::Validator => "validator",
        };
        f.write_str(name)
    }
}

/// Runs the extraction routine matching `endpoint` over `body`.
///
/// # Errors
///
/// Returns the error of the selected routine.
pub fn extract(endpoint: Endpoint, body: &[u8], registry: &mut MetricRegistry) -> Result<()> {
    match endpoint {
        Endpoint::SystemInfo => extract_system_info(body, registry).map(|_| ()),
        Endpoint::Peers => extract_peers(body, registry),
        Endpoint::EpochProof => extract_epoch_proof(body, registry),
        Endpoint::Validator => extract_validator(body, registry),
    }
}

/// Registers every numeric field of the `/system/info` document.
///
/// The document is flattened under [`SYSTEM_INFO_PREFIX`], stripped of
/// [`Denylist::SYSTEM_INFO`], and each remaining number becomes a dynamic
/// gauge. Non-numeric leaves are skipped. Returns the number of gauges
/// registered.
///
/// # Errors
///
/// Returns `HarvestError::MalformedInput` for invalid JSON,
/// `HarvestError::Projection` if the root is not an object, and registry
/// errors for bad or colliding names.
pub fn extract_system_info(body: &[u8], registry: &mut MetricRegistry) -> Result<usize> {
    let document: Value = serde_json::from_slice(body)?;
    if !document.is_object() {
        return Err(wrong_type("$", "object", &document));
    }

    let mut flat = flatten(&document, SYSTEM_INFO_PREFIX)?;
    Denylist::SYSTEM_INFO.apply(&mut flat);

    let mut registered = 0;
    for (name, value) in &flat {
        match value {
            Value::Number(n) => {
                let Some(v) = n.as_f64() else {
                    trace!(name = %name, "skipping number not representable as f64");
                    continue;
                };
                registry.register_dynamic(name, Endpoint::SystemInfo, v)?;
                registered += 1;
            }
            Value::Null | Value::Bool(_) | Value::String(_) | Value::Array(_) | Value::Object(_) => {
                trace!(name = %name, kind = kind(value), "skipping non-numeric field");
            }
        }
    }

    debug!(fields = flat.len(), registered, "extracted system info");
    Ok(registered)
}

/// Sets the peer count from the `/system/peers` array.
///
/// # Errors
///
/// Returns `HarvestError::MalformedInput` for invalid JSON and
/// `HarvestError::Projection` if the document is not an array.
#[allow(clippy::cast_precision_loss)] // Peer counts are far below 2^52
pub fn extract_peers(body: &[u8], registry: &mut MetricRegistry) -> Result<()> {
    let document: Value = serde_json::from_slice(body)?;
    let peers = document
        .as_array()
        .ok_or_else(|| wrong_type("$", "array", &document))?;

    registry.set(PEERS_COUNT, peers.len() as f64)?;
    debug!(peers = peers.len(), "extracted peers");
    Ok(())
}

/// Sets the next validator count and stake extremes from `/system/epochproof`.
///
/// Stakes are read from `header.nextValidators[].stake` and scaled down by
/// [`STAKE_SCALE`] before registration.
///
/// # Errors
///
/// Returns `HarvestError::Projection` if a stake is missing or not numeric,
/// and `HarvestError::EmptyAggregation` if the validator set is empty.
#[allow(clippy::cast_precision_loss)] // Validator set sizes are far below 2^52
pub fn extract_epoch_proof(body: &[u8], registry: &mut MetricRegistry) -> Result<()> {
    let document: Value = serde_json::from_slice(body)?;
    let validators = project_array(&document, "header.nextValidators")?;

    let stakes = validators
        .iter()
        .enumerate()
        .map(|(idx, validator)| {
            let path = format!("header.nextValidators.{idx}.stake");
            let stake = validator.get("stake").ok_or_else(|| missing(&path))?;
            as_number(stake, &path)
        })
        .collect::<Result<Vec<f64>>>()?;

    let extremes = min_max(&stakes, "header.nextValidators.#.stake")?.scaled_down(STAKE_SCALE);

    registry.set(NEXT_VALIDATORS_COUNT, stakes.len() as f64)?;
    registry.set(NEXT_VALIDATORS_STAKE_MIN, extremes.min)?;
    registry.set(NEXT_VALIDATORS_STAKE_MAX, extremes.max)?;
    debug!(
        validators = stakes.len(),
        stake_min = extremes.min,
        stake_max = extremes.max,
        "extracted epoch proof"
    );
    Ok(())
}

/// Sets the total stake and delegator count from `/node/validator`.
///
/// `validator.totalStake` is registered as served, without fixed-point
/// scaling.
///
/// # Errors
///
/// Returns `HarvestError::Projection` if `validator.totalStake` is missing or
/// not numeric, or `validator.stakes` is not an array.
#[allow(clippy::cast_precision_loss)] // Delegator counts are far below 2^52
pub fn extract_validator(body: &[u8], registry: &mut MetricRegistry) -> Result<()> {
    let document: Value = serde_json::from_slice(body)?;
    let total_stake = as_number(project(&document, "validator.totalStake")?, "validator.totalStake")?;
    let stakes = project_array(&document, "validator.stakes")?;

    registry.set(STAKE_TOTAL, total_stake)?;
    registry.set(DELEGATORS_COUNT, stakes.len() as f64)?;
    debug!(total_stake, delegators = stakes.len(), "extracted validator");
    Ok(())
}

/// Follows a dotted path of object keys from `document`.
fn project<'a>(document: &'a Value, path: &str) -> Result<&'a Value> {
    path.split('.').try_fold(document, |value, key| {
        match value {
            Value::Object(map) => map.get(key).ok_or_else(|| missing(path)),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                Err(wrong_type(path, "object along the path", value))
            }
        }
    })
}

fn project_array<'a>(document: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    let value = project(document, path)?;
    value.as_array().ok_or_else(|| wrong_type(path, "array", value))
}

/// Reads a number, also accepting decimal numbers encoded as strings.
fn as_number(value: &Value, path: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| HarvestError::Projection {
            path: path.to_string(),
            reason: format!("{n} is not representable as f64"),
        }),
        Value::String(s) => s.trim().parse::<f64>().map_err(|e| HarvestError::Projection {
            path: path.to_string(),
            reason: format!("'{s}' is not a number: {e}"),
        }),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            Err(wrong_type(path, "number", value))
        }
    }
}

fn missing(path: &str) -> HarvestError {
    HarvestError::Projection {
        path: path.to_string(),
        reason: "field is missing".to_string(),
    }
}

fn wrong_type(path: &str, expected: &str, found: &Value) -> HarvestError {
    HarvestError::Projection {
        path: path.to_string(),
        reason: format!("expected {expected}, found {}", kind(found)),
    }
}
