use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Single observation sent to a forecaster.
///
/// Keys are feature names (for example `"Sin"`), values are the observed
/// measurements. The timestamp dimension is interpreted server-side, usually
/// from one of the features named in the forecaster configuration.
pub type DataPoint = BTreeMap<String, f64>;

/// Stored forecaster data as returned by the `/data` endpoint.
///
/// Outer keys are timestamps rendered by the server, inner maps are the
/// feature values recorded at that timestamp.
pub type ForecasterData = BTreeMap<String, DataPoint>;

/// Wire body for the `PATCH` feed endpoint.
///
/// Serialized as:
///
/// ```json
/// { "forecasterId": "abc", "data": { "Sin": 0.5 } }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest<'a, T: ?Sized + Serialize> {
    pub forecaster_id: &'a str,
    pub data: &'a T,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
/// Request payload for [`crate::run_replay_handler`].
///
/// * `forecaster_id` must reference a forecaster that already exists.
/// * `rows`, `noise_std`, and `seed` are forwarded to the signal generator.
/// * `batch_size` controls how many rows travel in each `PATCH` call. A value
///   of one sends bare data points, anything larger sends JSON arrays.
pub struct ReplayRequest {
    pub forecaster_id: String,
    pub rows: usize,
    #[serde(default)]
    pub noise_std: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_seed() -> u64 {
    42
}

fn default_batch_size() -> usize {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
/// Summary produced by the replay handler.
///
/// `forecast` is `None` when the service answered `204` because it has not
/// seen enough data yet.
pub struct ReplayReport {
    pub forecaster_id: String,
    pub rows_fed: usize,
    pub batches: usize,
    pub forecast: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
/// Errors returned by [`crate::DriftMindClient`] operations.
///
/// Every variant except [`ClientError::Transport`] corresponds to a response
/// the service actually produced.
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("forecaster {forecaster_id} not found")]
    NotFound { forecaster_id: String },
    #[error("no forecast available yet for forecaster {forecaster_id}")]
    NotReady { forecaster_id: String },
    #[error("response with status {status} carried no body")]
    EmptyBody { status: u16 },
    #[error("failed to decode response with status {status}: {message}")]
    MalformedBody { status: u16, message: String },
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// True for every outcome that yielded nothing usable but did reach the
    /// service. Transport failures and rejected requests are excluded.
    pub fn is_no_value(&self) -> bool {
        !matches!(self, ClientError::Transport(_) | ClientError::InvalidRequest(_))
    }

    /// HTTP status associated with the failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::NotFound { .. } => Some(404),
            ClientError::NotReady { .. } => Some(204),
            ClientError::EmptyBody { status }
            | ClientError::MalformedBody { status, .. }
            | ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|status| status.as_u16()),
            ClientError::InvalidRequest(_) => None,
        }
    }
}

#[derive(Debug, Error)]
/// Errors produced while loading [`crate::Credentials`].
pub enum CredentialsError {
    #[error("credentials file not found at {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to parse credentials: {0}")]
    Parse(String),
    #[error("missing required credential {key}")]
    MissingKey { key: &'static str },
    #[error("{key} contains `$` outside single quotes; quote it as {key}='...' to keep it literal")]
    Substitution { key: &'static str },
}

#[derive(Debug, Error, PartialEq)]
/// Errors produced by the synthetic signal generator.
pub enum GeneratorError {
    #[error("noise standard deviation must be finite and non-negative, got {0}")]
    InvalidNoise(f64),
}
