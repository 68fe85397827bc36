//! Entry point for the DriftMind SDK crate.
//! Consumers should import exported types via the crate root.
//!
//! The crate has two halves: [`DriftMindClient`], a blocking client for the
//! forecaster resource, and [`generate_sin_cos_tan_with_drifts`], a
//! deterministic generator of drifting test signals.
//!
//! # Example
//!
//! ```no_run
//! use driftmind_sdk::{
//!     generate_sin_cos_tan_with_drifts, ClientError, Credentials, DriftMindClient,
//! };
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::load("resources/DRIFTMIND_CONNECT.txt")?;
//!     let client = DriftMindClient::from_credentials(&credentials)?;
//!
//!     let created = client.create_forecaster(&json!({ "features": ["Sin", "Cos", "Tan"] }))?;
//!     println!("{created:?}");
//!
//!     let dataset = generate_sin_cos_tan_with_drifts(600, 0.0, 42)?;
//!     for point in dataset.to_data_points() {
//!         client.feed_point("my-forecaster", &point)?;
//!     }
//!
//!     match client.forecast("my-forecaster") {
//!         Ok(prediction) => println!("{prediction}"),
//!         Err(ClientError::NotReady { .. }) => println!("not ready yet"),
//!         Err(err) => return Err(err.into()),
//!     }
//!     Ok(())
//! }
//! ```

pub mod credentials;
pub mod dto;
pub mod generator;
pub mod handler;
pub(crate) mod helpers;
pub mod implementation {
    include!("impl.rs");
}

pub use credentials::Credentials;
pub use dto::*;
pub use generator::{
    generate_sin_cos_tan_with_drifts, GeneratorConfig, SegmentParams, SignalRow, SyntheticDataset,
    DRIFT_SEGMENTS, TAN_CLAMP,
};
pub use handler::run_replay_handler;
pub use implementation::DriftMindClient;
