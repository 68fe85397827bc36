use serde_json::Value;

use crate::{
    generate_sin_cos_tan_with_drifts, ClientError, DataPoint, DriftMindClient, ReplayReport,
    ReplayRequest,
};

/// Replay a synthetic dataset into an existing forecaster and return a JSON
/// report.
///
/// This helper is intended for MCP or HTTP entry points where callers send a
/// single payload describing the forecaster and the dataset to generate. The
/// handler generates the drifting signals, feeds them in batches of
/// `batch_size` rows, then asks for a forecast. A forecaster that is not ready
/// yet produces `"forecast": null` rather than an error.
///
/// # Examples
///
/// ```no_run
/// use driftmind_sdk::{DriftMindClient, ReplayRequest};
///
/// let client = DriftMindClient::new("my-api-key", "https://api.example.com/forecasters")?;
/// let request = ReplayRequest {
///     forecaster_id: "fc-1".to_string(),
///     rows: 600,
///     noise_std: 0.0,
///     seed: 42,
///     batch_size: 50,
/// };
///
/// let json = driftmind_sdk::run_replay_handler(&client, request)?;
/// println!("{json}");
/// # Ok::<(), driftmind_sdk::ClientError>(())
/// ```
pub fn run_replay_handler(
    client: &DriftMindClient,
    request: ReplayRequest,
) -> Result<String, ClientError> {
    let dataset = generate_sin_cos_tan_with_drifts(request.rows, request.noise_std, request.seed)
        .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
    let points = dataset.to_data_points();
    let batch_size = request.batch_size.max(1);

    let mut batches = 0;
    for chunk in points.chunks(batch_size) {
        feed_chunk(client, &request.forecaster_id, chunk)?;
        batches += 1;
    }
    tracing::info!(
        forecaster_id = %request.forecaster_id,
        rows = points.len(),
        batches,
        "replayed synthetic dataset"
    );

    let forecast = match client.forecast(&request.forecaster_id) {
        Ok(prediction) => Some(prediction),
        Err(ClientError::NotReady { .. }) => None,
        Err(err) => return Err(err),
    };

    let report = ReplayReport {
        forecaster_id: request.forecaster_id,
        rows_fed: points.len(),
        batches,
        forecast,
    };

    serde_json::to_string(&report).map_err(|err| ClientError::InvalidRequest(err.to_string()))
}

fn feed_chunk(
    client: &DriftMindClient,
    forecaster_id: &str,
    chunk: &[DataPoint],
) -> Result<Option<Value>, ClientError> {
    match chunk {
        [point] => client.feed_point(forecaster_id, point),
        batch => client.feed_data(forecaster_id, batch),
    }
}
