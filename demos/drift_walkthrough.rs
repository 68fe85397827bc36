use driftmind_sdk::{
    generate_sin_cos_tan_with_drifts, ClientError, Credentials, DriftMindClient,
};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "driftmind_sdk=info".into()),
        )
        .init();

    // Pass a credentials file path, or rely on DRIFTMIND_API_KEY / DRIFTMIND_API_URL.
    let credentials = match std::env::args().nth(1) {
        Some(path) => Credentials::load(path)?,
        None => Credentials::from_env()?,
    };
    let client = DriftMindClient::from_credentials(&credentials)?;

    println!("🚀 Creating forecaster at {}...", client.base_url());
    let created = client.create_forecaster(&json!({
        "features": ["Sin", "Cos", "Tan"],
        "timestamp": "Sequence",
    }))?;
    let forecaster_id = created
        .as_ref()
        .and_then(|body| body["forecasterId"].as_str())
        .ok_or("service did not return a forecasterId")?
        .to_string();
    println!("✅ Forecaster {forecaster_id} created");

    let dataset = generate_sin_cos_tan_with_drifts(600, 0.0, 42)?;
    println!("📊 Feeding {} synthetic rows...", dataset.len());
    for point in dataset.to_data_points() {
        client.feed_point(&forecaster_id, &point)?;
    }

    match client.forecast(&forecaster_id) {
        Ok(prediction) => println!("{}", serde_json::to_string_pretty(&prediction)?),
        Err(ClientError::NotReady { .. }) => println!("⏳ No forecast available yet"),
        Err(err) => {
            eprintln!("❌ Forecast failed: {err}");
            std::process::exit(1);
        }
    }

    let stored = client.get_forecaster_data(&forecaster_id)?;
    println!("🗂️  Forecaster holds {} timestamps", stored.len());

    Ok(())
}
