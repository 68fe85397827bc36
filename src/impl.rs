use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{IntoUrl, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::helpers::{self, AUTH_HEADER, JSON_MEDIA_TYPE};
use crate::{ClientError, Credentials, DataPoint, FeedRequest, ForecasterData};

/// Blocking client for the DriftMind forecaster resource.
///
/// The client only holds connection parameters. Each operation issues exactly
/// one request, performs no retries, and reports failures as
/// [`ClientError`] variants. Forecaster state lives entirely on the server.
pub struct DriftMindClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl DriftMindClient {
    /// Construct a client with a default blocking `reqwest` transport.
    ///
    /// Trailing slashes on `base_url` are stripped. Fails with
    /// [`ClientError::Transport`] if the transport cannot be built.
    ///
    /// ```no_run
    /// use driftmind_sdk::DriftMindClient;
    ///
    /// let client = DriftMindClient::new("my-api-key", "https://api.example.com/forecasters/")?;
    /// assert_eq!(client.base_url(), "https://api.example.com/forecasters");
    /// # Ok::<(), driftmind_sdk::ClientError>(())
    /// ```
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, api_key, base_url))
    }

    /// Build a client around a pre-configured transport.
    ///
    /// Use this when you need timeouts, proxies, or a mock server. Timeouts are
    /// never configured by the client itself.
    ///
    /// ```no_run
    /// use driftmind_sdk::DriftMindClient;
    /// use reqwest::blocking::Client;
    ///
    /// let transport = Client::builder().timeout(std::time::Duration::from_secs(10)).build()?;
    /// let client =
    ///     DriftMindClient::with_client(transport, "my-api-key", "https://api.example.com");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_client(
        client: Client,
        api_key: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: helpers::normalize_base_url(base_url.as_ref()),
        }
    }

    /// Construct a client from loaded [`Credentials`] using the default
    /// transport.
    ///
    /// ```no_run
    /// use driftmind_sdk::{Credentials, DriftMindClient};
    ///
    /// let credentials = Credentials::load("resources/DRIFTMIND_CONNECT.txt")?;
    /// let client = DriftMindClient::from_credentials(&credentials)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_credentials(credentials: &Credentials) -> Result<Self, ClientError> {
        Self::new(credentials.api_key.clone(), &credentials.api_url)
    }

    /// Base resource URL with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Raw key sent in the `Auth` header of every request.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Create a forecaster from a service-defined configuration payload.
    ///
    /// Returns `Ok(Some(body))` for `200`/`201` with a JSON body and
    /// `Ok(None)` when the forecaster was created but the body is empty.
    pub fn create_forecaster<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<Option<Value>, ClientError> {
        let request = self.with_json(self.client.post(&self.base_url), payload)?;
        let (status, body) = self.execute(request)?;

        if status == StatusCode::OK || status == StatusCode::CREATED {
            let created = helpers::decode_optional_body(status.as_u16(), &body).inspect_err(
                |err| tracing::warn!(error = %err, "forecaster created with an undecodable body"),
            )?;
            if created.is_none() {
                tracing::warn!(
                    status = status.as_u16(),
                    "forecaster created without a JSON body"
                );
            }
            return Ok(created);
        }

        Err(unexpected_status(status, body, "forecaster creation failed"))
    }

    /// Fetch the configuration of a forecaster.
    ///
    /// `404` maps to [`ClientError::NotFound`]; an empty `200` response maps to
    /// [`ClientError::EmptyBody`].
    pub fn get_forecaster_details(&self, forecaster_id: &str) -> Result<Value, ClientError> {
        let url = helpers::forecaster_url(&self.base_url, forecaster_id, "details")?;
        self.fetch_forecaster_resource(forecaster_id, url, "forecaster details")
    }

    /// Append one data point or a batch of data points to a forecaster.
    ///
    /// `data` is sent verbatim as the `data` field of the request body, so a
    /// single [`DataPoint`] and a `Vec<DataPoint>` are both accepted. Only
    /// `200` counts as success; the acknowledgement body is returned when the
    /// service sends one.
    pub fn feed_data<T: Serialize + ?Sized>(
        &self,
        forecaster_id: &str,
        data: &T,
    ) -> Result<Option<Value>, ClientError> {
        let payload = FeedRequest { forecaster_id, data };
        let request = self.with_json(self.client.patch(&self.base_url), &payload)?;
        let (status, body) = self.execute(request)?;

        if status == StatusCode::OK {
            return helpers::decode_optional_body(status.as_u16(), &body).inspect_err(|err| {
                tracing::warn!(forecaster_id, error = %err, "feed acknowledgement undecodable")
            });
        }

        Err(unexpected_status(status, body, "data feeding failed"))
    }

    /// Convenience wrapper around [`DriftMindClient::feed_data`] for a single
    /// point.
    pub fn feed_point(
        &self,
        forecaster_id: &str,
        point: &DataPoint,
    ) -> Result<Option<Value>, ClientError> {
        self.feed_data(forecaster_id, point)
    }

    /// Request a forecast.
    ///
    /// `204` means the forecaster has not produced a prediction yet and maps to
    /// [`ClientError::NotReady`].
    pub fn forecast(&self, forecaster_id: &str) -> Result<Value, ClientError> {
        let url = helpers::forecaster_url(&self.base_url, forecaster_id, "predict")?;
        let (status, body) = self.execute(self.get(url))?;

        match status {
            StatusCode::OK => helpers::decode_required_body(status.as_u16(), &body).inspect_err(
                |err| tracing::warn!(forecaster_id, error = %err, "forecast body unusable"),
            ),
            StatusCode::NO_CONTENT => {
                tracing::warn!(forecaster_id, "no forecast available yet");
                Err(ClientError::NotReady {
                    forecaster_id: forecaster_id.to_string(),
                })
            }
            _ => Err(unexpected_status(status, body, "forecast request failed")),
        }
    }

    /// Fetch the data points currently stored by a forecaster, keyed by
    /// timestamp.
    pub fn get_forecaster_data(&self, forecaster_id: &str) -> Result<ForecasterData, ClientError> {
        let url = helpers::forecaster_url(&self.base_url, forecaster_id, "data")?;
        self.fetch_forecaster_resource(forecaster_id, url, "forecaster data")
    }

    /// List every forecaster visible to the API key.
    ///
    /// An empty `200` response yields an empty list.
    pub fn list_forecasters(&self) -> Result<Vec<Value>, ClientError> {
        let (status, body) = self.execute(self.get(self.base_url.as_str()))?;

        if status == StatusCode::OK {
            let listed = helpers::decode_optional_body(status.as_u16(), &body).inspect_err(
                |err| tracing::warn!(error = %err, "forecaster list could not be decoded"),
            )?;
            return Ok(listed.unwrap_or_else(|| {
                tracing::warn!("no forecasters returned in body");
                Vec::new()
            }));
        }

        Err(unexpected_status(status, body, "failed to list forecasters"))
    }

    fn fetch_forecaster_resource<T: serde::de::DeserializeOwned>(
        &self,
        forecaster_id: &str,
        url: reqwest::Url,
        resource: &'static str,
    ) -> Result<T, ClientError> {
        let (status, body) = self.execute(self.get(url))?;

        match status {
            StatusCode::OK => {
                helpers::decode_required_body(status.as_u16(), &body).inspect_err(|err| {
                    tracing::warn!(forecaster_id, resource, error = %err, "response body unusable")
                })
            }
            StatusCode::NOT_FOUND => {
                tracing::warn!(forecaster_id, resource, "forecaster not found");
                Err(ClientError::NotFound {
                    forecaster_id: forecaster_id.to_string(),
                })
            }
            _ => Err(unexpected_status(status, body, "failed to fetch forecaster resource")),
        }
    }

    fn get(&self, url: impl IntoUrl) -> RequestBuilder {
        self.client.get(url)
    }

    fn with_json<T: Serialize + ?Sized>(
        &self,
        request: RequestBuilder,
        payload: &T,
    ) -> Result<RequestBuilder, ClientError> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
        Ok(request.header(CONTENT_TYPE, JSON_MEDIA_TYPE).body(body))
    }

    fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String), ClientError> {
        let response = request
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .header(AUTH_HEADER, self.api_key.as_str())
            .send()?;
        let status = response.status();
        let body = response.text()?;
        Ok((status, body))
    }
}

fn unexpected_status(status: StatusCode, body: String, context: &'static str) -> ClientError {
    tracing::error!(status = status.as_u16(), body = %body, "{context}");
    ClientError::Status {
        status: status.as_u16(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::json;

    const API_KEY: &str = "test-key";

    fn build_client(server: &MockServer) -> DriftMindClient {
        let transport = Client::builder().build().unwrap();
        DriftMindClient::with_client(transport, API_KEY, server.url("/forecasters/"))
    }

    #[test]
    fn base_url_trailing_slashes_are_stripped() {
        let transport = Client::builder().build().unwrap();
        let client =
            DriftMindClient::with_client(transport, API_KEY, "https://api.example.com/v1///");

        assert_eq!(client.base_url(), "https://api.example.com/v1");
        assert_eq!(client.api_key(), API_KEY);
    }

    #[test]
    fn create_forecaster_posts_payload_with_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/forecasters")
                .header("auth", API_KEY)
                .header("accept", "application/json")
                .header("content-type", "application/json")
                .json_body(json!({ "features": ["Sin", "Cos", "Tan"] }));
            then.status(201).json_body(json!({ "forecasterId": "fc-1" }));
        });

        let client = build_client(&server);
        let created = client
            .create_forecaster(&json!({ "features": ["Sin", "Cos", "Tan"] }))
            .expect("creation should succeed");

        mock.assert();
        assert_eq!(created, Some(json!({ "forecasterId": "fc-1" })));
    }

    #[test]
    fn create_forecaster_accepts_empty_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/forecasters");
            then.status(200);
        });

        let client = build_client(&server);
        let created = client.create_forecaster(&json!({})).expect("empty body is not an error");

        mock.assert();
        assert!(created.is_none());
    }

    #[test]
    fn create_forecaster_reports_status_and_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/forecasters");
            then.status(400).body("bad config");
        });

        let client = build_client(&server);
        let err = client.create_forecaster(&json!({})).unwrap_err();

        mock.assert();
        assert!(matches!(
            err,
            ClientError::Status { status: 400, ref body } if body == "bad config"
        ));
        assert!(err.is_no_value());
    }

    #[test]
    fn create_forecaster_flags_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/forecasters");
            then.status(201).body("<html>created</html>");
        });

        let client = build_client(&server);
        let err = client.create_forecaster(&json!({})).unwrap_err();

        assert!(matches!(err, ClientError::MalformedBody { status: 201, .. }));
    }

    #[test]
    fn details_returns_parsed_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/forecasters/forecaster/fc-1/details")
                .header("auth", API_KEY);
            then.status(200).json_body(json!({ "id": "fc-1", "window": 30 }));
        });

        let client = build_client(&server);
        let details = client.get_forecaster_details("fc-1").unwrap();

        mock.assert();
        assert_eq!(details["window"], 30);
    }

    #[test]
    fn details_maps_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/forecasters/forecaster/missing/details");
            then.status(404);
        });

        let client = build_client(&server);
        let err = client.get_forecaster_details("missing").unwrap_err();

        assert!(matches!(
            err,
            ClientError::NotFound { ref forecaster_id } if forecaster_id == "missing"
        ));
    }

    #[test]
    fn details_empty_body_is_distinct_from_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/forecasters/forecaster/fc-1/details");
            then.status(200);
        });

        let client = build_client(&server);
        let err = client.get_forecaster_details("fc-1").unwrap_err();

        assert!(matches!(err, ClientError::EmptyBody { status: 200 }));
    }

    #[test]
    fn feed_data_wraps_point_with_forecaster_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/forecasters")
                .header("content-type", "application/json")
                .json_body(json!({ "forecasterId": "fc-1", "data": { "Sin": 0.25 } }));
            then.status(200).json_body(json!(true));
        });

        let client = build_client(&server);
        let point = DataPoint::from([("Sin".to_string(), 0.25)]);
        let ack = client.feed_point("fc-1", &point).unwrap();

        mock.assert();
        assert_eq!(ack, Some(json!(true)));
    }

    #[test]
    fn feed_data_sends_batches_as_arrays() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH).path("/forecasters").json_body(json!({
                "forecasterId": "fc-1",
                "data": [{ "Sin": 0.0 }, { "Sin": 1.0 }]
            }));
            then.status(200).json_body(json!({ "accepted": 2 }));
        });

        let client = build_client(&server);
        let batch = vec![
            DataPoint::from([("Sin".to_string(), 0.0)]),
            DataPoint::from([("Sin".to_string(), 1.0)]),
        ];
        let ack = client.feed_data("fc-1", &batch).unwrap();

        mock.assert();
        assert_eq!(ack, Some(json!({ "accepted": 2 })));
    }

    #[test]
    fn feed_data_rejects_non_ok_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PATCH).path("/forecasters");
            then.status(201).body("created?");
        });

        let client = build_client(&server);
        let err = client.feed_data("fc-1", &json!({})).unwrap_err();

        assert!(matches!(err, ClientError::Status { status: 201, .. }));
    }

    #[test]
    fn forecast_maps_no_content_to_not_ready() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/forecasters/forecaster/fc-1/predict");
            then.status(204);
        });

        let client = build_client(&server);
        let err = client.forecast("fc-1").unwrap_err();

        mock.assert();
        assert!(matches!(err, ClientError::NotReady { .. }));
        assert_eq!(err.status(), Some(204));
    }

    #[test]
    fn forecast_reports_server_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/forecasters/forecaster/fc-1/predict");
            then.status(503).body("warming up");
        });

        let client = build_client(&server);
        let err = client.forecast("fc-1").unwrap_err();

        assert!(matches!(
            err,
            ClientError::Status { status: 503, ref body } if body == "warming up"
        ));
    }

    #[test]
    fn details_and_data_report_server_errors_with_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/forecasters/forecaster/fc-1/details");
            then.status(500).body("details exploded");
        });
        server.mock(|when, then| {
            when.method(GET).path("/forecasters/forecaster/fc-1/data");
            then.status(502).body("bad gateway");
        });

        let client = build_client(&server);
        let details_err = client.get_forecaster_details("fc-1").unwrap_err();
        let data_err = client.get_forecaster_data("fc-1").unwrap_err();

        assert!(matches!(
            details_err,
            ClientError::Status { status: 500, ref body } if body == "details exploded"
        ));
        assert!(matches!(
            data_err,
            ClientError::Status { status: 502, ref body } if body == "bad gateway"
        ));
    }

    #[test]
    fn data_empty_body_is_reported() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/forecasters/forecaster/fc-1/data");
            then.status(200);
        });

        let client = build_client(&server);
        let err = client.get_forecaster_data("fc-1").unwrap_err();

        mock.assert();
        assert!(matches!(err, ClientError::EmptyBody { status: 200 }));
        assert!(err.is_no_value());
    }

    #[test]
    fn get_requests_carry_no_content_type() {
        let server = MockServer::start();
        let with_content_type = server.mock(|when, then| {
            when.method(GET).header_exists("content-type");
            then.status(400).body("unexpected content-type");
        });
        let details = server.mock(|when, then| {
            when.method(GET)
                .path("/forecasters/forecaster/fc-1/details")
                .header("accept", "application/json")
                .header("auth", API_KEY);
            then.status(200).json_body(json!({ "id": "fc-1" }));
        });
        let listing = server.mock(|when, then| {
            when.method(GET).path("/forecasters");
            then.status(200).json_body(json!([]));
        });

        let client = build_client(&server);
        client.get_forecaster_details("fc-1").unwrap();
        client.list_forecasters().unwrap();

        with_content_type.assert_hits(0);
        details.assert();
        listing.assert();
    }

    #[test]
    fn data_is_decoded_by_timestamp() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/forecasters/forecaster/fc-1/data");
            then.status(200).json_body(json!({
                "0": { "Sin": 0.0, "Cos": 0.6 },
                "1": { "Sin": 0.12, "Cos": 0.59 }
            }));
        });

        let client = build_client(&server);
        let data = client.get_forecaster_data("fc-1").unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data["1"]["Cos"], 0.59);
    }

    #[test]
    fn data_with_unexpected_shape_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/forecasters/forecaster/fc-1/data");
            then.status(200).json_body(json!(["not", "a", "map"]));
        });

        let client = build_client(&server);
        let err = client.get_forecaster_data("fc-1").unwrap_err();

        assert!(matches!(err, ClientError::MalformedBody { status: 200, .. }));
    }

    #[test]
    fn list_returns_empty_for_blank_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/forecasters");
            then.status(200).body("");
        });

        let client = build_client(&server);

        assert!(client.list_forecasters().unwrap().is_empty());
    }

    #[test]
    fn list_reports_failures() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/forecasters");
            then.status(401).body("invalid key");
        });

        let client = build_client(&server);
        let err = client.list_forecasters().unwrap_err();

        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn transport_failures_are_not_no_value() {
        let transport = Client::builder().build().unwrap();
        let client = DriftMindClient::with_client(transport, API_KEY, "http://127.0.0.1:9");

        let err = client.list_forecasters().unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
        assert!(!err.is_no_value());
    }
}
