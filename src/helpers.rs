use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::dto::ClientError;

pub(crate) const JSON_MEDIA_TYPE: &str = "application/json";
pub(crate) const AUTH_HEADER: &str = "Auth";

pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Build `{base}/forecaster/{id}/{leaf}` with `forecaster_id` encoded as a
/// single path segment, so ids containing `/`, `?` or `#` cannot change the
/// route.
pub(crate) fn forecaster_url(
    base_url: &str,
    forecaster_id: &str,
    leaf: &str,
) -> Result<Url, ClientError> {
    let mut url = Url::parse(base_url).map_err(|err| {
        ClientError::InvalidRequest(format!("invalid base url {base_url}: {err}"))
    })?;
    url.path_segments_mut()
        .map_err(|_| {
            ClientError::InvalidRequest(format!("base url {base_url} cannot hold a path"))
        })?
        .pop_if_empty()
        .extend(["forecaster", forecaster_id, leaf]);
    Ok(url)
}

/// Decode a response body that may legitimately be absent.
///
/// Whitespace-only bodies count as absent and yield `Ok(None)`. Anything else
/// must be valid JSON for `T`, otherwise [`ClientError::MalformedBody`] is
/// returned with the response status attached.
pub(crate) fn decode_optional_body<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<Option<T>, ClientError> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(body)
        .map(Some)
        .map_err(|err| ClientError::MalformedBody {
            status,
            message: err.to_string(),
        })
}

pub(crate) fn decode_required_body<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<T, ClientError> {
    decode_optional_body(status, body)?.ok_or(ClientError::EmptyBody { status })
}
