//! Shared HTTP plumbing: client construction, status mapping, JSON decoding.

use std::time::Duration;

use metrics::counter;
use point_common::{PointDataError, PointDataResult};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Build the pooled client shared by every upstream.
pub fn build_client(timeout: Duration) -> PointDataResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(8)
        .tcp_nodelay(true)
        .build()
        .map_err(|e| PointDataError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// GET `url` and decode the JSON body into `T`.
///
/// Only the URL path is logged; query strings carry API keys.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    service: &'static str,
    url: Url,
) -> PointDataResult<T> {
    counter!("upstream_requests_total", "service" => service).increment(1);
    debug!(service, path = url.path(), "Upstream request");

    let result = fetch(client, service, url).await;
    if let Err(ref e) = result {
        counter!("upstream_errors_total", "service" => service).increment(1);
        warn!(service, error = %e, "Upstream request failed");
    }
    result
}

async fn fetch<T: DeserializeOwned>(
    client: &Client,
    service: &'static str,
    url: Url,
) -> PointDataResult<T> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(service, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(service, status));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(service, e))?;

    decode(service, &body)
}

/// Decode a JSON body, mapping schema mismatches to a 502.
pub fn decode<T: DeserializeOwned>(service: &str, body: &[u8]) -> PointDataResult<T> {
    serde_json::from_slice(body).map_err(|e| PointDataError::malformed_payload(service, e))
}

/// Non-success upstream status, forwarded as-is.
pub fn status_error(service: &str, status: StatusCode) -> PointDataError {
    let reason = status.canonical_reason().unwrap_or("Unknown Status");
    PointDataError::upstream(status.as_u16(), format!("{} API Error: {}", service, reason))
}

fn transport_error(service: &str, err: reqwest::Error) -> PointDataError {
    // Never include the URL; it contains the key
    let err = err.without_url();
    if err.is_timeout() {
        PointDataError::upstream(504, format!("{} API timed out", service))
    } else {
        PointDataError::upstream(502, format!("{} API unreachable: {}", service, err))
    }
}

/// Join `path` onto a configured base URL.
pub fn endpoint(base_url: &str, path: &str) -> PointDataResult<Url> {
    let joined = format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse(&joined)
        .map_err(|e| PointDataError::Config(format!("Invalid upstream URL '{}': {}", base_url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_forwards_status() {
        let err = status_error("DMI", StatusCode::FORBIDDEN);
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(
            err,
            PointDataError::upstream(403, "DMI API Error: Forbidden")
        );
    }

    #[test]
    fn test_decode_mismatch_is_bad_gateway() {
        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            results: Vec<f64>,
        }

        let err = decode::<Expected>("MapTiler", br#"{"message":"Invalid key"}"#).unwrap_err();
        assert_eq!(err.http_status_code(), 502);
        assert!(err.to_string().contains("MapTiler API returned a malformed payload"));
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let url = endpoint("https://example.org/", "/v2/metObs").unwrap();
        assert_eq!(url.as_str(), "https://example.org/v2/metObs");

        assert!(endpoint("not a url", "x").is_err());
    }
}
