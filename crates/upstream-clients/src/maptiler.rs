//! MapTiler coordinate transform client.

use async_trait::async_trait;
use point_common::{Point, PointDataError, PointDataResult};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::instrument;

use crate::config::MapTilerConfig;
use crate::http::{endpoint, get_json};

const SERVICE: &str = "Coordinate";

/// WGS 84 geographic
pub const SOURCE_EPSG: u32 = 4326;

/// ETRS89 / UTM zone 32N
pub const TARGET_EPSG: u32 = 25832;

#[derive(Debug, Clone, Deserialize)]
pub struct TransformResponse {
    pub results: Vec<TransformResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformResult {
    pub x: f64,
    pub y: f64,
}

impl TransformResponse {
    /// First result as a projected point (`x` = easting, `y` = northing).
    pub fn first_point(&self) -> PointDataResult<Point> {
        self.results
            .first()
            .map(|r| Point::new(r.x, r.y))
            .ok_or_else(|| PointDataError::malformed_payload(SERVICE, "empty results"))
    }
}

/// Projects WGS 84 positions to EPSG:25832.
#[async_trait]
pub trait CoordinateTransform: Send + Sync {
    async fn to_projected(&self, latitude: f64, longitude: f64) -> PointDataResult<Point>;
}

#[derive(Clone)]
pub struct MapTilerClient {
    client: Client,
    config: MapTilerConfig,
}

impl MapTilerClient {
    pub fn new(client: Client, config: MapTilerConfig) -> Self {
        Self { client, config }
    }

    /// Longitude goes first in the path.
    pub fn transform_url(&self, latitude: f64, longitude: f64) -> PointDataResult<Url> {
        let mut url = endpoint(
            &self.config.base_url,
            &format!("coordinates/transform/{},{}.json", longitude, latitude),
        )?;
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("s_srs", &SOURCE_EPSG.to_string())
            .append_pair("t_srs", &TARGET_EPSG.to_string());
        Ok(url)
    }

    /// Project a WGS 84 position to EPSG:25832.
    #[instrument(skip(self))]
    pub async fn transform(&self, latitude: f64, longitude: f64) -> PointDataResult<Point> {
        let response: TransformResponse =
            get_json(&self.client, SERVICE, self.transform_url(latitude, longitude)?).await?;
        response.first_point()
    }
}

#[async_trait]
impl CoordinateTransform for MapTilerClient {
    async fn to_projected(&self, latitude: f64, longitude: f64) -> PointDataResult<Point> {
        self.transform(latitude, longitude).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::decode;
    use test_utils::maptiler_transform_json;

    #[test]
    fn test_transform_url_puts_longitude_first() {
        let client = MapTilerClient::new(
            Client::new(),
            MapTilerConfig {
                base_url: "https://maptiler.test".to_string(),
                api_key: "k".to_string(),
            },
        );
        let url = client.transform_url(56.351, 8.6).unwrap();
        assert_eq!(
            url.as_str(),
            "https://maptiler.test/coordinates/transform/8.6,56.351.json?key=k&s_srs=4326&t_srs=25832"
        );
    }

    #[test]
    fn test_decode_first_result() {
        let body = serde_json::to_vec(&maptiler_transform_json(723456.3, 6175234.9)).unwrap();
        let response: TransformResponse = decode(SERVICE, &body).unwrap();
        assert_eq!(response.first_point().unwrap(), Point::new(723456.3, 6175234.9));
    }

    #[test]
    fn test_empty_results_is_malformed() {
        let response: TransformResponse = decode(SERVICE, br#"{"results":[]}"#).unwrap();
        assert_eq!(response.first_point().unwrap_err().http_status_code(), 502);
    }
}
