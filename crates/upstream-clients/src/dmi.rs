//! DMI open-data client: station catalogues and climate station values.

use async_trait::async_trait;
use point_common::{PointDataResult, Station, StationApi};
use point_processor::StationSource;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::config::DmiConfig;
use crate::http::{endpoint, get_json};

const SERVICE: &str = "DMI";

/// Page size used when listing a station catalogue.
pub const STATION_PAGE_LIMIT: u32 = 10_000;

/// Default page size for climate station values.
pub const DEFAULT_VALUE_LIMIT: u32 = 200_000;

// =============================================================================
// Payloads
// =============================================================================

/// GeoJSON point geometry, `[lon, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationProperties {
    pub station_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub parameter_id: Vec<String>,
    /// Remaining DMI properties, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationFeature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub geometry: Option<PointGeometry>,
    pub properties: StationProperties,
}

fn feature_type() -> String {
    "Feature".to_string()
}

impl StationFeature {
    /// Convert to a [`Station`]; `None` when the feature has no usable position.
    pub fn to_station(&self) -> Option<Station> {
        let coords = &self.geometry.as_ref()?.coordinates;
        let (lon, lat) = match coords.as_slice() {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => (*lon, *lat),
            _ => return None,
        };

        let mut station = Station::new(
            self.properties.station_id.clone(),
            lat,
            lon,
            self.properties.parameter_id.iter().cloned(),
        );
        station.name = self.properties.name.clone();
        Some(station)
    }
}

impl From<&Station> for StationFeature {
    fn from(station: &Station) -> Self {
        Self {
            kind: feature_type(),
            id: None,
            geometry: Some(PointGeometry {
                kind: "Point".to_string(),
                coordinates: vec![station.lon, station.lat],
            }),
            properties: StationProperties {
                station_id: station.id.clone(),
                name: station.name.clone(),
                parameter_id: station.supported_parameters.iter().cloned().collect(),
                extra: Map::new(),
            },
        }
    }
}

/// A station catalogue FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<StationFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_returned: Option<u64>,
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}

impl StationCollection {
    /// Stations with coordinates; features without a position are skipped.
    pub fn stations(&self) -> Vec<Station> {
        self.features.iter().filter_map(StationFeature::to_station).collect()
    }

    /// Features with a position, each paired with its station, in catalogue order.
    pub fn located(&self) -> (Vec<&StationFeature>, Vec<Station>) {
        self.features
            .iter()
            .filter_map(|f| f.to_station().map(|s| (f, s)))
            .unzip()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationValueProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationValueFeature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    pub properties: StationValueProperties,
}

/// A climate `stationValue` FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationValueCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<StationValueFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_returned: Option<u64>,
}

// =============================================================================
// Client
// =============================================================================

/// Parameters of a climate station-value query.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateValuesQuery {
    pub parameter: String,
    pub station_id: String,
    /// Pre-built `datetime` argument; empty means unbounded.
    pub datetime: String,
    pub time_resolution: String,
    pub limit: u32,
    pub offset: u32,
}

impl ClimateValuesQuery {
    pub fn new(parameter: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            station_id: station_id.into(),
            datetime: String::new(),
            time_resolution: "hour".to_string(),
            limit: DEFAULT_VALUE_LIMIT,
            offset: 0,
        }
    }
}

/// Raw DMI catalogue and value access, as served to the frontend.
#[async_trait]
pub trait DmiApi: StationSource {
    async fn station_collection(&self, api: StationApi) -> PointDataResult<StationCollection>;

    async fn station_values(
        &self,
        query: &ClimateValuesQuery,
    ) -> PointDataResult<StationValueCollection>;
}

#[derive(Clone)]
pub struct DmiClient {
    client: Client,
    config: DmiConfig,
}

impl DmiClient {
    pub fn new(client: Client, config: DmiConfig) -> Self {
        Self { client, config }
    }

    fn api_key(&self, api: StationApi) -> &str {
        match api {
            StationApi::Climate => &self.config.climate_api_key,
            StationApi::MetObs => &self.config.metobs_api_key,
        }
    }

    pub fn stations_url(&self, api: StationApi) -> PointDataResult<Url> {
        let mut url = endpoint(
            &self.config.base_url,
            &format!("v2/{}/collections/station/items", api.collection_name()),
        )?;
        url.query_pairs_mut()
            .append_pair("api-key", self.api_key(api))
            .append_pair("limit", &STATION_PAGE_LIMIT.to_string())
            .append_pair("offset", "0");
        Ok(url)
    }

    pub fn station_values_url(&self, query: &ClimateValuesQuery) -> PointDataResult<Url> {
        let mut url = endpoint(
            &self.config.base_url,
            "v2/climateData/collections/stationValue/items",
        )?;
        url.query_pairs_mut()
            .append_pair("api-key", self.api_key(StationApi::Climate))
            .append_pair("parameterId", &query.parameter)
            .append_pair("stationId", &query.station_id)
            .append_pair("datetime", &query.datetime)
            .append_pair("timeResolution", &query.time_resolution)
            .append_pair("limit", &query.limit.to_string())
            .append_pair("offset", &query.offset.to_string());
        Ok(url)
    }

    #[instrument(skip(self))]
    async fn fetch_station_collection(&self, api: StationApi) -> PointDataResult<StationCollection> {
        let collection: StationCollection =
            get_json(&self.client, SERVICE, self.stations_url(api)?).await?;
        debug!("Fetched {} station features", collection.features.len());
        Ok(collection)
    }

    #[instrument(skip(self, query), fields(parameter = %query.parameter, station = %query.station_id))]
    async fn fetch_station_values(
        &self,
        query: &ClimateValuesQuery,
    ) -> PointDataResult<StationValueCollection> {
        let values: StationValueCollection =
            get_json(&self.client, SERVICE, self.station_values_url(query)?).await?;
        debug!("Fetched {} station values", values.features.len());
        Ok(values)
    }
}

#[async_trait]
impl StationSource for DmiClient {
    async fn find_stations(&self, api: StationApi) -> PointDataResult<Vec<Station>> {
        Ok(self.fetch_station_collection(api).await?.stations())
    }
}

#[async_trait]
impl DmiApi for DmiClient {
    async fn station_collection(&self, api: StationApi) -> PointDataResult<StationCollection> {
        self.fetch_station_collection(api).await
    }

    async fn station_values(
        &self,
        query: &ClimateValuesQuery,
    ) -> PointDataResult<StationValueCollection> {
        self.fetch_station_values(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::decode;
    use test_utils::{danish_stations, dmi_station_collection_json, dmi_station_values_json};

    fn client() -> DmiClient {
        DmiClient::new(
            Client::new(),
            DmiConfig {
                base_url: "https://dmi.test".to_string(),
                climate_api_key: "climate-key".to_string(),
                metobs_api_key: "metobs-key".to_string(),
            },
        )
    }

    #[test]
    fn test_stations_url_uses_api_specific_key() {
        let url = client().stations_url(StationApi::MetObs).unwrap();
        assert_eq!(
            url.as_str(),
            "https://dmi.test/v2/metObs/collections/station/items?api-key=metobs-key&limit=10000&offset=0"
        );

        let url = client().stations_url(StationApi::Climate).unwrap();
        assert!(url.path().starts_with("/v2/climateData/"));
        assert!(url.query().unwrap().contains("api-key=climate-key"));
    }

    #[test]
    fn test_station_values_url() {
        let mut query = ClimateValuesQuery::new("mean_temp", "06180");
        query.datetime = "2019-01-01T00:00:00.000Z/2019-01-05T00:00:00.000Z".to_string();

        let url = client().station_values_url(&query).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/v2/climateData/collections/stationValue/items");
        assert!(pairs.contains(&("parameterId".into(), "mean_temp".into())));
        assert!(pairs.contains(&("stationId".into(), "06180".into())));
        assert!(pairs.contains(&("timeResolution".into(), "hour".into())));
        assert!(pairs.contains(&("limit".into(), "200000".into())));
        assert!(pairs.contains(&(
            "datetime".into(),
            "2019-01-01T00:00:00.000Z/2019-01-05T00:00:00.000Z".into()
        )));
    }

    #[test]
    fn test_collection_skips_features_without_coordinates() {
        let body = serde_json::to_vec(&dmi_station_collection_json()).unwrap();
        let collection: StationCollection = decode(SERVICE, &body).unwrap();

        assert_eq!(collection.features.len(), 5);
        assert_eq!(collection.stations(), danish_stations());
    }

    #[test]
    fn test_located_pairs_features_with_stations() {
        let body = serde_json::to_vec(&dmi_station_collection_json()).unwrap();
        let collection: StationCollection = decode(SERVICE, &body).unwrap();

        let (features, stations) = collection.located();
        assert_eq!(features.len(), 4);
        for (feature, station) in features.iter().zip(&stations) {
            assert_eq!(feature.properties.station_id, station.id);
        }
    }

    #[test]
    fn test_extra_properties_survive_round_trip() {
        let body = serde_json::to_vec(&dmi_station_collection_json()).unwrap();
        let collection: StationCollection = decode(SERVICE, &body).unwrap();

        let value = serde_json::to_value(&collection.features[0]).unwrap();
        assert_eq!(value["properties"]["status"], "Active");
        assert_eq!(value["properties"]["stationId"], "06041");
    }

    #[test]
    fn test_feature_from_station() {
        let station = &danish_stations()[2];
        let feature = StationFeature::from(station);
        assert_eq!(feature.to_station().as_ref(), Some(station));

        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"]["coordinates"][0], station.lon);
    }

    #[test]
    fn test_station_values_decode() {
        let body = serde_json::to_vec(&dmi_station_values_json("06180", "mean_temp", &[1.5, 2.0]))
            .unwrap();
        let values: StationValueCollection = decode(SERVICE, &body).unwrap();

        assert_eq!(values.features.len(), 2);
        assert_eq!(values.features[1].properties.value, Some(2.0));
        assert_eq!(values.features[1].properties.to, "2019-01-01T02:00:00Z");
    }

    #[test]
    fn test_missing_station_id_is_malformed() {
        let body = br#"{"type":"FeatureCollection","features":[{"properties":{"name":"x"}}]}"#;
        let err = decode::<StationCollection>(SERVICE, body).unwrap_err();
        assert_eq!(err.http_status_code(), 502);
    }
}
