//! DMI handlers: station catalogues, closest station and climate values.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use point_common::time::{format_instant, parse_instant};
use point_common::{datetime_argument, Point, StationApi};
use point_processor::{
    find_closest_index, find_closest_with_distance, parse_parameter_list, StationSource,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use upstream_clients::dmi::DEFAULT_VALUE_LIMIT;
use upstream_clients::{ClimateValuesQuery, DmiApi, StationValueCollection};

use super::common::{
    bad_request, error_response, parse_number, point_data_error_response, present, ErrorMessage,
};
use crate::state::AppState;

const DEFAULT_TIME_RESOLUTION: &str = "hour";

fn parse_api(api: &Option<String>) -> Result<StationApi, Response> {
    present(api)
        .unwrap_or_default()
        .parse::<StationApi>()
        .map_err(point_data_error_response)
}

// =============================================================================
// Stations
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StationsParams {
    pub api: Option<String>,
}

/// GET /api/dmi/stations
pub async fn stations_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<StationsParams>,
) -> Response {
    let api = match parse_api(&params.api) {
        Ok(api) => api,
        Err(response) => return response,
    };

    match state.dmi.station_collection(api).await {
        Ok(collection) => Json(collection).into_response(),
        Err(e) => point_data_error_response(e),
    }
}

// =============================================================================
// Closest station
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ClosestStationParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub params: Option<String>,
    pub api: Option<String>,
}

/// GET /api/dmi/closest-station
///
/// Responds with the chosen station's feature as DMI served it.
pub async fn closest_station_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ClosestStationParams>,
) -> Response {
    let (Some(latitude), Some(longitude)) = (present(&params.latitude), present(&params.longitude))
    else {
        return bad_request("Missing latitude or longitude");
    };

    let mut errors = Vec::new();
    let latitude = parse_number("latitude", latitude, &mut errors);
    let longitude = parse_number("longitude", longitude, &mut errors);
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return error_response(StatusCode::BAD_REQUEST, ErrorMessage::Many(errors));
    };

    let api = match parse_api(&params.api) {
        Ok(api) => api,
        Err(response) => return response,
    };
    let required = params
        .params
        .as_deref()
        .map(parse_parameter_list)
        .unwrap_or_default();

    let collection = match state.dmi.station_collection(api).await {
        Ok(collection) => collection,
        Err(e) => return point_data_error_response(e),
    };
    let (features, stations) = collection.located();

    let Some((index, dist)) =
        find_closest_index(Point::new(latitude, longitude), &stations, &required)
    else {
        return error_response(
            StatusCode::NOT_FOUND,
            ErrorMessage::One("No suitable station found".to_string()),
        );
    };
    debug!(station = %stations[index].id, dist_km = dist, "Closest station");

    Json(features[index].clone()).into_response()
}

// =============================================================================
// Climate data
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateDataParams {
    pub parameter: Option<String>,
    pub station_id: Option<String>,
    pub from_time: Option<String>,
    pub to_time: Option<String>,
    pub time_resolution: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Parse optional `fromTime`/`toTime` into the DMI `datetime` argument.
fn datetime_from_params(
    from: &Option<String>,
    to: &Option<String>,
    errors: &mut Vec<String>,
) -> String {
    let mut instant = |name: &str, value: &Option<String>| {
        let value = present(value)?;
        let parsed = parse_instant(value);
        if parsed.is_none() {
            errors.push(format!("Parameter '{}' must be a valid datetime", name));
        }
        parsed
    };

    let from = instant("fromTime", from);
    let to = instant("toTime", to);
    datetime_argument(from, to, Utc::now())
}

fn parse_count(name: &str, value: &Option<String>, default: u32, errors: &mut Vec<String>) -> u32 {
    match present(value) {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|_| {
            errors.push(format!("Parameter '{}' must be a non-negative integer", name));
            default
        }),
    }
}

/// GET /api/dmi/climate-data
pub async fn climate_data_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ClimateDataParams>,
) -> Response {
    let (Some(parameter), Some(station_id)) =
        (present(&params.parameter), present(&params.station_id))
    else {
        return bad_request("Missing required parameters (parameter, stationId)");
    };

    let mut errors = Vec::new();
    let mut query = ClimateValuesQuery::new(parameter, station_id);
    query.datetime = datetime_from_params(&params.from_time, &params.to_time, &mut errors);
    query.limit = parse_count("limit", &params.limit, DEFAULT_VALUE_LIMIT, &mut errors);
    query.offset = parse_count("offset", &params.offset, 0, &mut errors);
    if let Some(resolution) = present(&params.time_resolution) {
        query.time_resolution = resolution.to_string();
    }
    if !errors.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, ErrorMessage::Many(errors));
    }

    match state.dmi.station_values(&query).await {
        Ok(values) => Json(values).into_response(),
        Err(e) => point_data_error_response(e),
    }
}

// =============================================================================
// Aggregated data
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDataParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub params: Option<String>,
    pub from_time: Option<String>,
    pub to_time: Option<String>,
    pub time_resolution: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct GetDataResponse {
    pub parameters: Vec<ParameterValues>,
    pub stations: Vec<ParameterStation>,
}

#[derive(Debug, Serialize)]
pub struct ParameterValues {
    pub parameter: String,
    /// `{time_stamp, <parameter>: value}` per observation
    pub values: Vec<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct ParameterStation {
    pub par: String,
    pub id: String,
    pub dist: f64,
    pub lat: f64,
    pub lon: f64,
}

/// Key each observation by its parameter name.
fn observations(parameter: &str, values: &StationValueCollection) -> Vec<Map<String, Value>> {
    values
        .features
        .iter()
        .map(|feature| {
            let props = &feature.properties;
            let time_stamp = parse_instant(&props.to)
                .map(|dt| format_instant(&dt))
                .unwrap_or_else(|| props.to.clone());

            let mut entry = Map::new();
            entry.insert("time_stamp".to_string(), Value::String(time_stamp));
            entry.insert(
                parameter.to_string(),
                props.value.map(Value::from).unwrap_or(Value::Null),
            );
            entry
        })
        .collect()
}

/// Parameters in request order, without blanks or repeats.
fn requested_parameters(list: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty() && seen.insert(p.to_string()))
        .map(str::to_string)
        .collect()
}

/// GET /api/dmi/get-data
///
/// For each parameter, the closest climate station reporting it and that
/// station's values. Parameters that fail are skipped.
pub async fn get_data_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<GetDataParams>,
) -> Response {
    let (Some(lat), Some(lng), Some(list)) = (
        present(&params.lat),
        present(&params.lng),
        present(&params.params),
    ) else {
        return bad_request("Missing required parameters (lat, lng, params)");
    };

    let mut errors = Vec::new();
    let lat = parse_number("lat", lat, &mut errors);
    let lng = parse_number("lng", lng, &mut errors);
    let datetime = datetime_from_params(&params.from_time, &params.to_time, &mut errors);
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return error_response(StatusCode::BAD_REQUEST, ErrorMessage::Many(errors));
    };
    if !errors.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, ErrorMessage::Many(errors));
    }

    let stations = match state.dmi.find_stations(StationApi::Climate).await {
        Ok(stations) => stations,
        Err(e) => return point_data_error_response(e),
    };

    let mut result = GetDataResponse::default();
    for parameter in requested_parameters(list) {
        let required = BTreeSet::from([parameter.clone()]);
        let Some((station, dist)) =
            find_closest_with_distance(Point::new(lat, lng), &stations, &required)
        else {
            warn!("Failed to find station for parameter {}", parameter);
            continue;
        };

        result.stations.push(ParameterStation {
            par: parameter.clone(),
            id: station.id.clone(),
            dist,
            lat: station.lat,
            lon: station.lon,
        });

        let mut query = ClimateValuesQuery::new(parameter.as_str(), station.id.as_str());
        query.datetime = datetime.clone();
        if let Some(resolution) = present(&params.time_resolution) {
            query.time_resolution = resolution.to_string();
        }

        let values = match state.dmi.station_values(&query).await {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to get data for parameter {} at station {}",
                    parameter,
                    station.id
                );
                continue;
            }
        };

        if !values.features.is_empty() {
            result.parameters.push(ParameterValues {
                values: observations(&parameter, &values),
                parameter,
            });
        }
    }

    Json(result).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::dmi_station_values_json;

    #[test]
    fn test_requested_parameters_keep_order() {
        assert_eq!(
            requested_parameters("b, a,,b ,c"),
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_observations_are_keyed_by_parameter() {
        let values: StationValueCollection =
            serde_json::from_value(dmi_station_values_json("06180", "mean_temp", &[4.5])).unwrap();

        let entries = observations("mean_temp", &values);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["time_stamp"], "2019-01-01T01:00:00.000Z");
        assert_eq!(entries[0]["mean_temp"], 4.5);
    }

    #[test]
    fn test_datetime_from_params() {
        let mut errors = Vec::new();
        let arg = datetime_from_params(
            &Some("2019-01-01T00:00:00".to_string()),
            &Some("2019-01-02".to_string()),
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(arg, "2019-01-01T00:00:00.000Z/2019-01-02T00:00:00.000Z");

        let arg = datetime_from_params(&None, &None, &mut errors);
        assert_eq!(arg, "");

        datetime_from_params(&Some("yesterday".to_string()), &None, &mut errors);
        assert_eq!(errors, vec!["Parameter 'fromTime' must be a valid datetime"]);
    }

    #[test]
    fn test_parse_count() {
        let mut errors = Vec::new();
        assert_eq!(parse_count("limit", &None, 200000, &mut errors), 200000);
        assert_eq!(parse_count("limit", &Some("10".into()), 200000, &mut errors), 10);
        assert_eq!(parse_count("offset", &Some("-1".into()), 0, &mut errors), 0);
        assert_eq!(errors.len(), 1);
    }
}
