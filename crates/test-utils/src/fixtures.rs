//! Common test fixtures for point-data tests.
//!
//! Upstream payloads are modelled on real DMI, HIP and MapTiler responses,
//! trimmed to the fields the clients read.

use point_common::Station;
use serde_json::{json, Value};

/// Danish reference locations (latitude, longitude).
pub mod locations {
    /// Copenhagen city hall square
    pub const COPENHAGEN: (f64, f64) = (55.6761, 12.5683);

    /// Aarhus
    pub const AARHUS: (f64, f64) = (56.1629, 10.2039);

    /// Holstebro, the default map centre
    pub const HOLSTEBRO: (f64, f64) = (56.351, 8.60);

    /// A projected EPSG:25832 point inside a HIP grid cell (not on a corner)
    pub const PROJECTED_INSIDE_CELL: (f64, f64) = (723456.3, 6175234.9);
}

/// Common time ranges in the canonical wire format.
pub mod time {
    pub const FROM: &str = "2019-01-01T00:00:00";
    pub const TO: &str = "2019-01-05T00:00:00";
}

/// A small station catalogue spread over Denmark.
pub fn danish_stations() -> Vec<Station> {
    vec![
        Station::new("06041", 57.7364, 10.6316, ["temp_mean_past1h", "wind_speed"])
            .with_name("Skagen Fyr"),
        Station::new("06072", 56.0955, 10.5135, ["temp_mean_past1h", "precip_past1h"])
            .with_name("Ødum"),
        Station::new(
            "06180",
            55.614,
            12.6455,
            ["temp_mean_past1h", "precip_past1h", "wind_speed"],
        )
        .with_name("Københavns Lufthavn"),
        Station::new("06058", 56.3778, 8.6094, ["precip_past1h"]).with_name("Holstebro"),
    ]
}

/// A DMI station FeatureCollection.
///
/// Contains the stations of [`danish_stations`] plus one feature with no
/// coordinates, which clients must skip.
pub fn dmi_station_collection_json() -> Value {
    let mut features: Vec<Value> = danish_stations()
        .into_iter()
        .map(|s| {
            json!({
                "type": "Feature",
                "id": format!("station-{}", s.id),
                "geometry": { "type": "Point", "coordinates": [s.lon, s.lat] },
                "properties": {
                    "stationId": s.id,
                    "name": s.name,
                    "parameterId": s.supported_parameters,
                    "status": "Active"
                }
            })
        })
        .collect();

    features.push(json!({
        "type": "Feature",
        "id": "station-99999",
        "geometry": null,
        "properties": {
            "stationId": "99999",
            "name": "Decommissioned",
            "parameterId": ["temp_mean_past1h"]
        }
    }));

    json!({
        "type": "FeatureCollection",
        "numberReturned": features.len(),
        "features": features
    })
}

/// A DMI climate `stationValue` FeatureCollection with hourly values.
pub fn dmi_station_values_json(station_id: &str, parameter: &str, values: &[f64]) -> Value {
    let features: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(hour, value)| {
            json!({
                "type": "Feature",
                "properties": {
                    "stationId": station_id,
                    "parameterId": parameter,
                    "from": format!("2019-01-01T{:02}:00:00Z", hour),
                    "to": format!("2019-01-01T{:02}:00:00Z", hour + 1),
                    "timeResolution": "hour",
                    "value": value
                }
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "numberReturned": features.len(),
        "features": features
    })
}

/// A HIP v1 shallow-groundwater response for one grid tile.
pub fn hip_groundwater_json(actual_x: f64, actual_y: f64, dates: &[String], depths: &[f64]) -> Value {
    let days: Vec<Value> = dates
        .iter()
        .zip(depths)
        .map(|(date, depth)| json!({ "dato": date, "dybde": depth }))
        .collect();

    json!({
        "tileId": 4711,
        "kote": 23.4,
        "geometry": format!("POINT({} {})", actual_x, actual_y),
        "resultater": { "dag": days }
    })
}

/// A MapTiler coordinate transform response.
pub fn maptiler_transform_json(x: f64, y: f64) -> Value {
    json!({
        "results": [{ "x": x, "y": y, "z": 0 }],
        "transformer_selection_strategy": "auto"
    })
}
