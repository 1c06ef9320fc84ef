//! Nearest-station lookup.

use std::collections::BTreeSet;

use point_common::{Point, Station};

/// Earth diameter used by the haversine distance, in km.
pub const EARTH_DIAMETER_KM: f64 = 12742.0;

/// Great-circle distance between two lat/lon pairs in km (haversine).
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p = std::f64::consts::PI / 180.0;
    let a = 0.5 - ((lat2 - lat1) * p).cos() / 2.0
        + (lat1 * p).cos() * (lat2 * p).cos() * (1.0 - ((lon2 - lon1) * p).cos()) / 2.0;
    EARTH_DIAMETER_KM * a.sqrt().asin()
}

/// Split a comma separated parameter list, dropping blanks.
pub fn parse_parameter_list(params: &str) -> BTreeSet<String> {
    params
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Find the station closest to `point` (`x` = latitude, `y` = longitude)
/// that reports every parameter in `required`.
///
/// Returns `None` when nothing qualifies. Ties go to the candidate that
/// comes first.
pub fn find_closest<'a>(
    point: Point,
    candidates: &'a [Station],
    required: &BTreeSet<String>,
) -> Option<&'a Station> {
    find_closest_with_distance(point, candidates, required).map(|(station, _)| station)
}

/// Like [`find_closest`], also returning the distance in km.
pub fn find_closest_with_distance<'a>(
    point: Point,
    candidates: &'a [Station],
    required: &BTreeSet<String>,
) -> Option<(&'a Station, f64)> {
    find_closest_index(point, candidates, required).map(|(index, dist)| (&candidates[index], dist))
}

/// Position of the closest qualifying candidate in `candidates`, and its
/// distance in km.
///
/// Station ids are not unique in a catalogue, so callers mapping the result
/// back to their own records should go by position.
pub fn find_closest_index(
    point: Point,
    candidates: &[Station],
    required: &BTreeSet<String>,
) -> Option<(usize, f64)> {
    let mut closest: Option<(usize, f64)> = None;

    for (index, station) in candidates.iter().enumerate() {
        if !station.supports_all(required) {
            continue;
        }

        let dist = great_circle_distance(point.x, point.y, station.lat, station.lon);
        match closest {
            Some((_, best)) if dist >= best => {}
            _ if dist.is_nan() => {}
            _ => closest = Some((index, dist)),
        }
    }

    closest
}
