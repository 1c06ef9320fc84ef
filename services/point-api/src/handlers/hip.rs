//! HIP groundwater handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use point_common::{
    InterpolationMode, InterpolationResult, Point, PointDataError, TileId, TimeRange,
};
use serde::{Deserialize, Serialize};

use super::common::{
    bad_request, error_response, parse_number, point_data_error_response, present, ErrorMessage,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundwaterParams {
    /// Easting in EPSG:25832
    pub x: Option<String>,
    /// Northing in EPSG:25832
    pub y: Option<String>,
    pub from_time: Option<String>,
    pub to_time: Option<String>,
    pub interpolation: Option<String>,
}

/// Groundwater depth series at a point.
#[derive(Debug, Serialize)]
pub struct GroundwaterResponse {
    #[serde(rename = "tileId")]
    pub tile_id: Option<TileId>,
    /// Terrain elevation of the answering tile
    pub kote: Option<f64>,
    pub request_point: Point,
    pub actual_point: Point,
    pub dates: Vec<String>,
    pub depths: Vec<f64>,
    pub interpolation: InterpolationMode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub corners: Vec<Point>,
}

impl From<InterpolationResult> for GroundwaterResponse {
    fn from(result: InterpolationResult) -> Self {
        Self {
            tile_id: result.tile_id,
            kote: result.elevation,
            request_point: result.requested_point,
            actual_point: result.resolved_point,
            dates: result.dates,
            depths: result.values,
            interpolation: result.interpolation_mode,
            corners: result.corners,
        }
    }
}

/// Validate the query, reporting every bad field at once.
fn parse_request(
    params: &GroundwaterParams,
) -> Result<(Point, TimeRange, InterpolationMode), Response> {
    let (Some(x), Some(y), Some(from_time), Some(to_time)) = (
        present(&params.x),
        present(&params.y),
        present(&params.from_time),
        present(&params.to_time),
    ) else {
        return Err(bad_request(
            "Missing required parameters (x, y, fromTime, toTime)",
        ));
    };

    let mut errors = Vec::new();
    let x = parse_number("x", x, &mut errors);
    let y = parse_number("y", y, &mut errors);

    let range = match TimeRange::parse(from_time, to_time) {
        Ok(range) => Some(range),
        Err(PointDataError::Validation(messages)) => {
            errors.extend(messages);
            None
        }
        Err(e) => return Err(point_data_error_response(e)),
    };

    let mode = match present(&params.interpolation).map(str::parse::<InterpolationMode>) {
        None => Some(InterpolationMode::default()),
        Some(Ok(mode)) => Some(mode),
        Some(Err(PointDataError::Validation(messages))) => {
            errors.extend(messages);
            None
        }
        Some(Err(e)) => return Err(point_data_error_response(e)),
    };

    match (x, y, range, mode) {
        (Some(x), Some(y), Some(range), Some(mode)) if errors.is_empty() => {
            Ok((Point::new(x, y), range, mode))
        }
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            ErrorMessage::Many(errors),
        )),
    }
}

/// GET /api/hip/groundwater
pub async fn groundwater_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<GroundwaterParams>,
) -> Response {
    let (point, range, mode) = match parse_request(&params) {
        Ok(request) => request,
        Err(response) => return response,
    };

    counter!("interpolations_total", "mode" => mode.as_str()).increment(1);

    match state.groundwater.interpolate(point, &range, mode).await {
        Ok(result) => Json(GroundwaterResponse::from(result)).into_response(),
        Err(e) => point_data_error_response(e),
    }
}
