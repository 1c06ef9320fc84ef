//! MapTiler coordinate transform handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use upstream_clients::CoordinateTransform;

use super::common::{
    bad_request, error_response, parse_number, point_data_error_response, present, ErrorMessage,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TransformParams {
    pub longitude: Option<String>,
    pub latitude: Option<String>,
}

/// GET /api/maptiler/transform
///
/// Returns `{x, y}` as easting and northing in EPSG:25832.
pub async fn transform_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<TransformParams>,
) -> Response {
    let (Some(longitude), Some(latitude)) =
        (present(&params.longitude), present(&params.latitude))
    else {
        return bad_request("Missing required parameters (long, lat)");
    };

    let mut errors = Vec::new();
    let longitude = parse_number("longitude", longitude, &mut errors);
    let latitude = parse_number("latitude", latitude, &mut errors);
    let (Some(longitude), Some(latitude)) = (longitude, latitude) else {
        return error_response(StatusCode::BAD_REQUEST, ErrorMessage::Many(errors));
    };

    match state.coordinates.to_projected(latitude, longitude).await {
        Ok(point) => Json(point).into_response(),
        Err(e) => point_data_error_response(e),
    }
}
