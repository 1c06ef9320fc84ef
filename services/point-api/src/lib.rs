//! Point-data API service library.
//!
//! HTTP proxy in front of the DMI, HIP and MapTiler APIs. Keys stay on the
//! server; the frontend only ever sees the routes assembled in [`app`].

pub mod config;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the router with all routes and middleware.
pub fn app(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        // DMI
        .route("/api/dmi/stations", get(handlers::dmi::stations_handler))
        .route(
            "/api/dmi/closest-station",
            get(handlers::dmi::closest_station_handler),
        )
        .route(
            "/api/dmi/climate-data",
            get(handlers::dmi::climate_data_handler),
        )
        .route("/api/dmi/get-data", get(handlers::dmi::get_data_handler))
        // HIP
        .route(
            "/api/hip/groundwater",
            get(handlers::hip::groundwater_handler),
        )
        // MapTiler
        .route(
            "/api/maptiler/transform",
            get(handlers::maptiler::transform_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
