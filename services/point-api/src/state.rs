//! Application state for the point-data API.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use point_processor::{CornerSeriesSource, GridInterpolator};
use upstream_clients::{CoordinateTransform, DmiApi, UpstreamClients};

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// DMI station catalogues and climate values.
    pub dmi: Arc<dyn DmiApi>,

    /// Groundwater series over the HIP grid.
    pub groundwater: GridInterpolator,

    /// WGS 84 → EPSG:25832.
    pub coordinates: Arc<dyn CoordinateTransform>,

    /// Renders `/metrics`; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state backed by the real upstream clients.
    pub fn new(config: &ServiceConfig, prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let clients = UpstreamClients::new(config.upstream.clone())
            .context("Failed to create upstream clients")?;

        let mut state = Self::with_sources(
            Arc::new(clients.dmi),
            Arc::new(clients.hip),
            Arc::new(clients.maptiler),
        );
        state.prometheus = prometheus;
        Ok(state)
    }

    /// Create state over arbitrary capability implementations.
    pub fn with_sources(
        dmi: Arc<dyn DmiApi>,
        groundwater: Arc<dyn CornerSeriesSource>,
        coordinates: Arc<dyn CoordinateTransform>,
    ) -> Self {
        Self {
            dmi,
            groundwater: GridInterpolator::new(groundwater),
            coordinates,
            prometheus: None,
        }
    }
}
