//! Clients for the upstream open-data APIs.
//!
//! - [`DmiClient`]: DMI station catalogues and climate station values
//! - [`HipClient`]: HIP shallow-groundwater depth per 100 m grid tile
//! - [`MapTilerClient`]: EPSG:4326 → EPSG:25832 coordinate transforms
//!
//! Every payload is decoded into typed structs at this boundary; bodies that
//! do not match the expected schema surface as
//! [`PointDataError::UpstreamHttp`](point_common::PointDataError) instead of
//! failing later on a missing field. API keys come from [`UpstreamConfig`]
//! and are never logged.

pub mod config;
pub mod dmi;
pub mod hip;
pub mod http;
pub mod maptiler;

pub use config::{DmiConfig, HipConfig, MapTilerConfig, UpstreamConfig};
pub use dmi::{
    ClimateValuesQuery, DmiApi, DmiClient, StationCollection, StationFeature,
    StationValueCollection,
};
pub use hip::{parse_wkt_point, HipClient};
pub use maptiler::{CoordinateTransform, MapTilerClient};

use point_common::PointDataResult;

/// All upstream clients, sharing one connection pool.
#[derive(Clone)]
pub struct UpstreamClients {
    pub dmi: DmiClient,
    pub hip: HipClient,
    pub maptiler: MapTilerClient,
}

impl UpstreamClients {
    pub fn new(config: UpstreamConfig) -> PointDataResult<Self> {
        let client = http::build_client(config.timeout)?;
        Ok(Self {
            dmi: DmiClient::new(client.clone(), config.dmi),
            hip: HipClient::new(client.clone(), config.hip),
            maptiler: MapTilerClient::new(client, config.maptiler),
        })
    }
}
