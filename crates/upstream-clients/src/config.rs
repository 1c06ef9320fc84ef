//! Upstream endpoints and credentials.

use std::time::Duration;

pub const DEFAULT_DMI_BASE_URL: &str = "https://dmigw.govcloud.dk";
pub const DEFAULT_HIP_BASE_URL: &str = "https://api.dataforsyningen.dk";
pub const DEFAULT_MAPTILER_BASE_URL: &str = "https://api.maptiler.com";

/// DMI open-data gateway. Climate and observation APIs use separate keys.
#[derive(Debug, Clone)]
pub struct DmiConfig {
    pub base_url: String,
    pub climate_api_key: String,
    pub metobs_api_key: String,
}

/// Dataforsyningen HIP hydrology model.
#[derive(Debug, Clone)]
pub struct HipConfig {
    pub base_url: String,
    pub api_key: String,
}

/// MapTiler coordinates API.
#[derive(Debug, Clone)]
pub struct MapTilerConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Configuration for all upstream clients.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub dmi: DmiConfig,
    pub hip: HipConfig,
    pub maptiler: MapTilerConfig,
    /// Per-request timeout
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Config against the public endpoints with the given keys.
    pub fn with_keys(
        dmi_climate_key: impl Into<String>,
        dmi_metobs_key: impl Into<String>,
        hip_key: impl Into<String>,
        maptiler_key: impl Into<String>,
    ) -> Self {
        Self {
            dmi: DmiConfig {
                base_url: DEFAULT_DMI_BASE_URL.to_string(),
                climate_api_key: dmi_climate_key.into(),
                metobs_api_key: dmi_metobs_key.into(),
            },
            hip: HipConfig {
                base_url: DEFAULT_HIP_BASE_URL.to_string(),
                api_key: hip_key.into(),
            },
            maptiler: MapTilerConfig {
                base_url: DEFAULT_MAPTILER_BASE_URL.to_string(),
                api_key: maptiler_key.into(),
            },
            timeout: Duration::from_secs(30),
        }
    }
}
