//! Service configuration: CORS origins and upstream credentials.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use upstream_clients::{
    config::{DEFAULT_DMI_BASE_URL, DEFAULT_HIP_BASE_URL, DEFAULT_MAPTILER_BASE_URL},
    DmiConfig, HipConfig, MapTilerConfig, UpstreamConfig,
};

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";

/// Raw settings as read from the command line and environment.
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    pub allowed_origins: String,
    pub dmi_api_key_climate: String,
    pub dmi_api_key_metobs: String,
    pub hip_api_key: String,
    pub maptiler_api_key: String,
    pub dmi_base_url: Option<String>,
    pub hip_base_url: Option<String>,
    pub maptiler_base_url: Option<String>,
    pub upstream_timeout_secs: u64,
}

/// Validated service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub allowed_origins: Vec<String>,
    pub upstream: UpstreamConfig,
}

impl ServiceConfig {
    pub fn from_settings(settings: ServiceSettings) -> Result<Self> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("DMI_API_KEY_CLIMATE", &settings.dmi_api_key_climate),
            ("DMI_API_KEY_METOBS", &settings.dmi_api_key_metobs),
            ("HIP_API_KEY", &settings.hip_api_key),
            ("MAPTILER_API_KEY", &settings.maptiler_api_key),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            bail!("Missing required API keys: {}", missing.join(", "));
        }

        let allowed_origins = parse_origins(&settings.allowed_origins);
        if allowed_origins.is_empty() {
            bail!("ALLOWED_ORIGINS must name at least one origin");
        }

        let upstream = UpstreamConfig {
            dmi: DmiConfig {
                base_url: base_url(settings.dmi_base_url, DEFAULT_DMI_BASE_URL),
                climate_api_key: settings.dmi_api_key_climate,
                metobs_api_key: settings.dmi_api_key_metobs,
            },
            hip: HipConfig {
                base_url: base_url(settings.hip_base_url, DEFAULT_HIP_BASE_URL),
                api_key: settings.hip_api_key,
            },
            maptiler: MapTilerConfig {
                base_url: base_url(settings.maptiler_base_url, DEFAULT_MAPTILER_BASE_URL),
                api_key: settings.maptiler_api_key,
            },
            timeout: Duration::from_secs(settings.upstream_timeout_secs.max(1)),
        };

        Ok(Self {
            allowed_origins,
            upstream,
        })
    }

    /// CORS restricted to the configured origins, GET only.
    pub fn cors_layer(&self) -> Result<CorsLayer> {
        let origins = self
            .allowed_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET]))
    }
}

fn base_url(configured: Option<String>, default: &str) -> String {
    configured
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Split a comma separated origin list.
pub fn parse_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
