//! 网关配置：服务商密钥、端点与静态地图参数（启动时加载，运行期只读）。
//!
//! Gateway configuration.
//!
//! Built once at startup from defaults, an optional YAML file and the
//! environment (in that order of precedence), validated, then shared read-only
//! as `Arc<GatewayConfig>`. Nothing mutates it per request.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SENIVERSE_API_KEY` | `weather.api_key` |
//! | `SENIVERSE_BASE_URL` | `weather.base_url` |
//! | `AMAP_API_KEY` | `amap.api_key` |
//! | `AMAP_BASE_URL` | `amap.base_url` |
//! | `GEOWEATHER_HTTP_TIMEOUT_SECS` | `http.timeout_secs` |
//! | `GEOWEATHER_RENDER_POLICY` | `render_policy` (`collapse` / `distinguish`) |

use crate::format::RenderPolicy;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Env var naming the optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "GEOWEATHER_MCP_CONFIG";

const DEFAULT_WEATHER_URL: &str = "https://api.seniverse.com/v3/weather/daily.json";
const DEFAULT_AMAP_BASE_URL: &str = "https://restapi.amap.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub weather: WeatherConfig,
    pub amap: AmapConfig,
    pub http: HttpConfig,
    pub render_policy: RenderPolicy,
}

/// Seniverse daily forecast endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Full URL of the daily forecast endpoint.
    pub base_url: String,
    pub api_key: String,
    pub language: String,
    pub unit: String,
    pub start: u32,
    pub days: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
            api_key: String::new(),
            language: "zh-Hans".to_string(),
            unit: "c".to_string(),
            start: 0,
            days: 1,
        }
    }
}

/// AMap web service: one key for geocoding, driving routes and static maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmapConfig {
    pub base_url: String,
    pub api_key: String,
    pub geocode_path: String,
    pub driving_path: String,
    pub static_map_path: String,
    pub static_map: StaticMapConfig,
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AMAP_BASE_URL.to_string(),
            api_key: String::new(),
            geocode_path: "/v3/geocode/geo".to_string(),
            driving_path: "/v5/direction/driving".to_string(),
            static_map_path: "/v3/staticmap".to_string(),
            static_map: StaticMapConfig::default(),
        }
    }
}

impl AmapConfig {
    /// Join `base_url` and an endpoint path without doubling the slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Rendering parameters for `/v3/staticmap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticMapConfig {
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    pub scale: u8,
}

impl Default for StaticMapConfig {
    fn default() -> Self {
        Self {
            zoom: 11,
            width: 1024,
            height: 800,
            scale: 2,
        }
    }
}

impl StaticMapConfig {
    /// AMap's `size` parameter: `<width>*<height>`.
    pub fn size_param(&self) -> String {
        format!("{}*{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Upper bound on a single provider call; hitting it is a transport failure.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl GatewayConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env(|k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Full startup load: YAML file (explicit path, else `GEOWEATHER_MCP_CONFIG`), then env.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok();
        let path = path.or(env_path.as_deref().map(Path::new));
        let mut cfg = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from an env-like lookup. Empty values are ignored except
    /// for API keys, where empty means "no key".
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("SENIVERSE_API_KEY") {
            self.weather.api_key = key.trim().to_string();
        }
        if let Some(url) = non_empty(lookup("SENIVERSE_BASE_URL")) {
            self.weather.base_url = url;
        }
        if let Some(key) = lookup("AMAP_API_KEY") {
            self.amap.api_key = key.trim().to_string();
        }
        if let Some(url) = non_empty(lookup("AMAP_BASE_URL")) {
            self.amap.base_url = url;
        }
        if let Some(raw) = non_empty(lookup("GEOWEATHER_HTTP_TIMEOUT_SECS")) {
            self.http.timeout_secs = raw.parse::<u64>().map_err(|_| {
                Error::configuration_with_context(
                    format!("timeout must be a whole number of seconds, got '{}'", raw),
                    ErrorContext::new()
                        .with_field_path("http.timeout_secs")
                        .with_source("GEOWEATHER_HTTP_TIMEOUT_SECS"),
                )
            })?;
        }
        if let Some(raw) = non_empty(lookup("GEOWEATHER_RENDER_POLICY")) {
            self.render_policy = raw.parse()?;
        }
        Ok(())
    }

    /// Reject unusable endpoints up front. Missing keys only warn: the call is
    /// still attempted and the provider rejects it.
    pub fn validate(&self) -> Result<()> {
        check_url(&self.weather.base_url, "weather.base_url")?;
        check_url(&self.amap.base_url, "amap.base_url")?;
        if self.http.timeout_secs == 0 {
            return Err(Error::validation_with_context(
                "timeout must be at least one second",
                ErrorContext::new()
                    .with_field_path("http.timeout_secs")
                    .with_source("config_validator"),
            ));
        }
        if self.weather.api_key.is_empty() {
            tracing::warn!("SENIVERSE_API_KEY is empty; weather requests will be rejected upstream");
        }
        if self.amap.api_key.is_empty() {
            tracing::warn!("AMAP_API_KEY is empty; AMap requests will be rejected upstream");
        }
        Ok(())
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn check_url(raw: &str, field: &str) -> Result<()> {
    let parsed = url::Url::parse(raw).map_err(|e| {
        Error::validation_with_context(
            format!("invalid URL '{}': {}", raw, e),
            ErrorContext::new()
                .with_field_path(field)
                .with_source("config_validator"),
        )
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::validation_with_context(
            format!("unsupported URL scheme '{}'", other),
            ErrorContext::new()
                .with_field_path(field)
                .with_source("config_validator"),
        )),
    }
}
