//! 请求构建：把强类型参数映射为服务商 HTTP 请求（纯函数，无副作用）。
//!
//! Request builder.
//!
//! One pure function per tool. Each returns a [`ProviderRequest`]: a base URL
//! plus an ordered parameter list. Values are percent-encoded only when the
//! request is turned into a [`Url`], so the parameter identities and their
//! order stay inspectable.

use crate::config::GatewayConfig;
use crate::error::TransportError;
use crate::schema::{ForecastArgs, GeocodeArgs, RouteArgs, StaticMapArgs};
use reqwest::Method;
use url::Url;

const REDACTED: &str = "***";

/// A fully-formed outbound call. No body; every input travels in the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub method: Method,
    pub base_url: String,
    pub params: Vec<(&'static str, String)>,
}

impl ProviderRequest {
    fn get(base_url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            base_url: base_url.into(),
            params: Vec::new(),
        }
    }

    fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// First value for `name`, if present.
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parameter names in send order.
    pub fn param_names(&self) -> Vec<&'static str> {
        self.params.iter().map(|(k, _)| *k).collect()
    }

    /// Serialize to a URL with every value percent-encoded.
    pub fn url(&self) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            TransportError::Other(format!("invalid provider URL '{}': {}", self.base_url, e))
        })?;
        url.query_pairs_mut()
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    /// URL safe for logs: the `key` parameter is masked.
    pub fn redacted_url(&self) -> String {
        let masked = Self {
            method: self.method.clone(),
            base_url: self.base_url.clone(),
            params: self
                .params
                .iter()
                .map(|(k, v)| {
                    if *k == "key" {
                        (*k, REDACTED.to_string())
                    } else {
                        (*k, v.clone())
                    }
                })
                .collect(),
        };
        masked
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|_| self.base_url.clone())
    }
}

/// `GET <weather>?key&location&language&unit&start&days`
pub fn weather_forecast(cfg: &GatewayConfig, args: &ForecastArgs) -> ProviderRequest {
    let w = &cfg.weather;
    ProviderRequest::get(&w.base_url)
        .param("key", &w.api_key)
        .param("location", &args.location)
        .param("language", &w.language)
        .param("unit", &w.unit)
        .param("start", w.start.to_string())
        .param("days", w.days.to_string())
}

/// `GET <amap>/v3/geocode/geo?key&address`
pub fn geocode(cfg: &GatewayConfig, args: &GeocodeArgs) -> ProviderRequest {
    ProviderRequest::get(cfg.amap.endpoint(&cfg.amap.geocode_path))
        .param("key", &cfg.amap.api_key)
        .param("address", &args.address)
}

/// `GET <amap>/v5/direction/driving?origin&destination&key&show_fields=polyline`
pub fn route_plan(cfg: &GatewayConfig, args: &RouteArgs) -> ProviderRequest {
    ProviderRequest::get(cfg.amap.endpoint(&cfg.amap.driving_path))
        .param("origin", &args.source)
        .param("destination", &args.destination)
        .param("key", &cfg.amap.api_key)
        .param("show_fields", "polyline")
}

/// `GET <amap>/v3/staticmap?zoom&size&paths&key&scale`
pub fn static_map(cfg: &GatewayConfig, args: &StaticMapArgs) -> ProviderRequest {
    let m = &cfg.amap.static_map;
    ProviderRequest::get(cfg.amap.endpoint(&cfg.amap.static_map_path))
        .param("zoom", m.zoom.to_string())
        .param("size", m.size_param())
        .param("paths", &args.paths)
        .param("key", &cfg.amap.api_key)
        .param("scale", m.scale.to_string())
}
