//! AMap web service: geocoding, driving routes, static maps.
//!
//! Geocode and route bodies carry `status`: `"1"` is success, anything else
//! is a provider-level rejection even though HTTP said 200. AMap puts `[]`
//! where a string is absent, so every string field is decoded leniently.

use super::{lenient_string, FetchedBody, HttpTransport, Outcome, Rejection};
use crate::error::TransportError;
use crate::request::ProviderRequest;
use bytes::Bytes;
use serde::Deserialize;

const STATUS_OK: &str = "1";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub info: Option<String>,
    #[serde(default)]
    pub geocodes: Vec<GeocodeRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
}

/// A resolved coordinate pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geocode {
    /// `"<lng>,<lat>"`
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrivingResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub info: Option<String>,
    #[serde(default)]
    pub route: Option<Route>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub paths: Vec<RoutePath>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutePath {
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RouteStep {
    #[serde(default, deserialize_with = "lenient_string")]
    pub instruction: Option<String>,
    /// Only present when the request asked for `show_fields=polyline`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub polyline: Option<String>,
}

/// Rendered map bytes plus the media type the provider declared, if it was an image type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapImage {
    pub bytes: Bytes,
    pub media_type: Option<String>,
}

fn rejection(status: Option<String>, info: Option<String>) -> Option<Rejection> {
    match status.as_deref() {
        Some(STATUS_OK) => None,
        _ => Some(Rejection {
            status: status.unwrap_or_default(),
            info,
        }),
    }
}

/// First geocode's location; a first geocode without one is empty.
pub fn classify_geocode(response: Result<GeocodeResponse, TransportError>) -> Outcome<Geocode> {
    let response = match response {
        Ok(r) => r,
        Err(e) => return Outcome::TransportFailed(e),
    };
    if let Some(r) = rejection(response.status, response.info) {
        return Outcome::ProviderRejected(r);
    }
    response
        .geocodes
        .into_iter()
        .next()
        .and_then(|g| g.location)
        .filter(|location| !location.is_empty())
        .map(|location| Outcome::Success(Geocode { location }))
        .unwrap_or(Outcome::EmptyResult)
}

/// Ordered steps of the first path.
pub fn classify_route(response: Result<DrivingResponse, TransportError>) -> Outcome<Vec<RouteStep>> {
    let response = match response {
        Ok(r) => r,
        Err(e) => return Outcome::TransportFailed(e),
    };
    if let Some(r) = rejection(response.status, response.info) {
        return Outcome::ProviderRejected(r);
    }
    match response
        .route
        .and_then(|route| route.paths.into_iter().next())
    {
        Some(path) if !path.steps.is_empty() => Outcome::Success(path.steps),
        _ => Outcome::EmptyResult,
    }
}

/// Whatever body came back is the image, without looking at its bytes.
pub fn classify_static_map(response: Result<FetchedBody, TransportError>) -> Outcome<MapImage> {
    let body = match response {
        Ok(b) => b,
        Err(e) => return Outcome::TransportFailed(e),
    };
    let media_type = body
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| ct.starts_with("image/"));
    Outcome::Success(MapImage {
        bytes: body.bytes,
        media_type,
    })
}

pub async fn fetch_geocode(transport: &HttpTransport, req: &ProviderRequest) -> Outcome<Geocode> {
    classify_geocode(transport.fetch_json(req).await)
}

pub async fn fetch_route(
    transport: &HttpTransport,
    req: &ProviderRequest,
) -> Outcome<Vec<RouteStep>> {
    classify_route(transport.fetch_json(req).await)
}

pub async fn fetch_static_map(transport: &HttpTransport, req: &ProviderRequest) -> Outcome<MapImage> {
    classify_static_map(transport.fetch(req).await)
}
