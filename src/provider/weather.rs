//! Seniverse `/v3/weather/daily.json`.
//!
//! Only the fields the forecast text needs are decoded, all leniently: a body
//! that parses but lacks one of them is an empty result, not a transport failure.

use super::{lenient_string, HttpTransport, Outcome};
use crate::error::TransportError;
use crate::request::ProviderRequest;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub results: Option<Vec<WeatherResult>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherResult {
    #[serde(default)]
    pub daily: Vec<DailyRecord>,
}

/// One day as sent. Seniverse sends numbers as strings; either is accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text_day: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub high: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub low: Option<String>,
}

impl DailyRecord {
    /// `None` unless every rendered field is present.
    pub fn complete(self) -> Option<DailyForecast> {
        Some(DailyForecast {
            date: self.date?,
            text_day: self.text_day?,
            high: self.high?,
            low: self.low?,
        })
    }
}

/// One complete day of forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyForecast {
    pub date: String,
    pub text_day: String,
    pub high: String,
    pub low: String,
}

/// First result's first day, or `EmptyResult` when either list is missing or
/// empty, or that day lacks a rendered field.
pub fn classify_forecast(
    response: Result<WeatherResponse, TransportError>,
) -> Outcome<DailyForecast> {
    let response = match response {
        Ok(r) => r,
        Err(e) => return Outcome::TransportFailed(e),
    };
    response
        .results
        .and_then(|results| results.into_iter().next())
        .and_then(|first| first.daily.into_iter().next())
        .and_then(DailyRecord::complete)
        .map(Outcome::Success)
        .unwrap_or(Outcome::EmptyResult)
}

pub async fn fetch_forecast(
    transport: &HttpTransport,
    req: &ProviderRequest,
) -> Outcome<DailyForecast> {
    classify_forecast(transport.fetch_json(req).await)
}
