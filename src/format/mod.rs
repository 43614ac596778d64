//! 响应格式化：把归类后的结果渲染为统一的内容信封（总是成功，从不为空）。
//!
//! Response formatter.
//!
//! `render_*` functions are total: every [`Outcome`] yields exactly one
//! non-empty [`ContentEnvelope`]. Failure text follows two templates:
//!
//! - transport failure: `Failed to retrieve <subject> <resource>`
//! - empty result: `Retrieved <subject> <resource> error`
//!
//! How a provider rejection reads is a [`RenderPolicy`] decision.

use crate::provider::{DailyForecast, Geocode, MapImage, Outcome, Rejection, RouteStep};
use crate::schema::{ForecastArgs, GeocodeArgs, RouteArgs, StaticMapArgs};
use crate::types::{ContentBlock, ContentEnvelope};
use crate::{Error, ErrorContext};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ROUTE_STEPS_LABEL: &str = "路径规划描述: ";
pub const ROUTE_POLYLINES_LABEL: &str = "路径规划的经纬度坐标集合: ";

/// How `ProviderRejected` is worded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPolicy {
    /// Same text as a transport failure.
    #[default]
    Collapse,
    /// Transport-failure text plus the provider's status and info.
    Distinguish,
}

impl FromStr for RenderPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collapse" => Ok(RenderPolicy::Collapse),
            "distinguish" => Ok(RenderPolicy::Distinguish),
            other => Err(Error::configuration_with_context(
                format!("unknown render policy '{}'", other),
                ErrorContext::new()
                    .with_field_path("render_policy")
                    .with_details("expected 'collapse' or 'distinguish'"),
            )),
        }
    }
}

/// What a failure message talks about: the echoed input and the resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub subject: String,
    pub resource: &'static str,
}

impl Subject {
    pub fn forecast(args: &ForecastArgs) -> Self {
        Self {
            subject: args.location.clone(),
            resource: "weather data",
        }
    }

    pub fn geocode(args: &GeocodeArgs) -> Self {
        Self {
            subject: args.address.clone(),
            resource: "lating and longitude",
        }
    }

    pub fn route(args: &RouteArgs) -> Self {
        Self {
            subject: format!("{} and {}", args.source, args.destination),
            resource: "route plan",
        }
    }

    pub fn static_map(args: &StaticMapArgs) -> Self {
        Self {
            subject: args.paths.clone(),
            resource: "route plan",
        }
    }

    pub fn failed_text(&self) -> String {
        format!("Failed to retrieve {} {}", self.subject, self.resource)
    }

    pub fn empty_text(&self) -> String {
        format!("Retrieved {} {} error", self.subject, self.resource)
    }

    pub fn rejected_text(&self, rejection: &Rejection, policy: RenderPolicy) -> String {
        match policy {
            RenderPolicy::Collapse => self.failed_text(),
            RenderPolicy::Distinguish => {
                let status = if rejection.status.is_empty() {
                    "missing"
                } else {
                    rejection.status.as_str()
                };
                match rejection.info.as_deref().filter(|i| !i.is_empty()) {
                    Some(info) => format!(
                        "{} (provider status {}: {})",
                        self.failed_text(),
                        status,
                        info
                    ),
                    None => format!("{} (provider status {})", self.failed_text(), status),
                }
            }
        }
    }
}

/// Shared skeleton: failures become one error-flagged text block, success goes to `on_success`.
pub fn render<T, F>(
    subject: &Subject,
    outcome: Outcome<T>,
    policy: RenderPolicy,
    on_success: F,
) -> ContentEnvelope
where
    F: FnOnce(T) -> ContentEnvelope,
{
    match outcome {
        Outcome::Success(payload) => on_success(payload),
        Outcome::EmptyResult => ContentEnvelope::error_text(subject.empty_text()),
        Outcome::ProviderRejected(r) => {
            ContentEnvelope::error_text(subject.rejected_text(&r, policy))
        }
        Outcome::TransportFailed(_) => ContentEnvelope::error_text(subject.failed_text()),
    }
}

pub fn render_forecast(
    args: &ForecastArgs,
    outcome: Outcome<DailyForecast>,
    policy: RenderPolicy,
) -> ContentEnvelope {
    render(&Subject::forecast(args), outcome, policy, |day| {
        ContentEnvelope::text(format!(
            "{}{}天气：{} {}°C ~ {}°C",
            args.location, day.date, day.text_day, day.low, day.high
        ))
    })
}

pub fn render_geocode(
    args: &GeocodeArgs,
    outcome: Outcome<Geocode>,
    policy: RenderPolicy,
) -> ContentEnvelope {
    render(&Subject::geocode(args), outcome, policy, |geo| {
        ContentEnvelope::text(format!(
            "{} lating and longitude is {}",
            args.address, geo.location
        ))
    })
}

/// Two blocks: step instructions, then step polylines, both in step order.
pub fn render_route(
    args: &RouteArgs,
    outcome: Outcome<Vec<RouteStep>>,
    policy: RenderPolicy,
) -> ContentEnvelope {
    render(&Subject::route(args), outcome, policy, |steps| {
        let instructions = steps
            .iter()
            .map(|s| s.instruction.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n");
        let polylines = steps
            .iter()
            .map(|s| s.polyline.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n");
        ContentEnvelope::new(
            ContentBlock::text(format!("{}\n{}", ROUTE_STEPS_LABEL, instructions)),
            [ContentBlock::text(format!(
                "{}\n{}",
                ROUTE_POLYLINES_LABEL, polylines
            ))],
        )
    })
}

pub fn render_static_map(
    args: &StaticMapArgs,
    outcome: Outcome<MapImage>,
    policy: RenderPolicy,
) -> ContentEnvelope {
    render(&Subject::static_map(args), outcome, policy, |img| {
        ContentEnvelope::single(ContentBlock::image_from_bytes(&img.bytes, img.media_type))
    })
}
