//! 服务商适配：发出一次 HTTP 调用，并把结果归类为固定的结果种类。
//!
//! Provider adapter.
//!
//! Every provider call ends in exactly one [`Outcome`]:
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `Success` | Usable payload |
//! | `EmptyResult` | Well-formed response with nothing in it |
//! | `ProviderRejected` | Well-formed response carrying a non-success status |
//! | `TransportFailed` | No response, non-2xx status, timeout, or undecodable body |
//!
//! One attempt per call. There is no retry and no cache.

pub mod amap;
pub mod transport;
pub mod weather;

pub use amap::{Geocode, MapImage, RouteStep};
pub use transport::{FetchedBody, HttpTransport};
pub use weather::DailyForecast;

use crate::error::TransportError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Strings, numbers as strings, anything else (`[]`, `null`, objects) as absent.
pub(crate) fn lenient_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Provider-declared failure: the opaque status plus any message it sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: String,
    pub info: Option<String>,
}

#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    EmptyResult,
    ProviderRejected(Rejection),
    TransportFailed(TransportError),
}

/// Payload-free discriminant of [`Outcome`], for logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    EmptyResult,
    ProviderRejected,
    TransportFailed,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::EmptyResult => "empty_result",
            OutcomeKind::ProviderRejected => "provider_rejected",
            OutcomeKind::TransportFailed => "transport_failed",
        }
    }
}

impl<T> Outcome<T> {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Success(_) => OutcomeKind::Success,
            Outcome::EmptyResult => OutcomeKind::EmptyResult,
            Outcome::ProviderRejected(_) => OutcomeKind::ProviderRejected,
            Outcome::TransportFailed(_) => OutcomeKind::TransportFailed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::EmptyResult)
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Outcome::TransportFailed(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::EmptyResult => Outcome::EmptyResult,
            Outcome::ProviderRejected(r) => Outcome::ProviderRejected(r),
            Outcome::TransportFailed(e) => Outcome::TransportFailed(e),
        }
    }

    /// Log non-success outcomes at `warn`.
    pub fn log(&self, tool: &str) {
        match self {
            Outcome::Success(_) => tracing::debug!(tool, outcome = "success"),
            Outcome::EmptyResult => tracing::warn!(tool, outcome = "empty_result", "provider returned no data"),
            Outcome::ProviderRejected(r) => tracing::warn!(
                tool,
                outcome = "provider_rejected",
                status = %r.status,
                info = r.info.as_deref().unwrap_or(""),
                "provider rejected request"
            ),
            Outcome::TransportFailed(e) => {
                tracing::warn!(tool, outcome = "transport_failed", error = %e, "provider call failed")
            }
        }
    }
}
