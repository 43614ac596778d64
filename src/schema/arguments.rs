//! Typed arguments, one struct per tool. Doc comments become the schema's
//! property descriptions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastArgs {
    /// Location name (e.g. '杭州')
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeArgs {
    /// Address name (e.g. '杭州')
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RouteArgs {
    /// Source's Coordinates (e.g. '116.397,39.909')
    pub source: String,
    /// Destination's Coordinates (e.g. '116.397,39.909')
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StaticMapArgs {
    /// Route planning's paths data (e.g. '10,0x0000ff,1,,:116.31604,39.96491;116.320816,39.966606;116.321785,39.966827;116.32361,39.966957')
    pub paths: String,
}
