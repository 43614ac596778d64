//! AMap-backed tools: geocoding, driving route planning, static route maps.

use super::{ProviderContext, Tool};
use crate::format::{render_geocode, render_route, render_static_map};
use crate::provider::amap::{fetch_geocode, fetch_route, fetch_static_map};
use crate::request;
use crate::schema::{GeocodeArgs, RouteArgs, StaticMapArgs};
use crate::types::ContentEnvelope;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct GeocodeTool {
    ctx: ProviderContext,
}

impl GeocodeTool {
    pub const NAME: &'static str = "get-lating-and-longitude";

    pub fn new(ctx: ProviderContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GeocodeTool {
    type Args = GeocodeArgs;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "(获取经纬度) 根据给定的地址获取经纬度坐标"
    }

    async fn run(&self, args: GeocodeArgs) -> ContentEnvelope {
        let req = request::geocode(&self.ctx.config, &args);
        let outcome = fetch_geocode(&self.ctx.transport, &req).await;
        outcome.log(Self::NAME);
        render_geocode(&args, outcome, self.ctx.config.render_policy)
    }
}

#[derive(Debug, Clone)]
pub struct RoutePlanTool {
    ctx: ProviderContext,
}

impl RoutePlanTool {
    pub const NAME: &'static str = "route-planning";

    pub fn new(ctx: ProviderContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for RoutePlanTool {
    type Args = RouteArgs;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "(路径规划) 根据起始点经纬度获取路径规划，返回规划的路径信息的描述和对应的规划路径的经纬度坐标集合，以便后续将路径规划绘制成图"
    }

    async fn run(&self, args: RouteArgs) -> ContentEnvelope {
        let req = request::route_plan(&self.ctx.config, &args);
        let outcome = fetch_route(&self.ctx.transport, &req).await;
        outcome.log(Self::NAME);
        render_route(&args, outcome, self.ctx.config.render_policy)
    }
}

#[derive(Debug, Clone)]
pub struct StaticMapTool {
    ctx: ProviderContext,
}

impl StaticMapTool {
    pub const NAME: &'static str = "draw-route";

    pub fn new(ctx: ProviderContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for StaticMapTool {
    type Args = StaticMapArgs;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "(路径绘图) 接收路径规划的一系列路径点坐标数据，返回一张base64编码的路径绘图"
    }

    async fn run(&self, args: StaticMapArgs) -> ContentEnvelope {
        let req = request::static_map(&self.ctx.config, &args);
        let outcome = fetch_static_map(&self.ctx.transport, &req).await;
        outcome.log(Self::NAME);
        render_static_map(&args, outcome, self.ctx.config.render_policy)
    }
}
