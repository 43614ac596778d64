use super::{ProviderContext, Tool};
use crate::format::render_forecast;
use crate::provider::weather::fetch_forecast;
use crate::request;
use crate::schema::ForecastArgs;
use crate::types::ContentEnvelope;
use async_trait::async_trait;

/// `get-forecast`: today's Seniverse forecast for a location.
#[derive(Debug, Clone)]
pub struct ForecastTool {
    ctx: ProviderContext,
}

impl ForecastTool {
    pub const NAME: &'static str = "get-forecast";

    pub fn new(ctx: ProviderContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ForecastTool {
    type Args = ForecastArgs;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Get weather forecast for a location"
    }

    async fn run(&self, args: ForecastArgs) -> ContentEnvelope {
        let req = request::weather_forecast(&self.ctx.config, &args);
        let outcome = fetch_forecast(&self.ctx.transport, &req).await;
        outcome.log(Self::NAME);
        render_forecast(&args, outcome, self.ctx.config.render_policy)
    }
}
