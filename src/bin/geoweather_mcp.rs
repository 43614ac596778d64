//! geoweather-mcp: 天气与地图 MCP 服务（stdio）
//!
//! Usage:
//!   geoweather-mcp [--profile weather|path-guide|all] [--config <path>]
//!   geoweather-mcp version
//!   geoweather-mcp help
//!
//! stdout carries protocol frames only; logs go to stderr.

use anyhow::Context;
use geoweather_mcp::{GatewayConfig, McpServer, Profile, ProviderContext, ServerInfo};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct Args {
    profile: Profile,
    config: Option<PathBuf>,
}

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    match argv.first().map(String::as_str) {
        Some("version" | "--version" | "-V") => {
            println!("geoweather-mcp {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Some("help" | "--help" | "-h") => {
            print_usage();
            return;
        }
        _ => {}
    }

    init_logging();

    if let Err(e) = run(&argv) {
        tracing::error!("Fatal error in main(): {e:#}");
        eprintln!("geoweather-mcp error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"geoweather-mcp: Seniverse weather and AMap tools over MCP (stdio)

USAGE:
    geoweather-mcp [--profile <weather|path-guide|all>] [--config <path>]

COMMANDS:
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    SENIVERSE_API_KEY           Weather API key
    AMAP_API_KEY                AMap web service key
    SENIVERSE_BASE_URL          Override the daily forecast endpoint
    AMAP_BASE_URL               Override the AMap base URL
    GEOWEATHER_MCP_CONFIG       YAML config file (same as --config)
    GEOWEATHER_HTTP_TIMEOUT_SECS  Per-call timeout (default 30)
    GEOWEATHER_RENDER_POLICY    collapse | distinguish
    RUST_LOG                    Log filter (default info), written to stderr"#
    );
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn parse_args(argv: &[String]) -> anyhow::Result<Args> {
    let mut args = Args {
        profile: Profile::default(),
        config: None,
    };
    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--profile" => {
                let value = iter.next().context("--profile needs a value")?;
                args.profile = value.parse()?;
            }
            "--config" => {
                let value = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(value));
            }
            other => anyhow::bail!("unknown argument: {other} (see `geoweather-mcp help`)"),
        }
    }
    Ok(args)
}

fn run(argv: &[String]) -> anyhow::Result<()> {
    let args = parse_args(argv)?;

    let config = GatewayConfig::load(args.config.as_deref()).context("loading configuration")?;
    let ctx = ProviderContext::new(Arc::new(config)).context("building HTTP client")?;
    let registry = args
        .profile
        .registry(&ctx)
        .context("registering tools")?;
    tracing::info!(
        profile = args.profile.server_name(),
        tools = ?registry.names(),
        "tools registered"
    );

    let server = Arc::new(
        McpServer::new(ServerInfo::new(args.profile.server_name()), registry).with_instructions(
            "Weather: get-forecast. Maps: get-lating-and-longitude turns an address into \
             'lng,lat'; route-planning takes two 'lng,lat' points; draw-route renders AMap \
             path data as an image.",
        ),
    );

    let rt = tokio::runtime::Runtime::new().context("starting async runtime")?;
    rt.block_on(server.serve_stdio())?;
    Ok(())
}
