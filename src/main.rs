use anyhow::{Context, Result};
use clap::Parser;
use hitl_mcp::{
    config::{HitlConfig, API_KEY_ENV},
    escalation::EscalationToolServer,
    mcp::{MCPServerHandler, MCPTransport, StdioConfig, StdioServerTransport},
    telemetry::{init_logging, LoggingConfig},
    HitlError,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// MCP server exposing human-in-the-loop escalation tools over stdio
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// TOML configuration file (also read from HITL_CONFIG)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter for stderr output, e.g. `debug` or `hitl_mcp=trace`
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if let Some(level) = cli.log_level {
        logging = logging.with_level(level);
    }
    let _guard = init_logging(&logging)?;

    info!("Starting HITL MCP Server");

    let config = match HitlConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let e = HitlError::from(e);
            error!("{}", e);
            if e.is_missing_credential() {
                info!("Set it with: export {}=\"your_api_key\"", API_KEY_ENV);
            }
            return Err(e.into());
        }
    };

    info!(api_key = %config.api_key, "API key loaded");
    info!(
        base_url = %config.service.base_url,
        timeout = ?config.service.request_timeout,
        "Setting up request handlers"
    );

    let server = EscalationToolServer::new(&config).context("Failed to initialize server")?;
    let handler = MCPServerHandler::new(Arc::new(server));
    let mut transport = StdioServerTransport::new(StdioConfig::default());

    info!(
        transport = %transport.transport_info().transport_type,
        "HITL MCP Server running and ready for requests"
    );

    handler
        .serve(&mut transport)
        .await
        .context("MCP session failed")?;

    Ok(())
}
