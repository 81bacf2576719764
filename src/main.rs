//! ESG platform API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌──────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ http server ──▶ routing ──▶ proxy          │
//!                              │   (request id,    (service,    (body mode,   │
//!                              │    cors, limit)    rewrite)     headers)     │
//!                              │                                   │          │
//!     Client Response          │                                   ▼          │
//!     ◀────────────────────────┼── response ◀──────────── reqwest client ◀────┼──── Backend
//!                              │   normalize                                   │     Service
//!                              │                                              │
//!                              │  config · health registry · observability    │
//!                              │  lifecycle (startup / signals / shutdown)    │
//!                              └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "esg-gateway", version, about = "API gateway for the ESG platform services")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    esg_gateway::lifecycle::startup::launch(args.config.as_deref()).await?;
    Ok(())
}
