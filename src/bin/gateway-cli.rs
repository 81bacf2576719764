use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the ESG API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "GATEWAY_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Status,
    /// List registered services and their health
    Services,
    /// Show registry counts and uptime
    Stats,
    /// Check one registered service now
    Check { service: String },
    /// Register or replace a service
    Register {
        name: String,
        url: String,
        #[arg(long)]
        health_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{base}/health")).send().await?,
        Commands::Services => client.get(format!("{base}/services")).send().await?,
        Commands::Stats => client.get(format!("{base}/stats")).send().await?,
        Commands::Check { service } => {
            client
                .get(format!("{base}/health/{service}"))
                .send()
                .await?
        }
        Commands::Register {
            name,
            url,
            health_url,
        } => {
            client
                .post(format!("{base}/register"))
                .json(&json!({ "name": name, "url": url, "health_url": health_url }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
