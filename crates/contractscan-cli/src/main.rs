mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use contractscan_service::HttpService;

#[derive(Parser)]
#[command(name = "contractscan", about = "Analyze, compare and generate freelance contracts")]
pub struct Cli {
    /// Server URL
    #[arg(long, env = "CONTRACTSCAN_SERVER_URL", default_value = "http://127.0.0.1:3720")]
    pub server: String,

    /// API key for authenticating with the server
    #[arg(long, env = "CONTRACTSCAN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Print raw JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the server is reachable
    Health,
    /// Analyze a contract file ("-" reads stdin)
    Analyze {
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
    /// List analyzed contracts, newest first
    List {
        /// LOW, MEDIUM, HIGH or CRITICAL
        #[arg(long)]
        risk: Option<String>,
        /// analyzed, compared or generated
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Show one contract with its issues
    Show { id: String },
    /// Delete a contract
    Delete { id: String },
    /// Dashboard counters
    Stats,
    /// Compare two versions of a contract
    Compare {
        original: PathBuf,
        revised: PathBuf,
    },
    /// List stored comparisons
    Comparisons,
    /// Show one stored comparison
    Comparison { id: String },
    /// Generate a contract from requirements
    Generate {
        #[arg(long)]
        client: String,
        #[arg(long)]
        freelancer: String,
        #[arg(long)]
        description: String,
        /// May be repeated
        #[arg(long = "deliverable")]
        deliverables: Vec<String>,
        #[arg(long, default_value = "")]
        timeline: String,
        #[arg(long, default_value = "")]
        payment_terms: String,
        #[arg(long, default_value = "general")]
        industry: String,
        /// fixed_price or hourly
        #[arg(long, default_value = "fixed_price")]
        project_type: String,
        #[arg(long, default_value = "US")]
        region: String,
        /// Write the contract text to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show or update default industry and region
    Prefs {
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = match cli.api_key.clone() {
        Some(key) => HttpService::with_api_key(&cli.server, key),
        None => HttpService::new(&cli.server),
    };

    commands::run(&service, cli.command, cli.json).await
}
