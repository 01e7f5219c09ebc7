use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use contractscan_server::auth;
use contractscan_server::config::ServerConfig;
use contractscan_service::DEFAULT_USER;

#[derive(Parser)]
#[command(name = "contractscan-server", about = "Contract risk analysis API")]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Generate a new API key
    Keygen {
        /// Human-readable name for the key
        #[arg(long, default_value = "")]
        name: String,
        /// User the key acts for
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// List all API keys (metadata only, no secrets)
    ListKeys,
    /// Revoke (delete) an API key by ID
    RevokeKey {
        /// The API key ID to revoke
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Some(Commands::Keygen { name, user }) => {
            let db = contractscan_db::open(&config.db_config()).await?;
            let raw_key = auth::generate_api_key();
            let hash = auth::sha256_hex(&raw_key);
            let api_key = db.insert_api_key(&name, &user, &hash).await?;
            eprintln!("Created API key (id: {}) for user {user}", api_key.id);
            if !name.is_empty() {
                eprintln!("  name: {name}");
            }
            // raw key on stdout so it can be captured
            println!("{raw_key}");
            eprintln!("\nSave this key. It cannot be retrieved again.");
        }
        Some(Commands::ListKeys) => {
            let db = contractscan_db::open(&config.db_config()).await?;
            let keys = db.list_api_keys().await?;
            if keys.is_empty() {
                eprintln!("No API keys found.");
            } else {
                println!(
                    "{:<38} {:<20} {:<16} {:<28} LAST USED",
                    "ID", "NAME", "USER", "CREATED"
                );
                for key in keys {
                    println!(
                        "{:<38} {:<20} {:<16} {:<28} {}",
                        key.id,
                        if key.name.is_empty() { "-" } else { &key.name },
                        key.user_id,
                        key.created_at,
                        key.last_used_at.as_deref().unwrap_or("never"),
                    );
                }
            }
        }
        Some(Commands::RevokeKey { id }) => {
            let db = contractscan_db::open(&config.db_config()).await?;
            db.delete_api_key(&id).await?;
            eprintln!("Revoked API key {id}");
        }
        Some(Commands::Serve) | None => {
            let addr = config.addr()?;
            let (service, db) = contractscan_server::build_service(&config).await?;

            let auth = auth::build_auth_config(db).await;
            if auth.is_some() {
                info!("authentication enabled");
            } else {
                info!("authentication disabled (no CONTRACTSCAN_API_KEY or DB keys)");
            }

            let listener = TcpListener::bind(addr).await?;
            info!("contractscan-server listening on http://{addr}");

            contractscan_server::serve(listener, service, auth).await?;
        }
    }

    Ok(())
}
