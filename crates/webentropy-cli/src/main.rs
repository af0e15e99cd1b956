//! CLI for webentropy — harvest a freshness token or serve it over HTTP.

use clap::{Parser, Subcommand};

use webentropy_core::{HarvestConfig, LogSink, harvest_and_hash};

#[derive(Parser)]
#[command(name = "webentropy")]
#[command(about = "webentropy — public-beacon entropy harvesting and digest service")]
#[command(version = webentropy_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one harvest and print the result as JSON.
    /// Exits non-zero when the policy engine rejects the invocation.
    Harvest {
        /// Force the pure-Rust digest provider
        #[arg(long)]
        soft_digest: bool,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },

    /// Serve the harvest endpoint over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, default_value_t = 8787)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            soft_digest,
            pretty,
        } => {
            let mut config = HarvestConfig::from_env();
            if soft_digest {
                config.force_soft_digest = true;
            }

            let (status, body) = harvest_and_hash(&config, &LogSink).await;
            let json = if pretty {
                serde_json::to_string_pretty(&body)
            } else {
                serde_json::to_string(&body)
            }
            .unwrap_or_else(|_| "{}".to_string());
            println!("{json}");

            if status != 200 {
                std::process::exit(1);
            }
        }
        Commands::Serve { host, port } => {
            let config = HarvestConfig::from_env();
            webentropy_server::run_server(config, &host, port).await;
        }
    }
}
