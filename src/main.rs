use anyhow::Result;
use clap::{Parser, Subcommand};
use eventhub::Config;

/// eventhub - discover, like and join events
#[derive(Parser)]
#[command(name = "eventhub")]
#[command(about = "Event discovery backend", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.clone())?;

    eventhub::observability::init_observability("eventhub", &config.observability)?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            config.validate().map_err(|e| anyhow::anyhow!(e))?;
            eventhub::server::serve(config).await
        }
        Commands::Migrate => {
            tracing::info!("Running database migrations...");
            let db = eventhub::server::connect(&config.database).await?;
            eventhub::server::migrate(&db.write_db).await
        }
    }
}
