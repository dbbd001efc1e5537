use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pengayoman-cli", version, about = "Doa Pengayoman CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the prayer collection
    Prayers {
        #[command(subcommand)]
        action: commands::prayers::PrayersAction,
    },
    /// Ad consent state
    Consent {
        #[command(subcommand)]
        action: commands::consent::ConsentAction,
    },
    /// Ad-free reward window
    Reward {
        #[command(subcommand)]
        action: commands::reward::RewardAction,
    },
    /// Ad request configuration
    Ads {
        #[command(subcommand)]
        action: commands::ads::AdsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Prayers { action } => commands::prayers::run(action).await,
        Commands::Consent { action } => commands::consent::run(action),
        Commands::Reward { action } => commands::reward::run(action),
        Commands::Ads { action } => commands::ads::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
