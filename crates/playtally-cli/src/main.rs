use clap::{ArgAction, Parser, Subcommand};
use commands::sync::{self, Platform};

mod commands;
mod envelope;
mod logging;

#[derive(Parser)]
#[command(name = "playtally")]
#[command(about = "PlayTally - one playtime ledger across every launcher")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync owned games and playtime from one backend
    #[command(
        long_about = "Authenticate against the selected backend with the supplied credential payload, walk the owned-game catalog, and print exactly one JSON result envelope on stdout. Logs go to stderr."
    )]
    Sync {
        /// Backend to sync against
        #[arg(long, value_enum)]
        platform: Platform,

        /// JSON encoded credential payload
        #[arg(long)]
        data: String,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    match cli.command {
        Commands::Sync { platform, data } => sync::run_sync(platform, &data).await,
    }
}
