use clap::{ArgAction, Parser, Subcommand};
use commands::{browse, config, update, watchlist};
use logging::LogTarget;
use reelbox_models::{Category, MediaType, WatchFilter};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelbox")]
#[command(about = "Reelbox - browse movies and TV, watch trailers, keep a watchlist")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the home rows (popular, top rated, now playing, TV)
    Home,
    /// Search the catalog by title
    Search {
        term: String,

        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Restrict results to one type (movie, series, episode)
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<MediaType>,
    },
    /// Browse a category (popular, top-rated, now-playing, tv, movie)
    Browse {
        category: Category,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List TV series matching a term
    Tv {
        term: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show full details for a title
    Details {
        /// IMDb id, e.g. tt0468569
        id: String,
    },
    /// Find a trailer for a title
    ///
    /// Looks up a trailer through the video search API. When the lookup fails
    /// a built-in trailer is used instead, unless --no-fallback is given.
    Trailer {
        title: String,

        /// Report nothing instead of a built-in trailer when the lookup fails
        #[arg(long, action = ArgAction::SetTrue)]
        no_fallback: bool,
    },
    /// Manage your watchlist
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },
    /// Check for and install app updates
    Update {
        #[command(subcommand)]
        cmd: UpdateCommands,
    },
    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum WatchlistCommands {
    /// List saved titles in the order they were added
    List {
        #[arg(long, default_value = "all")]
        filter: WatchFilter,
    },
    /// Save a title by IMDb id
    Add { id: String },
    /// Remove a saved title
    Remove { id: String },
    /// Flip the watched flag of a saved title
    Toggle { id: String },
}

#[derive(Subcommand)]
pub enum UpdateCommands {
    /// Show installed and waiting versions
    Status,
    /// Check the release manifest once and offer any waiting version
    Check,
    /// Stay running, check periodically and prompt when an update is ready
    ///
    /// Keeps a session open that checks the release manifest on the configured
    /// interval (at most hourly) and offers each new version as it becomes
    /// ready. Ends on Ctrl+C or after switching to a new version.
    Watch {
        /// Also write logs to a daily-rotated file in the log directory
        #[arg(long, action = ArgAction::SetTrue)]
        log_file: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks API keys)
    Show {
        /// Show API keys unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_target = match &cli.command {
        Commands::Update {
            cmd: UpdateCommands::Watch { log_file: true },
        } => LogTarget::SessionFile(reelbox_config::PathManager::default().session_log_file()),
        _ => LogTarget::Terminal,
    };
    logging::init_logging(cli.verbose, cli.quiet, log_target)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Home => browse::run_home(&output).await,
        Commands::Search { term, page, kind } => {
            browse::run_search(&term, page, kind, &output).await
        }
        Commands::Browse { category, page } => browse::run_browse(category, page, &output).await,
        Commands::Tv { term, page } => browse::run_tv(term, page, &output).await,
        Commands::Details { id } => browse::run_details(&id, &output).await,
        Commands::Trailer { title, no_fallback } => {
            browse::run_trailer(&title, no_fallback, &output).await
        }
        Commands::Watchlist { cmd } => watchlist::run_watchlist(cmd, &output).await,
        Commands::Update { cmd } => update::run_update(cmd, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output),
    }
}
