use clap::{Parser, Subcommand};
use purepath_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "purepath", version, about = "PurePath daily check-in streak tracker")]
struct Cli {
    /// Keep records in memory instead of the remote store.
    /// The key is still cached, but streak data is not kept between runs.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the private key and load its streak
    Login {
        /// Private key (read from stdin when omitted)
        key: Option<String>,
    },
    /// Forget the cached private key
    Logout,
    /// Record today's check-in
    Checkin,
    /// Show the current streak
    Status {
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Live countdown; type `c` to check in, `q` to quit
    Watch,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let fallback = Config::load_or_default().logging.filter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // stdout carries command output; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let offline = cli.offline;
    let result = match cli.command {
        Commands::Login { key } => commands::block_on(commands::auth::login(key, offline)),
        Commands::Logout => commands::auth::logout(),
        Commands::Checkin => commands::block_on(commands::streak::checkin(offline)),
        Commands::Status { json } => commands::block_on(commands::streak::status(json, offline)),
        Commands::Watch => commands::block_on(commands::streak::watch(offline)),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
