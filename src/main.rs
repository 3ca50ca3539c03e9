use clap::{Parser, Subcommand};
use crashstats_query::{Config, OutputFormat, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crashstats-query")]
#[command(about = "Search crash-stats for top crash signatures and their bugs", long_about = None)]
struct Cli {
    #[arg(long, value_enum, default_value = "compact", global = true)]
    format: OutputFormat,

    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API token stored in system keychain
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Build a signature search from KEY=VALUE parameters
    Query {
        /// Execute the search instead of only normalizing it
        #[arg(long)]
        run: bool,

        /// Search parameters, e.g. product=Firefox version=Firefox:52.0 query=OOM
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Resolve a crash ID or signature typed into the quick search box
    Quick {
        term: String,

        #[arg(long)]
        product: Option<String>,

        #[arg(long)]
        version: Option<String>,

        /// Run the signature search instead of printing the redirect
        #[arg(long)]
        run: bool,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Store API token in system keychain
    Login,
    /// Remove API token from system keychain
    Logout,
    /// Check if API token is stored
    Status,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Login => crashstats_query::commands::auth::login(&cli.config)?,
            AuthAction::Logout => crashstats_query::commands::auth::logout(&cli.config)?,
            AuthAction::Status => crashstats_query::commands::auth::status(&cli.config)?,
        },
        Commands::Query { run, params } => {
            crashstats_query::commands::query::execute(&cli.config, &params, run, cli.format)?;
        }
        Commands::Quick { term, product, version, run } => {
            crashstats_query::commands::quick::execute(&cli.config, &term, product, version, run, cli.format)?;
        }
    }

    Ok(())
}
