use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "careline", version, about = "Careline CLI")]
struct Cli {
    /// Config file to use instead of ~/.config/careline/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emergency alert countdown
    Emergency {
        #[command(subcommand)]
        action: commands::emergency::EmergencyAction,
    },
    /// Emergency contact management
    Contacts {
        #[command(subcommand)]
        action: commands::contacts::ContactsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    // Logs go to stderr so JSON output on stdout stays parseable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = commands::resolve_config_path(cli.config).and_then(|path| match cli.command {
        Commands::Emergency { action } => commands::emergency::run(action, &path),
        Commands::Contacts { action } => commands::contacts::run(action, &path),
        Commands::Config { action } => commands::config::run(action, &path),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
