use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod utils;

/// stache - Mustache template bundler and dev server
#[derive(Parser)]
#[command(name = "stache")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./stache.toml, then the XDG config dir)
    #[arg(short, long, global = true, value_name = "FILE", env = "STACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print or write the client bundle of stringified partials
    Bundle {
        /// Partials directory to bundle
        #[arg(long, value_name = "DIR")]
        partials: Option<PathBuf>,

        /// Wrapper template for the bundle
        #[arg(long, value_name = "FILE")]
        wrapper: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Render a layout to stdout
    Render {
        /// Layout name
        layout: String,

        /// JSON file with the template data
        #[arg(short, long, value_name = "DATA.json")]
        data: Option<PathBuf>,
    },
    /// List partial and layout names
    List,
    /// Scaffold a views directory
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
    /// Serve layouts and the bundle over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Environment name (development reloads templates per request)
        #[arg(long, value_name = "ENV")]
        env: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    let result = run(cli).await;

    // Handle result
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);

            // Show context if available
            if let Some(source) = e.source() {
                eprintln!("\n{} {}", "Caused by:".yellow(), source);
            }

            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Scaffolding does not need a configuration
    if let Commands::Init { dir, force } = &cli.command {
        return commands::init::execute(dir, *force);
    }

    let config = utils::load_config(cli.config.as_deref())?;
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    stache::observability::init_tracing_with_level(log_level)?;

    match cli.command {
        Commands::Bundle {
            partials,
            wrapper,
            output,
        } => commands::bundle::execute(
            &config,
            partials.as_deref(),
            wrapper.as_deref(),
            output.as_deref(),
        ),
        Commands::Render { layout, data } => {
            commands::render::execute(config, &layout, data.as_deref())
        }
        Commands::List => commands::list::execute(config),
        Commands::Serve { port, env } => commands::serve::execute(config, port, env).await,
        Commands::Init { .. } => Ok(()),
    }
}
