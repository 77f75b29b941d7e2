mod config_cmd;
mod context;
mod counts_cmd;
mod live_cmd;
mod output;
mod plural_cmd;
mod view_cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use readerstats_config::{config_dir, config_file_path, load_and_prepare};
use readerstats_core::ContentId;

use context::AppContext;

#[derive(Parser)]
#[command(name = "readerstats")]
#[command(about = "readerstats: view counts, live readers, and Lithuanian count labels")]
#[command(version)]
struct Cli {
    /// Config file (default: $READERSTATS_CONFIG_DIR/config.yaml or ~/.readerstats/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a count with the agreeing Lithuanian noun form
    Plural {
        #[arg(allow_negative_numbers = true)]
        count: i64,
        /// Stock noun: views, readers, articles, minutes, courses, lessons, students, tools
        #[arg(long)]
        noun: Option<String>,
        #[arg(long)]
        one: Option<String>,
        #[arg(long)]
        few: Option<String>,
        #[arg(long)]
        many: Option<String>,
    },
    /// Record a view of a content item, unless one was recorded recently
    View {
        content_id: String,
        /// Signed-in user id
        #[arg(long)]
        user: Option<String>,
    },
    /// End the current view session
    EndSession,
    /// Show view counts and the display multiplier
    Counts {
        content_id: String,
        /// Raw live reader count to scale
        #[arg(long)]
        live: Option<u64>,
    },
    /// Simulate live readers on an in-process presence hub
    Live {
        content_id: String,
        /// Other readers to connect
        #[arg(long, default_value_t = 2)]
        peers: usize,
    },
    /// Show the effective config with secrets masked
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Pure formatting needs neither config nor logging.
    if let Commands::Plural {
        count,
        noun,
        one,
        few,
        many,
    } = cli.command
    {
        let forms = plural_cmd::resolve_forms(noun.as_deref(), one, few, many)?;
        return plural_cmd::run(count, &forms);
    }

    let path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let config = load_and_prepare(&path).await?;

    let log_dir = config
        .log_dir()
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("logs"));
    tokio::fs::create_dir_all(&log_dir)
        .await
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    readerstats_logging::init_logger(&log_dir, config.log_level());
    debug!(config = %path.display(), "Config loaded");

    if let Commands::Config = cli.command {
        return config_cmd::run(&config, &path);
    }

    let ctx = AppContext::build(config)?;
    match cli.command {
        Commands::View { content_id, user } => {
            view_cmd::run(&ctx, ContentId::new(content_id), user).await
        }
        Commands::EndSession => view_cmd::end_session(&ctx),
        Commands::Counts { content_id, live } => {
            counts_cmd::run(&ctx, ContentId::new(content_id), live).await
        }
        Commands::Live { content_id, peers } => {
            live_cmd::run(&ctx, ContentId::new(content_id), peers).await
        }
        Commands::Plural { .. } | Commands::Config => Ok(()),
    }
}
