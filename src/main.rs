use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::ExtractParams;

#[derive(Parser)]
#[command(
    name = "transcite",
    version,
    about = "Extract and rank citations from video transcripts",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract citations from a transcript
    Extract {
        /// Transcript file (.json is parsed as a full input, anything else as plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// JSON array of timed segments ({"text", "start"})
        #[arg(long)]
        segments: Option<PathBuf>,

        /// JSON user interest profile for ranking
        #[arg(long)]
        profile: Option<PathBuf>,

        /// JSON candidates produced by an external analyzer
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// JSON knowledge base used to verify and enrich citations
        #[arg(long)]
        knowledge_base: Option<PathBuf>,

        /// Maximum number of citations to return
        #[arg(short, long)]
        max_results: Option<usize>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cache results under this directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Print Prometheus metrics to stderr after the run
        #[arg(long, default_value = "false")]
        metrics: bool,
    },

    /// List pattern rules
    Rules {
        /// Only show this category
        #[arg(long)]
        category: Option<String>,

        /// TOML configuration file with custom rules
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Extract {
            input,
            segments,
            profile,
            candidates,
            knowledge_base,
            max_results,
            format,
            output,
            config,
            cache_dir,
            metrics,
        } => {
            tracing::info!(
                input = %input.display(),
                format = %format,
                max_results = ?max_results,
                "Starting extract command"
            );
            commands::extract(ExtractParams {
                input,
                segments,
                profile,
                candidates,
                knowledge_base,
                max_results,
                format,
                output,
                config,
                cache_dir,
                metrics,
            })
            .await?;
        }

        Commands::Rules { category, config } => {
            commands::rules(category, config)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("transcite=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("transcite=info,warn"))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
