mod config;
mod output;
mod plan_cmd;
mod regenerate_cmd;
mod suggest_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use itinera_core::GenerationRequest;

use config::{CliOverrides, Environment, FallbackMode, ItineraConfig};

#[derive(Parser)]
#[command(name = "itinera", about = "AI travel itinerary generator")]
struct Cli {
    /// API root of an OpenAI-compatible provider (overrides ITINERA_MODEL_URL)
    #[arg(long, global = true)]
    model_url: Option<String>,

    /// Model name (overrides ITINERA_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Deployment environment (overrides ITINERA_ENV)
    #[arg(long = "env", global = true, value_enum)]
    environment: Option<Environment>,

    /// Behaviour once the retry budget is spent
    #[arg(long, global = true, value_enum)]
    fallback: Option<FallbackMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an itinera config file (records `--env` when given)
    Init {
        /// Provider API key
        #[arg(long)]
        api_key: String,
        /// Per-request HTTP timeout in seconds
        #[arg(long)]
        request_timeout: Option<u64>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate a multi-day travel plan
    Plan {
        /// Destination city and country (e.g. "Kyoto, Japan")
        destination: String,
        /// Trip length in days
        #[arg(long, short = 'd')]
        days: u32,
        /// What the traveller is interested in
        #[arg(long, short = 'i')]
        interests: Option<String>,
        /// First day of the trip (YYYY-MM-DD); dates every day of the plan
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Give up after this many seconds, retries included
        #[arg(long)]
        timeout: Option<u64>,
        /// Output file path (defaults to stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Regenerate one day of a saved plan
    RegenerateDay {
        /// Plan JSON file (output of `itinera plan`, or a bare plan)
        plan_file: PathBuf,
        /// Day number to regenerate
        #[arg(long)]
        day: u32,
        /// Destination (defaults to the plan's destination)
        #[arg(long)]
        destination: Option<String>,
        /// What the traveller is interested in
        #[arg(long, short = 'i')]
        interests: Option<String>,
        /// Exit with an error if the day could not be regenerated
        #[arg(long)]
        strict: bool,
        /// Output file path (defaults to stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Ask a free-text question about a destination
    Suggest {
        /// Destination the question is about
        destination: String,
        /// The question
        query: String,
        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute the `itinera init` command: write config file.
fn cmd_init(
    api_key: &str,
    environment: Environment,
    request_timeout: Option<u64>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if api_key.trim().is_empty() {
        anyhow::bail!("--api-key must not be empty");
    }

    let cfg = config::ConfigFile {
        model: config::ModelSection {
            api_key: Some(api_key.trim().to_string()),
            request_timeout_secs: request_timeout,
            ..Default::default()
        },
        runtime: config::RuntimeSection {
            environment: Some(environment),
            fallback: None,
        },
    };

    config::save_config(&cfg)?;

    let key = api_key.trim();
    let shown = if key.chars().count() > 8 {
        format!("{}...", key.chars().take(4).collect::<String>())
    } else {
        "****".to_string()
    };
    println!("Config written to {}", path.display());
    println!("  model.api_key = {shown}");
    println!("  runtime.environment = {environment}");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let overrides = CliOverrides {
        model_url: cli.model_url,
        model: cli.model,
        environment: cli.environment,
        fallback: cli.fallback,
    };

    match cli.command {
        Commands::Init {
            api_key,
            request_timeout,
            force,
        } => {
            let environment = overrides.environment.unwrap_or_default();
            cmd_init(&api_key, environment, request_timeout, force)?;
        }
        Commands::Plan {
            destination,
            days,
            interests,
            start_date,
            timeout,
            output,
        } => {
            let resolved = ItineraConfig::resolve(&overrides)?;
            let mut request = GenerationRequest::new(destination, days, interests.as_deref())
                .context("invalid plan request")?;
            if let Some(start) = start_date {
                request = request.with_start_date(start);
            }
            tracing::debug!(
                environment = %resolved.environment,
                fallback = ?resolved.fallback,
                "resolved configuration"
            );
            let options = plan_cmd::PlanOptions {
                timeout: timeout.map(Duration::from_secs),
                output,
            };
            plan_cmd::run_plan(
                resolved.model_client()?,
                resolved.fallback_policy(),
                request,
                &options,
            )
            .await?;
        }
        Commands::RegenerateDay {
            plan_file,
            day,
            destination,
            interests,
            strict,
            output,
        } => {
            let resolved = ItineraConfig::resolve(&overrides)?;
            let client = resolved.model_client()?;
            let options = regenerate_cmd::RegenerateOptions {
                plan_file,
                day,
                destination,
                interests,
                strict,
                output,
            };
            regenerate_cmd::run_regenerate(client.as_ref(), &options).await?;
        }
        Commands::Suggest {
            destination,
            query,
            json,
        } => {
            let resolved = ItineraConfig::resolve(&overrides)?;
            let client = resolved.model_client()?;
            suggest_cmd::run_suggest(client.as_ref(), &destination, &query, json).await?;
        }
    }

    Ok(())
}
