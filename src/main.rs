use anyhow::{bail, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use room_analyzer::catalog::Catalog;
use room_analyzer::config::{AppConfig, AppConfigBuilder};
use room_analyzer::logging::{init_logging, LoggingConfig};
use room_analyzer::pipeline::RoomAnalysisPipeline;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "room-analyzer")]
#[command(about = "Analyze a sample empty-room photo with a vision model")]
#[command(long_about = r#"
Picks a photo from the built-in empty room catalog, downloads it and asks a
Gemini vision model for the room type, the detected style and three furniture
recommendations. The result is printed to stdout as JSON.

Examples:
  # Random room
  GEMINI_API_KEY=... room-analyzer

  # Reproducible pick
  room-analyzer --seed 7

  # A specific record, accepting replies that do not match the schema
  room-analyzer --record bedroom-1 --lenient

  # Show the catalog
  room-analyzer --list
"#)]
struct CliArgs {
    /// Instruction prompt sent with the image (default prompt when omitted)
    #[arg(long)]
    prompt: Option<String>,

    /// Catalog record id to analyze instead of a random pick
    #[arg(long, conflicts_with = "seed")]
    record: Option<String>,

    /// Seed for the random pick
    #[arg(long)]
    seed: Option<u64>,

    /// Vision model name
    #[arg(long)]
    model: Option<String>,

    /// Vision service API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the vision service
    #[arg(long)]
    vision_base_url: Option<String>,

    /// Image download timeout in seconds
    #[arg(long)]
    fetch_timeout_secs: Option<u64>,

    /// Vision request timeout in seconds
    #[arg(long)]
    vision_timeout_secs: Option<u64>,

    /// Return the raw reply instead of failing when it does not match the schema
    #[arg(long, default_value_t = false)]
    lenient: bool,

    /// Attempts per network stage (1 disables retry)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Print the catalog and exit
    #[arg(long, default_value_t = false)]
    list: bool,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<String>,

    /// Log level
    #[arg(long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    /// Directory to store log files
    #[arg(long)]
    log_dir: Option<String>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

impl CliArgs {
    /// Layer CLI flags over the optional config file, without validating.
    fn to_app_config(&self) -> anyhow::Result<AppConfig> {
        let base = match &self.config {
            Some(path) => AppConfig::from_json_file(path)?,
            None => AppConfig::default(),
        };

        let mut builder = AppConfigBuilder::from_config(base).maybe_api_key(self.api_key.clone());
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(url) = &self.vision_base_url {
            builder = builder.vision_base_url(url);
        }
        if let Some(secs) = self.fetch_timeout_secs {
            builder = builder.fetch_timeout_secs(secs);
        }
        if let Some(secs) = self.vision_timeout_secs {
            builder = builder.vision_timeout_secs(secs);
        }
        if self.lenient {
            builder = builder.lenient(true);
        }
        if let Some(max) = self.max_retries {
            builder = builder.max_retries(max);
        }
        if let Some(level) = &self.log_level {
            builder = builder.log_level(level);
        }
        if let Some(dir) = &self.log_dir {
            builder = builder.log_dir(dir);
        }
        if self.log_json {
            builder = builder.log_json(true);
        }
        Ok(builder.build_unchecked())
    }
}

fn print_catalog() -> anyhow::Result<()> {
    let catalog = Catalog::builtin()?;
    println!("{}", serde_json::to_string_pretty(&catalog.listing())?);
    Ok(())
}

async fn run(args: CliArgs, config: AppConfig) -> anyhow::Result<()> {
    let pipeline = RoomAnalysisPipeline::from_config(&config)
        .context("failed to set up pipeline")?
        .with_prompt(args.prompt);

    let output = match (&args.record, args.seed) {
        (Some(id), _) => pipeline.run_for_id(id).await,
        (None, Some(seed)) => pipeline.run(&mut StdRng::seed_from_u64(seed)).await,
        (None, None) => pipeline.run(&mut rand::rng()).await,
    };

    match output {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!(stage = %e.stage(), kind = ?e.kind(), "{}", e);
            bail!(e)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.list {
        return print_catalog();
    }

    let config = AppConfigBuilder::from_config(args.to_app_config()?).build()?;
    let _log_guard = init_logging(LoggingConfig::from_app_config(&config));

    run(args, config).await
}
