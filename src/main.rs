mod cli;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use usage_ledger::core::config::AppConfig;
use usage_ledger::core::ledger::UsageLedger;
use usage_ledger::core::pricing;

#[derive(Parser)]
#[command(name = "uledger", about = "Per-day ledger of metered AI API usage", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ledger directory (overrides USAGE_LEDGER_DIR and the config file)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one usage event
    Record {
        /// Vendor/API name, e.g. "OpenAI"
        service: String,
        /// Kind of call, e.g. "image_generation"
        operation: String,
        /// Cost in USD
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        cost: f64,
        /// Metadata pair, repeatable
        #[arg(short = 'm', long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
        /// Metadata as a JSON object
        #[arg(long, value_name = "JSON")]
        metadata: Option<String>,
    },
    /// Record a priced call for a known vendor
    Log {
        #[command(subcommand)]
        vendor: LogVendor,
    },
    /// Show the ledger for one day (default: today)
    Day {
        /// Date as YYYY-MM-DD
        date: Option<NaiveDate>,
    },
    /// Aggregate spend by service over recent days
    Services {
        /// Number of trailing days, today included
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum LogVendor {
    /// OpenAI, priced per 1K tokens
    Openai {
        #[arg(long)]
        operation: String,
        #[arg(long)]
        tokens: u64,
        #[arg(long)]
        model: Option<String>,
    },
    /// fal.ai image generation
    FalImage {
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// fal.ai video generation
    FalVideo {
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// ElevenLabs text to speech
    Elevenlabs {
        #[arg(long)]
        characters: u64,
    },
    /// Exa web search (free tier)
    Exa {
        #[arg(long)]
        query: String,
    },
    /// browser-use session
    BrowserUse {
        /// Cloud session (billed) instead of local
        #[arg(long)]
        cloud: bool,
    },
    /// Gemini image generation
    GeminiImage {
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// HeyGen video generation
    Heygen {
        #[arg(long)]
        seconds: u64,
        #[arg(long)]
        model: Option<String>,
    },
    /// Runway video generation
    Runway {
        #[arg(long)]
        seconds: u64,
        #[arg(long)]
        model: Option<String>,
    },
    /// Suno music generation
    Suno {
        #[arg(long)]
        seconds: u64,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
    /// Print config and ledger paths
    Path,
}

impl LogVendor {
    fn charge(&self) -> pricing::Charge {
        match self {
            LogVendor::Openai { operation, tokens, model } => {
                pricing::openai(operation, *tokens, model.as_deref())
            }
            LogVendor::FalImage { prompt, model } => pricing::fal_image(prompt, model.as_deref()),
            LogVendor::FalVideo { prompt, model } => pricing::fal_video(prompt, model.as_deref()),
            LogVendor::Elevenlabs { characters } => pricing::elevenlabs(*characters),
            LogVendor::Exa { query } => pricing::exa_search(query),
            LogVendor::BrowserUse { cloud } => pricing::browser_use(*cloud),
            LogVendor::GeminiImage { prompt, model } => {
                pricing::gemini_image(prompt, model.as_deref())
            }
            LogVendor::Heygen { seconds, model } => {
                pricing::heygen_video(*seconds, model.as_deref())
            }
            LogVendor::Runway { seconds, model } => {
                pricing::runway_video(*seconds, model.as_deref())
            }
            LogVendor::Suno { seconds } => pricing::suno_music(*seconds),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load();
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };
    cli::logging::init(cli.verbose, &config.logging);
    if let Err(e) = loaded {
        tracing::warn!("{}; using defaults", e);
    }

    let output_opts = cli::output::OutputOptions {
        format: cli::output::OutputFormat::resolve(
            cli.json,
            cli.format.as_deref(),
            &config.settings.default_format,
        ),
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color, &config.settings.color),
    };

    let ledger = UsageLedger::new(config.ledger_options(cli.root.clone()));
    tracing::debug!(root = %ledger.root().display(), "ledger root");

    match cli.command {
        Commands::Record {
            service,
            operation,
            cost,
            meta,
            metadata,
        } => cli::record_cmd::record(
            &ledger,
            &service,
            &operation,
            cost,
            &meta,
            metadata.as_deref(),
            &output_opts,
        )?,
        Commands::Log { vendor } => cli::record_cmd::log(&ledger, vendor.charge(), &output_opts)?,
        Commands::Day { date } => cli::summary_cmd::day(&ledger, date, &output_opts)?,
        Commands::Services { days } => {
            let days = days.unwrap_or(config.ledger.summary_days);
            cli::summary_cmd::services(&ledger, days, &output_opts)?
        }
        Commands::Config { action } => match action {
            ConfigAction::Init => cli::config_cmd::init()?,
            ConfigAction::Check => cli::config_cmd::check()?,
            ConfigAction::Path => cli::config_cmd::path(ledger.root()),
        },
    }

    Ok(())
}
