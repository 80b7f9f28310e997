mod chat_cmd;
mod config;
mod config_cmd;
mod observer;
mod terminal_output;
mod voice_cmd;
mod weather_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use config::AppContext;
use weather_cmd::Target;

#[derive(Parser)]
#[command(name = "weatherwise")]
#[command(about = "WeatherWise: simulated weather assistant sessions")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.weatherwise/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides logging.level from the config
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the text assistant
    Chat {
        /// Persona slug, e.g. outdoor-enthusiast
        #[arg(long)]
        profile: Option<String>,
    },
    /// Run a simulated voice conversation
    Voice {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// Start with the microphone muted
        #[arg(long)]
        muted: bool,
    },
    /// Current weather (or forecast) as JSON
    Weather {
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,
        /// Five-day forecast instead of current conditions
        #[arg(long)]
        forecast: bool,
    },
    /// NASA astronomy picture of the day as JSON
    Apod,
    /// Locate the config file, or print it with --show
    Config {
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = AppContext::load(cli.config).await?;

    let log = ctx.config.log_settings();
    let level = cli.log_level.unwrap_or(log.level);
    let json = cli.json_logs || log.json;
    match &log.dir {
        Some(dir) => logging::init_logger(dir, &level, json),
        None => logging::init_console(&level, json),
    };
    // Config is loaded before the subscriber exists; surface its warnings now.
    for warning in weatherwise_config::validate(&ctx.config).warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    debug!(path = %ctx.path.display(), "Config ready");

    match cli.command {
        Commands::Chat { profile } => chat_cmd::run(&ctx, profile).await,
        Commands::Voice { seconds, muted } => voice_cmd::run(&ctx, seconds, muted).await,
        Commands::Weather {
            lat,
            lon,
            city,
            forecast,
        } => weather_cmd::run(&ctx, Target::from_args(lat, lon, city)?, forecast).await,
        Commands::Apod => weather_cmd::run_apod(&ctx).await,
        Commands::Config { show } => config_cmd::run(&ctx, show).await,
    }
}
