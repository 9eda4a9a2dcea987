use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use lamp_core::{
    Config, ControlOutcome, LampController, LampDecisionRequest, WeatherObservation,
    controller_from_config, day_of_year,
};
use serde_json::json;
use tracing::{debug, info};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "lamp", version, about = "Street lamp control client")]
pub struct Cli {
    /// Base URL of the lamp service; overrides the stored configuration.
    #[arg(long, global = true, env = "LAMP_SERVICE_URL")]
    pub base_url: Option<String>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask the lamp service what the lamp should do.
    Decide(DecideArgs),

    /// Store the lamp service base URL.
    Configure {
        /// e.g. "http://127.0.0.1:5000"; prompts when omitted.
        url: Option<String>,
    },

    /// Show the effective endpoint and where the config lives.
    #[command(name = "config")]
    ShowConfig,
}

#[derive(Debug, Args)]
pub struct DecideArgs {
    /// It is currently night.
    #[arg(long)]
    pub night: bool,

    /// Motion was detected near the lamp.
    #[arg(long)]
    pub motion: bool,

    /// Relative humidity, %.
    #[arg(long, allow_negative_numbers = true)]
    pub humidity: f64,

    /// Cloud cover, %.
    #[arg(long, allow_negative_numbers = true)]
    pub cloudcover: f64,

    /// Visibility, km.
    #[arg(long, allow_negative_numbers = true)]
    pub visibility: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub uvindex: f64,

    /// Defaults to today.
    #[arg(long, allow_negative_numbers = true)]
    pub day_of_year: Option<i64>,

    /// Air temperature, °C.
    #[arg(long, allow_negative_numbers = true)]
    pub temp: f64,

    /// Precipitation, mm.
    #[arg(long, allow_negative_numbers = true)]
    pub precip: f64,

    /// Print the full service reply as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DecideArgs {
    pub fn observation(&self) -> WeatherObservation {
        WeatherObservation {
            humidity: self.humidity,
            cloudcover: self.cloudcover,
            visibility: self.visibility,
            uvindex: self.uvindex,
            day_of_year: self.day_of_year.unwrap_or_else(|| day_of_year(Local::now())),
            temp: self.temp,
            precip: self.precip,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Decide(ref args) => {
                let config = resolve_config(Config::load()?, self.base_url.as_deref())?;
                let endpoint = config.endpoint()?;
                debug!(%endpoint, "Resolved lamp service endpoint");
                let controller = controller_from_config(&config)?;
                decide(controller.as_ref(), args).await?;
            }
            Command::Configure { url } => {
                let mut config = Config::load()?;

                let url = match url {
                    Some(url) => url,
                    None => inquire::Text::new("Lamp service base URL:")
                        .with_default(config.base_url())
                        .prompt()
                        .context("Failed to read base URL")?,
                };

                config.set_base_url(&url)?;
                config.save()?;
                info!(base_url = config.base_url(), "Stored lamp service URL");

                println!(
                    "Saved lamp service URL {} to {}",
                    config.base_url(),
                    Config::config_file_path()?.display()
                );
            }
            Command::ShowConfig => {
                let config = resolve_config(Config::load()?, self.base_url.as_deref())?;
                debug!(overridden = self.base_url.is_some(), "Loaded lamp configuration");

                println!("Config file: {}", Config::config_file_path()?.display());
                println!("Endpoint:    {}", config.endpoint()?);
            }
        }

        Ok(())
    }
}

/// Apply a `--base-url` / `LAMP_SERVICE_URL` override on top of the stored config.
pub fn resolve_config(mut config: Config, base_url: Option<&str>) -> anyhow::Result<Config> {
    if let Some(url) = base_url {
        config.set_base_url(url)?;
    }
    Ok(config)
}

async fn decide(controller: &dyn LampController, args: &DecideArgs) -> anyhow::Result<()> {
    let weather = args.observation();

    if args.json {
        let request = LampDecisionRequest::new(args.night, args.motion, weather);
        let value = match controller.control_lamp(&request).await? {
            ControlOutcome::Decided(reply) => serde_json::to_value(reply)?,
            ControlOutcome::Rejected { status, reason } => json!({
                "lamp_action": lamp_core::ERROR_SENTINEL,
                "http_status": status,
                "reason": reason,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let decision = controller.get_lamp_action(args.night, args.motion, &weather).await?;
    match decision.level() {
        Some(level) => println!("{decision} [{level}]"),
        None => println!("{decision}"),
    }

    Ok(())
}
