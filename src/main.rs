mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use showlist_core::ShowListConfig;

#[derive(Parser)]
#[command(name = "showlist")]
#[command(about = "Show the upcoming shows from a band's public calendar feed")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.config/showlist/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    /// Markup for the page's shows list
    Html,
    /// Colored terminal listing
    Text,
    /// Display rows as JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the calendar feed and list the upcoming shows
    Shows {
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,

        /// Calendar identifier (overrides config)
        #[arg(short, long)]
        calendar: Option<String>,

        /// IANA time zone for dates and times (overrides config)
        #[arg(short, long)]
        timezone: Option<String>,
    },
    /// List the upcoming shows from a local .ics file
    Render {
        file: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,

        /// IANA time zone for dates and times (overrides config)
        #[arg(short, long)]
        timezone: Option<String>,
    },
    /// Submit the contact form
    Contact {
        /// Form field as name=value (repeatable)
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Form action URL (overrides config)
        #[arg(long)]
        action: Option<String>,
    },
    /// Show configuration
    Config {
        /// Write a commented default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => ShowListConfig::config_path()?,
    };

    match cli.command {
        Commands::Shows {
            format,
            calendar,
            timezone,
        } => {
            let mut config = load_config(&config_path)?;
            if let Some(calendar) = calendar {
                config.calendar_id = calendar;
            }
            apply_timezone(&mut config, timezone)?;
            commands::shows::run(&config, format).await
        }
        Commands::Render {
            file,
            format,
            timezone,
        } => {
            let mut config = load_config(&config_path)?;
            apply_timezone(&mut config, timezone)?;
            commands::render::run(&config, &file, format)
        }
        Commands::Contact { fields, action } => {
            let config = load_config(&config_path)?;
            commands::contact::run(&config, fields, action).await
        }
        Commands::Config { init } => commands::config::run(&config_path, init),
    }
}

fn load_config(path: &std::path::Path) -> Result<ShowListConfig> {
    log::debug!("Loading config from {}", path.display());
    ShowListConfig::load_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

fn apply_timezone(config: &mut ShowListConfig, timezone: Option<String>) -> Result<()> {
    if let Some(tz) = timezone {
        tz.parse::<chrono_tz::Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown time zone '{}'", tz))?;
        config.timezone = Some(tz);
    }
    Ok(())
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected name=value, got '{}'", s))?;
    if name.trim().is_empty() {
        return Err(format!("Field name is empty in '{}'", s));
    }
    Ok((name.trim().to_string(), value.to_string()))
}
