use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use showlist_core::ShowListConfig;

pub fn run(config_path: &Path, init: bool) -> Result<()> {
    if init {
        if config_path.exists() {
            println!("Config already exists at {}", config_path.display());
        } else {
            ShowListConfig::create_default_config(config_path)?;
            println!("Created {}", config_path.display());
        }
    }

    let config = ShowListConfig::load_from(config_path)?;
    let source = config.feed_source();

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!();
    println!("{}", "Feed".bold());
    println!("  Calendar:   {}", config.calendar_id);
    println!("  URL:        {}", source.feed_url());
    println!("  Proxy:      {}", source.proxy_url());
    println!();
    println!("{}", "Display".bold());
    println!("  Time zone:  {}", config.display_timezone().name());
    println!("  Shows:      {}", config.max_events);
    println!("  Window:     {} months", config.window_months);
    println!("  Venue:      {}", config.default_venue);
    for entry in &config.venue_keywords {
        println!("    \"{}\" → {}", entry.keyword, entry.venue);
    }
    if let Some(action) = &config.contact_action {
        println!();
        println!("{}", "Contact".bold());
        println!("  Action:     {}", action);
    }

    Ok(())
}
