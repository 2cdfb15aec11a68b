use anyhow::Result;
use calblock_core::config::BlockConfig;
use owo_colors::OwoColorize;

pub fn run(path: Option<&str>) -> Result<()> {
    let config_path = BlockConfig::resolve_path(path)?;
    let config = BlockConfig::load(path)?;
    let provider = super::provider_for(&config)?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());

    println!("\n{}", "Settings".bold());
    println!("  Block title:  {}", config.blocked_event_title);
    println!("  Lookahead:    {} days", config.lookahead_days);
    println!("  On error:     {:?}", config.on_error);

    let status = if provider.is_installed() {
        "installed".green().to_string()
    } else {
        "not found in PATH".red().to_string()
    };
    println!(
        "  Provider:     {} ({}, timeout {})",
        provider.binary_name(),
        status,
        config.provider_timeout
    );

    println!("\n{}", "Remote calendars".bold());
    if config.remote_calendar_ids.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for id in &config.remote_calendar_ids {
        println!("  {}", id);
    }

    Ok(())
}
