use anyhow::{Context, Result};

use usage_ledger::core::config::AppConfig;

pub fn init() -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    let path = AppConfig::default()
        .save()
        .context("Failed to generate config")?;
    println!("Generated config at {}", path.display());
    println!("  Ledger root: {}", AppConfig::default_root().display());
    Ok(())
}

pub fn check() -> Result<()> {
    let path = AppConfig::config_path();
    if !path.exists() {
        eprintln!("No config file found at {}", path.display());
        eprintln!("Run `uledger config init` to create one.");
        return Ok(());
    }

    let config = AppConfig::load().context("Failed to load config")?;

    let issues = config.validate();
    if issues.is_empty() {
        println!("Config is valid: {}", path.display());
        println!("  Ledger root: {}", config.resolve_root(None).display());
    } else {
        eprintln!("Config issues found in {}:", path.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Print the config file path and the ledger root in effect.
pub fn path(ledger_root: &std::path::Path) {
    println!("Config: {}", AppConfig::config_path().display());
    println!("Ledger: {}", ledger_root.display());
}
