//! Show configuration

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use vigil_watcher::example_config;

pub fn run(config_path: Option<&Path>, example: bool, path: bool) -> Result<()> {
    if example {
        print!("{}", example_config());
        return Ok(());
    }

    if path {
        let path = config_path.context("Could not determine config file path")?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = util::load_config(config_path)?;
    if let Some(path) = config_path {
        let note = if path.exists() { "" } else { " (not found, using defaults)" };
        eprintln!("{}: {}{}", "Location".dimmed(), path.display(), note.dimmed());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
