use super::prompts;
use super::ui;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use reelbox_config::{Config, PathManager};
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Init { force } => init_config(force, output),
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let secret = |value: &str| if full { value.to_string() } else { mask_string(value) };

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "config_file_exists": config_file.exists(),
            "data_dir": path_manager.data_dir().display().to_string(),
            "log_dir": path_manager.log_dir().display().to_string(),
            "catalog": {
                "api_key": secret(&config.catalog.api_key),
                "base_url": config.catalog.base_url,
            },
            "trailers": {
                "api_key": secret(&config.trailers.api_key),
                "base_url": config.trailers.base_url,
                "demo_fallback": config.trailers.demo_fallback,
            },
            "updates": {
                "manifest_url": config.updates.manifest_url,
                "check_interval_secs": config.updates.check_interval_secs,
            },
            "valid": config.validate().is_ok(),
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    if !config_file.exists() {
        output.warn(format!(
            "No config file at {}; showing defaults. Create one with `reelbox config init`.",
            config_file.display()
        ));
    }

    let mut paths_table = ui::new_table();
    paths_table.set_header(vec![ui::header_cell("Paths"), ui::header_cell("")]);
    paths_table.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display())]);
    paths_table.add_row(vec![Cell::new("Data"), Cell::new(path_manager.data_dir().display())]);
    paths_table.add_row(vec![Cell::new("Logs"), Cell::new(path_manager.log_dir().display())]);
    println!("{}", paths_table);

    let mut catalog_table = ui::new_table();
    catalog_table.set_header(vec![ui::header_cell("Catalog (OMDb)"), ui::header_cell("")]);
    catalog_table.add_row(vec![Cell::new("API key"), Cell::new(secret(&config.catalog.api_key))]);
    catalog_table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.catalog.base_url)]);
    println!("{}", catalog_table);

    let mut trailer_table = ui::new_table();
    trailer_table.set_header(vec![ui::header_cell("Trailers (YouTube)"), ui::header_cell("")]);
    trailer_table.add_row(vec![Cell::new("API key"), Cell::new(secret(&config.trailers.api_key))]);
    trailer_table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.trailers.base_url)]);
    trailer_table.add_row(vec![
        Cell::new("Built-in fallback"),
        Cell::new(if config.trailers.demo_fallback { "on" } else { "off" }),
    ]);
    println!("{}", trailer_table);

    let mut update_table = ui::new_table();
    update_table.set_header(vec![ui::header_cell("Updates"), ui::header_cell("")]);
    update_table.add_row(vec![
        Cell::new("Manifest URL"),
        Cell::new(config.updates.manifest_url.as_deref().unwrap_or("<disabled>")),
    ]);
    update_table.add_row(vec![
        Cell::new("Check interval"),
        Cell::new(format!("{}s", config.updates.check_interval_secs)),
    ]);
    println!("{}", update_table);

    if !config.is_catalog_configured() {
        output.warn(
            "No catalog API key: browsing and search will not work. \
             Set catalog.api_key or OMDB_API_KEY.",
        );
    }
    if !config.is_trailer_search_configured() {
        output.info("No video search key: trailers come from the built-in list.");
    }
    if !config.updates_enabled() {
        output.info("App updates are disabled.");
    }
    if let Err(e) = config.validate() {
        output.error(format!("Invalid configuration: {}", e));
    }
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if config_file.exists() && !force {
        let overwrite = output.is_human()
            && ui::is_interactive()
            && prompts::prompt_yes_no(
                &format!("{} already exists. Overwrite it with defaults?", config_file.display()),
                Some(false),
                output,
            )?;
        if !overwrite {
            output.warn(format!(
                "Config file already exists at {} (use --force to overwrite)",
                config_file.display()
            ));
            return Ok(());
        }
    }

    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create directories: {}", e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    output.info("Add your OMDb API key under [catalog] to start browsing.");
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.trim().is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
