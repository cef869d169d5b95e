//! `config` command: inspect and edit the planner configuration file

use crate::args::ConfigSubcommand;
use course_planner::config::Config;
use std::io::{self, BufRead, Write};

/// Dispatch config subcommands
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) {
    match subcommand {
        None | Some(ConfigSubcommand::Get { key: None }) => show_all(config),
        Some(ConfigSubcommand::Get { key: Some(key) }) => show_one(config, &key),
        Some(ConfigSubcommand::Set { key, value }) => {
            let outcome = config.set(&key, &value);
            persist(config, outcome, &format!("Set {key} = {value}"));
        }
        Some(ConfigSubcommand::Unset { key }) => {
            let outcome = config.unset(&key, defaults);
            let shown = config.get(&key).unwrap_or_default();
            persist(config, outcome, &format!("Reset {key} to default ({shown})"));
        }
        Some(ConfigSubcommand::Reset) => reset(),
    }
}

fn show_all(config: &Config) {
    println!("\n=== Configuration ===");
    println!("# {}\n", Config::get_config_file_path().display());
    print!("{config}");
}

fn show_one(config: &Config, key: &str) {
    match config.get(key) {
        Some(value) => println!("{value}"),
        None => {
            eprintln!("✗ Unknown config key: '{key}'");
            std::process::exit(1);
        }
    }
}

/// Save after an in-memory edit, or report why the edit failed
fn persist(config: &Config, outcome: Result<(), String>, done: &str) {
    if let Err(e) = outcome {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
    if let Err(e) = config.save() {
        eprintln!("✗ Failed to save config: {e}");
        std::process::exit(1);
    }
    println!("✓ {done}");
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} (y/n): ");
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin().lock().read_line(&mut response).ok();
    matches!(response.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn reset() {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return;
    }
    if !confirm("Reset the planner config to defaults?") {
        println!("✗ Reset cancelled");
        return;
    }
    if let Err(e) = Config::reset() {
        eprintln!("✗ Failed to remove config file: {e}");
        std::process::exit(1);
    }
    println!("✓ Config reset to defaults");
}
