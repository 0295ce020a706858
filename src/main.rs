use crossterm::style::Stylize;
use socialmap::assistant::{AssistantBridge, GeminiClient};
use socialmap::config::Config;
use socialmap::data::OrganizationStore;
use socialmap::search_filter::SearchFilter;
use socialmap::utils::app_paths::AppPaths;
use socialmap::utils::logging::{init_tracing, log_file_path};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

mod table_display;

use table_display::display_organizations;

fn print_help() {
    println!("{}", "SocialMap - реєстр соціальних служб півдня України".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  socialmap [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}          - Load organizations from a CSV/JSON export", "--data FILE".green());
    println!("  {}       - Print the directory, optionally filtered", "--list [QUERY]".green());
    println!(
        "  {} - Ask the assistant once and print the answer",
        "--ask QUESTION [--query QUERY]".green()
    );
    println!("  {}      - Generate config file with defaults", "--generate-config".green());
    println!("  {}                 - Show this help", "--help".green());
    println!();
    println!("{}", "Environment:".yellow());
    println!("  API_KEY / GEMINI_API_KEY   - key for the AI assistant");
    println!("  RUST_LOG                   - log filter (default socialmap=debug)");
    println!();
}

/// Value following `flag`, if present and not another flag
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
        .filter(|value| !value.starts_with("--"))
        .cloned()
}

fn generate_config() -> anyhow::Result<PathBuf> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    Ok(path)
}

fn load_store(data_file: Option<&PathBuf>) -> anyhow::Result<(OrganizationStore, String)> {
    match data_file {
        Some(path) => {
            let store = OrganizationStore::from_path(path)?;
            Ok((store, path.display().to_string()))
        }
        None => Ok((OrganizationStore::builtin(), "вбудований список".to_string())),
    }
}

fn ask_once(config: &Config, store: &OrganizationStore, question: &str, query: &str) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let client = {
        let _guard = runtime.enter();
        GeminiClient::new(&config.assistant)?
    };
    let bridge = AssistantBridge::new(Arc::new(client), config.assistant.temperature);
    let visible = SearchFilter::filter(store.all(), query);

    println!(
        "{}",
        format!("Запит з {} організаціями у контексті...", visible.len()).cyan()
    );
    let answer = runtime.block_on(bridge.ask(question, &visible));
    println!("\n{}", answer);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        match generate_config() {
            Ok(path) => {
                println!("Configuration file created at: {:?}", path);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }
        }
    }

    let log_path = AppPaths::log_dir().ok().map(|dir| log_file_path(&dir));
    init_tracing(log_path.as_deref());

    let config = Config::load().unwrap_or_else(|e| {
        warn!(target: "config", "Using default config: {:#}", e);
        Config::default()
    });

    let data_file = flag_value(&args, "--data")
        .map(PathBuf::from)
        .or_else(|| config.behavior.data_file.clone());
    let (store, data_source) = match load_store(data_file.as_ref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", format!("Cannot load organizations: {:#}", e).red());
            std::process::exit(1);
        }
    };
    info!(
        target: "system",
        "Loaded {} organizations from {}",
        store.len(),
        data_source
    );

    if args.contains(&"--list".to_string()) {
        let query = flag_value(&args, "--list").unwrap_or_default();
        let visible = SearchFilter::filter(store.all(), &query);
        display_organizations(&visible, store.len());
        return Ok(());
    }

    if args.contains(&"--ask".to_string()) {
        let Some(question) = flag_value(&args, "--ask") else {
            eprintln!("{}", "--ask needs a question".red());
            std::process::exit(2);
        };
        let query = flag_value(&args, "--query").unwrap_or_default();
        return ask_once(&config, &store, &question, &query);
    }

    if let Some(path) = &log_path {
        eprintln!("Debug logs: {}", path.display());
    }

    socialmap::ui::run_tui(config, store, data_source)
}
