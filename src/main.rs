//! hashpill - terminal demo of hashtag pill highlighting

mod app;
mod terminal;

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use hashpill::{Config, Result};

use app::App;
use terminal::Terminal;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut config = Config::load();
    let mut initial: Option<String> = None;

    for arg in &args {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-V" => {
                print_version();
                return Ok(());
            }
            "--free" => config.restrict_to_hashtag_prefix = false,
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                process::exit(2);
            }
            text => initial = Some(text.to_string()),
        }
    }

    setup_tracing();

    let terminal = Terminal::new()?;
    let mut app = App::new(terminal, &config, initial.as_deref())?;
    app.run()
}

/// Log to a file under HASHPILL_LOG_DIR; the screen belongs to the editor
fn setup_tracing() {
    use tracing_subscriber::EnvFilter;

    let Some(log_dir) = env::var("HASHPILL_LOG_DIR").ok().map(PathBuf::from) else {
        return;
    };
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let log_path = log_dir.join(format!("hashpill.{}.log", process::id()));
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("HASHPILL_LOG")
        .unwrap_or_else(|_| EnvFilter::new("hashpill=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    tracing::info!(path = ?log_path, "tracing initialized");
}

fn print_usage() {
    println!("hashpill {} - hashtag highlighting demo", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: hashpill [OPTIONS] [TEXT]");
    println!();
    println!("Options:");
    println!("  -h, --help     Show this help message");
    println!("  -V, --version  Show version information");
    println!("      --free     Accept any input (no hashtag-first rule)");
    println!();
    println!("Keys:");
    println!("  Left/Right     Move caret");
    println!("  Home/End       Start/end of text");
    println!("  Backspace/Del  Delete");
    println!("  Enter          New line");
    println!("  C-t            Toggle hashtag-first input");
    println!("  Esc, C-c      Quit");
    println!();
    println!("Settings are read from ~/.hashpill.toml");
    println!("Set HASHPILL_LOG_DIR to write a log file (filter with HASHPILL_LOG)");
}

fn print_version() {
    println!("hashpill {}", env!("CARGO_PKG_VERSION"));
}
