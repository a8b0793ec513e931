//! failscan CLI
//!
//! Entry point for the `failscan` command-line tool.

use clap::{Args, Parser, Subcommand};
use failscan::config::{self, deep_merge, EffectiveConfig};
use failscan::picker::PickCommand;
use failscan::pipeline::{self, Analysis, AnalysisError};
use failscan::{highlight, source, viewer, ExitCode, LogEntry, Settings};
use owo_colors::OwoColorize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "failscan")]
#[command(about = "Extract failure reasons from CI test logs", version)]
struct Cli {
    /// Path to user config file (default: $FAILSCAN_CONFIG or ~/.config/failscan/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List logs in the log directory
    List {
        /// Log directory (overrides logs.directory)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,

        /// List the oldest log first
        #[arg(long)]
        oldest_first: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Scan a log and write a failure report
    Scan(ScanArgs),

    /// Interactively pick logs to scan
    Pick {
        /// Log directory (overrides logs.directory)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,

        /// Open each report in the configured viewer
        #[arg(long)]
        open: bool,
    },

    /// Print a report with highlighting
    Show {
        /// Report file
        report: PathBuf,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Log file to scan (default: first log in the log directory)
    #[arg(conflicts_with = "index")]
    file: Option<PathBuf>,

    /// Log directory (overrides logs.directory)
    #[arg(long, short = 'd')]
    dir: Option<PathBuf>,

    /// Scan the N-th listed log (1-based)
    #[arg(long, short = 'n')]
    index: Option<usize>,

    /// Write the report to a temp file
    #[arg(long, conflicts_with = "report_dir")]
    temp: bool,

    /// Write the report into this directory
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Open the report in the configured viewer
    #[arg(long)]
    open: bool,

    /// Print the report to stdout
    #[arg(long)]
    print: bool,

    /// Exit with status 1 when failures are found
    #[arg(long)]
    strict: bool,

    /// Give up looking for a reason start after N lines
    #[arg(long)]
    start_search_limit: Option<usize>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration and its sources
    Show,

    /// Print the user config file path
    Path,

    /// Write a commented starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Set one key in the user config file
    Set {
        /// Dotted key, e.g. logs.directory
        key: String,

        /// New value; empty unsets optional keys, lists are comma-separated
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::List {
            dir,
            oldest_first,
            json,
        } => {
            run_list(config_path, dir, oldest_first, json);
        }
        Commands::Scan(args) => {
            run_scan(config_path, args);
        }
        Commands::Pick { dir, open } => {
            run_pick(config_path, dir, open);
        }
        Commands::Show { report } => {
            run_show(&report);
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show => run_config_show(config_path),
            ConfigCommands::Path => run_config_path(config_path),
            ConfigCommands::Init { force } => run_config_init(config_path, force),
            ConfigCommands::Set { key, value } => run_config_set(config_path, &key, &value),
        },
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn exit_with(err: &AnalysisError) -> ! {
    eprintln!("Error: {}", err);
    process::exit(ExitCode::from(err).as_i32());
}

fn exit_config(err: &config::ConfigError) -> ! {
    eprintln!("Configuration error: {}", err);
    process::exit(ExitCode::Config.as_i32());
}

/// Merge CLI overrides on top of defaults and the user file.
fn load_settings(config_path: Option<&Path>, overrides: Value) -> Settings {
    let user_path = match config::resolve_path(config_path) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::debug!(error = %e, "no user config");
            None
        }
    };
    let overrides = if overrides.as_object().is_some_and(|o| o.is_empty()) {
        None
    } else {
        Some(overrides)
    };
    match EffectiveConfig::build(user_path.as_deref(), overrides) {
        Ok(effective) => effective.settings,
        Err(e) => exit_config(&e),
    }
}

fn dir_override(dir: Option<&Path>) -> Value {
    match dir {
        Some(dir) => json!({ "logs": { "directory": dir.to_string_lossy() } }),
        None => json!({}),
    }
}

fn print_listing(entries: &[LogEntry]) {
    let width = entries.len().to_string().len();
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "  {:>width$}  {}  {}  {}",
            i + 1,
            entry.name.bold(),
            format_size(entry.size),
            entry.modified.format("%Y-%m-%d %H:%M:%S").dimmed(),
            width = width
        );
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn print_analysis(analysis: &Analysis) {
    println!("Log:    {}", analysis.log.display());
    println!("Report: {}", analysis.report.display());
    if analysis.summary.has_failures() {
        println!("Failure counts: {}", analysis.summary.counts.join(", ").red());
    } else {
        println!("No failures found.");
    }
}

fn print_report(report: &Path) -> Result<(), io::Error> {
    let text = std::fs::read_to_string(report)?;
    print!("{}", highlight::render(&text));
    Ok(())
}

fn run_list(config_path: Option<&Path>, dir: Option<PathBuf>, oldest_first: bool, json_output: bool) {
    let mut overrides = dir_override(dir.as_deref());
    if oldest_first {
        overrides = deep_merge(overrides, json!({ "logs": { "newest_first": false } }));
    }
    let settings = load_settings(config_path, overrides);

    let dir = match pipeline::log_directory(&settings, None) {
        Ok(dir) => dir,
        Err(e) => exit_with(&e),
    };
    let entries = match pipeline::list(&settings, dir) {
        Ok(entries) => entries,
        Err(e) => exit_with(&e),
    };

    if json_output {
        match serde_json::to_string_pretty(&entries) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if entries.is_empty() {
        println!("No log files in {}.", dir.display());
        return;
    }
    println!("Logs in {} ({} total):\n", dir.display(), entries.len());
    print_listing(&entries);
}

fn run_scan(config_path: Option<&Path>, args: ScanArgs) {
    let mut overrides = dir_override(args.dir.as_deref());
    if args.temp {
        overrides = deep_merge(overrides, json!({ "report": { "use_temp_file": true } }));
    }
    if let Some(ref report_dir) = args.report_dir {
        overrides = deep_merge(
            overrides,
            json!({ "report": { "use_temp_file": false, "directory": report_dir.to_string_lossy() } }),
        );
    }
    if let Some(limit) = args.start_search_limit {
        overrides = deep_merge(overrides, json!({ "scan": { "start_search_limit": limit } }));
    }
    let settings = load_settings(config_path, overrides);

    let log = match args.file {
        Some(file) => file,
        None => {
            let chosen = pipeline::log_directory(&settings, None)
                .and_then(|dir| pipeline::choose_log(&settings, dir, args.index));
            match chosen {
                Ok(entry) => entry.path,
                Err(e) => exit_with(&e),
            }
        }
    };

    let analysis = match pipeline::analyze(
        &log,
        &pipeline::sink_target(&settings),
        pipeline::extract_options(&settings),
    ) {
        Ok(analysis) => analysis,
        Err(e) => exit_with(&e),
    };

    print_analysis(&analysis);
    if analysis.summary.start_search_exhausted > 0 {
        eprintln!(
            "Note: {} marker(s) had no reason start line within the search limit.",
            analysis.summary.start_search_exhausted
        );
    }

    if args.print {
        println!();
        if let Err(e) = print_report(&analysis.report) {
            eprintln!("Error reading report {}: {}", analysis.report.display(), e);
            process::exit(ExitCode::SinkUnavailable.as_i32());
        }
    }

    if args.open {
        if let Err(e) = viewer::open(&settings.viewer, &analysis.report) {
            exit_with(&AnalysisError::Viewer(e));
        }
    }

    process::exit(ExitCode::for_scan(analysis.summary.has_failures(), args.strict).as_i32());
}

fn run_pick(config_path: Option<&Path>, dir: Option<PathBuf>, open: bool) {
    let settings = load_settings(config_path, dir_override(dir.as_deref()));
    let dir = match pipeline::log_directory(&settings, None) {
        Ok(dir) => dir.to_path_buf(),
        Err(e) => exit_with(&e),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        let entries = match pipeline::list(&settings, &dir) {
            Ok(entries) => entries,
            Err(e) => exit_with(&e),
        };

        println!();
        if entries.is_empty() {
            println!("No log files in {}.", dir.display());
        } else {
            print_listing(&entries);
        }
        print!("\nLog number [Enter = first, r = refresh, q = quit]: ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                process::exit(ExitCode::Config.as_i32());
            }
        }

        let index = match PickCommand::parse(&line) {
            PickCommand::Quit => break,
            PickCommand::Refresh => continue,
            PickCommand::First => 1,
            PickCommand::Index(n) => n,
            PickCommand::Invalid(raw) => {
                eprintln!("Not a log number: '{}'", raw);
                continue;
            }
        };

        let entry = match source::select(&entries, index) {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("Error: {}", e);
                continue;
            }
        };

        match pipeline::analyze(
            &entry.path,
            &pipeline::sink_target(&settings),
            pipeline::extract_options(&settings),
        ) {
            Ok(analysis) => {
                print_analysis(&analysis);
                println!();
                if let Err(e) = print_report(&analysis.report) {
                    eprintln!("Error reading report {}: {}", analysis.report.display(), e);
                }
                if open {
                    if let Err(e) = viewer::open(&settings.viewer, &analysis.report) {
                        eprintln!("Error: {}", e);
                    }
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}

fn run_show(report: &Path) {
    if let Err(e) = print_report(report) {
        eprintln!("Error reading report {}: {}", report.display(), e);
        process::exit(ExitCode::SourceUnavailable.as_i32());
    }
}

fn user_config_path(config_path: Option<&Path>) -> PathBuf {
    match config::resolve_path(config_path) {
        Ok(path) => path,
        Err(e) => exit_config(&e),
    }
}

fn run_config_show(config_path: Option<&Path>) {
    let path = user_config_path(config_path);
    let effective = match EffectiveConfig::build(Some(&path), None) {
        Ok(effective) => effective,
        Err(e) => exit_config(&e),
    };
    match effective.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_config_path(config_path: Option<&Path>) {
    let path = user_config_path(config_path);
    if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{} (not created; run `failscan config init`)", path.display());
    }
}

fn run_config_init(config_path: Option<&Path>, force: bool) {
    let path = user_config_path(config_path);
    if let Err(e) = config::init_file(&path, force) {
        exit_config(&e);
    }
    println!("Wrote {}", path.display());
}

fn run_config_set(config_path: Option<&Path>, key: &str, value: &str) {
    let path = user_config_path(config_path);
    if let Err(e) = config::set_key(&path, key, value) {
        if matches!(e, config::ConfigError::UnknownKey(_)) {
            eprintln!("Known keys: {}", config::SETTABLE_KEYS.join(", "));
        }
        exit_config(&e);
    }
    println!("Set {} in {}", key, path.display());
}
