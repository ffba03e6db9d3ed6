//! TypeSpec Client Model Mapper CLI

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::json;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use typespec_clientgen::{example, factory_for, map_code_model, Client, CodeModel, Flavor, Settings};

/// Global flag for watch mode termination
static RUNNING: AtomicBool = AtomicBool::new(true);

#[derive(Parser)]
#[command(name = "tsp-clientgen")]
#[command(about = "Map a code model to a client model")]
struct Cli {
    /// Input code model (JSON)
    input: PathBuf,

    /// Settings file (JSON, kebab-case keys)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Root package; overrides the settings file
    #[arg(short, long)]
    namespace: Option<String>,

    /// Generator flavor
    #[arg(short, long, value_enum, default_value = "default")]
    flavor: Flavor,

    /// Output file for the client model; stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include example payloads for every model
    #[arg(short, long)]
    examples: bool,

    /// Watch input files and remap on changes
    #[arg(short, long)]
    watch: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.settings {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings {}", path.display()))?;
            serde_json::from_str::<Settings>(&source)
                .with_context(|| format!("Failed to parse settings {}", path.display()))?
        }
        None => Settings::default(),
    };
    if let Some(namespace) = &cli.namespace {
        settings.namespace = namespace.clone();
    }
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

/// Perform a single mapping run
fn do_generate(cli: &Cli) -> Result<Client> {
    let settings = load_settings(cli)?;
    let source = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let code_model =
        CodeModel::from_json(&source).with_context(|| format!("Failed to parse {}", cli.input.display()))?;

    let factory = factory_for(cli.flavor);
    let client = map_code_model(&code_model, &settings, factory.as_ref())
        .with_context(|| format!("Failed to map {}", cli.input.display()))?;

    // Mock tests describe responses, samples describe requests.
    let with_examples = cli.examples || settings.generate_tests || settings.generate_samples;
    let document = if with_examples {
        json!({
            "client": client,
            "examples": example::examples_for_client(&client, settings.generate_samples && !settings.generate_tests),
        })
    } else {
        json!({ "client": client })
    };

    let rendered = serde_json::to_string_pretty(&document)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(output = %path.display(), "wrote client model");
        }
        None => println!("{}", rendered),
    }
    Ok(client)
}

fn summarize(client: &Client) {
    eprintln!(
        "Mapped {}: {} models, {} enums, {} method groups",
        client.client_name,
        client.models.len(),
        client.enums.len(),
        client.service_clients.iter().map(|s| s.method_groups.len()).sum::<usize>()
    );
}

/// Run in watch mode
fn run_watch(cli: &Cli) -> Result<()> {
    RUNNING.store(true, Ordering::SeqCst);

    let _ = ctrlc::set_handler(|| {
        RUNNING.store(false, Ordering::SeqCst);
    });

    let watched: HashSet<PathBuf> = std::iter::once(&cli.input)
        .chain(cli.settings.as_ref())
        .filter_map(|f| f.canonicalize().ok())
        .collect();
    let watch_dirs: HashSet<PathBuf> = watched
        .iter()
        .filter_map(|p| p.parent().map(|p| p.to_path_buf()))
        .collect();

    if watch_dirs.is_empty() {
        anyhow::bail!("No valid directories to watch");
    }

    eprintln!("TypeSpec Client Mapper - Watch Mode");
    eprintln!("===================================\n");

    eprint!("Running initial mapping... ");
    let _ = io::stderr().flush();

    match do_generate(cli) {
        Ok(client) => {
            eprintln!("done");
            summarize(&client);
        }
        Err(e) => eprintln!("failed\nError: {:#}\n", e),
    }

    eprintln!(
        "Watching {} file{} for changes",
        watched.len(),
        if watched.len() == 1 { "" } else { "s" }
    );
    eprintln!("\nPress Ctrl+C to stop\n");

    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        Config::default().with_poll_interval(Duration::from_millis(500)),
    )?;

    for dir in &watch_dirs {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
    }

    while RUNNING.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(Ok(event)) => {
                let input_changed = event
                    .paths
                    .iter()
                    .filter_map(|p| p.canonicalize().ok())
                    .any(|p| watched.contains(&p));

                if input_changed {
                    let timestamp = Local::now().format("%H:%M:%S");
                    eprintln!("[{}] Change detected, remapping...", timestamp);

                    match do_generate(cli) {
                        Ok(client) => summarize(&client),
                        Err(e) => eprintln!("Error: {:#}\n", e),
                    }
                } else {
                    debug!(paths = ?event.paths, "ignored change");
                }
            }
            Ok(Err(e)) => {
                eprintln!("Watch error: {}", e);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    eprintln!("\nWatch stopped.");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(io::stderr)
        .init();

    if cli.watch {
        run_watch(&cli)
    } else {
        let client = do_generate(&cli)?;
        summarize(&client);
        Ok(())
    }
}
