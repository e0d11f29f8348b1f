//! Command-line interface for runlog.
//!
//! Provides commands for logging files into a run's artifact store,
//! listing stored artifacts, and inspecting the record log.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config;
use crate::core::{LoggingQueue, RecordStore};
use crate::domain::{LogOutcome, PendingArtifact};
use crate::store::LocalArtifactStore;

/// runlog - Asynchronous run artifact logging
#[derive(Parser, Debug)]
#[command(name = "runlog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a local file as a run artifact
    Log {
        /// File to log
        file: PathBuf,

        /// Run ID (a new run is created if not provided)
        #[arg(short, long)]
        run: Option<Uuid>,

        /// Subdirectory within the run's artifact store
        #[arg(short, long, default_value = "")]
        artifact_path: String,
    },

    /// List artifacts stored for a run
    List {
        /// Run ID (UUID)
        run: Uuid,
    },

    /// Show the artifact record log for a run
    Records {
        /// Run ID (UUID)
        run: Uuid,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Log {
                file,
                run,
                artifact_path,
            } => log_artifact(file, run, artifact_path).await,
            Commands::List { run } => list_artifacts(run).await,
            Commands::Records { run } => show_records(run).await,
            Commands::Config => show_config(),
        }
    }
}

/// Log one file through the asynchronous queue and wait for the outcome
async fn log_artifact(file: PathBuf, run: Option<Uuid>, artifact_path: String) -> Result<()> {
    let file = file
        .canonicalize()
        .with_context(|| format!("Cannot read file: {}", file.display()))?;

    let run_id = run.unwrap_or_else(Uuid::new_v4);
    let runs_dir = config::runs_dir()?;

    let store = Arc::new(LocalArtifactStore::for_run(&runs_dir, run_id));
    let records = RecordStore::open(run_id).await?;
    let queue = LoggingQueue::spawn(store, records, config::config()?.queue.capacity);

    let completion = queue
        .enqueue(PendingArtifact::from_file(artifact_path, &file))
        .await?;
    let outcome = completion.wait().await;
    queue.shutdown().await;

    match outcome {
        LogOutcome::Logged => {
            println!("Logged {} to run {}", file.display(), run_id);
            Ok(())
        }
        LogOutcome::Failed(error) => anyhow::bail!("Failed to log artifact: {}", error),
    }
}

/// Print the artifact tree of a run, relative to its artifacts root
async fn list_artifacts(run_id: Uuid) -> Result<()> {
    let store = LocalArtifactStore::for_run(&config::runs_dir()?, run_id);
    let root = store.root();

    if !root.exists() {
        println!("No artifacts for run {}", run_id);
        return Ok(());
    }

    let mut files = collect_files(root)?;
    files.sort();

    for file in files {
        let relative = file.strip_prefix(root).unwrap_or(&file);
        println!("{}", relative.display());
    }

    Ok(())
}

/// Walk a directory tree collecting file paths
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Replay and print the record log of a run
async fn show_records(run_id: Uuid) -> Result<()> {
    let records = RecordStore::open(run_id).await?;
    let entries = records.replay().await?;

    if entries.is_empty() {
        println!("No records for run {}", run_id);
        return Ok(());
    }

    for record in entries {
        let name = record.file_name.as_deref().unwrap_or("<unknown>");
        let location = if record.artifact_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", record.artifact_path, name)
        };

        match record.error {
            None => println!(
                "{}  logged  {}  {} bytes",
                record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                location,
                record.size_bytes.unwrap_or(0),
            ),
            Some(error) => println!(
                "{}  failed  {}  ({})",
                record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                location,
                error,
            ),
        }
    }

    Ok(())
}

/// Print the resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("home:           {}", config.home.display());
    println!("runs dir:       {}", config.runs_dir().display());
    println!("queue capacity: {}", config.queue.capacity);
    match &config.config_file {
        Some(path) => println!("config file:    {}", path.display()),
        None => println!("config file:    (none)"),
    }

    Ok(())
}
