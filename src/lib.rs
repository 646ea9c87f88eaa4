pub mod catalog;
pub mod cost;
pub mod diagnosis;
pub mod error;
pub mod models;
pub mod monitor;
pub mod schedule;
pub mod settings;
pub mod snapshot;
mod utils;
pub mod workflow;

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use log::{error, info, warn};

use catalog::StaticCatalog;
use diagnosis::SimulatedDiagnoser;
use error::WorkflowError;
use models::ImageHandle;
use settings::SettingsStore;
use snapshot::SessionSnapshot;
use workflow::{
    commands::{self, Command, Outcome},
    SystemClock, WorkflowController,
};

pub const DATA_DIR_ENV: &str = "CROPDOC_DATA_DIR";
pub const DEBUG_ENV: &str = "CROPDOC_DEBUG";

/// Turn a user-supplied path into an image handle. Failures here never reach
/// the workflow.
pub fn acquire_image(path: &str) -> Result<ImageHandle, WorkflowError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(WorkflowError::CaptureUnavailable("no image path given".into()));
    }
    if !Path::new(path).is_file() {
        return Err(WorkflowError::CaptureUnavailable(format!(
            "{path} is not a readable file"
        )));
    }
    Ok(ImageHandle::new(path))
}

fn data_dir() -> PathBuf {
    std::env::var(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".cropdoc"))
}

pub fn run() {
    let debug_mode = std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(if debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    info!("CropDoc starting up...");

    let result = tokio::runtime::Runtime::new()
        .context("failed to start async runtime")
        .and_then(|runtime| runtime.block_on(serve(data_dir())));

    if let Err(err) = result {
        error!("CropDoc exited with an error: {err:#}");
        std::process::exit(1);
    }
}

async fn serve(data_dir: PathBuf) -> anyhow::Result<()> {
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let settings = Arc::new(SettingsStore::new(data_dir.join("settings.json"))?);
    let catalog = Arc::new(StaticCatalog::builtin()?);
    let diagnoser = Arc::new(SimulatedDiagnoser::new(
        catalog.clone(),
        settings.current().latency,
    ));
    let controller = WorkflowController::new(diagnoser, catalog, settings, Arc::new(SystemClock));

    let session_path = data_dir.join("session.json");
    match SessionSnapshot::load(&session_path) {
        Ok(Some(snapshot)) => controller.restore_snapshot(snapshot).await,
        Ok(None) => {}
        Err(err) => warn!("Ignoring saved session: {err:#}"),
    }

    println!("{}", controller.current_view().await);
    println!("Type `help` for commands.");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match Command::parse(&line) {
            Ok(command) => commands::execute(&controller, command).await,
            Err(message) => Err(message),
        };

        match outcome {
            Ok(Outcome::Continue(message)) => println!("{message}"),
            Ok(Outcome::Quit) => break,
            Err(message) => println!("error: {message}"),
        }
        io::stdout().flush().ok();
    }

    controller.export_snapshot().await.save(&session_path)?;
    info!("Session saved to {}", session_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_rejects_missing_files() {
        assert!(matches!(
            acquire_image("  "),
            Err(WorkflowError::CaptureUnavailable(_))
        ));
        assert!(matches!(
            acquire_image("/definitely/not/here.jpg"),
            Err(WorkflowError::CaptureUnavailable(_))
        ));
    }

    #[test]
    fn acquire_accepts_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();
        assert_eq!(acquire_image(&path).unwrap().source, path);
    }
}
