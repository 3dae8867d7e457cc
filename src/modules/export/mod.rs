//! Export Module
//!
//! Dumps the rows on screen to a file.
//!
//! - 'e' key / `:export [csv|json]`
//! - Files saved to `<data dir>/exports/`

mod csv_export;
mod json_export;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config;
use crate::core::{Action, ExportFormat, NotifyLevel};
use crate::domain::session::Session;

/// Get the export directory path, creating it if needed
fn get_export_dir() -> std::io::Result<PathBuf> {
    let export_dir = config::exports_dir().unwrap_or_else(|| PathBuf::from(".tablescope").join("exports"));
    fs::create_dir_all(&export_dir)?;
    Ok(export_dir)
}

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

/// `<contract>-<table>-<scope>`, safe for file names
fn file_prefix(session: &Session) -> String {
    let selection = session.selection();
    [
        selection.contract.as_deref(),
        selection.table.as_deref(),
        selection.scope.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(|part| part.replace(|c: char| !c.is_ascii_alphanumeric() && c != '.', "_"))
    .collect::<Vec<_>>()
    .join("-")
}

/// Export the current rows to the default export directory
pub fn export_rows(session: &Session, format: ExportFormat) -> Action {
    if session.rows().is_empty() {
        return Action::Notify("No rows to export".to_string(), NotifyLevel::Warn);
    }

    let export_dir = match get_export_dir() {
        Ok(dir) => dir,
        Err(e) => {
            return Action::Notify(
                format!("Failed to create export directory: {}", e),
                NotifyLevel::Error,
            )
        }
    };

    export_rows_to(session, format, &export_dir)
}

pub fn export_rows_to(session: &Session, format: ExportFormat, dir: &Path) -> Action {
    let extension = match format {
        ExportFormat::Csv => "csv",
        ExportFormat::Json => "json",
    };
    let filename = generate_filename(&file_prefix(session), extension);
    let path = dir.join(&filename);

    let result = match format {
        ExportFormat::Csv => csv_export::write_rows(&path, session.rows()),
        ExportFormat::Json => json_export::write_rows(
            &path,
            &session.location().to_path(),
            session.page_index(),
            session.rows(),
        ),
    };

    match result {
        Ok(count) => {
            log::info!("exported {} rows to {}", count, path.display());
            Action::Notify(
                format!("Exported {} rows to {}", count, path.display()),
                NotifyLevel::Info,
            )
        }
        Err(e) => Action::Notify(format!("Export failed: {}", e), NotifyLevel::Error),
    }
}
