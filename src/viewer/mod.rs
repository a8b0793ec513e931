//! Opening finished reports in an external program

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::config::ViewerSettings;

/// Errors launching the viewer
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' exited with {status}")]
    Exit { command: String, status: ExitStatus },
}

/// Build the command that opens `report` with the configured viewer.
pub fn command_for(viewer: &ViewerSettings, report: &Path) -> Command {
    let mut command = Command::new(&viewer.command);
    command.args(&viewer.args).arg(report);
    command
}

/// Open `report` and wait for the viewer to return.
pub fn open(viewer: &ViewerSettings, report: &Path) -> Result<(), ViewerError> {
    tracing::info!(command = %viewer.command, report = %report.display(), "opening report");

    let status = command_for(viewer, report)
        .status()
        .map_err(|source| ViewerError::Spawn {
            command: viewer.command.clone(),
            source,
        })?;

    if !status.success() {
        return Err(ViewerError::Exit {
            command: viewer.command.clone(),
            status,
        });
    }
    Ok(())
}
