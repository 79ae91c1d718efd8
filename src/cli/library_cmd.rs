//! List, info, export and delete commands

use std::path::PathBuf;
use std::process::ExitCode;

use crate::application::ports::RecordingStore;
use crate::application::{LibraryError, RecordingLibrary};
use crate::domain::recording::RecordingId;

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::input::is_affirmative;
use super::presenter::Presenter;

/// Library subcommands after argument parsing
#[derive(Debug, Clone)]
pub enum LibraryCommand {
    List,
    Info(RecordingId),
    Export {
        id: RecordingId,
        dir: Option<PathBuf>,
    },
    Delete {
        id: RecordingId,
        confirmed: bool,
    },
}

/// Run a library command and map the outcome to an exit code
pub async fn handle_library_command<S: RecordingStore>(
    command: LibraryCommand,
    library: &RecordingLibrary<S>,
    presenter: &Presenter,
) -> ExitCode {
    match run(command, library, presenter).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run<S: RecordingStore>(
    command: LibraryCommand,
    library: &RecordingLibrary<S>,
    presenter: &Presenter,
) -> Result<(), LibraryError> {
    match command {
        LibraryCommand::List => {
            let recordings = library.list().await?;
            presenter.recording_list(&recordings);
        }
        LibraryCommand::Info(id) => {
            let meta = library.info(&id).await?;
            presenter.recording_info(&meta);
        }
        LibraryCommand::Export { id, dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()
                    .map_err(|e| LibraryError::ExportFailed(e.to_string()))?,
            };
            let path = library.export(&id, &dir).await?;
            presenter.success(&format!("Exported to {}", path.display()));
            presenter.output(&path.to_string_lossy());
        }
        LibraryCommand::Delete { id, confirmed } => {
            let meta = library.info(&id).await?;
            if !confirmed && !confirm(presenter, &format!("Delete \"{}\"? [y/N]", meta.name)).await
            {
                presenter.info("Kept");
                return Ok(());
            }
            library.delete(&id).await?;
            presenter.success(&format!("Deleted \"{}\"", meta.name));
        }
    }
    Ok(())
}

/// Ask on stderr and read one answer line from stdin. EOF counts as no.
async fn confirm(presenter: &Presenter, question: &str) -> bool {
    presenter.prompt(question);
    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    })
    .await;

    match answer {
        Ok(Ok(line)) => is_affirmative(&line),
        _ => false,
    }
}
