//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, key input, signal handling,
//! and the command runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod display;
pub mod input;
pub mod library_cmd;
pub mod play_cmd;
pub mod presenter;
pub mod record_cmd;
pub mod signals;

// Re-export commonly used types
pub use app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, PlayOptions, RecordOptions};
pub use library_cmd::{handle_library_command, LibraryCommand};
pub use play_cmd::run_play;
pub use presenter::Presenter;
pub use record_cmd::run_record;
