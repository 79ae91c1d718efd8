//! Recording session domain module

mod machine;
mod state;
mod timer;

pub use machine::{Effect, Segment, Session, SessionEvent, SessionSnapshot, Timestamp};
pub use state::{InvalidStateTransition, SessionState};
pub use timer::{format_clock, format_elapsed};
