//! Recording storage infrastructure module

mod fs;
mod memory;

pub use fs::FsRecordingStore;
pub use memory::MemoryRecordingStore;
