//! Configuration infrastructure module

mod xdg;

pub use xdg::{XdgConfigStore, STORAGE_DIR_ENV};
