//! Voice Memo - terminal voice memo recorder
//!
//! This crate records voice memos from the microphone, keeps them in a local
//! recording store and plays them back, drawing a live waveform and an
//! elapsed-time readout while a session is active.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Session state machine, recording entity, waveform framebuffer, errors
//! - **Application**: Port interfaces (traits), session controller, live monitor, library
//! - **Infrastructure**: Adapter implementations (cpal, FLAC, filesystem store, rodio, config)
//! - **CLI**: Command-line interface, argument parsing, key input and terminal display

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
