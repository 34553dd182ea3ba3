//! # parakit-core
//!
//! Core library of the ParaKit memory extractor.
//!
//! This crate provides:
//! - Windows process memory reading and suspension
//! - Per-title memory schemas (built-in or loaded from TOML)
//! - Entity decoders and the snapshot builder
//! - Frame-synchronised capture feeding pluggable analyzers

pub mod analysis;
pub mod capture;
pub mod config;
pub mod error;
pub mod extract;
pub mod game;
pub mod memory;
pub mod schema;
pub mod window;

pub use analysis::{Analyzer, AnalyzerContext, AnalyzerRegistry};
pub use capture::{
    CaptureMode, CaptureOptions, CaptureReport, CaptureScheduler, PollPolicy, Termination,
};
pub use config::Config;
pub use error::{Error, Result};
pub use extract::{ExtractionFlags, SnapshotBuilder, read_untracked};
pub use game::{GameSpecific, GameState, UntrackedValues};
pub use memory::{MemoryReader, ProcessControl, ProcessHandle, ReadMemory};
pub use schema::{GameSchema, GameTitle};
pub use window::{GameWindow, ScreenCapture, WindowControl};
