//! Common utilities for the Quoll selector engine.
//!
//! This crate provides shared infrastructure used by all Quoll components:
//! - **Diagnostics** - deduplicated, colored warnings and trace output

pub mod diagnostics;

pub use diagnostics::{clear_warnings, recorded_warnings, warn_once};
