//! Avniconf CLI - Command-line interface for reconciling Avni configuration
//!
//! This crate provides the CLI application that ties together all avniconf components.

pub mod config;
pub mod report;

pub use config::{Command, Config, OutputFormat};
pub use report::{render_resolution, render_text};
