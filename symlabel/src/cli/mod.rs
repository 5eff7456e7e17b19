//! Command-line interface for symlabel
//!
//! This module contains CLI argument parsing and configuration

pub mod args;

pub use args::Args;
