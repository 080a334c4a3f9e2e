//! RedWings CLI
//!
//! Command-line interface for extracting biomechanical metrics from pose
//! landmark sequences and turning them into coaching feedback.
//!
//! # Usage
//!
//! ```bash
//! # Metrics summary for a (frames, 33, 4) landmark file
//! redwings analyze run.json --pretty
//!
//! # Metrics plus coaching feedback for an athlete
//! redwings coach run.json --profile rider.json
//! ```

use clap::{Parser, Subcommand};

pub mod commands;

/// RedWings Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "redwings")]
#[command(author, version, about = "Biomechanical metrics and coaching from pose landmarks")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the metrics summary from a landmark file
    Analyze(commands::AnalyzeArgs),

    /// Extract metrics and generate coaching feedback
    Coach(commands::CoachArgs),

    /// Display version information
    Version,
}
