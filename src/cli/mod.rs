//! CLI Module
//!
//! Command-line interface for the Strata compositing engine.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strata - layered, non-destructive image editing
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a stack of layers and save the composite
    #[command(name = "apply")]
    Apply {
        /// Input image
        input: PathBuf,

        /// Output image
        output: PathBuf,

        /// Operation to add as a layer, e.g. `grayscale` or `brightness=40`
        #[arg(short = 'l', long = "layer")]
        layers: Vec<String>,

        /// Disable the layer at this index before saving
        #[arg(long)]
        disable: Vec<usize>,
    },

    /// Render an uncommitted preview of one control over a layer stack
    #[command(name = "preview")]
    Preview {
        /// Input image
        input: PathBuf,

        /// Output image
        output: PathBuf,

        /// Control to preview (brightness, contrast, scale, translate, rotate)
        #[arg(long)]
        control: String,

        /// Control value, e.g. `45` or `10,-5`
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        /// Committed layers beneath the preview
        #[arg(short = 'l', long = "layer")]
        layers: Vec<String>,
    },

    /// List every available operation
    #[command(name = "operations")]
    Operations,

    /// Print image dimensions
    #[command(name = "info")]
    Info {
        /// Input image
        input: PathBuf,
    },
}
