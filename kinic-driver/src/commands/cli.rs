//! 命令行定义

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::state::PointLabel;

/// Kinic driver CLI.
#[derive(Parser, Debug)]
#[command(name = "kinic-driver")]
#[command(about = "Drive the Kinic browser extension through synthetic input")]
#[command(version)]
pub struct Cli {
    /// Tuning settings file (default: <config dir>/kinic-driver/settings.json)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Coordinate file (default: <config dir>/kinic-driver/coordinates.json)
    #[arg(long, global = true)]
    pub coordinates: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save the current page to Kinic
    Save,

    /// Search and print the first result's URL
    Retrieve {
        /// Search query
        query: String,
    },

    /// Search, generate the AI answer and print its text
    Extract {
        /// Search query
        query: String,
    },

    /// Close the extension overlay
    Close,

    /// Record a screen coordinate
    Calibrate {
        /// Which point to record
        target: CalibrationTarget,

        /// X coordinate (captured from the pointer when omitted)
        #[arg(long, requires = "y", allow_hyphen_values = true)]
        x: Option<i32>,

        /// Y coordinate (captured from the pointer when omitted)
        #[arg(long, requires = "x", allow_hyphen_values = true)]
        y: Option<i32>,

        /// Seconds to wait before reading the pointer
        #[arg(long, default_value_t = 10)]
        delay: u64,
    },

    /// Print settings, coordinates and platform capabilities
    Config {
        /// Ask the OS for accessibility permission (macOS)
        #[arg(long)]
        request_permission: bool,
    },
}

/// 校准目标
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationTarget {
    /// Kinic extension button
    Button,
    /// AI answer text area
    Response,
}

impl From<CalibrationTarget> for PointLabel {
    fn from(target: CalibrationTarget) -> Self {
        match target {
            CalibrationTarget::Button => PointLabel::Button,
            CalibrationTarget::Response => PointLabel::ResponseArea,
        }
    }
}
