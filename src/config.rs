//! Run configuration.

use clap::ValueEnum;
use serde::Serialize;

use crate::graphics::tiles::DEFAULT_CELL_SIZE;

/// File format of repacked tileset images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Bmp,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Bmp => "bmp",
            OutputFormat::Png => "png",
        }
    }
}

/// Configuration options for a minimisation run
#[derive(Debug, Clone)]
pub struct MinimiseConfig {
    /// Side length of a tile in pixels
    pub cell_size: u32,
    pub output_format: OutputFormat,
    /// Run PNG output through oxipng with bit depth reduction
    pub optimise_png: bool,
    /// Drop tiles no map layer references before deduplicating (map runs only)
    pub prune_unused: bool,
    /// Compute and report the reduction without writing any files
    pub dry_run: bool,
}

impl Default for MinimiseConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            output_format: OutputFormat::Bmp,
            optimise_png: false,
            prune_unused: false,
            dry_run: false,
        }
    }
}
