// cli.rs - Command-line interface of the simulator
use std::path::PathBuf;

use clap::Parser;
use dot_matrix_display::{ConfigError, DisplayConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "simulator")]
#[command(about = "Flickering dot-matrix display simulator", long_about = None)]
pub struct Cli {
    /// JSON configuration file (missing fields keep their defaults)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Shape shown at startup
    #[arg(long, default_value = "circle")]
    pub shape: String,

    /// Draw block ids at block centers
    #[arg(long)]
    pub show_ids: bool,

    /// Dot edge length in pixels
    #[arg(long)]
    pub dot_size: Option<u32>,

    /// Minimum delay between frames in milliseconds
    #[arg(long = "interval-ms")]
    pub interval_ms: Option<u64>,

    /// Fraction of highlighted dots redrawn per frame
    #[arg(long)]
    pub high_pct: Option<f32>,

    /// Fraction of background dots redrawn per frame
    #[arg(long)]
    pub low_pct: Option<f32>,

    /// Seed for a reproducible flicker
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// Load the configuration file, if any, and apply flag overrides on top.
    pub fn display_config(&self) -> Result<DisplayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DisplayConfig::load(path)?,
            None => DisplayConfig::default(),
        };

        if self.show_ids {
            config.show_ids = true;
        }
        if let Some(size) = self.dot_size {
            config.dot_size = size;
        }
        if let Some(ms) = self.interval_ms {
            config.animation_interval_ms = ms;
        }
        if let Some(pct) = self.high_pct {
            config.update_percentage_high = pct;
        }
        if let Some(pct) = self.low_pct {
            config.update_percentage_low = pct;
        }

        config.validate()?;
        Ok(config)
    }
}
