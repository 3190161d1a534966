//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::params::{ColorScheme, DisplayConfig, DisplayMode};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "wavescope")]
#[command(about = "Live audio spectrum analyzer", long_about = None)]
pub struct Args {
    /// Capture duration (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "10")]
    pub duration: f32,

    /// Lower edge of the displayed frequency range (Hz)
    #[arg(long, value_name = "HZ", default_value = "300")]
    pub low: f32,

    /// Upper edge of the displayed frequency range (Hz)
    #[arg(long, value_name = "HZ", default_value = "2000")]
    pub high: f32,

    /// Post-normalization gain (contrast control)
    #[arg(long, value_name = "FACTOR", default_value = "2.0")]
    pub gain: f32,

    /// Color scheme: blue-to-red (default), black-to-red
    #[arg(long, value_name = "SCHEME", default_value = "blue-to-red")]
    pub scheme: String,

    /// Scrolling waterfall history instead of instantaneous bars
    #[arg(long)]
    pub waterfall: bool,

    /// Samples per analysis block (power of 2)
    #[arg(long, value_name = "SAMPLES", default_value = "2048")]
    pub fft_size: usize,

    /// Write the final snapshot to this PNG file
    #[arg(long, value_name = "PATH", default_value = "spectrum.png")]
    pub out: PathBuf,

    /// Also record the captured audio to this WAV file
    #[arg(long, value_name = "PATH")]
    pub record: Option<PathBuf>,

    /// Input device name (substring match); system default when omitted
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// List input devices and exit
    #[arg(long)]
    pub list_devices: bool,
}

impl Args {
    /// Parse the color scheme from command-line arguments
    pub fn parse_scheme(&self) -> ColorScheme {
        match self.scheme.to_lowercase().as_str() {
            "blue-to-red" | "blue" => ColorScheme::BlueToRed,
            "black-to-red" | "black" => ColorScheme::BlackToRed,
            other => {
                eprintln!("Warning: Unknown color scheme '{}', using blue-to-red", other);
                ColorScheme::BlueToRed
            }
        }
    }

    /// Build the display configuration from the arguments
    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            low_hz: self.low,
            high_hz: self.high,
            gain: self.gain,
            scheme: self.parse_scheme(),
            mode: if self.waterfall {
                DisplayMode::Waterfall
            } else {
                DisplayMode::Bars
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["wavescope"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults_match_display_config() {
        let parsed = args(&[]);
        let config = parsed.display_config();
        assert!((config.low_hz - 300.0).abs() < f32::EPSILON);
        assert!((config.high_hz - 2000.0).abs() < f32::EPSILON);
        assert!((config.gain - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.scheme, ColorScheme::BlueToRed);
        assert_eq!(config.mode, DisplayMode::Bars);
    }

    #[test]
    fn test_scheme_parse_is_lenient() {
        assert_eq!(
            args(&["--scheme", "BLACK-TO-RED"]).parse_scheme(),
            ColorScheme::BlackToRed
        );
        assert_eq!(
            args(&["--scheme", "nonsense"]).parse_scheme(),
            ColorScheme::BlueToRed
        );
    }

    #[test]
    fn test_waterfall_flag_selects_mode() {
        assert_eq!(
            args(&["--waterfall"]).display_config().mode,
            DisplayMode::Waterfall
        );
    }
}
