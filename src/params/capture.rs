//! Audio capture and analysis configuration.

/// Capture pipeline configuration: sample format, block size, history depth
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Audio sample rate (Hz)
    pub sample_rate_hz: u32,

    /// Samples per analysis block (must be a power of 2)
    pub fft_size: usize,

    /// Waterfall history depth (frames retained, newest first)
    pub history_frames: usize,

    /// Chunks buffered between the stream callback and the blocking reader
    pub channel_depth: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44_100,
            fft_size: 2048,
            history_frames: 100,
            channel_depth: 32,
        }
    }
}

impl CaptureConfig {
    /// Number of one-sided spectrum bins per frame
    pub fn spectrum_bins(&self) -> usize {
        self.fft_size / 2
    }

    /// Frequency spacing between adjacent bins (Hz)
    pub fn bin_spacing_hz(&self) -> f32 {
        self.sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Highest representable frequency (Hz)
    pub fn nyquist_hz(&self) -> f32 {
        self.sample_rate_hz as f32 / 2.0
    }

    /// Block duration at the configured rate (seconds)
    pub fn block_duration_s(&self) -> f32 {
        self.fft_size as f32 / self.sample_rate_hz as f32
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 2 {
            return Err(format!(
                "FFT size must be a power of 2 >= 2, got {}",
                self.fft_size
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        if self.history_frames == 0 {
            return Err("History depth must be > 0".to_string());
        }
        if self.channel_depth == 0 {
            return Err("Channel depth must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spectrum_bins(), 1024);

        // 44100 / 2048 ≈ 21.53 Hz per bin
        assert!((config.bin_spacing_hz() - 21.53).abs() < 0.01);
        assert!((config.nyquist_hz() - 22_050.0).abs() < f32::EPSILON);

        // 2048 samples @ 44.1kHz ≈ 46ms per block
        assert!((config.block_duration_s() - 0.0464).abs() < 0.001);
    }

    #[test]
    fn test_validate_rejects_non_power_of_two() {
        let config = CaptureConfig {
            fft_size: 1000,
            ..CaptureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_history() {
        let config = CaptureConfig {
            history_frames: 0,
            ..CaptureConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
