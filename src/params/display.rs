//! Display settings shared between the capture loop and the renderer.

use std::sync::{Arc, Mutex};

/// Magnitude-to-color mapping variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    /// Hue sweep from blue (quiet) to red (full scale)
    BlueToRed,
    /// Black through purple to red, split at half scale
    BlackToRed,
}

/// Spectrum display variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Instantaneous bar spectrum
    Bars,
    /// Scrolling history, one row per published frame
    Waterfall,
}

/// User-adjustable display settings
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Lower edge of the rendered frequency range (Hz)
    pub low_hz: f32,

    /// Upper edge of the rendered frequency range (Hz)
    pub high_hz: f32,

    /// Post-normalization gain. Acts as a contrast control on the normalized
    /// spectrum, not as true amplitude gain.
    pub gain: f32,

    /// Active magnitude-to-color mapping
    pub scheme: ColorScheme,

    /// Active display mode
    pub mode: DisplayMode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            low_hz: 300.0, // voice band by default
            high_hz: 2000.0,
            gain: 2.0,
            scheme: ColorScheme::BlueToRed,
            mode: DisplayMode::Bars,
        }
    }
}

impl DisplayConfig {
    /// Validate against the Nyquist limit: 0 <= low < high <= nyquist, gain >= 0
    pub fn validate(&self, nyquist_hz: f32) -> Result<(), String> {
        if self.low_hz < 0.0 || self.low_hz >= self.high_hz || self.high_hz > nyquist_hz {
            return Err(format!(
                "Frequency range must satisfy 0 <= low < high <= {} Hz, got {}..{}",
                nyquist_hz, self.low_hz, self.high_hz
            ));
        }
        if self.gain < 0.0 {
            return Err(format!("Gain must be >= 0, got {}", self.gain));
        }
        Ok(())
    }
}

/// Shared handle to the display settings.
///
/// Writers replace whole field groups under the lock, so a reader never
/// observes a frequency range mid-update (low from one range, high from
/// another). Reads may be one frame stale; that is fine.
#[derive(Clone)]
pub struct SharedDisplayConfig {
    inner: Arc<Mutex<DisplayConfig>>,
}

impl SharedDisplayConfig {
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(config)),
        }
    }

    /// Snapshot of the current settings
    pub fn get(&self) -> DisplayConfig {
        self.inner.lock().unwrap().clone()
    }

    /// Current gain, read once per capture cycle
    pub fn gain(&self) -> f32 {
        self.inner.lock().unwrap().gain
    }

    /// Replace the frequency range; both edges change together under the lock
    pub fn set_frequency_range(
        &self,
        low_hz: f32,
        high_hz: f32,
        nyquist_hz: f32,
    ) -> Result<(), String> {
        let mut config = self.inner.lock().unwrap();
        let candidate = DisplayConfig {
            low_hz,
            high_hz,
            ..config.clone()
        };
        candidate.validate(nyquist_hz)?;
        *config = candidate;
        Ok(())
    }

    pub fn set_gain(&self, gain: f32) -> Result<(), String> {
        if gain < 0.0 {
            return Err(format!("Gain must be >= 0, got {}", gain));
        }
        self.inner.lock().unwrap().gain = gain;
        Ok(())
    }

    pub fn set_scheme(&self, scheme: ColorScheme) {
        self.inner.lock().unwrap().scheme = scheme;
    }

    pub fn set_mode(&self, mode: DisplayMode) {
        self.inner.lock().unwrap().mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NYQUIST: f32 = 22_050.0;

    #[test]
    fn test_default_config_valid() {
        assert!(DisplayConfig::default().validate(NYQUIST).is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = DisplayConfig {
            low_hz: 2000.0,
            high_hz: 300.0,
            ..DisplayConfig::default()
        };
        assert!(config.validate(NYQUIST).is_err());
    }

    #[test]
    fn test_validate_rejects_range_past_nyquist() {
        let config = DisplayConfig {
            high_hz: NYQUIST + 1.0,
            ..DisplayConfig::default()
        };
        assert!(config.validate(NYQUIST).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_gain() {
        let config = DisplayConfig {
            gain: -1.0,
            ..DisplayConfig::default()
        };
        assert!(config.validate(NYQUIST).is_err());
    }

    #[test]
    fn test_shared_range_update_is_all_or_nothing() {
        let shared = SharedDisplayConfig::new(DisplayConfig::default());

        // A rejected update leaves both edges untouched
        assert!(shared.set_frequency_range(5000.0, 100.0, NYQUIST).is_err());
        let config = shared.get();
        assert!((config.low_hz - 300.0).abs() < f32::EPSILON);
        assert!((config.high_hz - 2000.0).abs() < f32::EPSILON);

        // An accepted update replaces both edges together
        assert!(shared.set_frequency_range(100.0, 8000.0, NYQUIST).is_ok());
        let config = shared.get();
        assert!((config.low_hz - 100.0).abs() < f32::EPSILON);
        assert!((config.high_hz - 8000.0).abs() < f32::EPSILON);
    }
}
