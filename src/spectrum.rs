//! Windowing, FFT, and magnitude normalization.
//!
//! Converts fixed-size blocks of mono samples into normalized, gain-adjusted,
//! log-scaled magnitude frames ready for display.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// One published frame: half-spectrum magnitudes in [0, 1].
///
/// Immutable once built; clones share the underlying buffer so the store,
/// history, and consumer can all hold the same frame cheaply.
#[derive(Debug, Clone)]
pub struct SpectrumFrame {
    magnitudes: Arc<Vec<f32>>,
    sample_rate_hz: u32,
}

impl SpectrumFrame {
    pub fn new(magnitudes: Vec<f32>, sample_rate_hz: u32) -> Self {
        Self {
            magnitudes: Arc::new(magnitudes),
            sample_rate_hz,
        }
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Center frequency of bin `bin`: `bin * sample_rate / fft_size` (Hz)
    pub fn bin_frequency_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate_hz as f32 / (self.magnitudes.len() * 2) as f32
    }
}

/// Windowed forward FFT over fixed-size real blocks
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    fft_size: usize,
}

impl SpectrumAnalyzer {
    /// Plan an FFT of `fft_size` and precompute the Hann window
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let window = (0..fft_size).map(|i| hann_window(i, fft_size)).collect();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            fft_size,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Window `block` and transform it, returning the one-sided spectrum
    /// (`fft_size / 2` complex bins). A block of the wrong length is a
    /// programming error, not a runtime condition.
    pub fn transform(&mut self, block: &[f32]) -> &[Complex<f32>] {
        debug_assert_eq!(block.len(), self.fft_size);

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(block).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        &self.scratch[..self.fft_size / 2]
    }
}

/// Hann window coefficient for sample `index` of a `size`-sample block
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// Log compression applied after normalization and gain: maps [0, 1] onto
/// [0, log10(2)/2], expanding the quiet end of the scale.
fn compress(gained: f32) -> f32 {
    ((1.0 + gained).log10() / 100.0f32.log10()).clamp(0.0, 1.0)
}

/// Convert one-sided complex bins into display magnitudes in [0, 1].
///
/// Each magnitude is normalized by the per-frame maximum, multiplied by
/// `gain` (clamped to 1.0), then log-compressed. Gain therefore behaves as a
/// contrast control on the already-normalized spectrum rather than true
/// amplitude gain. Returns `None` for a silent frame (max magnitude 0) so the
/// previous frame stays on screen instead of flashing blank.
pub fn normalize_magnitudes(bins: &[Complex<f32>], gain: f32) -> Option<Vec<f32>> {
    let mut magnitudes: Vec<f32> = bins.iter().map(|c| c.norm()).collect();
    let max = magnitudes.iter().cloned().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return None;
    }

    for magnitude in magnitudes.iter_mut() {
        let normalized = *magnitude / max;
        let gained = (normalized * gain).min(1.0);
        *magnitude = compress(gained);
    }
    Some(magnitudes)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Block containing one exact-bin sinusoid: sin(2π k i / n)
    fn sine_block(n: usize, k: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * k as f32 * i as f32 / n as f32).sin())
            .collect()
    }

    #[test]
    fn test_hann_window() {
        let size = 2048;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_silent_block_produces_no_frame() {
        let mut analyzer = SpectrumAnalyzer::new(2048);
        let block = vec![0.0f32; 2048];
        let bins = analyzer.transform(&block);
        assert!(normalize_magnitudes(bins, 1.0).is_none());
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let n = 256;
        let k = 16;
        let mut analyzer = SpectrumAnalyzer::new(n);
        let block = sine_block(n, k);
        let magnitudes = normalize_magnitudes(analyzer.transform(&block), 1.0).unwrap();

        assert_eq!(magnitudes.len(), n / 2);

        // The peak bin is the frame maximum and carries normalized value 1.0,
        // which compresses to log10(2)/log10(100)
        let full_scale = (2.0f32).log10() / (100.0f32).log10();
        assert!((magnitudes[k] - full_scale).abs() < 1e-4);
        for (i, &m) in magnitudes.iter().enumerate() {
            assert!(m <= magnitudes[k] + 1e-6, "bin {} above peak", i);
        }

        // Bins away from the peak and its window sidelobes stay near zero
        for (i, &m) in magnitudes.iter().enumerate() {
            if i.abs_diff(k) > 4 {
                assert!(m < 0.05, "bin {} = {} too hot", i, m);
            }
        }
    }

    #[test]
    fn test_normalization_is_scale_invariant() {
        let n = 256;
        let mut analyzer = SpectrumAnalyzer::new(n);
        let block = sine_block(n, 10);
        let scaled: Vec<f32> = block.iter().map(|s| s * 3.7).collect();

        let a = normalize_magnitudes(analyzer.transform(&block), 1.0).unwrap();
        let b = normalize_magnitudes(analyzer.transform(&scaled), 1.0).unwrap();

        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_output_in_unit_range_for_any_gain() {
        let n = 256;
        let mut analyzer = SpectrumAnalyzer::new(n);
        let block = sine_block(n, 7);

        for gain in [0.0, 0.5, 1.0, 2.0, 100.0] {
            let magnitudes = normalize_magnitudes(analyzer.transform(&block), gain).unwrap();
            for &m in &magnitudes {
                assert!((0.0..=1.0).contains(&m), "gain {}: {} out of range", gain, m);
            }
        }
    }

    #[test]
    fn test_compression_spot_value() {
        // Normalized 0.5 at gain 1.0: log10(1.5) / log10(100) ≈ 0.0880
        assert!((compress(0.5) - 0.0880).abs() < 0.0005);
    }

    #[test]
    fn test_frame_bin_frequency() {
        let frame = SpectrumFrame::new(vec![0.0; 1024], 44_100);
        assert!((frame.bin_frequency_hz(0) - 0.0).abs() < f32::EPSILON);
        // 44100 / 2048 ≈ 21.53 Hz per bin
        assert!((frame.bin_frequency_hz(1) - 21.53).abs() < 0.01);
        assert!((frame.bin_frequency_hz(512) - 11_025.0).abs() < 0.5);
    }
}
