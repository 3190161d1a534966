//! Frequency-range mapping and draw-ready geometry for both display modes.
//!
//! Pure functions from frames and display settings to bars, rows, and colors.
//! Nothing here knows what surface eventually paints the result.

use crate::params::{ColorScheme, DisplayConfig};
use crate::spectrum::SpectrumFrame;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Inclusive bin range selected by a frequency range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinRange {
    pub low: usize,
    pub high: usize,
}

impl BinRange {
    /// Number of visible bins; an inclusive range always holds at least one
    pub fn count(&self) -> usize {
        self.high - self.low + 1
    }
}

/// Map a frequency range onto the bins of a frame with `bins` one-sided bins.
///
/// Both edges are clamped to the frame independently, so a stale range
/// configured against a differently sized frame degrades to the nearest valid
/// bins instead of being rejected. Callers supply `low_hz < high_hz`
/// (validated at the configuration boundary), which makes `low <= high` hold
/// after rounding.
pub fn map_bins(bins: usize, sample_rate_hz: u32, low_hz: f32, high_hz: f32) -> BinRange {
    debug_assert!(bins > 0);
    let spacing = sample_rate_hz as f32 / (bins * 2) as f32;
    let clamp_bin = |hz: f32| (hz / spacing).round().clamp(0.0, (bins - 1) as f32) as usize;

    BinRange {
        low: clamp_bin(low_hz),
        high: clamp_bin(high_hz),
    }
}

/// Color for a magnitude under the active scheme.
///
/// `BlueToRed` sweeps hue from 240° (blue) down to 0° (red) as magnitude
/// rises. `BlackToRed` ramps black to purple over the lower half of the
/// scale, purple to red over the upper half.
pub fn color_for_magnitude(magnitude: f32, scheme: ColorScheme) -> Rgb {
    let m = magnitude.clamp(0.0, 1.0);
    match scheme {
        ColorScheme::BlueToRed => hsv_to_rgb((1.0 - m) * 240.0, 1.0, 1.0),
        ColorScheme::BlackToRed => {
            if m < 0.5 {
                let ramp = (m * 2.0 * 255.0) as u8;
                Rgb {
                    r: ramp,
                    g: 0,
                    b: ramp,
                }
            } else {
                let t = (m - 0.5) * 2.0;
                Rgb {
                    r: 255,
                    g: 0,
                    b: ((1.0 - t) * 255.0) as u8,
                }
            }
        }
    }
}

/// HSV to RGB, hue in degrees, saturation/value in [0, 1]
fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb {
    let h = (hue % 360.0) / 60.0;
    let c = value * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;

    Rgb {
        r: ((r + m) * 255.0).round() as u8,
        g: ((g + m) * 255.0).round() as u8,
        b: ((b + m) * 255.0).round() as u8,
    }
}

/// Fraction of the surface height a full-scale magnitude reaches; the band
/// above it marks headroom before clipping
const MAX_HEIGHT_FRACTION: f32 = 0.9;

/// One bar of the instantaneous spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub color: Rgb,
}

/// Draw-ready bar spectrum for a `width` x `height` surface
#[derive(Debug, Clone)]
pub struct BarView {
    /// One bar per visible bin, left to right in frequency order
    pub bars: Vec<Bar>,
    /// Height of the full-scale reference line above the surface bottom
    pub reference_height: f32,
    pub width: u32,
    pub height: u32,
}

/// Build the bar spectrum for the configured frequency range
pub fn build_bars(
    frame: &SpectrumFrame,
    config: &DisplayConfig,
    width: u32,
    height: u32,
) -> BarView {
    let reference_height = height as f32 * MAX_HEIGHT_FRACTION;
    if frame.is_empty() {
        return BarView {
            bars: Vec::new(),
            reference_height,
            width,
            height,
        };
    }

    let range = map_bins(frame.len(), frame.sample_rate_hz(), config.low_hz, config.high_hz);
    let bar_width = width as f32 / range.count() as f32;
    let magnitudes = frame.magnitudes();

    let bars = (range.low..=range.high)
        .map(|bin| {
            let magnitude = magnitudes[bin].clamp(0.0, 1.0);
            Bar {
                x: (bin - range.low) as f32 * bar_width,
                width: bar_width,
                height: magnitude * reference_height,
                color: color_for_magnitude(magnitude, config.scheme),
            }
        })
        .collect();

    BarView {
        bars,
        reference_height,
        width,
        height,
    }
}

/// One waterfall row: a color per visible bin
#[derive(Debug, Clone)]
pub struct WaterfallRow {
    pub cells: Vec<Rgb>,
}

/// Draw-ready waterfall for a `width` x `height` surface
#[derive(Debug, Clone)]
pub struct WaterfallView {
    /// Rows newest first; the renderer draws row 0 at the bottom edge
    pub rows: Vec<WaterfallRow>,
    pub width: u32,
    pub height: u32,
}

/// Build waterfall rows, newest first. Rows that would fall past the top of
/// the surface are not built; each row maps its own frame through the current
/// frequency range, so mixed-length history frames stay tolerable.
pub fn build_waterfall(
    history: &[SpectrumFrame],
    config: &DisplayConfig,
    width: u32,
    height: u32,
) -> WaterfallView {
    let rows = history
        .iter()
        .filter(|frame| !frame.is_empty())
        .take(height as usize)
        .map(|frame| {
            let range = map_bins(
                frame.len(),
                frame.sample_rate_hz(),
                config.low_hz,
                config.high_hz,
            );
            let magnitudes = frame.magnitudes();
            let cells = (range.low..=range.high)
                .map(|bin| color_for_magnitude(magnitudes[bin].clamp(0.0, 1.0), config.scheme))
                .collect();
            WaterfallRow { cells }
        })
        .collect();

    WaterfallView {
        rows,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DisplayMode;

    fn config(low_hz: f32, high_hz: f32, scheme: ColorScheme) -> DisplayConfig {
        DisplayConfig {
            low_hz,
            high_hz,
            gain: 1.0,
            scheme,
            mode: DisplayMode::Bars,
        }
    }

    #[test]
    fn test_map_bins_orders_and_clamps() {
        // 1024 bins @ 44.1kHz: spacing ≈ 21.53 Hz
        let range = map_bins(1024, 44_100, 300.0, 2000.0);
        assert_eq!(range.low, 14); // round(300 / 21.53)
        assert_eq!(range.high, 93); // round(2000 / 21.53)
        assert!(range.low <= range.high);

        // Edges past the frame clamp to the last bin instead of rejecting
        let range = map_bins(1024, 44_100, 0.0, 44_100.0);
        assert_eq!(range.low, 0);
        assert_eq!(range.high, 1023);

        // A stale wide range against a shorter frame degrades the same way
        let range = map_bins(64, 44_100, 22_000.0, 22_050.0);
        assert_eq!(range.low, 63);
        assert_eq!(range.high, 63);
        assert_eq!(range.count(), 1);
    }

    #[test]
    fn test_blue_to_red_endpoints() {
        // Magnitude 0 is pure blue (hue 240°), magnitude 1 pure red (hue 0°)
        assert_eq!(
            color_for_magnitude(0.0, ColorScheme::BlueToRed),
            Rgb { r: 0, g: 0, b: 255 }
        );
        assert_eq!(
            color_for_magnitude(1.0, ColorScheme::BlueToRed),
            Rgb { r: 255, g: 0, b: 0 }
        );
        // Midpoint lands on green (hue 120°)
        assert_eq!(
            color_for_magnitude(0.5, ColorScheme::BlueToRed),
            Rgb { r: 0, g: 255, b: 0 }
        );
    }

    #[test]
    fn test_black_to_red_ramp() {
        assert_eq!(
            color_for_magnitude(0.0, ColorScheme::BlackToRed),
            Rgb { r: 0, g: 0, b: 0 }
        );
        assert_eq!(
            color_for_magnitude(0.5, ColorScheme::BlackToRed),
            Rgb { r: 255, g: 0, b: 255 }
        );
        assert_eq!(
            color_for_magnitude(1.0, ColorScheme::BlackToRed),
            Rgb { r: 255, g: 0, b: 0 }
        );
    }

    #[test]
    fn test_build_bars_geometry() {
        // 8 bins @ 16Hz sample rate: spacing 1 Hz, bins 2..=5 visible
        let magnitudes = vec![0.0, 0.1, 0.2, 0.4, 0.6, 1.0, 0.3, 0.1];
        let frame = SpectrumFrame::new(magnitudes, 16);
        let view = build_bars(&frame, &config(2.0, 5.0, ColorScheme::BlueToRed), 400, 100);

        assert_eq!(view.bars.len(), 4);
        assert!((view.reference_height - 90.0).abs() < f32::EPSILON);

        // Bars tile the surface left to right
        for (i, bar) in view.bars.iter().enumerate() {
            assert!((bar.width - 100.0).abs() < f32::EPSILON);
            assert!((bar.x - i as f32 * 100.0).abs() < f32::EPSILON);
        }

        // Full-scale bin reaches exactly the reference line
        assert!((view.bars[3].height - 90.0).abs() < f32::EPSILON);
        // Bin 2 (magnitude 0.2) reaches 20% of it
        assert!((view.bars[0].height - 18.0).abs() < 1e-3);
    }

    #[test]
    fn test_build_waterfall_rows_newest_first_and_bounded() {
        let frames: Vec<SpectrumFrame> = (0..6)
            .map(|i| SpectrumFrame::new(vec![i as f32 / 6.0; 8], 16))
            .collect();

        // Surface only 4 pixels tall: rows past the top are not built
        let view = build_waterfall(&frames, &config(0.0, 8.0, ColorScheme::BlackToRed), 80, 4);
        assert_eq!(view.rows.len(), 4);
        assert_eq!(view.rows[0].cells.len(), 8);

        // Row 0 corresponds to the newest (first) frame
        let newest = color_for_magnitude(0.0, ColorScheme::BlackToRed);
        assert_eq!(view.rows[0].cells[0], newest);
    }
}
