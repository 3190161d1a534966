//! Wavescope - live audio spectrum analyzer
//!
//! Captures the microphone, converts fixed-size sample blocks into
//! normalized magnitude spectra on a dedicated thread, and snapshots the
//! result as a bar-spectrum or waterfall PNG on exit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wavescope::capture::{input_device_names, CaptureLoop, FrameSink, MicCapture};
use wavescope::cli::Args;
use wavescope::export::{render_bars_image, render_waterfall_image};
use wavescope::params::{CaptureConfig, SharedDisplayConfig};
use wavescope::render::{build_bars, build_waterfall};
use wavescope::spectrum::SpectrumFrame;
use wavescope::store::{Snapshot, SpectrumStore};

/// Snapshot surface size (pixels)
const SURFACE_WIDTH: u32 = 1280;
const SURFACE_HEIGHT: u32 = 720;

/// Counts published frames; stands in for a display refresh trigger
#[derive(Default)]
struct FrameCounter {
    frames: AtomicUsize,
}

impl FrameSink for FrameCounter {
    fn on_frame(&self, _frame: &SpectrumFrame) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    if args.list_devices {
        for name in input_device_names()? {
            println!("{}", name);
        }
        return Ok(());
    }

    let capture_config = CaptureConfig {
        fft_size: args.fft_size,
        ..CaptureConfig::default()
    };
    capture_config.validate()?;

    // Reject a bad frequency range up front; the mapper never sees one.
    let display = args.display_config();
    display.validate(capture_config.nyquist_hz())?;

    let shared = SharedDisplayConfig::new(display.clone());
    let store = Arc::new(SpectrumStore::new(capture_config.history_frames));
    store.set_mode(display.mode);

    let (mic, reader) = MicCapture::open(
        &capture_config,
        args.device.as_deref(),
        args.record.as_deref(),
    )?;

    let counter = Arc::new(FrameCounter::default());
    let mut capture = CaptureLoop::new(
        Box::new(reader),
        capture_config.fft_size,
        Arc::clone(&store),
        shared.clone(),
    );
    capture.set_sink(Arc::clone(&counter) as Arc<dyn FrameSink>);
    capture.start();

    println!(
        "Capturing from {} for {:.1}s ({:.0}-{:.0} Hz)",
        mic.device_name(),
        args.duration,
        display.low_hz,
        display.high_hz
    );
    thread::sleep(Duration::from_secs_f32(args.duration));

    capture.stop();
    mic.finalize_recording()?;

    let frames = counter.frames.load(Ordering::Relaxed);
    println!("Published {} frames", frames);

    match store.snapshot() {
        Snapshot::Bars(Some(frame)) => {
            let view = build_bars(&frame, &shared.get(), SURFACE_WIDTH, SURFACE_HEIGHT);
            save_png(render_bars_image(&view), &args)?;
        }
        Snapshot::Waterfall(history) if !history.is_empty() => {
            let view = build_waterfall(&history, &shared.get(), SURFACE_WIDTH, SURFACE_HEIGHT);
            save_png(render_waterfall_image(&view), &args)?;
        }
        Snapshot::Bars(None) | Snapshot::Waterfall(_) => {
            println!("No signal captured, nothing to write");
        }
    }

    Ok(())
}

fn save_png(img: image::RgbImage, args: &Args) -> Result<(), String> {
    img.save(&args.out)
        .map_err(|e| format!("Failed to write {}: {}", args.out.display(), e))?;
    println!("Wrote {}", args.out.display());
    Ok(())
}
