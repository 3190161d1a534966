//! Audio capture: device input, blocking block reads, and the processing loop.
//!
//! The cpal input callback never blocks: it downmixes to mono, tees samples
//! to the optional WAV recorder, and hands chunks to a bounded channel. The
//! capture loop owns the blocking side, assembling fixed-size blocks and
//! driving the transform, normalizer, and store each cycle on a dedicated
//! thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::params::{CaptureConfig, SharedDisplayConfig};
use crate::spectrum::{normalize_magnitudes, SpectrumAnalyzer, SpectrumFrame};
use crate::store::SpectrumStore;

/// Mono sample source with blocking fixed-size reads
pub trait AudioSource: Send {
    /// Sample rate of the delivered samples (Hz)
    fn sample_rate(&self) -> u32;

    /// Fill `buf` with the next samples, blocking until data arrives.
    ///
    /// Returns the number of samples written; fewer than `buf.len()` is a
    /// short read and the caller discards the block.
    fn read(&mut self, buf: &mut [f32]) -> Result<usize, String>;
}

/// Consumer notified from the capture thread after each published frame
pub trait FrameSink: Send + Sync {
    fn on_frame(&self, frame: &SpectrumFrame);
}

type WavRecorder = hound::WavWriter<std::io::BufWriter<std::fs::File>>;

/// Names of the available input devices
pub fn input_device_names() -> Result<Vec<String>, String> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| format!("Failed to enumerate input devices: {}", e))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Microphone capture: owns the cpal input stream and hands out the reader
/// half used by the capture loop.
///
/// Keep this alive for as long as the loop runs; dropping it closes the
/// stream and the reader starts reporting errors.
pub struct MicCapture {
    _stream: cpal::Stream,
    device_name: String,
    recorder: Option<Arc<Mutex<WavRecorder>>>,
}

impl MicCapture {
    /// Open an input device at the configured rate and start the stream.
    ///
    /// `device_hint` selects a device by name substring; `None` takes the
    /// system default. `record_path` tees the mono capture to a WAV file.
    /// Any failure here is fatal to startup: the pipeline never runs against
    /// a device that did not initialize.
    pub fn open(
        config: &CaptureConfig,
        device_hint: Option<&str>,
        record_path: Option<&Path>,
    ) -> Result<(Self, MicReader), String> {
        let host = cpal::default_host();
        let device = match device_hint {
            Some(hint) => {
                let hint_lower = hint.to_lowercase();
                host.input_devices()
                    .map_err(|e| format!("Failed to enumerate input devices: {}", e))?
                    .find(|d| {
                        d.name()
                            .map(|n| n.to_lowercase().contains(&hint_lower))
                            .unwrap_or(false)
                    })
                    .ok_or_else(|| format!("No input device matching '{}'", hint))?
            }
            None => host
                .default_input_device()
                .ok_or("No audio input device found")?,
        };
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device
            .default_input_config()
            .map_err(|e| format!("Failed to get input config for {}: {}", device_name, e))?;
        let channels = supported.channels() as usize;
        let stream_config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(config.sample_rate_hz),
            buffer_size: cpal::BufferSize::Default,
        };

        let recorder = record_path
            .map(|path| -> Result<Arc<Mutex<WavRecorder>>, String> {
                let spec = hound::WavSpec {
                    channels: 1,
                    sample_rate: config.sample_rate_hz,
                    bits_per_sample: 32,
                    sample_format: hound::SampleFormat::Float,
                };
                let writer = hound::WavWriter::create(path, spec)
                    .map_err(|e| format!("Failed to create WAV recorder: {}", e))?;
                Ok(Arc::new(Mutex::new(writer)))
            })
            .transpose()?;
        let recorder_tee = recorder.clone();

        let (tx, rx) = sync_channel::<Vec<f32>>(config.channel_depth);
        let dropped = Arc::new(AtomicUsize::new(0));
        let dropped_tee = Arc::clone(&dropped);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Downmix interleaved frames to mono. This callback runs
                    // on the device thread and must never block.
                    let mono: Vec<f32> = if channels <= 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Some(ref writer) = recorder_tee {
                        if let Ok(mut w) = writer.lock() {
                            for &sample in &mono {
                                let _ = w.write_sample(sample);
                            }
                        }
                    }

                    if let Err(TrySendError::Full(_)) = tx.try_send(mono) {
                        dropped_tee.fetch_add(1, Ordering::Relaxed);
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| format!("Failed to build input stream on {}: {}", device_name, e))?;

        stream
            .play()
            .map_err(|e| format!("Failed to start input stream: {}", e))?;

        info!("Capturing from {} @ {}Hz", device_name, config.sample_rate_hz);

        let reader = MicReader {
            rx,
            pending: Vec::new(),
            sample_rate_hz: config.sample_rate_hz,
            dropped,
            reported_drops: 0,
        };

        Ok((
            Self {
                _stream: stream,
                device_name,
                recorder,
            },
            reader,
        ))
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Stop the stream and flush the WAV recorder, if one was requested.
    /// Call after the capture loop has stopped so no writer clone survives.
    pub fn finalize_recording(self) -> Result<(), String> {
        let MicCapture {
            _stream: stream,
            recorder,
            ..
        } = self;
        drop(stream); // stops the callback, releasing its writer clone

        if let Some(recorder) = recorder {
            let writer = Arc::try_unwrap(recorder)
                .map_err(|_| "WAV recorder still in use".to_string())?
                .into_inner()
                .unwrap();
            writer
                .finalize()
                .map_err(|e| format!("Failed to finalize WAV recording: {}", e))?;
        }
        Ok(())
    }
}

/// Blocking reader half of the microphone capture
pub struct MicReader {
    rx: Receiver<Vec<f32>>,
    pending: Vec<f32>,
    sample_rate_hz: u32,
    dropped: Arc<AtomicUsize>,
    reported_drops: usize,
}

impl AudioSource for MicReader {
    fn sample_rate(&self) -> u32 {
        self.sample_rate_hz
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize, String> {
        while self.pending.len() < buf.len() {
            let chunk = self
                .rx
                .recv()
                .map_err(|_| "audio stream closed".to_string())?;
            self.pending.extend_from_slice(&chunk);
        }
        buf.copy_from_slice(&self.pending[..buf.len()]);
        self.pending.drain(..buf.len());

        let dropped = self.dropped.load(Ordering::Relaxed);
        if dropped > self.reported_drops {
            warn!("Capture overrun: {} chunks dropped so far", dropped);
            self.reported_drops = dropped;
        }
        Ok(buf.len())
    }
}

/// Continuous capture-and-analyze loop on a dedicated thread.
///
/// Runs Stopped -> Running -> Stopped. Each cycle reads exactly one block,
/// transforms and normalizes it, publishes the frame, and notifies the sink.
/// Transient read problems skip the cycle and keep the loop alive; only
/// `stop()` ends it.
pub struct CaptureLoop {
    running: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
    source: Option<Box<dyn AudioSource>>,
    store: Arc<SpectrumStore>,
    config: SharedDisplayConfig,
    fft_size: usize,
    sink: Option<Arc<dyn FrameSink>>,
}

impl CaptureLoop {
    pub fn new(
        source: Box<dyn AudioSource>,
        fft_size: usize,
        store: Arc<SpectrumStore>,
        config: SharedDisplayConfig,
    ) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            source: Some(source),
            store,
            config,
            fft_size,
            sink: None,
        }
    }

    /// Register a consumer notified after each published frame
    pub fn set_sink(&mut self, sink: Arc<dyn FrameSink>) {
        self.sink = Some(sink);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn the processing thread. No-op when already running or when the
    /// source is unavailable (failed to initialize, or consumed by an
    /// earlier run).
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let Some(mut source) = self.source.take() else {
            warn!("Capture source unavailable, not starting");
            return;
        };
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        let sink = self.sink.clone();
        let fft_size = self.fft_size;

        self.worker = Some(thread::spawn(move || {
            info!("Capture loop started");
            let sample_rate = source.sample_rate();
            let mut analyzer = SpectrumAnalyzer::new(fft_size);
            let mut block = vec![0.0f32; fft_size];

            while running.load(Ordering::SeqCst) {
                match source.read(&mut block) {
                    Ok(n) if n == fft_size => {
                        let gain = config.gain();
                        let bins = analyzer.transform(&block);
                        match normalize_magnitudes(bins, gain) {
                            Some(magnitudes) => {
                                let frame = SpectrumFrame::new(magnitudes, sample_rate);
                                store.publish(frame.clone());
                                if let Some(ref sink) = sink {
                                    sink.on_frame(&frame);
                                }
                            }
                            // Silence: the store keeps the previous frame.
                            None => debug!("Silent block, no frame published"),
                        }
                    }
                    Ok(n) => {
                        warn!("Short read: expected {} samples, got {}", fft_size, n);
                    }
                    Err(e) => {
                        error!("Audio read failed: {}", e);
                        thread::sleep(Duration::from_millis(1));
                    }
                }
            }
            info!("Capture loop stopped");
        }));
    }

    /// Flag the worker down and join it. Waits for at most one in-flight
    /// blocking read; a source that never returns data stalls shutdown.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Capture worker panicked");
            }
        }
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
