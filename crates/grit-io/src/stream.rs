//! Real-time duplex audio via cpal.

use crate::{Error, Result, StreamEngine};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, Stream};
use grit_core::RandomSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// How often [`AudioStream::run`] wakes up to check for a stop request.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Input callbacks buffered ahead of the output callback.
const INPUT_BACKLOG: usize = 4;

/// Shortest gap between two dropped-input warnings.
const DROP_WARN_INTERVAL: Duration = Duration::from_secs(1);

/// Hands one input buffer to the output callback.
///
/// If the backlog is full the buffer is dropped and counted.
fn forward_input(tx: &mpsc::SyncSender<Vec<f32>>, data: &[f32], dropped: &AtomicU64) {
    if tx.try_send(data.to_vec()).is_err() {
        dropped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether the device supports audio input.
    pub is_input: bool,
    /// Whether the device supports audio output.
    pub is_output: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

/// Stream configuration.
#[derive(Debug, Clone, Default)]
pub struct StreamConfig {
    /// Sample rate in Hz (uses the output device default if `None`).
    pub sample_rate: Option<u32>,
    /// Host buffer size in frames (uses the host default if `None`).
    pub buffer_size: Option<u32>,
    /// Input device name or index (uses default if `None`).
    pub input_device: Option<String>,
    /// Output device name or index (uses default if `None`).
    pub output_device: Option<String>,
}

/// Snapshot of a cpal device as an [`AudioDevice`]. `None` if it has no name.
fn describe(device: &Device) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let input = device.default_input_config().ok();
    let output = device.default_output_config().ok();
    let default_sample_rate = output
        .as_ref()
        .or(input.as_ref())
        .map_or(48000, |c| c.sample_rate());
    Some(AudioDevice {
        name,
        is_input: input.is_some(),
        is_output: output.is_some(),
        default_sample_rate,
    })
}

/// List all available audio devices, inputs first.
///
/// A duplex device appears once, with both flags set.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let inputs = host.input_devices().into_iter().flatten();
    let outputs = host.output_devices().into_iter().flatten();

    let mut devices: Vec<AudioDevice> = Vec::new();
    for device in inputs.chain(outputs).filter_map(|d| describe(&d)) {
        if !devices.iter().any(|d| d.name == device.name) {
            devices.push(device);
        }
    }
    Ok(devices)
}

/// Get the default input and output device info.
pub fn default_device() -> Result<(Option<AudioDevice>, Option<AudioDevice>)> {
    let host = cpal::default_host();
    let input = host.default_input_device().and_then(|d| describe(&d));
    let output = host.default_output_device().and_then(|d| describe(&d));
    Ok((input, output))
}

/// Find a device by index among inputs (`is_input`) or outputs.
pub fn find_device_by_index(index: usize, is_input: bool) -> Result<AudioDevice> {
    let devices = list_devices()?;
    let filtered: Vec<_> = devices
        .into_iter()
        .filter(|d| if is_input { d.is_input } else { d.is_output })
        .collect();
    let available = filtered.len();

    filtered.into_iter().nth(index).ok_or_else(|| {
        Error::DeviceNotFound(format!(
            "{} device index {} (only {} devices available)",
            if is_input { "input" } else { "output" },
            index,
            available
        ))
    })
}

/// Live duplex stream: one input device feeding the engine, one output
/// device playing it.
pub struct AudioStream {
    input_device: Device,
    output_device: Device,
    input_config: cpal::StreamConfig,
    output_config: cpal::StreamConfig,
    running: Arc<AtomicBool>,
    dropped_input: Arc<AtomicU64>,
    _input_stream: Option<Stream>,
    _output_stream: Option<Stream>,
}

impl AudioStream {
    /// Opens the devices named in `config` and negotiates stream formats.
    ///
    /// Nothing plays until [`run`](Self::run).
    pub fn new(config: StreamConfig) -> Result<Self> {
        let host = cpal::default_host();

        let input_device = match &config.input_device {
            Some(name) => find_input_device(&host, name)?,
            None => host.default_input_device().ok_or(Error::NoDevice)?,
        };
        let output_device = match &config.output_device {
            Some(name) => find_output_device(&host, name)?,
            None => host.default_output_device().ok_or(Error::NoDevice)?,
        };

        let output_default = output_device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?;
        let input_default = input_device
            .default_input_config()
            .map_err(|e| Error::Stream(e.to_string()))?;

        let sample_rate = config
            .sample_rate
            .unwrap_or_else(|| output_default.sample_rate());
        let buffer_size = config
            .buffer_size
            .map_or(cpal::BufferSize::Default, cpal::BufferSize::Fixed);

        let output_config = cpal::StreamConfig {
            channels: output_default.channels(),
            sample_rate,
            buffer_size,
        };
        let input_config = cpal::StreamConfig {
            channels: input_default.channels(),
            sample_rate,
            buffer_size,
        };

        tracing::debug!(
            input = device_name(&input_device).unwrap_or_default(),
            output = device_name(&output_device).unwrap_or_default(),
            sample_rate,
            "audio devices opened"
        );

        Ok(Self {
            input_device,
            output_device,
            input_config,
            output_config,
            running: Arc::new(AtomicBool::new(false)),
            dropped_input: Arc::new(AtomicU64::new(0)),
            _input_stream: None,
            _output_stream: None,
        })
    }

    /// Sample rate both streams run at. Build the engine with this rate.
    pub fn sample_rate(&self) -> u32 {
        self.output_config.sample_rate
    }

    /// Input device name.
    pub fn input_name(&self) -> String {
        device_name(&self.input_device).unwrap_or_else(|_| "unknown".to_string())
    }

    /// Output device name.
    pub fn output_name(&self) -> String {
        device_name(&self.output_device).unwrap_or_else(|_| "unknown".to_string())
    }

    /// Flag that keeps [`run`](Self::run) alive. Store `false` to stop it
    /// from another thread or a signal handler.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Input buffers dropped because the output side fell behind.
    pub fn dropped_input_buffers(&self) -> u64 {
        self.dropped_input.load(Ordering::Relaxed)
    }

    /// Plays `engine` between the input and output devices.
    ///
    /// Blocks until the running flag is cleared, calling `on_poll` on this
    /// thread roughly every 100 ms. If input falls behind, the output
    /// callback plays silence for the missing frames.
    pub fn run<R, F>(&mut self, mut engine: StreamEngine<R>, mut on_poll: F) -> Result<()>
    where
        R: RandomSource + Send + 'static,
        F: FnMut(),
    {
        let input_channels = usize::from(self.input_config.channels);
        let output_channels = usize::from(self.output_config.channels);

        let (tx, rx) = mpsc::sync_channel::<Vec<f32>>(INPUT_BACKLOG);
        self.running.store(true, Ordering::SeqCst);

        let input_running = Arc::clone(&self.running);
        let dropped = Arc::clone(&self.dropped_input);
        let input_stream = self
            .input_device
            .build_input_stream(
                &self.input_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if input_running.load(Ordering::Relaxed) {
                        forward_input(&tx, data, &dropped);
                    }
                },
                |err| tracing::error!(error = %err, "input stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        let output_running = Arc::clone(&self.running);
        let mut pending: Vec<f32> = Vec::with_capacity(8192 * input_channels);
        let output_stream = self
            .output_device
            .build_output_stream(
                &self.output_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !output_running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }
                    while let Ok(samples) = rx.try_recv() {
                        pending.extend_from_slice(&samples);
                    }

                    let wanted = data.len() / output_channels * input_channels;
                    let take = wanted.min(pending.len());
                    engine.process_interleaved(
                        &pending[..take],
                        input_channels,
                        data,
                        output_channels,
                    );
                    pending.drain(..take);
                },
                |err| tracing::error!(error = %err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        input_stream
            .play()
            .map_err(|e| Error::Stream(e.to_string()))?;
        output_stream
            .play()
            .map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            sample_rate = self.sample_rate(),
            input_channels,
            output_channels,
            "duplex stream started"
        );

        self._input_stream = Some(input_stream);
        self._output_stream = Some(output_stream);

        let mut reported = self.dropped_input_buffers();
        let mut last_warning: Option<Instant> = None;
        while self.running.load(Ordering::SeqCst) {
            std::thread::sleep(POLL_INTERVAL);
            let dropped = self.dropped_input_buffers();
            if dropped > reported
                && last_warning.is_none_or(|t| t.elapsed() >= DROP_WARN_INTERVAL)
            {
                tracing::warn!(
                    dropped = dropped - reported,
                    total = dropped,
                    "input buffers dropped, output is falling behind"
                );
                reported = dropped;
                last_warning = Some(Instant::now());
            }
            on_poll();
        }

        self._input_stream = None;
        self._output_stream = None;
        tracing::info!("duplex stream stopped");
        Ok(())
    }

    /// Stop the audio stream.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the stream is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn find_input_device(host: &Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<_> = host
        .input_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();
    find_device_from_list(&devices, name_or_index, "input")
}

fn find_output_device(host: &Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<_> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();
    find_device_from_list(&devices, name_or_index, "output")
}

/// Find a device by index, exact name, or case-insensitive partial name.
fn find_device_from_list(devices: &[Device], name_or_index: &str, kind: &str) -> Result<Device> {
    if let Ok(index) = name_or_index.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "{} device index {} (only {} devices available)",
                kind,
                index,
                devices.len()
            ))
        });
    }

    if let Some(device) = devices
        .iter()
        .find(|d| device_name(d).is_ok_and(|n| n == name_or_index))
    {
        return Ok(device.clone());
    }

    let needle = name_or_index.to_lowercase();
    let matches: Vec<_> = devices
        .iter()
        .filter_map(|d| {
            device_name(d)
                .ok()
                .filter(|name| name.to_lowercase().contains(&needle))
                .map(|name| (d, name))
        })
        .collect();

    match matches.as_slice() {
        [] => Err(Error::DeviceNotFound(format!(
            "no {} device matching '{}'",
            kind, name_or_index
        ))),
        [(device, _)] => Ok((*device).clone()),
        [(device, first), ..] => {
            let names: Vec<_> = matches.iter().map(|(_, n)| n.as_str()).collect();
            tracing::warn!(
                query = name_or_index,
                kind,
                candidates = ?names,
                "several devices match, using {}",
                first
            );
            Ok((*device).clone())
        }
    }
}
