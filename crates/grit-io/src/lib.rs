//! Audio I/O for the grit engine.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`] (mono mixdown) and [`write_wav_stereo`]
//! - **Offline rendering**: [`render`] a whole buffer plus the echo tail
//! - **Host adaptation**: [`StreamEngine`] runs the fixed-block engine behind
//!   host buffers of any size
//! - **Real-time streaming**: [`AudioStream`] for live duplex audio via cpal
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use grit_core::{EngineSettings, ParameterSet};
//! use grit_io::{RenderOptions, WavSpec, read_wav, render, write_wav_stereo};
//! use std::sync::Arc;
//!
//! let (input, spec) = read_wav("input.wav")?;
//! let settings = EngineSettings {
//!     sample_rate: spec.sample_rate as f32,
//!     ..EngineSettings::default()
//! };
//! let params = Arc::new(ParameterSet::default());
//! let output = render(settings, params, &input, &RenderOptions::default());
//! write_wav_stereo("output.wav", &output, WavSpec { channels: 2, ..spec })?;
//! # Ok::<(), grit_io::Error>(())
//! ```

mod engine;
mod render;
mod stream;
mod wav;

pub use engine::StreamEngine;
pub use render::{RenderOptions, render, render_with_progress, tail_samples};
pub use stream::{
    AudioDevice, AudioStream, StreamConfig, default_device, find_device_by_index, list_devices,
};
pub use wav::{StereoSamples, WavInfo, WavSpec, read_wav, read_wav_info, write_wav_stereo};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
