//! Grit Core - the real-time dirt engine
//!
//! This crate implements the signal path of the grit effect: a live input is
//! split into a *clean* path and a *dirty* path, the dirty path runs through a
//! recirculating feedback delay, and a block mixer blends the two per channel
//! through a probabilistic bit-crusher before a limiter guards the output.
//!
//! # Core Abstractions
//!
//! ## Blocks and Ownership
//!
//! - [`AudioBlock`] - Fixed-size run of [`BLOCK_SAMPLES`] raw 16-bit samples
//! - [`BlockPool`] - Bounded, pre-sized pool with O(1) acquire/release
//! - [`BlockHandle`] - Move-only token for one pool slot (single owner)
//! - [`BlockQueue`] - Bounded FIFO of handles, the stage-to-stage carrier
//! - [`BlockSource`] / [`BlockSink`] - Interfaces between stages
//!
//! ## Processing Stages
//!
//! - [`distort`] - Per-sample glitch: probabilistic bit-crush plus noise
//! - [`FeedbackDelayNetwork`] - Delay line with attenuated re-injection
//! - [`BlockMixer`] - Pairs dirty/clean blocks and blends them per channel
//! - [`Limiter`] - Attack/hold/release envelope limiter acting as block sink
//! - [`StateVariableFilter`] - Input conditioning low-pass
//!
//! ## Parameters and Wiring
//!
//! - [`ParameterSet`] - Lock-free tunables written by a control thread
//! - [`ParamSnapshot`] - Per-tick copy of the tunables passed to the engine
//! - [`TOPOLOGY`] - The static, compile-time checked stage wiring
//! - [`Engine`] - Runs one block through the whole topology
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded targets. Disable the
//! default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! grit-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use grit_core::{BLOCK_SAMPLES, Engine, EngineSettings, ParamSnapshot, ParameterSet};
//! use std::sync::Arc;
//!
//! let params = Arc::new(ParameterSet::new(ParamSnapshot::default()));
//! let mut engine = Engine::new(EngineSettings::default(), Arc::clone(&params));
//!
//! let input = [0.25_f32; BLOCK_SAMPLES];
//! let mut left = [0.0_f32; BLOCK_SAMPLES];
//! let mut right = [0.0_f32; BLOCK_SAMPLES];
//!
//! // A control thread may change this at any time.
//! params.set_density(80);
//! engine.process_block(&input, &mut left, &mut right);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: every buffer is sized at construction, nothing in
//!   [`Engine::process_block`] allocates, locks, or waits
//! - **Single owner**: blocks move between stages by value, never aliased
//! - **Local degradation**: missing input skips a tick, overflow saturates,
//!   pool exhaustion becomes a counted dropped block

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod block;
pub mod channel;
pub mod delay;
pub mod distortion;
pub mod engine;
pub mod feedback;
pub mod limiter;
pub mod math;
pub mod mixer;
pub mod params;
pub mod queue;
pub mod rng;
pub mod smoothing;
pub mod stats;
pub mod svf;
pub mod topology;

// Re-export main types at crate root
pub use block::{AudioBlock, BLOCK_SAMPLES, BlockHandle, BlockPool, PoolError};
pub use channel::Channel;
pub use delay::DelayLine;
pub use distortion::{crush_bits, crush_steps, distort, quantize};
pub use engine::{Engine, EngineSettings};
pub use feedback::{FeedbackDelayNetwork, GainUpdate, MAX_FEEDBACK_GAIN};
pub use limiter::{Limiter, LimiterSettings};
pub use math::{
    db_to_linear, float_to_sample, flush_denormal, linear_to_db, ms_to_samples, sample_to_float,
    saturate,
};
pub use mixer::{BlockMixer, MixOutcome, mix_samples};
pub use params::{PARAM_SPECS, ParamId, ParamSnapshot, ParamSpec, ParameterSet, UnknownParam};
pub use queue::{BlockQueue, BlockSink, BlockSource};
pub use rng::{Lcg, RandomSource};
pub use smoothing::SmoothedParam;
pub use stats::{EngineStats, StatsSnapshot};
pub use svf::StateVariableFilter;
pub use topology::{Connection, SCHEDULE, Stage, TOPOLOGY};
