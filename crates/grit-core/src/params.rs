//! Tunable parameters shared between a control thread and the audio thread.
//!
//! [`ParameterSet`] stores every field in its own atomic so the audio thread
//! can read without locking. Fields are independent: a reader may see a new
//! `mix` alongside an old `density`, but never half of a value. The engine
//! copies the set into a [`ParamSnapshot`] once per block and threads that
//! value through the processing stages.
//!
//! ```rust
//! use grit_core::{ParamId, ParamSnapshot, ParameterSet};
//!
//! let params = ParameterSet::new(ParamSnapshot::default());
//! params.set_mix(1.5);
//! assert_eq!(params.mix(), 1.0);
//!
//! params.set_by_id(ParamId::Density, 42.0);
//! assert_eq!(params.snapshot().density, 42);
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// Upper bound for [`ParamSnapshot::density`].
pub const DENSITY_MAX: u8 = 100;

/// Upper bound for [`ParamSnapshot::noise_amount`].
pub const NOISE_MAX: u8 = 60;

/// Plain copy of all tunables, taken once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    /// Percentage of samples that get crushed, 0-100.
    pub density: u8,
    /// Crush depth and noise level, 0-60.
    pub noise_amount: u8,
    /// Dirty share of the output, 0.0-1.0.
    pub mix: f32,
    /// Feedback request for the delay network, 0.0-1.0.
    pub feedback: f32,
}

impl ParamSnapshot {
    /// Returns a copy with every field clamped into its range.
    ///
    /// Non-finite floats fall back to the field's default.
    #[must_use]
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            density: self.density.min(DENSITY_MAX),
            noise_amount: self.noise_amount.min(NOISE_MAX),
            mix: clamp_unit(self.mix).unwrap_or(defaults.mix),
            feedback: clamp_unit(self.feedback).unwrap_or(defaults.feedback),
        }
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            density: 50,
            noise_amount: 20,
            mix: 0.5,
            feedback: 0.0,
        }
    }
}

fn clamp_unit(value: f32) -> Option<f32> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

/// Identifies one tunable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// [`ParamSnapshot::density`]
    Density,
    /// [`ParamSnapshot::noise_amount`]
    NoiseAmount,
    /// [`ParamSnapshot::mix`]
    Mix,
    /// [`ParamSnapshot::feedback`]
    Feedback,
}

impl ParamId {
    /// All parameters in display order.
    pub const ALL: [ParamId; 4] = [
        ParamId::Density,
        ParamId::NoiseAmount,
        ParamId::Mix,
        ParamId::Feedback,
    ];

    /// Key used on the command line and in config files.
    pub const fn name(self) -> &'static str {
        match self {
            ParamId::Density => "density",
            ParamId::NoiseAmount => "noise",
            ParamId::Mix => "mix",
            ParamId::Feedback => "feedback",
        }
    }

    /// Looks up a parameter by key. Accepts `noise_amount` as an alias.
    pub fn from_name(name: &str) -> Result<Self, UnknownParam> {
        match name {
            "density" => Ok(ParamId::Density),
            "noise" | "noise_amount" => Ok(ParamId::NoiseAmount),
            "mix" => Ok(ParamId::Mix),
            "feedback" => Ok(ParamId::Feedback),
            _ => Err(UnknownParam),
        }
    }

    /// Range and description.
    pub const fn spec(self) -> &'static ParamSpec {
        match self {
            ParamId::Density => &PARAM_SPECS[0],
            ParamId::NoiseAmount => &PARAM_SPECS[1],
            ParamId::Mix => &PARAM_SPECS[2],
            ParamId::Feedback => &PARAM_SPECS[3],
        }
    }
}

impl core::fmt::Display for ParamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by [`ParamId::from_name`] for an unrecognized key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownParam;

#[cfg(feature = "std")]
impl std::fmt::Display for UnknownParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unknown parameter (expected density, noise, mix or feedback)")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownParam {}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Which parameter.
    pub id: ParamId,
    /// Lowest accepted value.
    pub min: f32,
    /// Highest accepted value.
    pub max: f32,
    /// Factory default.
    pub default: f32,
    /// Integer-valued parameters are rounded on write.
    pub integer: bool,
    /// One-line description.
    pub description: &'static str,
}

/// Descriptions of every parameter, indexed like [`ParamId::ALL`].
pub const PARAM_SPECS: [ParamSpec; 4] = [
    ParamSpec {
        id: ParamId::Density,
        min: 0.0,
        max: DENSITY_MAX as f32,
        default: 50.0,
        integer: true,
        description: "Chance in percent that a dirty sample gets crushed",
    },
    ParamSpec {
        id: ParamId::NoiseAmount,
        min: 0.0,
        max: NOISE_MAX as f32,
        default: 20.0,
        integer: true,
        description: "Crush depth (10 per lost bit) and injected noise level",
    },
    ParamSpec {
        id: ParamId::Mix,
        min: 0.0,
        max: 1.0,
        default: 0.5,
        integer: false,
        description: "Dirty share of the output (0 = clean only)",
    },
    ParamSpec {
        id: ParamId::Feedback,
        min: 0.0,
        max: 1.0,
        default: 0.0,
        integer: false,
        description: "Delay feedback request (applied gain is capped below 1)",
    },
];

/// Lock-free, thread-safe parameter storage.
///
/// Floats are stored as their bit patterns in [`AtomicU32`]s. Every setter
/// clamps into range and ignores non-finite input, so the audio thread never
/// sees an out-of-range value.
#[derive(Debug)]
pub struct ParameterSet {
    density: AtomicU32,
    noise_amount: AtomicU32,
    mix: AtomicU32,
    feedback: AtomicU32,
    /// Bumped on every write, for cheap change detection.
    generation: AtomicU32,
}

impl ParameterSet {
    /// Creates a set holding `initial` (clamped).
    pub fn new(initial: ParamSnapshot) -> Self {
        let initial = initial.clamped();
        Self {
            density: AtomicU32::new(u32::from(initial.density)),
            noise_amount: AtomicU32::new(u32::from(initial.noise_amount)),
            mix: AtomicU32::new(initial.mix.to_bits()),
            feedback: AtomicU32::new(initial.feedback.to_bits()),
            generation: AtomicU32::new(0),
        }
    }

    /// Reads all four fields.
    #[inline]
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            density: self.density(),
            noise_amount: self.noise_amount(),
            mix: self.mix(),
            feedback: self.feedback(),
        }
    }

    /// Writes all four fields (clamped). Fields are stored one by one.
    pub fn store(&self, snapshot: ParamSnapshot) {
        let s = snapshot.clamped();
        self.density.store(u32::from(s.density), Ordering::Relaxed);
        self.noise_amount.store(u32::from(s.noise_amount), Ordering::Relaxed);
        self.mix.store(s.mix.to_bits(), Ordering::Relaxed);
        self.feedback.store(s.feedback.to_bits(), Ordering::Relaxed);
        self.bump();
    }

    /// Crush probability in percent.
    #[inline]
    pub fn density(&self) -> u8 {
        self.density.load(Ordering::Relaxed) as u8
    }

    /// Crush depth and noise level.
    #[inline]
    pub fn noise_amount(&self) -> u8 {
        self.noise_amount.load(Ordering::Relaxed) as u8
    }

    /// Dirty share of the output.
    #[inline]
    pub fn mix(&self) -> f32 {
        f32::from_bits(self.mix.load(Ordering::Relaxed))
    }

    /// Feedback request.
    #[inline]
    pub fn feedback(&self) -> f32 {
        f32::from_bits(self.feedback.load(Ordering::Relaxed))
    }

    /// Sets density, clamped to 0-100.
    pub fn set_density(&self, value: u8) {
        self.density
            .store(u32::from(value.min(DENSITY_MAX)), Ordering::Relaxed);
        self.bump();
    }

    /// Sets noise amount, clamped to 0-60.
    pub fn set_noise_amount(&self, value: u8) {
        self.noise_amount
            .store(u32::from(value.min(NOISE_MAX)), Ordering::Relaxed);
        self.bump();
    }

    /// Sets mix, clamped to 0-1. Non-finite values are ignored.
    pub fn set_mix(&self, value: f32) {
        if let Some(v) = clamp_unit(value) {
            self.mix.store(v.to_bits(), Ordering::Relaxed);
            self.bump();
        }
    }

    /// Sets the feedback request, clamped to 0-1. Non-finite values are ignored.
    pub fn set_feedback(&self, value: f32) {
        if let Some(v) = clamp_unit(value) {
            self.feedback.store(v.to_bits(), Ordering::Relaxed);
            self.bump();
        }
    }

    /// Current value of one parameter as `f32`.
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Density => f32::from(self.density()),
            ParamId::NoiseAmount => f32::from(self.noise_amount()),
            ParamId::Mix => self.mix(),
            ParamId::Feedback => self.feedback(),
        }
    }

    /// Sets one parameter from an `f32`.
    ///
    /// Integer parameters are rounded after clamping. Non-finite values are
    /// ignored.
    pub fn set_by_id(&self, id: ParamId, value: f32) {
        if !value.is_finite() {
            return;
        }
        let spec = id.spec();
        let clamped = value.clamp(spec.min, spec.max);
        match id {
            ParamId::Density => self.set_density(libm::roundf(clamped) as u8),
            ParamId::NoiseAmount => self.set_noise_amount(libm::roundf(clamped) as u8),
            ParamId::Mix => self.set_mix(clamped),
            ParamId::Feedback => self.set_feedback(clamped),
        }
    }

    /// Number of writes since construction (wrapping).
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Relaxed)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::new(ParamSnapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp() {
        let p = ParameterSet::default();
        p.set_density(250);
        p.set_noise_amount(99);
        p.set_mix(-0.5);
        p.set_feedback(7.0);
        let s = p.snapshot();
        assert_eq!(s.density, 100);
        assert_eq!(s.noise_amount, 60);
        assert_eq!(s.mix, 0.0);
        assert_eq!(s.feedback, 1.0);
    }

    #[test]
    fn non_finite_is_ignored() {
        let p = ParameterSet::default();
        p.set_mix(0.3);
        p.set_mix(f32::NAN);
        p.set_feedback(f32::INFINITY);
        assert_eq!(p.mix(), 0.3);
        assert_eq!(p.feedback(), 0.0);
    }

    #[test]
    fn store_and_snapshot_round_trip() {
        let p = ParameterSet::default();
        let s = ParamSnapshot {
            density: 80,
            noise_amount: 40,
            mix: 0.75,
            feedback: 0.6,
        };
        p.store(s);
        assert_eq!(p.snapshot(), s);
    }

    #[test]
    fn set_by_id_rounds_integers() {
        let p = ParameterSet::default();
        p.set_by_id(ParamId::Density, 33.6);
        p.set_by_id(ParamId::NoiseAmount, 1000.0);
        assert_eq!(p.density(), 34);
        assert_eq!(p.noise_amount(), 60);
        assert_eq!(p.get(ParamId::Density), 34.0);
    }

    #[test]
    fn names_resolve() {
        for id in ParamId::ALL {
            assert_eq!(ParamId::from_name(id.name()), Ok(id));
            assert_eq!(id.spec().id, id);
        }
        assert_eq!(ParamId::from_name("noise_amount"), Ok(ParamId::NoiseAmount));
        assert_eq!(ParamId::from_name("gain"), Err(UnknownParam));
    }

    #[test]
    fn spec_defaults_match_snapshot_default() {
        let d = ParamSnapshot::default();
        assert_eq!(PARAM_SPECS[0].default, f32::from(d.density));
        assert_eq!(PARAM_SPECS[1].default, f32::from(d.noise_amount));
        assert_eq!(PARAM_SPECS[2].default, d.mix);
        assert_eq!(PARAM_SPECS[3].default, d.feedback);
    }

    #[test]
    fn generation_counts_writes() {
        let p = ParameterSet::default();
        let g0 = p.generation();
        p.set_mix(0.1);
        p.set_density(3);
        assert_eq!(p.generation(), g0.wrapping_add(2));
    }

    #[test]
    fn shared_across_threads() {
        use std::sync::Arc;

        let p = Arc::new(ParameterSet::default());
        let writer = {
            let p = Arc::clone(&p);
            std::thread::spawn(move || {
                for i in 0..1000_u32 {
                    p.set_mix((i % 100) as f32 / 100.0);
                }
            })
        };
        for _ in 0..1000 {
            let m = p.mix();
            assert!((0.0..=1.0).contains(&m));
        }
        writer.join().unwrap();
    }
}
