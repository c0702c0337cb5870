//! Offline rendering of whole buffers.

use std::sync::Arc;

use grit_core::{
    BLOCK_SAMPLES, Engine, EngineSettings, MAX_FEEDBACK_GAIN, ParameterSet, ms_to_samples,
};

use crate::StereoSamples;

/// Longest automatic tail.
const MAX_TAIL_SECS: f32 = 30.0;

/// Echo level, relative to the first repeat, at which the tail is cut.
const TAIL_FLOOR: f32 = 1.0e-3;

fn frames(ms: f32, sample_rate: f32) -> usize {
    ms_to_samples(ms, sample_rate).round() as usize
}

/// Options for [`render`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOptions {
    /// Silence rendered after the input, in milliseconds.
    ///
    /// `None` sizes the tail from the feedback gain with [`tail_samples`].
    pub tail_ms: Option<f32>,
}

/// Frames needed for the echoes of a sound to die away.
///
/// Without feedback this is one pass through the longest tap. With feedback
/// it is enough passes for the repeats to fall below -60 dB, capped at
/// 30 seconds.
pub fn tail_samples(settings: &EngineSettings, feedback: f32) -> usize {
    let longest_ms = settings
        .tap_ms
        .iter()
        .fold(0.0_f32, |m, &t| m.max(t))
        .min(settings.max_delay_ms);
    let tap = frames(longest_ms, settings.sample_rate);
    let cap = frames(MAX_TAIL_SECS * 1000.0, settings.sample_rate);

    let gain = if feedback.is_finite() {
        feedback.clamp(0.0, MAX_FEEDBACK_GAIN)
    } else {
        0.0
    };
    if gain <= 0.0 {
        return tap.min(cap);
    }

    let repeats = (TAIL_FLOOR.ln() / gain.ln()).ceil().max(1.0) as usize;
    tap.saturating_mul(repeats + 1).min(cap)
}

/// Renders `input` and its echo tail with a fresh engine.
pub fn render(
    settings: EngineSettings,
    params: Arc<ParameterSet>,
    input: &[f32],
    options: &RenderOptions,
) -> StereoSamples {
    render_with_progress(settings, params, input, options, |_, _| {})
}

/// Like [`render`], calling `progress(done, total)` after every block.
pub fn render_with_progress<F>(
    settings: EngineSettings,
    params: Arc<ParameterSet>,
    input: &[f32],
    options: &RenderOptions,
    mut progress: F,
) -> StereoSamples
where
    F: FnMut(usize, usize),
{
    let tail = match options.tail_ms {
        Some(ms) => frames(ms.max(0.0), settings.sample_rate),
        None => tail_samples(&settings, params.feedback()),
    };
    let total = input.len() + tail;

    let mut engine = Engine::new(settings, params);
    let mut output = StereoSamples::silent(total);

    for (i, (left, right)) in output
        .left
        .chunks_mut(BLOCK_SAMPLES)
        .zip(output.right.chunks_mut(BLOCK_SAMPLES))
        .enumerate()
    {
        let start = (i * BLOCK_SAMPLES).min(input.len());
        let end = (start + BLOCK_SAMPLES).min(input.len());
        engine.process_block(&input[start..end], left, right);
        progress(i * BLOCK_SAMPLES + left.len(), total);
    }

    let stats = engine.stats_snapshot();
    if stats.dropped_blocks() > 0 {
        tracing::warn!(%stats, "render dropped blocks");
    } else {
        tracing::debug!(%stats, frames = total, "render finished");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use grit_core::ParamSnapshot;

    fn params(feedback: f32) -> Arc<ParameterSet> {
        Arc::new(ParameterSet::new(ParamSnapshot {
            density: 0,
            noise_amount: 0,
            mix: 1.0,
            feedback,
        }))
    }

    #[test]
    fn tail_grows_with_feedback() {
        let settings = EngineSettings::default();
        let none = tail_samples(&settings, 0.0);
        let some = tail_samples(&settings, 0.5);
        let lots = tail_samples(&settings, 0.95);
        assert_eq!(none, 8820);
        assert!(none < some && some < lots);
        assert!(lots <= 30 * 44100);
        assert_eq!(tail_samples(&settings, f32::NAN), none);
    }

    #[test]
    fn explicit_tail_sets_length() {
        let input = vec![0.0; 1000];
        let out = render(
            EngineSettings::default(),
            params(0.0),
            &input,
            &RenderOptions { tail_ms: Some(0.0) },
        );
        assert_eq!(out.len(), 1000);
    }

    #[test]
    fn echo_lands_in_the_tail() {
        // A short burst, fully wet: all energy arrives one tap later.
        let mut input = vec![0.0; 256];
        input[..64].fill(0.8);
        let out = render(
            EngineSettings::default(),
            params(0.0),
            &input,
            &RenderOptions::default(),
        );
        assert_eq!(out.len(), 256 + 8820);
        assert!(out.left[..256].iter().all(|s| s.abs() < 1e-3));
        assert!(out.left[256..].iter().any(|s| s.abs() > 0.01));
    }

    #[test]
    fn progress_reaches_total() {
        let input = vec![0.1; 1000];
        let mut last = (0, 0);
        render_with_progress(
            EngineSettings::default(),
            params(0.0),
            &input,
            &RenderOptions { tail_ms: Some(10.0) },
            |done, total| last = (done, total),
        );
        assert_eq!(last.0, last.1);
    }
}
