//! Adapts the fixed-block engine to host buffers of any size.

use std::sync::Arc;

use grit_core::{BLOCK_SAMPLES, Engine, EngineSettings, Lcg, ParameterSet, RandomSource};

/// Runs an [`Engine`] behind arbitrarily sized host buffers.
///
/// Input is gathered into whole blocks and output is played back from the
/// last finished block, which adds exactly [`BLOCK_SAMPLES`] frames of
/// latency. Both buffers are fixed arrays, so nothing here allocates after
/// construction.
#[derive(Debug)]
pub struct StreamEngine<R = Lcg> {
    engine: Engine<R>,
    pending: [f32; BLOCK_SAMPLES],
    ready_left: [f32; BLOCK_SAMPLES],
    ready_right: [f32; BLOCK_SAMPLES],
    // Frames collected into `pending`, and frames played from `ready_*`.
    cursor: usize,
}

impl StreamEngine<Lcg> {
    /// Builds the engine and its adapter.
    pub fn new(settings: EngineSettings, params: Arc<ParameterSet>) -> Self {
        Self::from_engine(Engine::new(settings, params))
    }
}

impl<R: RandomSource> StreamEngine<R> {
    /// Wraps an existing engine.
    pub fn from_engine(engine: Engine<R>) -> Self {
        Self {
            engine,
            pending: [0.0; BLOCK_SAMPLES],
            ready_left: [0.0; BLOCK_SAMPLES],
            ready_right: [0.0; BLOCK_SAMPLES],
            cursor: 0,
        }
    }

    /// Latency added by the adapter, in frames.
    pub const fn latency_samples(&self) -> usize {
        BLOCK_SAMPLES
    }

    /// Processes one frame.
    #[inline]
    pub fn process_frame(&mut self, input: f32) -> (f32, f32) {
        let out = (self.ready_left[self.cursor], self.ready_right[self.cursor]);
        self.pending[self.cursor] = input;
        self.cursor += 1;
        if self.cursor == BLOCK_SAMPLES {
            self.engine
                .process_block(&self.pending, &mut self.ready_left, &mut self.ready_right);
            self.cursor = 0;
        }
        out
    }

    /// Processes a mono input into a stereo pair of equal length.
    ///
    /// Processes `min(input, left, right)` frames.
    pub fn process(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32]) {
        for ((&x, l), r) in input.iter().zip(left.iter_mut()).zip(right.iter_mut()) {
            (*l, *r) = self.process_frame(x);
        }
    }

    /// Processes interleaved host buffers.
    ///
    /// Input frames are averaged down to mono. The output pair goes to the
    /// first two output channels (their average on a mono output) and any
    /// further channels are silenced. Output frames without matching input
    /// are treated as silent input.
    pub fn process_interleaved(
        &mut self,
        input: &[f32],
        input_channels: usize,
        output: &mut [f32],
        output_channels: usize,
    ) {
        let input_channels = input_channels.max(1);
        let output_channels = output_channels.max(1);
        let mut frames_in = input.chunks_exact(input_channels);

        for frame in output.chunks_exact_mut(output_channels) {
            let x = frames_in
                .next()
                .map(|f| f.iter().sum::<f32>() / input_channels as f32)
                .unwrap_or(0.0);
            let (l, r) = self.process_frame(x);
            match frame {
                [mono] => *mono = (l + r) * 0.5,
                [fl, fr, rest @ ..] => {
                    *fl = l;
                    *fr = r;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }

    /// Silences the engine and the adapter buffers.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.pending.fill(0.0);
        self.ready_left.fill(0.0);
        self.ready_right.fill(0.0);
        self.cursor = 0;
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &Engine<R> {
        &self.engine
    }

    /// Mutable access to the wrapped engine.
    pub fn engine_mut(&mut self) -> &mut Engine<R> {
        &mut self.engine
    }
}
