//! The fixed wiring between processing stages.
//!
//! The signal graph never changes at runtime, so it is a `const` table of
//! [`Connection`]s. [`validate`] runs at compile time: an edit that leaves a
//! stage unconnected, drives an input port twice, or introduces a cycle other
//! than the delay/feedback-mixer loop fails the build.
//!
//! ```text
//! Input -> Filter -+-> FeedbackMixer:0 -> Delay -+-:0-> DirtyQueue[L] -+
//!                  |        ^:1                  |                     |
//!                  |        +---------------:0---+-:1-> DirtyQueue[R] -+
//!                  +-> CleanQueue[L] ----------------------------------+-> Mixer
//!                  +-> CleanQueue[R] ----------------------------------+     |
//!                                                     Output <- Limiter <----+
//! ```

use crate::channel::Channel;

/// A node in the signal graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Host input.
    Input,
    /// Input-conditioning low-pass.
    Filter,
    /// Summing junction in front of the delay line.
    FeedbackMixer,
    /// Delay line; port 0 and 1 are the left and right taps.
    Delay,
    /// Dirty block queue for a channel.
    DirtyQueue(Channel),
    /// Clean block queue for a channel.
    CleanQueue(Channel),
    /// Block mixer.
    Mixer,
    /// Limiter and its output queues.
    Limiter,
    /// Host output.
    Output,
}

/// Number of distinct stages.
pub const STAGE_COUNT: usize = 11;

/// Every stage, ordered by [`Stage::code`].
pub const STAGES: [Stage; STAGE_COUNT] = [
    Stage::Input,
    Stage::Filter,
    Stage::FeedbackMixer,
    Stage::Delay,
    Stage::DirtyQueue(Channel::Left),
    Stage::DirtyQueue(Channel::Right),
    Stage::CleanQueue(Channel::Left),
    Stage::CleanQueue(Channel::Right),
    Stage::Mixer,
    Stage::Limiter,
    Stage::Output,
];

impl Stage {
    /// Dense index in `0..STAGE_COUNT`.
    pub const fn code(self) -> usize {
        match self {
            Stage::Input => 0,
            Stage::Filter => 1,
            Stage::FeedbackMixer => 2,
            Stage::Delay => 3,
            Stage::DirtyQueue(c) => 4 + c.index(),
            Stage::CleanQueue(c) => 6 + c.index(),
            Stage::Mixer => 8,
            Stage::Limiter => 9,
            Stage::Output => 10,
        }
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Filter => "filter",
            Stage::FeedbackMixer => "feedback_mixer",
            Stage::Delay => "delay",
            Stage::DirtyQueue(Channel::Left) => "dirty_queue_left",
            Stage::DirtyQueue(Channel::Right) => "dirty_queue_right",
            Stage::CleanQueue(Channel::Left) => "clean_queue_left",
            Stage::CleanQueue(Channel::Right) => "clean_queue_right",
            Stage::Mixer => "mixer",
            Stage::Limiter => "limiter",
            Stage::Output => "output",
        }
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A patch cord from an output port to an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    /// Upstream stage.
    pub from: Stage,
    /// Output port on `from`.
    pub from_port: u8,
    /// Downstream stage.
    pub to: Stage,
    /// Input port on `to`.
    pub to_port: u8,
}

impl Connection {
    const fn new(from: Stage, from_port: u8, to: Stage, to_port: u8) -> Self {
        Self {
            from,
            from_port,
            to,
            to_port,
        }
    }

    /// `true` for the cord that closes the feedback loop.
    pub const fn is_feedback(&self) -> bool {
        matches!(self.from, Stage::Delay) && matches!(self.to, Stage::FeedbackMixer)
    }
}

impl core::fmt::Display for Connection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.from, self.from_port, self.to, self.to_port
        )
    }
}

const L: Channel = Channel::Left;
const R: Channel = Channel::Right;

/// The signal graph.
///
/// Mixer input ports are `2 * channel + {0: dirty, 1: clean}`; mixer and
/// limiter ports otherwise follow the channel index.
pub const TOPOLOGY: [Connection; 16] = [
    Connection::new(Stage::Input, 0, Stage::Filter, 0),
    Connection::new(Stage::Filter, 0, Stage::FeedbackMixer, 0),
    Connection::new(Stage::Delay, 0, Stage::FeedbackMixer, 1),
    Connection::new(Stage::FeedbackMixer, 0, Stage::Delay, 0),
    Connection::new(Stage::Filter, 0, Stage::CleanQueue(L), 0),
    Connection::new(Stage::Filter, 0, Stage::CleanQueue(R), 0),
    Connection::new(Stage::Delay, 0, Stage::DirtyQueue(L), 0),
    Connection::new(Stage::Delay, 1, Stage::DirtyQueue(R), 0),
    Connection::new(Stage::DirtyQueue(L), 0, Stage::Mixer, 0),
    Connection::new(Stage::CleanQueue(L), 0, Stage::Mixer, 1),
    Connection::new(Stage::DirtyQueue(R), 0, Stage::Mixer, 2),
    Connection::new(Stage::CleanQueue(R), 0, Stage::Mixer, 3),
    Connection::new(Stage::Mixer, 0, Stage::Limiter, 0),
    Connection::new(Stage::Mixer, 1, Stage::Limiter, 1),
    Connection::new(Stage::Limiter, 0, Stage::Output, 0),
    Connection::new(Stage::Limiter, 1, Stage::Output, 1),
];

/// Checks a wiring table.
///
/// A valid table has:
/// - an upstream for every stage except [`Stage::Input`],
/// - a downstream for every stage except [`Stage::Output`],
/// - no cord from a stage to itself,
/// - at most one cord per input port,
/// - exactly one feedback cord, and no cycle once it is removed.
pub const fn validate(connections: &[Connection]) -> bool {
    let mut has_upstream = [false; STAGE_COUNT];
    let mut has_downstream = [false; STAGE_COUNT];
    let mut feedback_cords = 0;

    let mut i = 0;
    while i < connections.len() {
        let c = connections[i];
        let (from, to) = (c.from.code(), c.to.code());
        if from == to {
            return false;
        }
        has_downstream[from] = true;
        has_upstream[to] = true;
        if c.is_feedback() {
            feedback_cords += 1;
        }

        let mut j = i + 1;
        while j < connections.len() {
            let other = connections[j];
            if other.to.code() == to && other.to_port == c.to_port {
                return false;
            }
            j += 1;
        }
        i += 1;
    }

    let mut s = 0;
    while s < STAGE_COUNT {
        let is_input = s == Stage::Input.code();
        let is_output = s == Stage::Output.code();
        if has_upstream[s] == is_input || has_downstream[s] == is_output {
            return false;
        }
        s += 1;
    }

    feedback_cords == 1 && execution_order(connections).is_some()
}

/// Topological order of the stages with the feedback cord removed.
///
/// Returns `None` if the remaining graph has a cycle.
pub const fn execution_order(connections: &[Connection]) -> Option<[Stage; STAGE_COUNT]> {
    let mut pending = [0_usize; STAGE_COUNT];
    let mut i = 0;
    while i < connections.len() {
        if !connections[i].is_feedback() {
            pending[connections[i].to.code()] += 1;
        }
        i += 1;
    }

    let mut order = [Stage::Input; STAGE_COUNT];
    let mut done = [false; STAGE_COUNT];
    let mut placed = 0;
    while placed < STAGE_COUNT {
        // Lowest-coded ready stage first, so the order is deterministic.
        let mut next = STAGE_COUNT;
        let mut s = 0;
        while s < STAGE_COUNT {
            if !done[s] && pending[s] == 0 {
                next = s;
                break;
            }
            s += 1;
        }
        if next == STAGE_COUNT {
            return None;
        }

        done[next] = true;
        order[placed] = STAGES[next];
        placed += 1;

        let mut k = 0;
        while k < connections.len() {
            let c = connections[k];
            if !c.is_feedback() && c.from.code() == next {
                pending[c.to.code()] -= 1;
            }
            k += 1;
        }
    }
    Some(order)
}

const _: () = assert!(validate(&TOPOLOGY), "TOPOLOGY is not a valid signal graph");

/// Stage order of one engine tick.
pub const SCHEDULE: [Stage; STAGE_COUNT] = match execution_order(&TOPOLOGY) {
    Some(order) => order,
    None => panic!("TOPOLOGY has a cycle outside the feedback loop"),
};
