//! Utterance endpointing.
//!
//! Decides when an utterance starts and ends from the per-frame speech
//! verdicts, using frame-count hysteresis on both edges: a sustained run of
//! voiced frames confirms the onset, a sustained run of silent frames marks
//! the endpoint. Single frames never flip the state.
//!
//! Onset counting is cumulative: while idle, the voiced-frame count is not
//! reset by an intervening silent frame, so fragmented speech over a noisy
//! channel still accumulates toward confirmation. The silent frames
//! themselves are discarded; only the voiced frames are held for inclusion
//! once the utterance is confirmed. After confirmation every frame is kept,
//! silence included, so natural pauses survive into the final audio.

use crate::audio::frame::Frame;
use crate::defaults;

/// Thresholds for onset and offset detection, in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Voiced frames required before an utterance is confirmed.
    pub min_voiced_frames: u32,
    /// Silent frames required after speech before the endpoint is declared.
    pub required_silence_frames: u32,
}

impl EndpointConfig {
    /// Derive frame counts from durations.
    ///
    /// Uses integer division, so 250 ms at 30 ms/frame is 8 frames. Each
    /// threshold is at least one frame.
    pub fn from_durations(min_voiced_ms: u32, silence_ms: u32, frame_ms: u32) -> Self {
        Self {
            min_voiced_frames: (min_voiced_ms / frame_ms).max(1),
            required_silence_frames: (silence_ms / frame_ms).max(1),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::from_durations(
            defaults::MIN_VOICED_MS,
            defaults::SILENCE_MS,
            defaults::FRAME_MS,
        )
    }
}

/// Endpointing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No confirmed utterance; counting voiced frames toward onset.
    Idle,
    /// Utterance in progress; counting silent frames toward the endpoint.
    Confirmed,
}

/// Full endpointing state: phase plus hysteresis counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointState {
    pub phase: Phase,
    pub voiced_frames: u32,
    pub silence_frames: u32,
}

impl EndpointState {
    /// The initial state: idle with cleared counters.
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            voiced_frames: 0,
            silence_frames: 0,
        }
    }
}

/// What to do with the frame that produced a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Drop the frame (silence while idle).
    Discard,
    /// Hold the frame in the onset buffer (voiced but not yet confirmed).
    Hold,
    /// Onset threshold reached: held frames and this one start the utterance.
    Confirm,
    /// Append the frame to the utterance in progress.
    Collect,
    /// Append the frame and finalize: the endpoint has been reached.
    Finalize,
}

/// The pure transition function.
///
/// Maps (state, verdict) to (state, effect) with no side effects, so the
/// endpointing policy is testable in isolation from buffering.
pub fn transition(state: EndpointState, is_speech: bool, cfg: &EndpointConfig) -> (EndpointState, Effect) {
    match (state.phase, is_speech) {
        (Phase::Idle, true) => {
            let voiced = state.voiced_frames + 1;
            if voiced >= cfg.min_voiced_frames {
                (
                    EndpointState {
                        phase: Phase::Confirmed,
                        voiced_frames: voiced,
                        silence_frames: 0,
                    },
                    Effect::Confirm,
                )
            } else {
                (
                    EndpointState {
                        voiced_frames: voiced,
                        ..state
                    },
                    Effect::Hold,
                )
            }
        }
        // Cumulative onset policy: the voiced count survives silent frames.
        (Phase::Idle, false) => (state, Effect::Discard),
        (Phase::Confirmed, true) => (
            EndpointState {
                silence_frames: 0,
                ..state
            },
            Effect::Collect,
        ),
        (Phase::Confirmed, false) => {
            let silence = state.silence_frames + 1;
            if silence >= cfg.required_silence_frames {
                (
                    EndpointState {
                        silence_frames: silence,
                        ..state
                    },
                    Effect::Finalize,
                )
            } else {
                (
                    EndpointState {
                        silence_frames: silence,
                        ..state
                    },
                    Effect::Collect,
                )
            }
        }
    }
}

/// An ordered run of raw frames bounded by silence on both sides.
#[derive(Debug, Clone)]
pub struct Utterance {
    frames: Vec<Frame>,
}

impl Utterance {
    /// Number of frames in the utterance.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total number of raw samples across all frames.
    pub fn sample_count(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }

    /// Duration in seconds at the given sample rate.
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        self.sample_count() as f32 / sample_rate as f32
    }

    /// The frames, in capture order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Consume the utterance, yielding its frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

/// Append-only frame collection for the utterance in progress.
///
/// `take` hands the collected frames out as an `Utterance` and leaves a
/// fresh, empty buffer behind, so samples can never leak from one utterance
/// into the next.
#[derive(Debug, Default)]
pub struct UtteranceBuffer {
    frames: Vec<Frame>,
}

impl UtteranceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Take the accumulated frames, replacing the buffer with a fresh one.
    pub fn take(&mut self) -> Utterance {
        Utterance {
            frames: std::mem::take(&mut self.frames),
        }
    }
}

/// Per-frame outcome reported by the endpointer.
#[derive(Debug)]
pub enum Verdict {
    /// Still idle; no confirmed utterance yet.
    Pending,
    /// Utterance in progress; frame was collected.
    Collecting,
    /// Endpoint reached: the finished utterance, with counters reset.
    Endpoint(Utterance),
}

/// Drives the transition function and owns the frame buffers.
#[derive(Debug)]
pub struct Endpointer {
    cfg: EndpointConfig,
    state: EndpointState,
    onset: Vec<Frame>,
    buffer: UtteranceBuffer,
}

impl Endpointer {
    pub fn new(cfg: EndpointConfig) -> Self {
        Self {
            cfg,
            state: EndpointState::idle(),
            onset: Vec::new(),
            buffer: UtteranceBuffer::new(),
        }
    }

    /// Feed one classified frame through the state machine.
    pub fn push(&mut self, frame: Frame, is_speech: bool) -> Verdict {
        let (next, effect) = transition(self.state, is_speech, &self.cfg);
        self.state = next;

        match effect {
            Effect::Discard => Verdict::Pending,
            Effect::Hold => {
                self.onset.push(frame);
                Verdict::Pending
            }
            Effect::Confirm => {
                for held in std::mem::take(&mut self.onset) {
                    self.buffer.push(held);
                }
                self.buffer.push(frame);
                Verdict::Collecting
            }
            Effect::Collect => {
                self.buffer.push(frame);
                Verdict::Collecting
            }
            Effect::Finalize => {
                self.buffer.push(frame);
                let utterance = self.buffer.take();
                self.reset();
                Verdict::Endpoint(utterance)
            }
        }
    }

    /// Current state (phase and counters).
    pub fn state(&self) -> EndpointState {
        self.state
    }

    /// Reset to idle with cleared counters and fresh buffers.
    pub fn reset(&mut self) {
        self.state = EndpointState::idle();
        self.onset.clear();
        self.buffer = UtteranceBuffer::new();
    }
}
