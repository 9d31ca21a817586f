//! Gesture segmentation over the ordered sample stream.
//!
//! A single pass assigns increasing ids to press → slide → release actions.
//! The scan only records the boundary timestamps of each action; which
//! samples belong to a gesture is decided later by the window extractor.

use crate::stream::{EventKind, EventStream, RawSample};
use serde::{Deserialize, Serialize};

/// An in-progress touch action.
///
/// Exists only while pressed, so `seen_press` is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureSegment {
    /// Timestamp of the press that opened the action
    pub first_ms: i64,
    /// Timestamp of the most recent sample accumulated into the action
    pub last_ms: i64,
    /// A slide was seen after the press
    pub seen_slide: bool,
    /// A release was seen after the press
    pub seen_release: bool,
}

impl GestureSegment {
    fn opened_at(timestamp_ms: i64) -> Self {
        Self {
            first_ms: timestamp_ms,
            last_ms: timestamp_ms,
            seen_slide: false,
            seen_release: false,
        }
    }

    /// Press, slide and release have all been seen.
    pub fn is_complete(&self) -> bool {
        self.seen_slide && self.seen_release
    }
}

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmenterState {
    /// Waiting for a press
    #[default]
    Idle,
    /// A press has been seen; accumulating the action
    Pressed(GestureSegment),
}

/// Boundary descriptor of a detected gesture, handed to window extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBounds {
    /// Gesture id, starting at 1
    pub id: u32,
    /// First accumulated timestamp (the opening press)
    pub first_ms: i64,
    /// Last accumulated timestamp
    pub last_ms: i64,
}

/// Advance the scanner by one sample.
///
/// Returns the next state and, when a non-touch sample closes a complete
/// action, that action.
pub fn step(state: SegmenterState, sample: &RawSample) -> (SegmenterState, Option<GestureSegment>) {
    let t = sample.timestamp_ms;

    match (state, sample.event_kind) {
        (SegmenterState::Idle, EventKind::Press) => {
            (SegmenterState::Pressed(GestureSegment::opened_at(t)), None)
        }
        // Slides and releases without a press are ignored
        (SegmenterState::Idle, _) => (SegmenterState::Idle, None),

        (SegmenterState::Pressed(mut segment), EventKind::Press) => {
            segment.last_ms = t;
            (SegmenterState::Pressed(segment), None)
        }
        (SegmenterState::Pressed(mut segment), EventKind::Move) => {
            segment.seen_slide = true;
            segment.last_ms = t;
            (SegmenterState::Pressed(segment), None)
        }
        (SegmenterState::Pressed(mut segment), EventKind::Release) => {
            segment.seen_release = true;
            segment.last_ms = t;
            (SegmenterState::Pressed(segment), None)
        }
        (SegmenterState::Pressed(segment), EventKind::None) => {
            if segment.is_complete() {
                (SegmenterState::Idle, Some(segment))
            } else {
                (SegmenterState::Pressed(segment), None)
            }
        }
    }
}

/// End-of-stream flush: the pending action, if complete.
pub fn flush_at_end(state: SegmenterState) -> Option<GestureSegment> {
    match state {
        SegmenterState::Pressed(segment) if segment.is_complete() => Some(segment),
        _ => None,
    }
}

/// Drives `step` over a stream and numbers the emitted actions.
#[derive(Debug)]
pub struct GestureSegmenter {
    /// Current scanner state
    state: SegmenterState,
    /// Id for the next emitted gesture
    next_id: u32,
    /// Gestures emitted and not yet taken
    completed: Vec<SegmentBounds>,
}

impl GestureSegmenter {
    pub fn new() -> Self {
        Self {
            state: SegmenterState::Idle,
            next_id: 1,
            completed: Vec::new(),
        }
    }

    /// Process the next sample in stream order.
    pub fn feed(&mut self, sample: &RawSample) {
        let (state, emitted) = step(self.state, sample);
        self.state = state;
        if let Some(segment) = emitted {
            self.emit(segment);
        }
    }

    /// Signal end of stream, flushing a final complete action.
    pub fn finish(&mut self) {
        let state = std::mem::take(&mut self.state);
        match flush_at_end(state) {
            Some(segment) => self.emit(segment),
            None => {
                if let SegmenterState::Pressed(segment) = state {
                    tracing::debug!(
                        "Discarding incomplete action started at {} ms",
                        segment.first_ms
                    );
                }
            }
        }
    }

    /// Get and remove emitted gestures.
    pub fn take_completed(&mut self) -> Vec<SegmentBounds> {
        std::mem::take(&mut self.completed)
    }

    /// Current scanner state.
    pub fn state(&self) -> SegmenterState {
        self.state
    }

    /// Segment a complete stream in one pass.
    pub fn segment(stream: &EventStream) -> Vec<SegmentBounds> {
        let mut segmenter = Self::new();
        for sample in stream.samples() {
            segmenter.feed(sample);
        }
        segmenter.finish();
        segmenter.take_completed()
    }

    fn emit(&mut self, segment: GestureSegment) {
        let bounds = SegmentBounds {
            id: self.next_id,
            first_ms: segment.first_ms,
            last_ms: segment.last_ms,
        };
        tracing::debug!(
            "Gesture {} detected: {}..={} ms",
            bounds.id,
            bounds.first_ms,
            bounds.last_ms
        );
        self.next_id += 1;
        self.completed.push(bounds);
    }
}

impl Default for GestureSegmenter {
    fn default() -> Self {
        Self::new()
    }
}
