//! The immutable, time-ordered sample buffer.
//!
//! Every later stage refers to samples by index range into this buffer
//! instead of copying rows, so per-gesture work can share it read-only.

use crate::stream::types::RawSample;
use std::ops::Range;

/// Position tolerance for treating two same-timestamp samples as duplicates.
const DUPLICATE_POSITION_TOLERANCE: f64 = 0.1;

/// A complete log of samples ordered by nondecreasing timestamp.
#[derive(Debug, Clone, Default)]
pub struct EventStream {
    samples: Vec<RawSample>,
}

impl EventStream {
    /// Build a stream, restoring timestamp order if needed.
    ///
    /// The sort is stable, so samples sharing a timestamp keep their log order.
    pub fn new(mut samples: Vec<RawSample>) -> Self {
        let ordered = samples
            .windows(2)
            .all(|pair| pair[0].timestamp_ms <= pair[1].timestamp_ms);
        if !ordered {
            tracing::warn!(
                "Input samples are not ordered by timestamp; sorting {} samples",
                samples.len()
            );
            samples.sort_by_key(|s| s.timestamp_ms);
        }
        Self { samples }
    }

    /// All samples in order.
    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Index range of samples with `lo <= timestamp <= hi`.
    pub fn time_range(&self, lo: i64, hi: i64) -> Range<usize> {
        let start = self.samples.partition_point(|s| s.timestamp_ms < lo);
        let end = self.samples.partition_point(|s| s.timestamp_ms <= hi);
        start..end.max(start)
    }

    /// Touch samples (press, slide, release) within an index range.
    pub fn touch_samples(&self, range: Range<usize>) -> impl Iterator<Item = &RawSample> {
        self.samples[range]
            .iter()
            .filter(|s| s.event_kind.is_touch())
    }

    /// Drop repeated samples: same timestamp as the previously kept sample
    /// and both coordinates within tolerance of it.
    ///
    /// Returns the reduced stream and the number of samples dropped.
    pub fn dedup(self) -> (Self, usize) {
        let before = self.samples.len();
        let mut kept: Vec<RawSample> = Vec::with_capacity(before);

        for sample in self.samples {
            let duplicate = kept.last().is_some_and(|prev| {
                prev.timestamp_ms == sample.timestamp_ms
                    && (prev.x - sample.x).abs() < DUPLICATE_POSITION_TOLERANCE
                    && (prev.y - sample.y).abs() < DUPLICATE_POSITION_TOLERANCE
            });
            if !duplicate {
                kept.push(sample);
            }
        }

        let dropped = before - kept.len();
        (Self { samples: kept }, dropped)
    }
}

impl From<Vec<RawSample>> for EventStream {
    fn from(samples: Vec<RawSample>) -> Self {
        Self::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::types::EventKind;

    fn sample(kind: EventKind, t: i64) -> RawSample {
        RawSample::touch(kind, t, 0.0, 0.0)
    }

    #[test]
    fn test_time_range_inclusive() {
        let stream = EventStream::new(vec![
            sample(EventKind::None, 0),
            sample(EventKind::Press, 10),
            sample(EventKind::Move, 20),
            sample(EventKind::Move, 20),
            sample(EventKind::Release, 30),
        ]);

        assert_eq!(stream.time_range(10, 20), 1..4);
        assert_eq!(stream.time_range(-5, 100), 0..5);
        assert_eq!(stream.time_range(31, 40), 5..5);
        assert!(stream.time_range(25, 15).is_empty());
    }

    #[test]
    fn test_touch_samples_filters_kind() {
        let stream = EventStream::new(vec![
            sample(EventKind::Press, 0),
            sample(EventKind::None, 5),
            sample(EventKind::Release, 10),
        ]);
        let kinds: Vec<EventKind> = stream
            .touch_samples(0..3)
            .map(|s| s.event_kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::Press, EventKind::Release]);
    }

    #[test]
    fn test_unordered_input_is_sorted_stably() {
        let stream = EventStream::new(vec![
            sample(EventKind::Release, 30),
            sample(EventKind::Press, 10),
            sample(EventKind::Move, 10),
        ]);
        let kinds: Vec<EventKind> = stream.samples().iter().map(|s| s.event_kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Press, EventKind::Move, EventKind::Release]
        );
    }

    #[test]
    fn test_dedup_same_time_and_position() {
        let stream = EventStream::new(vec![
            RawSample::touch(EventKind::Press, 10, 1.0, 1.0),
            RawSample::touch(EventKind::Move, 10, 1.05, 1.0),
            RawSample::touch(EventKind::Move, 10, 3.0, 1.0),
            RawSample::touch(EventKind::Move, 11, 3.0, 1.0),
        ]);
        let (stream, dropped) = stream.dedup();
        assert_eq!(dropped, 1);
        assert_eq!(stream.len(), 3);
    }
}
