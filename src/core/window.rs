//! Per-gesture window extraction.
//!
//! Membership is recomputed from the full stream for each detected gesture:
//! the padded boundary range selects a row pool, the pool's first press and
//! last release fix the core window, and the core window padded again gives
//! the sensor context. Windows are index ranges into the shared stream.

use crate::core::segmenter::SegmentBounds;
use crate::stream::{EventKind, EventStream, RawSample};
use std::ops::Range;

/// Sample windows for one gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureWindow {
    /// Gesture id
    pub id: u32,
    /// Earliest press timestamp in the pool
    pub tstart: i64,
    /// Latest release timestamp in the pool
    pub tend: i64,
    /// Stream range of the padded boundary pool
    pub pool: Range<usize>,
    /// Stream range of `[tstart, tend]`
    pub core: Range<usize>,
    /// Stream range of `[tstart - t, tend + t]` within the pool
    pub context: Range<usize>,
    /// Number of touch samples in the core window
    pub sample_count: usize,
}

impl GestureWindow {
    /// Touch samples of the core window, in timestamp order.
    pub fn core_samples<'a>(&self, stream: &'a EventStream) -> Vec<&'a RawSample> {
        stream.touch_samples(self.core.clone()).collect()
    }

    /// Touch samples of the sensor context window, in timestamp order.
    pub fn context_samples<'a>(&self, stream: &'a EventStream) -> Vec<&'a RawSample> {
        stream.touch_samples(self.context.clone()).collect()
    }

    /// Duration of the core window in milliseconds, `None` on overflow.
    pub fn duration_ms(&self) -> Option<i64> {
        self.tend.checked_sub(self.tstart)
    }
}

/// Resolve the windows of one detected gesture.
///
/// Returns `None` when the pool has no press or no release, or when the
/// core window holds no touch samples; such gestures produce no row.
pub fn extract_window(
    stream: &EventStream,
    bounds: &SegmentBounds,
    padding_ms: u32,
) -> Option<GestureWindow> {
    let padding_ms = i64::from(padding_ms);
    let pool = stream.time_range(
        bounds.first_ms.saturating_sub(padding_ms),
        bounds.last_ms.saturating_add(padding_ms),
    );

    let tstart = stream
        .touch_samples(pool.clone())
        .filter(|s| s.event_kind == EventKind::Press)
        .map(|s| s.timestamp_ms)
        .min();
    let tend = stream
        .touch_samples(pool.clone())
        .filter(|s| s.event_kind == EventKind::Release)
        .map(|s| s.timestamp_ms)
        .max();

    let (Some(tstart), Some(tend)) = (tstart, tend) else {
        tracing::debug!("Gesture {} has no press or no release; skipped", bounds.id);
        return None;
    };

    let core = stream.time_range(tstart, tend);
    let sample_count = stream.touch_samples(core.clone()).count();
    if sample_count == 0 {
        tracing::debug!("Gesture {} has an empty core window; skipped", bounds.id);
        return None;
    }

    let padded = stream.time_range(
        tstart.saturating_sub(padding_ms),
        tend.saturating_add(padding_ms),
    );
    let context_start = padded.start.max(pool.start);
    let context = context_start..padded.end.min(pool.end).max(context_start);

    Some(GestureWindow {
        id: bounds.id,
        tstart,
        tend,
        pool,
        core,
        context,
        sample_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segmenter::GestureSegmenter;

    fn stream_of(events: &[(EventKind, i64)]) -> EventStream {
        EventStream::new(
            events
                .iter()
                .map(|&(kind, t)| RawSample::touch(kind, t, 0.0, 0.0))
                .collect(),
        )
    }

    #[test]
    fn test_core_window_without_padding() {
        let stream = stream_of(&[
            (EventKind::None, 0),
            (EventKind::Press, 10),
            (EventKind::Move, 20),
            (EventKind::Release, 30),
            (EventKind::None, 40),
        ]);
        let bounds = GestureSegmenter::segment(&stream);
        let window = extract_window(&stream, &bounds[0], 0).unwrap();

        assert_eq!(window.tstart, 10);
        assert_eq!(window.tend, 30);
        assert_eq!(window.sample_count, 3);
        assert_eq!(window.duration_ms(), Some(20));
        assert_eq!(window.context_samples(&stream).len(), 3);
    }

    #[test]
    fn test_padding_widens_context_but_not_core() {
        let stream = stream_of(&[
            (EventKind::Move, 5),
            (EventKind::None, 8),
            (EventKind::Press, 10),
            (EventKind::Move, 20),
            (EventKind::Release, 30),
            (EventKind::Move, 34),
            (EventKind::None, 40),
        ]);
        let bounds = SegmentBounds {
            id: 1,
            first_ms: 10,
            last_ms: 30,
        };
        let window = extract_window(&stream, &bounds, 5).unwrap();

        assert_eq!(window.sample_count, 3);
        // Stray slides at 5 and 34 fall inside the padding; the none at 8 does not count.
        let context: Vec<i64> = window
            .context_samples(&stream)
            .iter()
            .map(|s| s.timestamp_ms)
            .collect();
        assert_eq!(context, vec![5, 10, 20, 30, 34]);
    }

    #[test]
    fn test_padding_can_pull_in_neighbouring_release() {
        let stream = stream_of(&[
            (EventKind::Press, 10),
            (EventKind::Move, 20),
            (EventKind::Release, 30),
            (EventKind::None, 35),
            (EventKind::Release, 38),
        ]);
        let bounds = SegmentBounds {
            id: 1,
            first_ms: 10,
            last_ms: 30,
        };
        let window = extract_window(&stream, &bounds, 10).unwrap();
        assert_eq!(window.tend, 38);
        assert_eq!(window.sample_count, 4);
    }

    #[test]
    fn test_pool_without_release_is_discarded() {
        let stream = stream_of(&[(EventKind::Press, 10), (EventKind::Move, 20)]);
        let bounds = SegmentBounds {
            id: 1,
            first_ms: 10,
            last_ms: 20,
        };
        assert!(extract_window(&stream, &bounds, 0).is_none());
    }

    #[test]
    fn test_release_before_press_is_discarded() {
        let stream = stream_of(&[(EventKind::Release, 5), (EventKind::Press, 10)]);
        let bounds = SegmentBounds {
            id: 1,
            first_ms: 5,
            last_ms: 10,
        };
        assert!(extract_window(&stream, &bounds, 0).is_none());
    }
}
