//! Feature computation from gesture windows.
//!
//! Geometric and kinematic features come from the core window; the nine
//! sensor channels are summarised over the padded context window. Every
//! value is an `Option<f64>`: `None` is the missing marker used whenever a
//! block's input is too small, and a downstream imputation step fills it.

use crate::core::window::GestureWindow;
use crate::stream::{EventStream, RawSample, SensorChannel};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::f64::consts::PI;

/// One feature value; `None` marks a missing value.
pub type Feature = Option<f64>;

/// Gesture-level features (position through direction).
pub const GESTURE_FEATURE_COUNT: usize = 29;

/// Statistics per sensor channel.
pub const CHANNEL_STAT_COUNT: usize = 5;

/// Sensor features (9 channels × 5 statistics).
pub const SENSOR_FEATURE_COUNT: usize = 9 * CHANNEL_STAT_COUNT;

/// Total feature columns per gesture, excluding id and sample count.
pub const FEATURE_COUNT: usize = GESTURE_FEATURE_COUNT + SENSOR_FEATURE_COUNT;

/// Mean, max, min and population variance of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub variance: f64,
}

impl SeriesStats {
    /// Summarise a series; `None` when it is empty.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            mean: Statistics::mean(values),
            max: Statistics::max(values),
            min: Statistics::min(values),
            variance: Statistics::population_variance(values),
        })
    }

    /// Block layout: mean, max, min, variance.
    fn block(stats: Option<Self>) -> [Feature; 4] {
        match stats {
            Some(s) => [
                feature(s.mean),
                feature(s.max),
                feature(s.min),
                feature(s.variance),
            ],
            None => [None; 4],
        }
    }
}

/// All features of one gesture, grouped by block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureFeatures {
    /// Start x, start y, end x, end y
    pub position: [Feature; 4],
    /// Displacement, path length, displacement / path length
    pub length: [Feature; 3],
    /// Stats of each point's angle from the origin
    pub point_angle: [Feature; 4],
    /// Stats of each consecutive step's heading
    pub step_angle: [Feature; 4],
    /// Core window duration in milliseconds
    pub duration: [Feature; 1],
    /// Stats of per-step speed (distance per millisecond)
    pub speed: [Feature; 4],
    /// Stats of touch pressure
    pub pressure: [Feature; 4],
    /// Stats of contact area
    pub area: [Feature; 4],
    /// Overall heading in [0, 2π)
    pub direction: [Feature; 1],
    /// Per channel: mean, min, max, variance, complexity
    pub sensors: [[Feature; CHANNEL_STAT_COUNT]; 9],
}

impl GestureFeatures {
    /// Compute every block for a resolved gesture window.
    pub fn compute(stream: &EventStream, window: &GestureWindow) -> Self {
        let core = window.core_samples(stream);
        let context = window.context_samples(stream);
        Self::from_samples(&core, &context, window.tstart, window.tend)
    }

    /// Compute every block from explicit core and context samples.
    pub fn from_samples(
        core: &[&RawSample],
        context: &[&RawSample],
        tstart: i64,
        tend: i64,
    ) -> Self {
        let (point_angle, step_angle) = angle_features(core);

        let mut sensors = [[None; CHANNEL_STAT_COUNT]; 9];
        for (slot, channel) in sensors.iter_mut().zip(SensorChannel::ALL) {
            let values: Vec<f64> = context.iter().map(|s| s.channel(channel)).collect();
            *slot = channel_features(&values);
        }

        Self {
            position: position_features(core),
            length: length_features(core),
            point_angle,
            step_angle,
            duration: duration_feature(tstart, tend),
            speed: speed_features(core),
            pressure: series_features(core, |s| s.pressure),
            area: series_features(core, |s| s.contact_area),
            direction: direction_feature(core),
            sensors,
        }
    }

    /// Flatten to table order. Always `FEATURE_COUNT` long.
    pub fn values(&self) -> Vec<Feature> {
        let mut values = Vec::with_capacity(FEATURE_COUNT);
        values.extend_from_slice(&self.position);
        values.extend_from_slice(&self.length);
        values.extend_from_slice(&self.point_angle);
        values.extend_from_slice(&self.step_angle);
        values.extend_from_slice(&self.duration);
        values.extend_from_slice(&self.speed);
        values.extend_from_slice(&self.pressure);
        values.extend_from_slice(&self.area);
        values.extend_from_slice(&self.direction);
        for channel in &self.sensors {
            values.extend_from_slice(channel);
        }
        values
    }

    /// Number of missing values.
    pub fn missing_count(&self) -> usize {
        self.values().iter().filter(|v| v.is_none()).count()
    }
}

/// Start and end coordinates.
pub fn position_features(core: &[&RawSample]) -> [Feature; 4] {
    match (core.first(), core.last()) {
        (Some(first), Some(last)) => [
            feature(first.x),
            feature(first.y),
            feature(last.x),
            feature(last.y),
        ],
        _ => [None; 4],
    }
}

/// Displacement, path length and their ratio.
///
/// The ratio is 0 when the path length is 0.
pub fn length_features(core: &[&RawSample]) -> [Feature; 3] {
    if core.len() < 2 {
        return [None; 3];
    }

    let first = core[0];
    let last = core[core.len() - 1];
    let displacement = distance(first, last);
    let move_length: f64 = core.windows(2).map(|pair| distance(pair[0], pair[1])).sum();

    let ratio = if move_length == 0.0 {
        0.0
    } else {
        displacement / move_length
    };

    [feature(displacement), feature(move_length), feature(ratio)]
}

/// Angle statistics in radians.
///
/// The first block uses `atan2(y, x)` of every point, the second
/// `atan2(dy, dx)` of every consecutive pair.
pub fn angle_features(core: &[&RawSample]) -> ([Feature; 4], [Feature; 4]) {
    let point_angles: Vec<f64> = core.iter().map(|s| s.y.atan2(s.x)).collect();
    let step_angles: Vec<f64> = core
        .windows(2)
        .map(|pair| (pair[1].y - pair[0].y).atan2(pair[1].x - pair[0].x))
        .collect();

    (
        SeriesStats::block(SeriesStats::compute(&point_angles)),
        SeriesStats::block(SeriesStats::compute(&step_angles)),
    )
}

/// Core window length; missing when the span does not fit in an `i64`.
pub fn duration_feature(tstart: i64, tend: i64) -> [Feature; 1] {
    [tend.checked_sub(tstart).and_then(|d| feature(d as f64))]
}

/// Per-step speed statistics.
///
/// Steps with no elapsed time are skipped rather than counted as zero.
pub fn speed_features(core: &[&RawSample]) -> [Feature; 4] {
    if core.len() < 2 {
        return [None; 4];
    }

    let speeds: Vec<f64> = core
        .windows(2)
        .filter_map(|pair| {
            let (t0, t1) = (pair[0].timestamp_ms, pair[1].timestamp_ms);
            // Differenced in f64 so extreme timestamps cannot overflow.
            (t1 != t0).then(|| distance(pair[0], pair[1]) / (t1 as f64 - t0 as f64))
        })
        .collect();

    SeriesStats::block(SeriesStats::compute(&speeds))
}

/// Statistics of one per-sample column.
pub fn series_features(core: &[&RawSample], column: impl Fn(&RawSample) -> f64) -> [Feature; 4] {
    let values: Vec<f64> = core.iter().map(|s| column(s)).collect();
    SeriesStats::block(SeriesStats::compute(&values))
}

/// Heading from first to last point, mapped into [0, 2π).
///
/// No movement gives exactly 0.
pub fn direction_feature(core: &[&RawSample]) -> [Feature; 1] {
    if core.len() < 2 {
        return [None];
    }

    let first = core[0];
    let last = core[core.len() - 1];
    let dx = last.x - first.x;
    let dy = last.y - first.y;

    let angle = if dx == 0.0 && dy == 0.0 {
        0.0
    } else {
        let angle = dy.atan2(dx);
        if angle < 0.0 {
            angle + 2.0 * PI
        } else {
            angle
        }
    };

    [feature(angle)]
}

/// Mean, min, max, population variance and complexity of a sensor channel.
///
/// Complexity is `sqrt(Σ diff²)` over consecutive values, 0 for fewer than
/// two values.
pub fn channel_features(values: &[f64]) -> [Feature; CHANNEL_STAT_COUNT] {
    let Some(stats) = SeriesStats::compute(values) else {
        return [None; CHANNEL_STAT_COUNT];
    };

    let complexity = if values.len() < 2 {
        0.0
    } else {
        values
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).powi(2))
            .sum::<f64>()
            .sqrt()
    };

    [
        feature(stats.mean),
        feature(stats.min),
        feature(stats.max),
        feature(stats.variance),
        feature(complexity),
    ]
}

fn distance(a: &RawSample, b: &RawSample) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Non-finite results become missing.
fn feature(value: f64) -> Feature {
    value.is_finite().then_some(value)
}
