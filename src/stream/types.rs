//! Raw touchscreen sample types.
//!
//! One `RawSample` is one row of the recorder's log: the touch event kind,
//! finger position and contact readings, and the synchronized IMU and
//! magnetometer readings taken at the same instant.

use serde::{Deserialize, Serialize};

/// Touch event classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Finger touched down
    Press,
    /// Finger sliding while in contact
    Move,
    /// Finger lifted
    Release,
    /// No finger on the screen (sensor-only sample)
    None,
}

impl EventKind {
    /// Parse a recorder label.
    ///
    /// Accepts the recorder's native labels and English aliases. Anything
    /// unrecognised is a non-touch sample.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "按下" => return EventKind::Press,
            "滑动中" => return EventKind::Move,
            "抬起" => return EventKind::Release,
            "无触摸" => return EventKind::None,
            _ => {}
        }

        match label.trim().to_lowercase().as_str() {
            "press" | "down" => EventKind::Press,
            "move" | "slide" => EventKind::Move,
            "release" | "up" => EventKind::Release,
            _ => EventKind::None,
        }
    }

    /// Whether this kind belongs to a touch action (press, slide or release).
    pub fn is_touch(self) -> bool {
        !matches!(self, EventKind::None)
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Press => "press",
            EventKind::Move => "move",
            EventKind::Release => "release",
            EventKind::None => "none",
        }
    }
}

/// A three-axis sensor reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One sensor/event snapshot from the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Touch event kind
    pub event_kind: EventKind,
    /// Capture time in milliseconds
    pub timestamp_ms: i64,
    /// Finger position
    pub x: f64,
    pub y: f64,
    /// Touch pressure
    pub pressure: f64,
    /// Finger contact area
    pub contact_area: f64,
    /// Recorder's swipe direction label, carried through unused
    pub swipe_direction: String,
    /// Accelerometer
    pub accel: Vec3,
    /// Gyroscope
    pub gyro: Vec3,
    /// Magnetometer
    pub mag: Vec3,
}

impl RawSample {
    /// A touch sample with zeroed sensor channels.
    pub fn touch(event_kind: EventKind, timestamp_ms: i64, x: f64, y: f64) -> Self {
        Self {
            event_kind,
            timestamp_ms,
            x,
            y,
            pressure: 0.0,
            contact_area: 0.0,
            swipe_direction: String::new(),
            accel: Vec3::default(),
            gyro: Vec3::default(),
            mag: Vec3::default(),
        }
    }

    /// Value of one of the nine sensor channels.
    pub fn channel(&self, channel: SensorChannel) -> f64 {
        match channel {
            SensorChannel::AccelX => self.accel.x,
            SensorChannel::AccelY => self.accel.y,
            SensorChannel::AccelZ => self.accel.z,
            SensorChannel::GyroX => self.gyro.x,
            SensorChannel::GyroY => self.gyro.y,
            SensorChannel::GyroZ => self.gyro.z,
            SensorChannel::MagX => self.mag.x,
            SensorChannel::MagY => self.mag.y,
            SensorChannel::MagZ => self.mag.z,
        }
    }
}

/// The nine synchronized sensor channels, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorChannel {
    AccelX,
    AccelY,
    AccelZ,
    GyroX,
    GyroY,
    GyroZ,
    MagX,
    MagY,
    MagZ,
}

impl SensorChannel {
    pub const ALL: [SensorChannel; 9] = [
        SensorChannel::AccelX,
        SensorChannel::AccelY,
        SensorChannel::AccelZ,
        SensorChannel::GyroX,
        SensorChannel::GyroY,
        SensorChannel::GyroZ,
        SensorChannel::MagX,
        SensorChannel::MagY,
        SensorChannel::MagZ,
    ];

    /// Column prefix used in the feature table.
    pub fn name(self) -> &'static str {
        match self {
            SensorChannel::AccelX => "accel_x",
            SensorChannel::AccelY => "accel_y",
            SensorChannel::AccelZ => "accel_z",
            SensorChannel::GyroX => "gyro_x",
            SensorChannel::GyroY => "gyro_y",
            SensorChannel::GyroZ => "gyro_z",
            SensorChannel::MagX => "mag_x",
            SensorChannel::MagY => "mag_y",
            SensorChannel::MagZ => "mag_z",
        }
    }
}
