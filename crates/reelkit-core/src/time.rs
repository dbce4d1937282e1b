//! Time representation for microsecond-accurate editing
//!
//! Every timeline position and duration is an integer count of
//! microseconds. Frame rates stay rational so NTSC rates such as
//! 30000/1001 convert without drift.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A point in time or a duration, in whole microseconds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MediaTime(i64);

impl MediaTime {
    /// Zero time constant.
    pub const ZERO: Self = Self(0);

    /// Largest representable time.
    pub const MAX: Self = Self(i64::MAX);

    /// Microseconds per second.
    pub const MICROS_PER_SECOND: i64 = 1_000_000;

    /// Create a time from a raw microsecond count.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Create a time from whole milliseconds.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * 1_000)
    }

    /// Create a time from whole seconds.
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * Self::MICROS_PER_SECOND)
    }

    /// Create a time from seconds as a float, rounded to the nearest microsecond.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * Self::MICROS_PER_SECOND as f64).round() as i64)
    }

    /// Raw microsecond count.
    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / Self::MICROS_PER_SECOND as f64
    }

    /// Check if this time is zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Check if this time is negative.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Addition that returns `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Convert to a frame number at the given rate (floored).
    pub fn to_frames(self, rate: FrameRate) -> i64 {
        let frames = Rational64::new(self.0, Self::MICROS_PER_SECOND) * rate.as_ratio();
        frames.floor().to_integer()
    }

    /// Time of the given frame number at the given rate (floored to the microsecond).
    ///
    /// A zero rate has no frame spacing, so every frame sits at zero.
    pub fn from_frames(frames: i64, rate: FrameRate) -> Self {
        let fps = rate.as_ratio();
        if fps == Rational64::from_integer(0) {
            return Self::ZERO;
        }
        let micros = Rational64::from_integer(frames) / fps
            * Rational64::from_integer(Self::MICROS_PER_SECOND);
        Self(micros.floor().to_integer())
    }

    /// Scale by an exact ratio, rounding down.
    pub fn scale(self, ratio: Rational64) -> Self {
        Self((Rational64::from_integer(self.0) * ratio).floor().to_integer())
    }
}

impl Add for MediaTime {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for MediaTime {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for MediaTime {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for MediaTime {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for MediaTime {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i64> for MediaTime {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<i64> for MediaTime {
    type Output = Self;
    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Exact frames-per-second ratio.
    #[inline]
    pub fn as_ratio(self) -> Rational64 {
        Rational64::new(self.numerator as i64, self.denominator.max(1) as i64)
    }

    /// Duration of a single frame.
    pub fn frame_duration(self) -> MediaTime {
        MediaTime::from_frames(1, self)
    }

    /// The lower of two rates.
    pub fn min(self, other: Self) -> Self {
        if other.as_ratio() < self.as_ratio() {
            other
        } else {
            self
        }
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_50: Self = Self::new(50, 1);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// A half-open time range `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: MediaTime,
    /// Duration of the range
    pub duration: MediaTime,
}

impl TimeRange {
    /// Create a new time range from start and duration.
    #[inline]
    pub fn new(start: MediaTime, duration: MediaTime) -> Self {
        Self { start, duration }
    }

    /// Create a time range from start and end times.
    #[inline]
    pub fn from_start_end(start: MediaTime, end: MediaTime) -> Self {
        Self {
            start,
            duration: end - start,
        }
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(self) -> MediaTime {
        self.start + self.duration
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: MediaTime) -> bool {
        time >= self.start && time < self.end()
    }

    /// Check if a time lies strictly between start and end.
    #[inline]
    pub fn strictly_contains(self, time: MediaTime) -> bool {
        time > self.start && time < self.end()
    }

    /// Check if two ranges overlap. Touching ranges do not overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Empty range starting at zero.
    pub const EMPTY: Self = Self {
        start: MediaTime::ZERO,
        duration: MediaTime::ZERO,
    };
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}
