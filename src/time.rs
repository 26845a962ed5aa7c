//! Time APIs for frame pacing, beacon cadence and session timeouts.
//!
//! The core paces universe frames at sub-millisecond intervals, so everything here has
//! microsecond resolution and uses 32-bit arithmetic. Points in time wrap around after a little
//! over an hour; all spans the core measures (frame gaps, retry windows, beacon intervals) are
//! far below that.

use core::fmt;
use core::ops::{Add, Sub};

/// A span of time with microsecond resolution.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(u32);

impl Duration {
    /// Creates a `Duration` from a number of microseconds.
    pub const fn from_micros(micros: u32) -> Self {
        Duration(micros)
    }

    /// Creates a `Duration` from a number of milliseconds.
    pub const fn from_millis(millis: u32) -> Self {
        Duration(millis * 1_000)
    }

    /// Creates a `Duration` from a number of seconds.
    pub const fn from_secs(secs: u16) -> Self {
        Duration(secs as u32 * 1_000_000)
    }

    /// Returns the number of microseconds represented by `self`.
    pub fn as_micros(&self) -> u32 {
        self.0
    }

    /// Returns the number of whole milliseconds that fit in `self`.
    pub fn whole_millis(&self) -> u32 {
        self.0 / 1_000
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Duration(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 1_000 && self.0 % 1_000 == 0 {
            write!(f, "{}ms", self.whole_millis())
        } else {
            write!(f, "{}µs", self.0)
        }
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

/// A point in time, relative to an unspecified epoch.
///
/// `Instant`s are obtained from an implementation of [`Timer`]. They have microsecond resolution
/// and wrap around after >1 hour. `Instant`s created by different [`Timer`] instances are not
/// compatible; mixing them in operations gives unspecified results.
///
/// [`Timer`]: trait.Timer.html
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instant(u32);

impl Instant {
    /// Creates an `Instant` from raw microseconds since an implementation-defined reference
    /// point.
    ///
    /// This should only be called from a [`Timer`] implementation.
    ///
    /// [`Timer`]: trait.Timer.html
    pub fn from_raw_micros(micros: u32) -> Self {
        Instant(micros)
    }

    /// Returns the raw value from which this `Instant` was created.
    pub fn raw_micros(&self) -> u32 {
        self.0
    }

    /// Calculates the time that has passed between `earlier` and `self`.
    ///
    /// The subtraction wraps, so the result is only meaningful when the real span between the two
    /// instants is shorter than the ~71 minute wrap-around period of the underlying counter.
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        Duration(self.0.wrapping_sub(earlier.0))
    }
}

/// `Instant`s can be subtracted, computing the [`Duration`] between them via
/// [`Instant::duration_since`].
impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.duration_since(rhs)
    }
}

/// A [`Duration`] can be added to an [`Instant`], moving it forwards in time.
impl Add<Duration> for Instant {
    type Output = Self;

    fn add(self, d: Duration) -> Self {
        Instant(self.0.wrapping_add(d.as_micros()))
    }
}

/// A [`Duration`] can be subtracted from an [`Instant`], moving it backwards in time.
impl Sub<Duration> for Instant {
    type Output = Self;

    fn sub(self, d: Duration) -> Self {
        Instant(self.0.wrapping_sub(d.as_micros()))
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}s", self.0 / 1_000_000, self.0 % 1_000_000)
    }
}

/// Trait for time providers.
///
/// The host has to provide an implementation of `Timer` to the core. On the reference hardware
/// this is a thin wrapper around the free-running microsecond counter; tests use a manually
/// advanced mock.
pub trait Timer {
    /// Obtain the current time as an [`Instant`].
    ///
    /// The [`Instant`]s returned by this function must never move backwards in time, except when
    /// the underlying value wraps around.
    ///
    /// [`Instant`]: struct.Instant.html
    fn now(&self) -> Instant;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Duration::from_millis(22).as_micros(), 22_000);
        assert_eq!(Duration::from_secs(1), Duration::from_millis(1_000));
        assert_eq!(Duration::from_micros(2_500).whole_millis(), 2);
    }

    #[test]
    fn duration_since_handles_wraparound() {
        let before = Instant::from_raw_micros(u32::max_value() - 10);
        let after = before + Duration::from_micros(30);
        assert_eq!(after.duration_since(before), Duration::from_micros(30));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Duration::from_millis(22)), "22ms");
        assert_eq!(format!("{}", Duration::from_micros(665)), "665µs");
    }
}
