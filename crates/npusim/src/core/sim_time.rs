//! Simulation time primitives.

use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Virtual timestamp or duration with nanosecond precision.
///
/// Stored as a signed nanosecond count, so durations may be negative (e.g. time left
/// until an already-passed deadline) and arithmetic never clamps. The integer
/// representation makes the ordering of event timestamps exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime {
    nanos: i64,
}

impl SimTime {
    /// Zero time, the simulation epoch.
    pub const ZERO: SimTime = SimTime { nanos: 0 };

    pub fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    pub fn from_micros(micros: i64) -> Self {
        Self {
            nanos: micros * NANOS_PER_MICRO,
        }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self {
            nanos: millis * NANOS_PER_MILLI,
        }
    }

    pub fn from_secs(secs: i64) -> Self {
        Self {
            nanos: secs * NANOS_PER_SEC,
        }
    }

    /// Creates a time value from seconds, rounding to the nearest nanosecond.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            nanos: (secs * NANOS_PER_SEC as f64).round() as i64,
        }
    }

    pub fn as_nanos(&self) -> i64 {
        self.nanos
    }

    pub fn as_micros(&self) -> i64 {
        self.nanos / NANOS_PER_MICRO
    }

    pub fn as_millis(&self) -> i64 {
        self.nanos / NANOS_PER_MILLI
    }

    pub fn as_secs(&self) -> i64 {
        self.nanos / NANOS_PER_SEC
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / NANOS_PER_SEC as f64
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    pub fn is_positive(&self) -> bool {
        self.nanos > 0
    }

    pub fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    pub fn abs(self) -> Self {
        Self {
            nanos: self.nanos.abs(),
        }
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, other: SimTime) -> SimTime {
        SimTime {
            nanos: self.nanos + other.nanos,
        }
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, other: SimTime) {
        self.nanos += other.nanos;
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, other: SimTime) -> SimTime {
        SimTime {
            nanos: self.nanos - other.nanos,
        }
    }
}

impl SubAssign for SimTime {
    fn sub_assign(&mut self, other: SimTime) {
        self.nanos -= other.nanos;
    }
}

impl Neg for SimTime {
    type Output = SimTime;

    fn neg(self) -> SimTime {
        SimTime { nanos: -self.nanos }
    }
}

/// Scales the time value by a factor, rounding to the nearest nanosecond.
impl Mul<f64> for SimTime {
    type Output = SimTime;

    fn mul(self, factor: f64) -> SimTime {
        SimTime {
            nanos: (self.nanos as f64 * factor).round() as i64,
        }
    }
}

/// Divides the time value by a factor, rounding to the nearest nanosecond.
impl Div<f64> for SimTime {
    type Output = SimTime;

    fn div(self, factor: f64) -> SimTime {
        SimTime {
            nanos: (self.nanos as f64 / factor).round() as i64,
        }
    }
}

/// Renders the value at ns/µs/ms/s granularity depending on its magnitude; zero is
/// rendered as `0s`.
impl Display for SimTime {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.nanos == 0 {
            return write!(f, "0s");
        }
        let magnitude = self.nanos.unsigned_abs();
        if magnitude < NANOS_PER_MICRO as u64 {
            write!(f, "{}ns", self.nanos)
        } else if magnitude < NANOS_PER_MILLI as u64 {
            write!(f, "{:.3}µs", self.nanos as f64 / NANOS_PER_MICRO as f64)
        } else if magnitude < NANOS_PER_SEC as u64 {
            write!(f, "{:.3}ms", self.nanos as f64 / NANOS_PER_MILLI as f64)
        } else {
            write!(f, "{:.3}s", self.as_secs_f64())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_agree() {
        assert_eq!(SimTime::from_secs(1), SimTime::from_millis(1_000));
        assert_eq!(SimTime::from_millis(1), SimTime::from_micros(1_000));
        assert_eq!(SimTime::from_micros(1), SimTime::from_nanos(1_000));
        assert_eq!(SimTime::from_secs_f64(1.5), SimTime::from_millis(1_500));
        assert_eq!(SimTime::ZERO, SimTime::from_nanos(0));
    }

    #[test]
    fn test_accessors() {
        let t = SimTime::from_millis(2_500);
        assert_eq!(t.as_nanos(), 2_500_000_000);
        assert_eq!(t.as_micros(), 2_500_000);
        assert_eq!(t.as_millis(), 2_500);
        assert_eq!(t.as_secs(), 2);
        assert_eq!(t.as_secs_f64(), 2.5);
    }

    #[test]
    fn test_arithmetic() {
        let a = SimTime::from_secs(3);
        let b = SimTime::from_secs(5);
        assert_eq!(a + b, SimTime::from_secs(8));
        assert_eq!(a - b, SimTime::from_secs(-2));
        assert!((a - b).is_negative());
        assert_eq!((a - b).abs(), SimTime::from_secs(2));
        assert_eq!(-a, SimTime::from_secs(-3));
        assert_eq!(a * 2.0, SimTime::from_secs(6));
        assert_eq!(b / 2.0, SimTime::from_millis(2_500));

        let mut c = a;
        c += b;
        assert_eq!(c, SimTime::from_secs(8));
        c -= a;
        assert_eq!(c, b);
    }

    #[test]
    fn test_ordering() {
        let early = SimTime::from_millis(999);
        let late = SimTime::from_secs(1);
        assert!(early < late);
        assert_eq!(early.max(late), late);
        assert_eq!(early.min(late), early);
        assert!(SimTime::from_secs(-1) < SimTime::ZERO);
    }

    #[test]
    fn test_predicates() {
        assert!(SimTime::ZERO.is_zero());
        assert!(SimTime::from_nanos(1).is_positive());
        assert!(SimTime::from_nanos(-1).is_negative());
        assert!(!SimTime::ZERO.is_positive());
        assert!(!SimTime::ZERO.is_negative());
    }

    #[test]
    fn test_display() {
        assert_eq!(SimTime::ZERO.to_string(), "0s");
        assert_eq!(SimTime::from_nanos(500).to_string(), "500ns");
        assert_eq!(SimTime::from_nanos(1_500).to_string(), "1.500µs");
        assert_eq!(SimTime::from_micros(1_500).to_string(), "1.500ms");
        assert_eq!(SimTime::from_millis(1_500).to_string(), "1.500s");
        assert_eq!(SimTime::from_secs(90).to_string(), "90.000s");
        assert_eq!(SimTime::from_nanos(-500).to_string(), "-500ns");
        assert_eq!(SimTime::from_millis(-1_500).to_string(), "-1.500s");
    }
}
