//! A lightweight uom-ish library, just the quantities the tracker needs.

use std::ops::{Add, Div, Mul, Neg, Sub};

use track_types::prelude::UtcTimestamp;

#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Length {
    meters: f64,
}

impl std::fmt::Debug for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} m", self.meters)
    }
}

impl Length {
    pub fn from_meters(meters: f64) -> Length {
        Length { meters }
    }

    pub fn from_kilometers(km: f64) -> Length {
        Length {
            meters: km * 1000.0,
        }
    }

    pub fn as_meters(&self) -> f64 {
        self.meters
    }

    pub fn as_kilometers(&self) -> f64 {
        self.meters / 1000.0
    }
}

/// Signed span of time, seconds resolution as f64
#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Time {
    seconds: f64,
}

impl std::fmt::Debug for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} s", self.seconds)
    }
}

impl Time {
    pub fn from_chrono_duration(duration: chrono::Duration) -> Time {
        match duration.num_nanoseconds() {
            Some(ns) => Time::from_nanos(ns),
            // Beyond ~292 years, millisecond precision is plenty
            None => Time::from_millis(duration.num_milliseconds() as f64),
        }
    }

    pub fn from_std_duration(duration: std::time::Duration) -> Time {
        Time::from_secs(duration.as_secs_f64())
    }

    pub fn from_days(days: f64) -> Time {
        Self::from_hours(days * 24.0)
    }

    pub fn from_hours(hours: f64) -> Time {
        Self::from_minutes(hours * 60.0)
    }

    pub fn from_minutes(minutes: f64) -> Time {
        Self::from_secs(minutes * 60.0)
    }

    pub const fn from_secs(seconds: f64) -> Time {
        Time { seconds }
    }

    pub fn from_millis(millis: f64) -> Time {
        Time {
            seconds: millis / 1000.0,
        }
    }

    pub fn from_nanos(nanos: i64) -> Time {
        Time {
            seconds: (nanos as f64) / 1_000_000_000.0,
        }
    }

    pub fn as_secs(&self) -> f64 {
        self.seconds
    }

    pub fn as_minutes(&self) -> f64 {
        self.seconds / 60.0
    }

    pub fn as_millis(&self) -> f64 {
        self.seconds * 1_000.0
    }

    pub fn as_nanos(&self) -> i64 {
        (self.seconds * 1_000_000_000.0).round() as i64
    }

    pub fn as_chrono_duration(&self) -> chrono::Duration {
        chrono::Duration::nanoseconds(self.as_nanos())
    }

    pub fn abs(&self) -> Time {
        Time {
            seconds: self.seconds.abs(),
        }
    }

    /// `t + self`
    pub fn after(&self, t: UtcTimestamp) -> UtcTimestamp {
        t + self.as_chrono_duration()
    }

    /// Elapsed time from `earlier` to `later`, negative if they're swapped
    pub fn between(earlier: UtcTimestamp, later: UtcTimestamp) -> Time {
        Time::from_chrono_duration(later - earlier)
    }
}

impl Add<Time> for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Self::Output {
        Time::from_secs(self.as_secs() + rhs.as_secs())
    }
}

impl Sub<Time> for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Self::Output {
        Time::from_secs(self.as_secs() - rhs.as_secs())
    }
}

impl Div<Time> for Time {
    type Output = f64;

    fn div(self, rhs: Time) -> Self::Output {
        self.as_secs() / rhs.as_secs()
    }
}

impl Div<f64> for Time {
    type Output = Time;

    fn div(self, rhs: f64) -> Self::Output {
        Time::from_secs(self.as_secs() / rhs)
    }
}

impl Mul<f64> for Time {
    type Output = Time;

    fn mul(self, rhs: f64) -> Self::Output {
        Time::from_secs(self.as_secs() * rhs)
    }
}

#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Angle {
    degrees: f64,
}

impl std::fmt::Debug for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees)
    }
}

impl Angle {
    pub fn from_degrees(degrees: f64) -> Angle {
        Angle { degrees }
    }

    pub fn from_radians(radians: f64) -> Angle {
        Angle {
            degrees: radians.to_degrees(),
        }
    }

    pub fn as_degrees(&self) -> f64 {
        self.degrees
    }

    pub fn as_radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// Wrapped into [0, 360)
    pub fn normalized_positive(&self) -> Angle {
        Angle::from_degrees(self.degrees.rem_euclid(360.0))
    }

    /// Wrapped into (-180, 180]
    pub fn normalized_signed(&self) -> Angle {
        let d = self.degrees.rem_euclid(360.0);
        Angle::from_degrees(if d > 180.0 { d - 360.0 } else { d })
    }
}

impl Add<Angle> for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Self::Output {
        Angle::from_degrees(self.as_degrees() + rhs.as_degrees())
    }
}

impl Sub<Angle> for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Self::Output {
        Angle::from_degrees(self.as_degrees() - rhs.as_degrees())
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Self::Output {
        Angle::from_degrees(-self.degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    #[test]
    fn time_conversions() {
        assert_eq!(Time::from_minutes(5.0).as_secs(), 300.0);
        assert_eq!(Time::from_days(2.0).as_minutes(), 2880.0);
        assert_eq!(Time::from_nanos(1_500_000_000).as_millis(), 1500.0);
        assert_eq!(
            Time::from_std_duration(std::time::Duration::from_millis(250)).as_secs(),
            0.25
        );
        assert_eq!(Time::from_minutes(90.0) / Time::from_minutes(5.0), 18.0);
    }

    #[test]
    fn time_and_timestamps() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 30).unwrap();
        let t1 = Time::from_secs(45.5).after(t0);
        assert_eq!(t1, Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 15).unwrap() + chrono::Duration::milliseconds(500));
        assert_eq!(Time::between(t0, t1).as_secs(), 45.5);
        assert_eq!(Time::between(t1, t0).as_secs(), -45.5);
    }

    #[test]
    fn angle_normalization() {
        assert_relative_eq!(Angle::from_degrees(-90.0).normalized_positive().as_degrees(), 270.0);
        assert_relative_eq!(Angle::from_degrees(190.0).normalized_signed().as_degrees(), -170.0);
        assert_relative_eq!(Angle::from_degrees(-180.0).normalized_signed().as_degrees(), 180.0);
        assert_relative_eq!(Angle::from_degrees(180.0).normalized_signed().as_degrees(), 180.0);
        assert_relative_eq!(Angle::from_radians(std::f64::consts::PI).as_degrees(), 180.0);
    }
}
