//! Time primitives for the DIS protocol
//!
//! DIS timestamps measure time past the current hour. The upper 31 bits hold
//! the time value, scaled so that 2^31 - 1 units span one hour; the least
//! significant bit tells whether the clock is absolute (synchronized to UTC)
//! or relative (free running local clock).

use std::time::Duration;

/// Number of timestamp units in one hour
pub const TIMESTAMP_UNITS_PER_HOUR: u32 = 0x7FFF_FFFF;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Whether a timestamp is synchronized to an absolute time reference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TimestampKind {
    #[default]
    Relative,
    Absolute,
}

/// 32-bit DIS timestamp
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Timestamp(pub u32);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Timestamp(raw)
    }

    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }

    /// Build from a kind and a 31-bit time value (excess bits are dropped)
    #[inline]
    pub fn new(kind: TimestampKind, units: u32) -> Self {
        let flag = match kind {
            TimestampKind::Relative => 0,
            TimestampKind::Absolute => 1,
        };
        Timestamp(((units & TIMESTAMP_UNITS_PER_HOUR) << 1) | flag)
    }

    /// Build from the time elapsed since the top of the hour.
    /// Durations of an hour or more wrap around.
    pub fn from_past_hour(kind: TimestampKind, past_hour: Duration) -> Self {
        let secs = past_hour.as_secs_f64() % SECONDS_PER_HOUR;
        let units = (secs / SECONDS_PER_HOUR * TIMESTAMP_UNITS_PER_HOUR as f64).round() as u32;
        Timestamp::new(kind, units.min(TIMESTAMP_UNITS_PER_HOUR))
    }

    #[inline]
    pub fn kind(self) -> TimestampKind {
        if self.0 & 1 == 1 {
            TimestampKind::Absolute
        } else {
            TimestampKind::Relative
        }
    }

    #[inline]
    pub fn set_kind(&mut self, kind: TimestampKind) {
        *self = Timestamp::new(kind, self.units());
    }

    /// 31-bit time value
    #[inline]
    pub fn units(self) -> u32 {
        self.0 >> 1
    }

    #[inline]
    pub fn set_units(&mut self, units: u32) {
        *self = Timestamp::new(self.kind(), units);
    }

    /// Seconds elapsed since the top of the hour
    #[inline]
    pub fn seconds_past_hour(self) -> f64 {
        self.units() as f64 * SECONDS_PER_HOUR / TIMESTAMP_UNITS_PER_HOUR as f64
    }

    #[inline]
    pub fn past_hour(self) -> Duration {
        Duration::from_secs_f64(self.seconds_past_hour())
    }
}

impl From<u32> for Timestamp {
    fn from(raw: u32) -> Self {
        Timestamp(raw)
    }
}

/// Clock time: hours since 1970-01-01 plus time past the hour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ClockTime {
    /// Hours since 0000 hours January 1, 1970 UTC (or simulation start)
    pub hour: i32,
    /// Time past the hour, in timestamp representation
    pub time_past_hour: Timestamp,
}

impl ClockTime {
    pub const WIRE_SIZE: usize = 8;

    #[inline]
    pub fn new(hour: i32, time_past_hour: Timestamp) -> Self {
        ClockTime {
            hour,
            time_past_hour,
        }
    }

    /// Absolute clock time for a duration since the Unix epoch
    pub fn from_unix(since_epoch: Duration) -> Self {
        let secs = since_epoch.as_secs();
        let hour = (secs / 3600).min(i32::MAX as u64) as i32;
        let past = since_epoch.saturating_sub(Duration::from_secs(secs - secs % 3600));
        ClockTime {
            hour,
            time_past_hour: Timestamp::from_past_hour(TimestampKind::Absolute, past),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_timestamp_kind_bit() {
        let abs = Timestamp::new(TimestampKind::Absolute, 10);
        assert_eq!(abs.to_raw(), 21);
        assert_eq!(abs.kind(), TimestampKind::Absolute);
        assert_eq!(abs.units(), 10);

        let rel = Timestamp::new(TimestampKind::Relative, 10);
        assert_eq!(rel.to_raw(), 20);
        assert_eq!(rel.kind(), TimestampKind::Relative);
    }

    #[test]
    fn test_timestamp_past_hour() {
        let ts = Timestamp::from_past_hour(TimestampKind::Relative, Duration::from_secs(1800));
        assert!((ts.seconds_past_hour() - 1800.0).abs() < 0.001);

        let wrapped = Timestamp::from_past_hour(TimestampKind::Relative, Duration::from_secs(3600 + 60));
        assert!((wrapped.seconds_past_hour() - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_timestamp_setters_keep_other_part() {
        let mut ts = Timestamp::new(TimestampKind::Absolute, 1234);
        ts.set_units(99);
        assert_eq!(ts.kind(), TimestampKind::Absolute);
        ts.set_kind(TimestampKind::Relative);
        assert_eq!(ts.units(), 99);
    }

    #[test]
    fn test_clock_time_from_unix() {
        let ct = ClockTime::from_unix(Duration::from_secs(3600 * 5 + 900));
        assert_eq!(ct.hour, 5);
        assert!((ct.time_past_hour.seconds_past_hour() - 900.0).abs() < 0.001);
        assert_eq!(ct.time_past_hour.kind(), TimestampKind::Absolute);
    }

    proptest! {
        #[test]
        fn prop_timestamp_fields_roundtrip(units in 0u32..=TIMESTAMP_UNITS_PER_HOUR, absolute in any::<bool>()) {
            let kind = if absolute { TimestampKind::Absolute } else { TimestampKind::Relative };
            let ts = Timestamp::new(kind, units);
            prop_assert_eq!(ts.units(), units);
            prop_assert_eq!(ts.kind(), kind);
            prop_assert_eq!(Timestamp::from_raw(ts.to_raw()), ts);
        }
    }
}
