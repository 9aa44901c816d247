//! Validity rules for `google.protobuf.Timestamp`.
//!
//! A timestamp is valid when it falls between 0001-01-01T00:00:00Z and
//! 9999-12-31T23:59:59.999999999Z and its `nanos` component is a proper
//! fraction of a second.

use chrono::{DateTime, Utc};
use protobuf::well_known_types::timestamp::Timestamp;
use thiserror::Error;

/// Seconds of 0001-01-01T00:00:00Z relative to the Unix epoch.
pub const MIN_VALID_SECONDS: i64 = -62_135_596_800;

/// Seconds of 9999-12-31T23:59:59Z relative to the Unix epoch.
pub const MAX_VALID_SECONDS: i64 = 253_402_300_799;

const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// Reasons a `Timestamp` does not denote a representable instant.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp (seconds={seconds}, nanos={nanos}) before 0001-01-01")]
    BeforeMin { seconds: i64, nanos: i32 },

    #[error("timestamp (seconds={seconds}, nanos={nanos}) after 9999-12-31")]
    AfterMax { seconds: i64, nanos: i32 },

    #[error("timestamp (seconds={seconds}, nanos={nanos}) has out-of-range nanos")]
    NanosOutOfRange { seconds: i64, nanos: i32 },
}

/// Check that `ts` lies within the range protobuf timestamps may express.
pub fn check_valid(ts: &Timestamp) -> Result<(), TimestampError> {
    let (seconds, nanos) = (ts.seconds, ts.nanos);
    if seconds < MIN_VALID_SECONDS {
        Err(TimestampError::BeforeMin { seconds, nanos })
    } else if seconds > MAX_VALID_SECONDS {
        Err(TimestampError::AfterMax { seconds, nanos })
    } else if !(0..NANOS_PER_SECOND).contains(&nanos) {
        Err(TimestampError::NanosOutOfRange { seconds, nanos })
    } else {
        Ok(())
    }
}

/// Build a timestamp from a UTC instant.
///
/// The result is not validated; instants outside years 1..=9999 produce a
/// timestamp that [`check_valid`] rejects.
pub fn from_datetime(dt: DateTime<Utc>) -> Timestamp {
    let mut ts = Timestamp::new();
    ts.seconds = dt.timestamp();
    // chrono reports leap seconds as nanos >= 1e9; validation rejects those.
    ts.nanos = dt.timestamp_subsec_nanos() as i32;
    ts
}

/// Convert a valid timestamp to a UTC instant.
pub fn to_datetime(ts: &Timestamp) -> Result<DateTime<Utc>, TimestampError> {
    check_valid(ts)?;
    DateTime::from_timestamp(ts.seconds, ts.nanos as u32).ok_or(TimestampError::AfterMax {
        seconds: ts.seconds,
        nanos: ts.nanos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(seconds: i64, nanos: i32) -> Timestamp {
        let mut t = Timestamp::new();
        t.seconds = seconds;
        t.nanos = nanos;
        t
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(check_valid(&ts(MIN_VALID_SECONDS, 0)).is_ok());
        assert!(check_valid(&ts(MAX_VALID_SECONDS, 999_999_999)).is_ok());
    }

    #[test]
    fn test_out_of_range_seconds() {
        assert_eq!(
            check_valid(&ts(MIN_VALID_SECONDS - 1, 0)),
            Err(TimestampError::BeforeMin {
                seconds: MIN_VALID_SECONDS - 1,
                nanos: 0
            })
        );
        assert!(matches!(
            check_valid(&ts(MAX_VALID_SECONDS + 1, 0)),
            Err(TimestampError::AfterMax { .. })
        ));
    }

    #[test]
    fn test_out_of_range_nanos() {
        assert!(matches!(
            check_valid(&ts(0, -1)),
            Err(TimestampError::NanosOutOfRange { .. })
        ));
        assert!(matches!(
            check_valid(&ts(0, 1_000_000_000)),
            Err(TimestampError::NanosOutOfRange { .. })
        ));
    }

    #[test]
    fn test_bounds_match_calendar() {
        let min = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        let max = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(min.timestamp(), MIN_VALID_SECONDS);
        assert_eq!(max.timestamp(), MAX_VALID_SECONDS);
    }

    #[test]
    fn test_datetime_conversion() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 45).unwrap()
            + chrono::Duration::microseconds(123_456);
        let t = from_datetime(dt);
        assert_eq!(t.seconds, dt.timestamp());
        assert_eq!(t.nanos, 123_456_000);
        assert_eq!(to_datetime(&t).unwrap(), dt);
    }

    #[test]
    fn test_to_datetime_rejects_invalid() {
        let year_10000 = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        let t = from_datetime(year_10000);
        assert!(matches!(
            to_datetime(&t),
            Err(TimestampError::AfterMax { .. })
        ));
    }
}
