//! Time utilities for consistent time handling
//!
//! All consent timestamps on the wire are epoch milliseconds (`validityTime`,
//! `createdTime`, `updatedTime`); internally we keep `DateTime<Utc>` and
//! convert at the edges.

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert epoch milliseconds to `DateTime<Utc>`.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Convert `DateTime<Utc>` to epoch milliseconds.
pub fn to_epoch_millis(datetime: &DateTime<Utc>) -> i64 {
    datetime.timestamp_millis()
}

/// Whether the given epoch-millis deadline has already passed.
pub fn is_past_epoch_millis(deadline_millis: i64) -> bool {
    deadline_millis <= to_epoch_millis(&now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_epoch_millis() {
        let dt = now();
        let millis = to_epoch_millis(&dt);
        let back = from_epoch_millis(millis).unwrap();
        assert_eq!(to_epoch_millis(&back), millis);
    }

    #[test]
    fn detects_past_deadline() {
        let past = to_epoch_millis(&now()) - 1_000;
        assert!(is_past_epoch_millis(past));

        let future = to_epoch_millis(&now()) + 60_000;
        assert!(!is_past_epoch_millis(future));
    }
}
