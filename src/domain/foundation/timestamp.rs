//! UTC instants used for activity tracking and expiry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A UTC instant. Serializes as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Signed: negative when `earlier` is actually later than `self`.
    pub fn duration_since(&self, earlier: &Timestamp) -> Duration {
        self.0.signed_duration_since(earlier.0)
    }

    pub fn minus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 - Duration::minutes(minutes))
    }

    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0 + Duration::seconds(secs as i64))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn duration_since_is_signed() {
        let now = Timestamp::now();
        let earlier = now.minus_minutes(45);

        assert_eq!(now.duration_since(&earlier), Duration::minutes(45));
        assert_eq!(earlier.duration_since(&now), Duration::minutes(-45));
    }

    #[test]
    fn plus_secs_moves_forward() {
        let ts = Timestamp::now();
        let later = ts.plus_secs(90);
        assert_eq!(later.duration_since(&ts), Duration::seconds(90));
    }

    #[test]
    fn serializes_transparently_as_rfc3339() {
        let dt = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_string(&Timestamp::from_datetime(dt)).unwrap();
        assert_eq!(json, "\"2024-05-01T12:00:00Z\"");
    }
}
