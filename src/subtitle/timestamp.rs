use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ZhsubError;

static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2,}):([0-5]\d):([0-5]\d),(\d{3})$").expect("timestamp pattern is valid")
});

/// Subtitle timestamp with millisecond precision (HH:MM:SS,mmm)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Build a timestamp from its parts, or `None` if it does not fit in a `u64`
    pub fn from_hms_milli(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<Self> {
        let millis = hours
            .checked_mul(60)?
            .checked_add(minutes)?
            .checked_mul(60)?
            .checked_add(seconds)?
            .checked_mul(1000)?
            .checked_add(millis)?;
        Some(Self(millis))
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3_600_000;
        let minutes = (self.0 % 3_600_000) / 60_000;
        let secs = (self.0 % 60_000) / 1_000;
        let millis = self.0 % 1_000;

        write!(f, "{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
    }
}

impl FromStr for Timestamp {
    type Err = ZhsubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TIMESTAMP_REGEX
            .captures(s.trim())
            .ok_or_else(|| ZhsubError::InvalidTimestamp(s.to_string()))?;

        let field = |idx: usize| -> Result<u64, ZhsubError> {
            caps[idx]
                .parse::<u64>()
                .map_err(|_| ZhsubError::InvalidTimestamp(s.to_string()))
        };

        Self::from_hms_milli(field(1)?, field(2)?, field(3)?, field(4)?)
            .ok_or_else(|| ZhsubError::InvalidTimestamp(s.to_string()))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(Timestamp::ZERO.to_string(), "00:00:00,000");
        assert_eq!(Timestamp::from_millis(65_123).to_string(), "00:01:05,123");
        assert_eq!(Timestamp::from_millis(3_661_500).to_string(), "01:01:01,500");
    }

    #[test]
    fn test_parse_timestamp() {
        let ts: Timestamp = "01:02:03,004".parse().unwrap();
        assert_eq!(Some(ts), Timestamp::from_hms_milli(1, 2, 3, 4));
        assert_eq!(ts.as_millis(), 3_723_004);

        let long: Timestamp = "100:00:00,000".parse().unwrap();
        assert_eq!(long.as_millis(), 360_000_000);
        assert_eq!(long.to_string(), "100:00:00,000");
    }

    #[test]
    fn test_parse_rejects_malformed_timestamps() {
        for bad in ["", "00:00:01.000", "0:00:01,000", "00:61:00,000", "00:00:01,00", "abc"] {
            assert!(
                matches!(bad.parse::<Timestamp>(), Err(ZhsubError::InvalidTimestamp(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range_hours() {
        for huge in ["9999999999999:00:00,000", "99999999999999999999:00:00,000"] {
            assert!(
                matches!(huge.parse::<Timestamp>(), Err(ZhsubError::InvalidTimestamp(_))),
                "{huge:?} should not parse"
            );
        }
        assert_eq!(Timestamp::from_hms_milli(u64::MAX / 1000, 0, 0, 0), None);
    }
}
