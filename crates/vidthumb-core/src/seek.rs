use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Highest accepted seek percentage. Seeking closer to the end tends to land
/// past the last decodable frame.
pub const MAX_SEEK_PERCENTAGE: u32 = 95;

pub const DEFAULT_SEEK_PERCENTAGE: u32 = 10;

/// Explicit seek time, parsed from `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeekTime {
    seconds: u64,
}

impl SeekTime {
    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn as_secs(&self) -> u64 {
        self.seconds
    }
}

impl FromStr for SeekTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidSeekTime(s.to_string());

        let parts: Vec<&str> = s.trim().split(':').collect();
        let [hours, minutes, seconds] = parts.as_slice() else {
            return Err(invalid());
        };
        let parse = |field: &str| -> Result<u64, CoreError> {
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            field.parse::<u64>().map_err(|_| invalid())
        };

        let (hours, minutes, seconds) = (parse(hours)?, parse(minutes)?, parse(seconds)?);
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }
        let seconds = hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .ok_or_else(invalid)?;
        Ok(Self { seconds })
    }
}

impl fmt::Display for SeekTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl TryFrom<String> for SeekTime {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeekTime> for String {
    fn from(value: SeekTime) -> Self {
        value.to_string()
    }
}

/// Where the thumbnailer seeks before grabbing a frame. A percentage and an
/// explicit time are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekPosition {
    Percentage(u32),
    Time(SeekTime),
}

impl SeekPosition {
    /// Percentage position, clamped to `MAX_SEEK_PERCENTAGE`.
    pub fn percentage(percentage: u32) -> Self {
        Self::Percentage(percentage.min(MAX_SEEK_PERCENTAGE))
    }

    /// Target second for a stream of `duration_secs` seconds.
    pub fn target_secs(&self, duration_secs: i64) -> i64 {
        match self {
            Self::Percentage(percentage) => duration_secs.max(0).saturating_mul(*percentage as i64) / 100,
            Self::Time(time) => i64::try_from(time.as_secs()).unwrap_or(i64::MAX),
        }
    }
}

impl Default for SeekPosition {
    fn default() -> Self {
        Self::Percentage(DEFAULT_SEEK_PERCENTAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seek_time() {
        let time: SeekTime = "01:02:03".parse().unwrap();
        assert_eq!(time.as_secs(), 3723);
        assert_eq!(time.to_string(), "01:02:03");
    }

    #[test]
    fn test_parse_long_hours() {
        let time: SeekTime = "120:00:00".parse().unwrap();
        assert_eq!(time.as_secs(), 120 * 3600);
    }

    #[test]
    fn test_reject_malformed_seek_time() {
        for bad in [
            "",
            "1:2",
            "00:61:00",
            "00:00:60",
            "aa:bb:cc",
            "00:-1:00",
            "1:2:3:4",
            "::",
            "9999999999999999999:00:00",
            "99999999999999999999:00:00",
        ] {
            assert!(
                matches!(bad.parse::<SeekTime>(), Err(CoreError::InvalidSeekTime(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_percentage_clamps() {
        assert_eq!(SeekPosition::percentage(150), SeekPosition::Percentage(95));
        assert_eq!(SeekPosition::percentage(95), SeekPosition::Percentage(95));
        assert_eq!(SeekPosition::percentage(0), SeekPosition::Percentage(0));
    }

    #[test]
    fn test_target_secs() {
        assert_eq!(SeekPosition::Percentage(10).target_secs(125), 12);
        assert_eq!(SeekPosition::Percentage(50).target_secs(0), 0);
        assert_eq!(SeekPosition::Percentage(50).target_secs(-5), 0);
        let time = SeekTime::from_secs(60);
        assert_eq!(SeekPosition::Time(time).target_secs(10), 60);
    }

    #[test]
    fn test_huge_seek_times_saturate() {
        let time: SeekTime = "3000000000:00:00".parse().unwrap();
        assert_eq!(SeekPosition::Time(time).target_secs(10), 10_800_000_000_000);

        let time = SeekTime::from_secs(u64::MAX);
        assert_eq!(SeekPosition::Time(time).target_secs(10), i64::MAX);
        assert_eq!(SeekPosition::Percentage(95).target_secs(i64::MAX), i64::MAX / 100);
    }
}
