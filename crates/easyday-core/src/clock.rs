//! Wall-clock minutes within a single day.
//!
//! Every schedule computation in this crate works in minutes since
//! midnight. `ClockTime` keeps that arithmetic in one place: parsing
//! and formatting of "HH:MM" strings, wrapping addition past midnight,
//! and the day-length constant everything else leans on.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minutes in a full day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// A wall-clock time expressed as minutes since midnight (0..1440).
///
/// Serializes as an "HH:MM" string so stored profiles and config files
/// stay human-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    /// Construct from raw minutes since midnight.
    pub fn from_minutes(minutes: u16) -> Result<Self, ValidationError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ValidationError::InvalidClockTime {
                input: minutes.to_string(),
                message: format!("must be below {MINUTES_PER_DAY} minutes"),
            });
        }
        Ok(Self(minutes))
    }

    /// Construct from hour and minute components.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, ValidationError> {
        if hour >= 24 || minute >= 60 {
            return Err(ValidationError::InvalidClockTime {
                input: format!("{hour:02}:{minute:02}"),
                message: "hour must be 0-23 and minute 0-59".to_string(),
            });
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Parse an "HH:MM" string.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            return Err(ValidationError::InvalidClockTime {
                input: s.to_string(),
                message: "expected HH:MM".to_string(),
            });
        }
        let hour: u16 = parts[0].parse().map_err(|_| ValidationError::InvalidClockTime {
            input: s.to_string(),
            message: "hour is not a number".to_string(),
        })?;
        let minute: u16 = parts[1].parse().map_err(|_| ValidationError::InvalidClockTime {
            input: s.to_string(),
            message: "minute is not a number".to_string(),
        })?;
        Self::from_hm(hour, minute)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Add a duration, wrapping past midnight.
    pub fn wrapping_add(self, minutes: u32) -> Self {
        Self(((self.0 as u32 + minutes) % MINUTES_PER_DAY as u32) as u16)
    }

    /// Minutes from `self` forward to `other`, wrapping past midnight.
    ///
    /// `21:00.until(01:00)` is 240, not -1200.
    pub fn until(self, other: Self) -> u16 {
        if other.0 >= self.0 {
            other.0 - self.0
        } else {
            MINUTES_PER_DAY - self.0 + other.0
        }
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_hh_mm() {
        let t = ClockTime::parse("07:30").unwrap();
        assert_eq!(t.minutes(), 450);
        assert_eq!(t.to_string(), "07:30");
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(ClockTime::parse("24:00").is_err());
        assert!(ClockTime::parse("12:60").is_err());
        assert!(ClockTime::parse("grapefruit").is_err());
        assert!(ClockTime::from_minutes(1440).is_err());
    }

    #[test]
    fn wrapping_add_crosses_midnight() {
        let t = ClockTime::parse("23:00").unwrap();
        assert_eq!(t.wrapping_add(90).to_string(), "00:30");
    }

    #[test]
    fn until_wraps_forward() {
        let late = ClockTime::parse("21:00").unwrap();
        let early = ClockTime::parse("01:00").unwrap();
        assert_eq!(late.until(early), 240);
        assert_eq!(early.until(late), 1200);
        assert_eq!(late.until(late), 0);
    }

    #[test]
    fn serde_round_trips_as_string() {
        let t = ClockTime::parse("06:45").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"06:45\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
