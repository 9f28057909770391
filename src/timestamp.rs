//! Observation timestamps
//!
//! Metadata and EXIF both hand us capture times with or without a UTC
//! offset. Naive values are kept naive; they are never assumed to be UTC.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};
use std::fmt;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y:%m:%d %H:%M:%S",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y:%m:%d %H:%M:%S%:z",
    "%Y:%m:%d %H:%M:%S%z",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Parse an ISO-8601 (or EXIF style) timestamp; a bare date means midnight
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
            return Some(Timestamp::Offset(stamp));
        }
        for format in OFFSET_FORMATS {
            if let Ok(stamp) = DateTime::parse_from_str(value, format) {
                return Some(Timestamp::Offset(stamp));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(stamp) = NaiveDateTime::parse_from_str(value, format) {
                return Some(Timestamp::Naive(stamp));
            }
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Timestamp::Naive)
    }

    pub fn now() -> Self {
        Timestamp::Naive(Local::now().naive_local())
    }

    /// Wall clock value used when comparing naive against offset stamps
    fn local_value(&self) -> NaiveDateTime {
        match self {
            Timestamp::Naive(stamp) => *stamp,
            Timestamp::Offset(stamp) => stamp.naive_local(),
        }
    }

    /// The earlier of two stamps
    ///
    /// Two offset stamps compare as instants; any pairing with a naive stamp
    /// compares wall clock values. That mix is not a total order, so
    /// `Timestamp` has no `Ord`.
    pub fn earliest(self, other: Self) -> Self {
        let other_first = match (&self, &other) {
            (Timestamp::Offset(a), Timestamp::Offset(b)) => b < a,
            _ => other.local_value() < self.local_value(),
        };
        if other_first {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Naive(stamp) => write!(f, "{}", stamp.format("%Y-%m-%dT%H:%M:%S%.f")),
            Timestamp::Offset(stamp) => write!(f, "{}", stamp.format("%Y-%m-%dT%H:%M:%S%.f%:z")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            Timestamp::parse("2020-12-31").unwrap().to_string(),
            "2020-12-31T00:00:00"
        );
        assert_eq!(
            Timestamp::parse("2019-06-12T10:30:15").unwrap().to_string(),
            "2019-06-12T10:30:15"
        );
        assert_eq!(
            Timestamp::parse("2019:06:12 10:30:15").unwrap().to_string(),
            "2019-06-12T10:30:15"
        );
        assert_eq!(
            Timestamp::parse("2019:06:12 10:30:15-07:00").unwrap().to_string(),
            "2019-06-12T10:30:15-07:00"
        );
        assert_eq!(
            Timestamp::parse("2019-06-12T10:30:15Z").unwrap().to_string(),
            "2019-06-12T10:30:15+00:00"
        );
        assert!(Timestamp::parse("").is_none());
        assert!(Timestamp::parse("not a time").is_none());
    }

    #[test]
    fn test_earliest() {
        let early = Timestamp::parse("2000-12-31").unwrap();
        let late = Timestamp::parse("2019-06-12T10:30:15").unwrap();
        assert_eq!(early.earliest(late), early);
        assert_eq!(late.earliest(early), early);

        let west = Timestamp::parse("2019-06-12T10:00:00-07:00").unwrap();
        let utc = Timestamp::parse("2019-06-12T12:00:00+00:00").unwrap();
        assert_eq!(west.earliest(utc), utc);

        // Naive against offset goes by wall clock; ties keep the first
        let naive = Timestamp::parse("2019-06-12T10:00:00").unwrap();
        assert_eq!(naive.earliest(west), naive);
        assert_eq!(west.earliest(naive), west);
        assert_ne!(naive, west);
        assert_eq!(naive.earliest(utc), naive);
    }
}
