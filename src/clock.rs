use chrono::{Duration, NaiveTime, Timelike, Weekday};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("time range '{0}' must have exactly one '-' separator")]
    Separator(String),

    #[error("time range '{0}' is missing an am/pm marker")]
    MissingMeridiem(String),

    #[error("'{0}' is not a valid H:MM clock value")]
    BadClock(String),

    #[error("'{0}' is not a valid HH:MM 24-hour time")]
    BadTime(String),

    #[error("'{0}' is not a day code (expected one of M, T, W, R, F)")]
    BadDay(String),
}

/// Weekday codes used by the registrar's `Days` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeetingDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl MeetingDay {
    pub const ALL: [MeetingDay; 5] = [
        MeetingDay::Monday,
        MeetingDay::Tuesday,
        MeetingDay::Wednesday,
        MeetingDay::Thursday,
        MeetingDay::Friday,
    ];

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'M' => Some(MeetingDay::Monday),
            'T' => Some(MeetingDay::Tuesday),
            'W' => Some(MeetingDay::Wednesday),
            'R' => Some(MeetingDay::Thursday),
            'F' => Some(MeetingDay::Friday),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            MeetingDay::Monday => 'M',
            MeetingDay::Tuesday => 'T',
            MeetingDay::Wednesday => 'W',
            MeetingDay::Thursday => 'R',
            MeetingDay::Friday => 'F',
        }
    }

    /// Name of the boolean dataset column flagging meetings on this day.
    pub fn column(self) -> &'static str {
        match self {
            MeetingDay::Monday => "meets_m",
            MeetingDay::Tuesday => "meets_t",
            MeetingDay::Wednesday => "meets_w",
            MeetingDay::Thursday => "meets_r",
            MeetingDay::Friday => "meets_f",
        }
    }

    /// Substring match against a raw day-code string such as `"MWF"`.
    pub fn occurs_in(self, days: &str) -> bool {
        days.contains(self.code())
    }

    pub fn weekday(self) -> Weekday {
        match self {
            MeetingDay::Monday => Weekday::Mon,
            MeetingDay::Tuesday => Weekday::Tue,
            MeetingDay::Wednesday => Weekday::Wed,
            MeetingDay::Thursday => Weekday::Thu,
            MeetingDay::Friday => Weekday::Fri,
        }
    }
}

impl FromStr for MeetingDay {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => {
                MeetingDay::from_code(code).ok_or_else(|| ClockError::BadDay(s.to_string()))
            }
            _ => Err(ClockError::BadDay(s.to_string())),
        }
    }
}

impl fmt::Display for MeetingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.weekday())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn parse(marker: &str) -> Option<Self> {
        match marker.to_ascii_lowercase().as_str() {
            "am" => Some(Meridiem::Am),
            "pm" => Some(Meridiem::Pm),
            _ => None,
        }
    }
}

fn twelve_hours() -> Duration {
    Duration::hours(12)
}

/// Parses an `H:MM` 12-hour clock reading into `(hour mod 12)` hours plus minutes.
pub fn parse_clock_12(raw: &str) -> Result<Duration, ClockError> {
    let bad = || ClockError::BadClock(raw.to_string());
    let (hour_s, minute_s) = raw.trim().split_once(':').ok_or_else(bad)?;
    if hour_s.is_empty() || hour_s.len() > 2 || minute_s.len() != 2 {
        return Err(bad());
    }
    if !hour_s.bytes().chain(minute_s.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let hour: i64 = hour_s.parse().map_err(|_| bad())?;
    let minute: i64 = minute_s.parse().map_err(|_| bad())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(bad());
    }
    Ok(Duration::hours(hour % 12) + Duration::minutes(minute))
}

/// Resolves a registrar time range such as `"11:00-1:50pm"` into start/end
/// offsets since midnight.
///
/// Only the end time carries a meridiem. The start is read as AM and moved to
/// the PM half when that would otherwise make the meeting longer than twelve
/// hours, so `"11:00-1:50pm"` is 11:00–13:50 while `"1:00-2:15pm"` is
/// 13:00–14:15.
pub fn parse_time_range(raw: &str) -> Result<(Duration, Duration), ClockError> {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.split('-').collect();
    if parts.len() != 2 {
        return Err(ClockError::Separator(raw.to_string()));
    }
    let (raw_start, raw_end) = (parts[0].trim(), parts[1].trim());

    if raw_end.len() < 2 || !raw_end.is_char_boundary(raw_end.len() - 2) {
        return Err(ClockError::MissingMeridiem(raw.to_string()));
    }
    let (end_clock, marker) = raw_end.split_at(raw_end.len() - 2);
    let meridiem =
        Meridiem::parse(marker).ok_or_else(|| ClockError::MissingMeridiem(raw.to_string()))?;

    let mut start = parse_clock_12(raw_start)?;
    let mut end = parse_clock_12(end_clock)?;
    if meridiem == Meridiem::Pm {
        end = end + twelve_hours();
    }

    let provisional_period = end - start;
    if provisional_period > twelve_hours() {
        start = start + twelve_hours();
    }
    Ok((start, end))
}

/// Parses an `HH:MM` 24-hour query time into an offset since midnight.
pub fn parse_query_time(raw: &str) -> Result<Duration, ClockError> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| ClockError::BadTime(raw.to_string()))?;
    Ok(Duration::hours(time.hour() as i64) + Duration::minutes(time.minute() as i64))
}

/// Formats an offset since midnight as `HH:MM`.
pub fn format_offset(offset: Duration) -> String {
    let minutes = offset.num_minutes();
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: i64, m: i64) -> Duration {
        Duration::hours(h) + Duration::minutes(m)
    }

    #[test]
    fn morning_start_with_afternoon_end_stays_am() {
        assert_eq!(parse_time_range("11:00-1:50pm").unwrap(), (hm(11, 0), hm(13, 50)));
    }

    #[test]
    fn noon_start_resolves_to_noon() {
        assert_eq!(parse_time_range("12:00-1:00pm").unwrap(), (hm(12, 0), hm(13, 0)));
        assert_eq!(parse_time_range("12:30-1:45pm").unwrap(), (hm(12, 30), hm(13, 45)));
    }

    #[test]
    fn afternoon_start_moves_to_pm_half() {
        assert_eq!(parse_time_range("1:00-2:15pm").unwrap(), (hm(13, 0), hm(14, 15)));
        assert_eq!(parse_time_range("6:30-9:20pm").unwrap(), (hm(18, 30), hm(21, 20)));
    }

    #[test]
    fn morning_ranges_are_unchanged() {
        assert_eq!(parse_time_range("8:00-9:15am").unwrap(), (hm(8, 0), hm(9, 15)));
        assert_eq!(parse_time_range("9:00-12:00pm").unwrap(), (hm(9, 0), hm(12, 0)));
    }

    #[test]
    fn exactly_twelve_hours_keeps_am_start() {
        assert_eq!(parse_time_range("1:00-1:00pm").unwrap(), (hm(1, 0), hm(13, 0)));
    }

    #[test]
    fn uppercase_marker_is_accepted() {
        assert_eq!(parse_time_range("10:00-10:50AM").unwrap(), (hm(10, 0), hm(10, 50)));
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        assert!(matches!(parse_time_range("10:00"), Err(ClockError::Separator(_))));
        assert!(matches!(parse_time_range("1-2-3pm"), Err(ClockError::Separator(_))));
        assert!(matches!(parse_time_range("10:00-10:50"), Err(ClockError::MissingMeridiem(_))));
        assert!(matches!(parse_time_range("10:00-10:50xm"), Err(ClockError::MissingMeridiem(_))));
        assert!(matches!(parse_time_range("ab:00-10:50am"), Err(ClockError::BadClock(_))));
        assert!(matches!(parse_time_range("13:00-1:50pm"), Err(ClockError::BadClock(_))));
        assert!(matches!(parse_time_range("10:75-11:50am"), Err(ClockError::BadClock(_))));
    }

    #[test]
    fn query_times_use_the_24_hour_clock() {
        assert_eq!(parse_query_time("13:05").unwrap(), hm(13, 5));
        assert_eq!(parse_query_time("00:00").unwrap(), hm(0, 0));
        assert!(parse_query_time("24:00").is_err());
        assert!(parse_query_time("9am").is_err());
    }

    #[test]
    fn day_codes_parse_single_characters_only() {
        assert_eq!("R".parse::<MeetingDay>().unwrap(), MeetingDay::Thursday);
        assert!("S".parse::<MeetingDay>().is_err());
        assert!("MW".parse::<MeetingDay>().is_err());
        assert!("".parse::<MeetingDay>().is_err());
        assert!(MeetingDay::Wednesday.occurs_in("MWF"));
        assert!(!MeetingDay::Tuesday.occurs_in("MWF"));
    }

    #[test]
    fn offsets_format_as_hh_mm() {
        assert_eq!(format_offset(hm(13, 50)), "13:50");
        assert_eq!(format_offset(hm(8, 5)), "08:05");
    }
}
