use crate::clock::{MeetingDay, format_offset};
use chrono::Duration;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source columns, besides the five mapped ones, that a row must fill to count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredColumns {
    /// Every column in the source; a single blank cell drops the row.
    #[default]
    All,
    Only(Vec<String>),
}

/// One schedule row as it arrives from the registrar's spreadsheet.
///
/// Empty cells are `None`. Columns beyond the five the normalizer reads are
/// kept in `attributes` so extra mandatory columns can be enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMeeting {
    pub crn: Option<String>,
    pub room: Option<String>,
    pub activity: Option<String>,
    pub days: Option<String>,
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Option<String>>,
}

impl RawMeeting {
    pub fn new(
        crn: impl Into<String>,
        room: impl Into<String>,
        activity: impl Into<String>,
        days: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            crn: non_empty(crn.into()),
            room: non_empty(room.into()),
            activity: non_empty(activity.into()),
            days: non_empty(days.into()),
            time: non_empty(time.into()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.attributes
            .insert(name.into(), value.and_then(|v| non_empty(v.to_string())));
        self
    }

    /// Name of the first required field that is absent, if any.
    pub fn first_missing_field<'a>(&'a self, required: &'a RequiredColumns) -> Option<&'a str> {
        let core: [(&'static str, &Option<String>); 5] = [
            ("crn", &self.crn),
            ("room", &self.room),
            ("activity", &self.activity),
            ("days", &self.days),
            ("time", &self.time),
        ];
        if let Some((name, _)) = core.iter().find(|(_, value)| value.is_none()) {
            return Some(*name);
        }
        match required {
            RequiredColumns::All => self
                .attributes
                .iter()
                .find(|(_, value)| value.is_none())
                .map(|(name, _)| name.as_str()),
            RequiredColumns::Only(names) => names
                .iter()
                .find(|name| !matches!(self.attributes.get(name.as_str()), Some(Some(_))))
                .map(String::as_str),
        }
    }
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A class meeting with unambiguous 24-hour offsets since midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMeeting {
    pub crn: String,
    pub room: String,
    pub days: String,
    pub start: Duration,
    pub end: Duration,
}

impl NormalizedMeeting {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn meets_on(&self, day: MeetingDay) -> bool {
        day.occurs_in(&self.days)
    }

    /// Strict-interior overlap with the window `[start, end)`.
    ///
    /// Touching a window boundary does not count, so back-to-back bookings
    /// never conflict.
    pub fn overlaps(&self, start: Duration, end: Duration) -> bool {
        let starts_inside = start < self.start && self.start < end;
        let ends_inside = start < self.end && self.end < end;
        let contains = self.start < start && self.end > end;
        starts_inside || ends_inside || contains
    }

    pub fn time_label(&self) -> String {
        format!("{}-{}", format_offset(self.start), format_offset(self.end))
    }

    pub(crate) fn columns_from_meetings(meetings: &[NormalizedMeeting]) -> Vec<Column> {
        let crn: Vec<&str> = meetings.iter().map(|m| m.crn.as_str()).collect();
        let room: Vec<&str> = meetings.iter().map(|m| m.room.as_str()).collect();
        let days: Vec<&str> = meetings.iter().map(|m| m.days.as_str()).collect();
        let start: Vec<i64> = meetings.iter().map(|m| m.start.num_minutes()).collect();
        let end: Vec<i64> = meetings.iter().map(|m| m.end.num_minutes()).collect();

        let mut columns: Vec<Column> = Vec::with_capacity(5 + MeetingDay::ALL.len());
        columns.push(Series::new(PlSmallStr::from_static("crn"), crn).into_column());
        columns.push(Series::new(PlSmallStr::from_static("room"), room).into_column());
        columns.push(Series::new(PlSmallStr::from_static("days"), days).into_column());
        columns.push(Series::new(PlSmallStr::from_static("start_minutes"), start).into_column());
        columns.push(Series::new(PlSmallStr::from_static("end_minutes"), end).into_column());
        for day in MeetingDay::ALL {
            let flags: Vec<bool> = meetings.iter().map(|m| m.meets_on(day)).collect();
            columns.push(Series::new(PlSmallStr::from_static(day.column()), flags).into_column());
        }
        columns
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let text = |name: &str| -> PolarsResult<String> {
            df.column(name)?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned)
                .ok_or_else(|| PolarsError::ComputeError(format!("meeting row missing {name}").into()))
        };
        let minutes = |name: &str| -> PolarsResult<i64> {
            df.column(name)?
                .i64()?
                .get(row_idx)
                .ok_or_else(|| PolarsError::ComputeError(format!("meeting row missing {name}").into()))
        };

        Ok(Self {
            crn: text("crn")?,
            room: text("room")?,
            days: text("days")?,
            start: Duration::minutes(minutes("start_minutes")?),
            end: Duration::minutes(minutes("end_minutes")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting(start: (i64, i64), end: (i64, i64)) -> NormalizedMeeting {
        NormalizedMeeting {
            crn: "1".into(),
            room: "HALL 101".into(),
            days: "MWF".into(),
            start: Duration::hours(start.0) + Duration::minutes(start.1),
            end: Duration::hours(end.0) + Duration::minutes(end.1),
        }
    }

    fn at(h: i64) -> Duration {
        Duration::hours(h)
    }

    #[test]
    fn raw_meeting_treats_blank_cells_as_missing() {
        let raw = RawMeeting::new("123", "  ", "LEC", "MW", "9:00-9:50am");
        assert_eq!(raw.room, None);
        assert_eq!(raw.first_missing_field(&RequiredColumns::All), Some("room"));
    }

    #[test]
    fn listed_columns_are_checked_after_core_fields() {
        let required = RequiredColumns::Only(vec!["Instructor".to_string()]);
        let raw = RawMeeting::new("123", "HALL 1", "LEC", "MW", "9:00-9:50am")
            .with_attribute("Notes", None);
        assert_eq!(raw.first_missing_field(&required), Some("Instructor"));

        let raw = raw.with_attribute("Instructor", Some("Staff"));
        assert_eq!(raw.first_missing_field(&required), None);
    }

    #[test]
    fn any_blank_column_is_missing_by_default() {
        let raw = RawMeeting::new("123", "HALL 1", "LEC", "MW", "9:00-9:50am")
            .with_attribute("Instructor", Some("Staff"))
            .with_attribute("Final Exam", Some(" "));
        assert_eq!(raw.first_missing_field(&RequiredColumns::All), Some("Final Exam"));
        assert_eq!(raw.first_missing_field(&RequiredColumns::Only(Vec::new())), None);
    }

    #[test]
    fn overlap_excludes_touching_boundaries() {
        let m = meeting((9, 0), (10, 0));
        assert!(!m.overlaps(at(10), at(11)));
        assert!(!m.overlaps(at(8), at(9)));
        assert!(m.overlaps(at(8), at(11)));
        assert!(m.overlaps(Duration::minutes(9 * 60 + 30), at(11)));
    }

    #[test]
    fn overlap_counts_containing_meeting() {
        let m = meeting((8, 0), (12, 0));
        assert!(m.overlaps(at(9), at(10)));
    }

    #[test]
    fn identical_window_is_not_an_interior_overlap() {
        let m = meeting((9, 0), (10, 0));
        assert!(!m.overlaps(at(9), at(10)));
    }

    #[test]
    fn dataframe_row_round_trips_offsets() {
        let meetings = vec![meeting((11, 0), (13, 50))];
        let df = DataFrame::new(NormalizedMeeting::columns_from_meetings(&meetings)).unwrap();
        let back = NormalizedMeeting::from_dataframe_row(&df, 0).unwrap();
        assert_eq!(back, meetings[0]);
        assert_eq!(back.time_label(), "11:00-13:50");
        assert!(df.column("meets_w").unwrap().bool().unwrap().get(0).unwrap());
        assert!(!df.column("meets_r").unwrap().bool().unwrap().get(0).unwrap());
    }
}
