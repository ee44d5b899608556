use crate::clock::{MeetingDay, format_offset, parse_query_time};
use crate::dataset::ScheduleDataset;
use crate::error::QueryError;
use chrono::Duration;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// A validated availability question: which rooms are free on `day`
/// between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    day: MeetingDay,
    start: Duration,
    end: Duration,
}

impl Query {
    pub fn new(day: MeetingDay, start: Duration, end: Duration) -> Result<Self, QueryError> {
        let midnight = Duration::zero();
        let day_length = Duration::hours(24);
        if start < midnight || start >= day_length || end <= midnight || end > day_length {
            return Err(QueryError::InvalidQuery(format!(
                "window {}-{} is outside a single day",
                format_offset(start),
                format_offset(end)
            )));
        }
        if end <= start {
            return Err(QueryError::InvalidQuery(format!(
                "end {} must be after start {}",
                format_offset(end),
                format_offset(start)
            )));
        }
        Ok(Self { day, start, end })
    }

    /// Builds a query from user input: a day code and two `HH:MM` times.
    pub fn parse(day: &str, start: &str, end: &str) -> Result<Self, QueryError> {
        let invalid = |e: crate::clock::ClockError| QueryError::InvalidQuery(e.to_string());
        let day: MeetingDay = day.parse().map_err(invalid)?;
        let start = parse_query_time(start).map_err(invalid)?;
        let end = parse_query_time(end).map_err(invalid)?;
        Self::new(day, start, end)
    }

    pub fn day(&self) -> MeetingDay {
        self.day
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn end(&self) -> Duration {
        self.end
    }

    /// Strict-interior overlap between meeting offsets and the query window.
    ///
    /// Meetings that only touch the window edge (ending at `start` or
    /// starting at `end`) are not counted.
    fn overlap_expr(&self) -> Expr {
        let q_start = lit(self.start.num_minutes());
        let q_end = lit(self.end.num_minutes());
        let m_start = col("start_minutes");
        let m_end = col("end_minutes");

        let starts_inside = m_start
            .clone()
            .gt(q_start.clone())
            .and(m_start.clone().lt(q_end.clone()));
        let ends_inside = m_end
            .clone()
            .gt(q_start.clone())
            .and(m_end.clone().lt(q_end.clone()));
        let contains = m_start.lt(q_start).and(m_end.gt(q_end));

        starts_inside.or(ends_inside).or(contains)
    }
}

/// Rooms split into those free for the whole window and those with a class in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub available: Vec<String>,
    pub occupied: Vec<String>,
}

/// Computes room availability for `query` against a normalized dataset.
///
/// Pure with respect to `dataset`; any number of callers may query the same
/// dataset at once.
pub fn find_rooms(dataset: &ScheduleDataset, query: &Query) -> Result<QueryResult, QueryError> {
    let occupied: Vec<String> = if dataset.is_empty() {
        Vec::new()
    } else {
        let hits = dataset
            .dataframe()
            .clone()
            .lazy()
            .filter(col(query.day().column()).and(query.overlap_expr()))
            .select([col("room")])
            .collect()?;
        let rooms: BTreeSet<String> = hits
            .column("room")?
            .str()?
            .into_iter()
            .flatten()
            .map(ToOwned::to_owned)
            .collect();
        rooms.into_iter().collect()
    };
    let available = dataset.rooms().without(&occupied);

    debug!(
        day = %query.day().code(),
        start = %format_offset(query.start()),
        end = %format_offset(query.end()),
        available = available.len(),
        occupied = occupied.len(),
        "room query"
    );
    Ok(QueryResult {
        available,
        occupied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: i64, m: i64) -> Duration {
        Duration::hours(h) + Duration::minutes(m)
    }

    #[test]
    fn parse_accepts_weekday_codes_and_24_hour_times() {
        let q = Query::parse("R", "13:00", "14:30").unwrap();
        assert_eq!(q.day(), MeetingDay::Thursday);
        assert_eq!(q.start(), hm(13, 0));
        assert_eq!(q.end(), hm(14, 30));
    }

    #[test]
    fn parse_rejects_weekend_day() {
        assert!(matches!(
            Query::parse("S", "09:00", "10:00"),
            Err(QueryError::InvalidQuery(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_or_reversed_window() {
        assert!(matches!(
            Query::parse("M", "10:00", "10:00"),
            Err(QueryError::InvalidQuery(_))
        ));
        assert!(matches!(
            Query::parse("M", "11:00", "10:00"),
            Err(QueryError::InvalidQuery(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_time_strings() {
        assert!(Query::parse("M", "9", "10:00").is_err());
        assert!(Query::parse("M", "09:00", "25:00").is_err());
        assert!(Query::parse("M", "09:00", "10:60").is_err());
    }

    #[test]
    fn new_rejects_offsets_past_midnight() {
        assert!(Query::new(MeetingDay::Monday, hm(23, 0), hm(25, 0)).is_err());
        assert!(Query::new(MeetingDay::Monday, -hm(1, 0), hm(1, 0)).is_err());
        assert!(Query::new(MeetingDay::Monday, hm(23, 0), hm(24, 0)).is_ok());
    }

    #[test]
    fn empty_dataset_has_no_rooms() {
        let dataset = ScheduleDataset::from_meetings(&[]).unwrap();
        let q = Query::parse("M", "09:00", "10:00").unwrap();
        assert_eq!(find_rooms(&dataset, &q).unwrap(), QueryResult::default());
    }
}
