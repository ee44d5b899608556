use crate::clock::MeetingDay;
use crate::meeting::NormalizedMeeting;
use crate::normalize::NormalizeSummary;
use polars::prelude::*;
use std::collections::BTreeSet;

/// Sorted, deduplicated room identifiers known from the normalized meetings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomCatalog {
    rooms: Vec<String>,
}

impl RoomCatalog {
    pub fn from_rooms<I, S>(rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = rooms.into_iter().map(Into::into).collect();
        Self {
            rooms: set.into_iter().collect(),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn contains(&self, room: &str) -> bool {
        self.rooms
            .binary_search_by(|probe| probe.as_str().cmp(room))
            .is_ok()
    }

    /// Catalog order with every room in `occupied` removed.
    pub fn without(&self, occupied: &[String]) -> Vec<String> {
        let occupied: BTreeSet<&str> = occupied.iter().map(String::as_str).collect();
        self.rooms
            .iter()
            .filter(|room| !occupied.contains(room.as_str()))
            .cloned()
            .collect()
    }
}

/// Immutable result of normalization: the meeting frame plus its room catalog.
///
/// Nothing mutates a dataset after construction; queries borrow it.
#[derive(Debug, Clone)]
pub struct ScheduleDataset {
    df: DataFrame,
    rooms: RoomCatalog,
    summary: NormalizeSummary,
}

impl ScheduleDataset {
    pub fn from_meetings(meetings: &[NormalizedMeeting]) -> PolarsResult<Self> {
        Self::with_summary(meetings, NormalizeSummary::default())
    }

    pub(crate) fn with_summary(
        meetings: &[NormalizedMeeting],
        summary: NormalizeSummary,
    ) -> PolarsResult<Self> {
        let df = if meetings.is_empty() {
            DataFrame::empty_with_schema(&Self::default_schema())
        } else {
            DataFrame::new(NormalizedMeeting::columns_from_meetings(meetings))?
        };
        let rooms = RoomCatalog::from_rooms(meetings.iter().map(|m| m.room.as_str()));
        Ok(Self { df, rooms, summary })
    }

    fn default_schema() -> Schema {
        let mut fields = vec![
            Field::new("crn".into(), DataType::String),
            Field::new("room".into(), DataType::String),
            Field::new("days".into(), DataType::String),
            Field::new("start_minutes".into(), DataType::Int64),
            Field::new("end_minutes".into(), DataType::Int64),
        ];
        for day in MeetingDay::ALL {
            fields.push(Field::new(day.column().into(), DataType::Boolean));
        }
        Schema::from_iter(fields)
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn rooms(&self) -> &RoomCatalog {
        &self.rooms
    }

    pub fn summary(&self) -> &NormalizeSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn meetings(&self) -> PolarsResult<Vec<NormalizedMeeting>> {
        (0..self.df.height())
            .map(|idx| NormalizedMeeting::from_dataframe_row(&self.df, idx))
            .collect()
    }

    /// Meetings held in `room` on `day`, earliest first.
    pub fn meetings_in_room(
        &self,
        room: &str,
        day: MeetingDay,
    ) -> PolarsResult<Vec<NormalizedMeeting>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let filtered = self
            .df
            .clone()
            .lazy()
            .filter(col("room").eq(lit(room)).and(col(day.column())))
            .collect()?;
        let mut meetings = (0..filtered.height())
            .map(|idx| NormalizedMeeting::from_dataframe_row(&filtered, idx))
            .collect::<PolarsResult<Vec<_>>>()?;
        meetings.sort_by_key(|m| (m.start, m.end));
        Ok(meetings)
    }
}
