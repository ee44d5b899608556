use crate::config::FinderConfig;
use crate::dataset::ScheduleDataset;
use crate::error::FinderResult;
use crate::meeting::RawMeeting;
use crate::normalize::{NormalizeOptions, normalize_meetings};
use crate::query::{Query, QueryResult, find_rooms};
use crate::source::{FileMeetingSource, MeetingSource};
use std::path::Path;
use tracing::info;

/// Loads a schedule once and answers availability queries against it.
#[derive(Debug, Clone)]
pub struct RoomFinder {
    dataset: ScheduleDataset,
}

impl RoomFinder {
    pub fn new(dataset: ScheduleDataset) -> Self {
        Self { dataset }
    }

    pub fn from_rows(rows: &[RawMeeting], options: &NormalizeOptions) -> FinderResult<Self> {
        Ok(Self::new(normalize_meetings(rows, options)?))
    }

    pub fn from_source<S: MeetingSource + ?Sized>(
        source: &S,
        options: &NormalizeOptions,
    ) -> FinderResult<Self> {
        let rows = source.load_meetings()?;
        Self::from_rows(&rows, options)
    }

    /// Reads `path` using the column mapping and filters from `config`.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &FinderConfig) -> FinderResult<Self> {
        config.validate()?;
        let path = path.as_ref();
        info!(path = %path.display(), "loading schedule");
        let source = FileMeetingSource::new(path, config.columns.clone());
        Self::from_source(&source, &NormalizeOptions::from(config))
    }

    pub fn from_config(config: &FinderConfig) -> FinderResult<Self> {
        Self::from_path(&config.schedule_path, config)
    }

    pub fn dataset(&self) -> &ScheduleDataset {
        &self.dataset
    }

    pub fn query(&self, query: &Query) -> FinderResult<QueryResult> {
        Ok(find_rooms(&self.dataset, query)?)
    }

    /// Parses user input (`"M"`, `"09:00"`, `"10:30"`) and runs the query.
    pub fn find(&self, day: &str, start: &str, end: &str) -> FinderResult<QueryResult> {
        let query = Query::parse(day, start, end)?;
        self.query(&query)
    }
}
