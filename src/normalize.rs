use crate::clock::parse_time_range;
use crate::config::FinderConfig;
use crate::dataset::ScheduleDataset;
use crate::error::{NormalizeError, NormalizeResult};
use crate::meeting::{NormalizedMeeting, RawMeeting, RequiredColumns};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const REMOTE_ONLY: &str = "REMOTE ONLY";
pub const LAB_ACTIVITY: &str = "LAB";

/// Row filters applied before time parsing.
///
/// [`REMOTE_ONLY`] rooms and [`LAB_ACTIVITY`] rows are always dropped; the
/// sentinel and activity list here only widen those filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub remote_sentinel: String,
    pub excluded_activities: Vec<String>,
    pub required_columns: RequiredColumns,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            remote_sentinel: REMOTE_ONLY.to_string(),
            excluded_activities: Vec::new(),
            required_columns: RequiredColumns::All,
        }
    }
}

impl From<&FinderConfig> for NormalizeOptions {
    fn from(config: &FinderConfig) -> Self {
        Self {
            remote_sentinel: config.remote_sentinel.clone(),
            excluded_activities: config.excluded_activities.clone(),
            required_columns: config.required_columns.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    MissingField(String),
    RemoteOnly,
    ExcludedActivity(String),
}

/// Counts of what happened to each input row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeSummary {
    pub rows_read: usize,
    pub kept: usize,
    pub missing_fields: usize,
    pub remote_only: usize,
    pub excluded_activity: usize,
}

impl NormalizeSummary {
    fn record_drop(&mut self, reason: &DropReason) {
        match reason {
            DropReason::MissingField(_) => self.missing_fields += 1,
            DropReason::RemoteOnly => self.remote_only += 1,
            DropReason::ExcludedActivity(_) => self.excluded_activity += 1,
        }
    }

    pub fn dropped(&self) -> usize {
        self.missing_fields + self.remote_only + self.excluded_activity
    }

    pub fn to_cli_summary(&self) -> String {
        format!(
            "{} rows read, {} kept, {} incomplete, {} remote, {} excluded activity",
            self.rows_read, self.kept, self.missing_fields, self.remote_only, self.excluded_activity
        )
    }
}

/// Applies the row filters in order: missing fields, remote sentinel, excluded activity.
pub fn drop_reason(raw: &RawMeeting, options: &NormalizeOptions) -> Option<DropReason> {
    if let Some(field) = raw.first_missing_field(&options.required_columns) {
        return Some(DropReason::MissingField(field.to_string()));
    }
    let room = raw.room.as_deref().unwrap_or_default();
    if room == REMOTE_ONLY || room == options.remote_sentinel {
        return Some(DropReason::RemoteOnly);
    }
    let activity = raw.activity.as_deref().unwrap_or_default();
    if activity == LAB_ACTIVITY || options.excluded_activities.iter().any(|a| a == activity) {
        return Some(DropReason::ExcludedActivity(activity.to_string()));
    }
    None
}

/// Resolves the time range of a row that passed every filter.
pub fn normalize_row(raw: &RawMeeting) -> NormalizeResult<NormalizedMeeting> {
    let crn = raw.crn.clone().unwrap_or_default();
    let malformed = |reason: String| NormalizeError::MalformedScheduleRow {
        crn: crn.clone(),
        reason,
    };
    let (room, days, time) = match (&raw.room, &raw.days, &raw.time) {
        (Some(room), Some(days), Some(time)) => (room, days, time),
        _ => return Err(malformed("required field is empty".into())),
    };

    let (start, end) = parse_time_range(time).map_err(|e| malformed(e.to_string()))?;
    if end <= start {
        return Err(malformed(format!("time range '{time}' ends before it starts")));
    }

    Ok(NormalizedMeeting {
        crn: crn.clone(),
        room: room.clone(),
        days: days.clone(),
        start,
        end,
    })
}

/// Filters and time-normalizes raw rows into an immutable dataset.
///
/// Any malformed time range aborts the whole batch; a corrupt export tends to
/// corrupt every row the same way.
pub fn normalize_meetings(
    rows: &[RawMeeting],
    options: &NormalizeOptions,
) -> NormalizeResult<ScheduleDataset> {
    let mut summary = NormalizeSummary {
        rows_read: rows.len(),
        ..NormalizeSummary::default()
    };
    let mut meetings = Vec::with_capacity(rows.len());

    for raw in rows {
        if let Some(reason) = drop_reason(raw, options) {
            debug!(crn = raw.crn.as_deref().unwrap_or("<none>"), ?reason, "dropping schedule row");
            summary.record_drop(&reason);
            continue;
        }
        meetings.push(normalize_row(raw)?);
    }
    summary.kept = meetings.len();

    let dataset = ScheduleDataset::with_summary(&meetings, summary)?;
    info!(
        rows = dataset.summary().rows_read,
        kept = dataset.summary().kept,
        dropped = dataset.summary().dropped(),
        rooms = dataset.rooms().len(),
        "normalized schedule"
    );
    Ok(dataset)
}
