use super::MeetingSource;
use crate::config::ColumnMapping;
use crate::error::{SourceError, SourceResult};
use crate::meeting::{RawMeeting, non_empty};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

fn open(path: &Path) -> SourceResult<File> {
    File::open(path).map_err(|source| SourceError::Unavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Schedule exported from the spreadsheet as CSV with a header row.
#[derive(Debug, Clone)]
pub struct CsvMeetingSource {
    path: PathBuf,
    columns: ColumnMapping,
}

impl CsvMeetingSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMapping) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }
}

impl MeetingSource for CsvMeetingSource {
    fn load_meetings(&self) -> SourceResult<Vec<RawMeeting>> {
        let rows = read_csv_meetings(open(&self.path)?, &self.columns)?;
        debug!(path = %self.path.display(), rows = rows.len(), "read csv schedule");
        Ok(rows)
    }
}

/// Schedule stored as a JSON array of row objects keyed by column name.
#[derive(Debug, Clone)]
pub struct JsonMeetingSource {
    path: PathBuf,
    columns: ColumnMapping,
}

impl JsonMeetingSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMapping) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }
}

impl MeetingSource for JsonMeetingSource {
    fn load_meetings(&self) -> SourceResult<Vec<RawMeeting>> {
        let rows = read_json_meetings(open(&self.path)?, &self.columns)?;
        debug!(path = %self.path.display(), rows = rows.len(), "read json schedule");
        Ok(rows)
    }
}

/// Positions of the mapped columns within a header row; every other header is
/// carried through as an attribute.
pub(super) struct ColumnIndex {
    crn: usize,
    room: usize,
    activity: usize,
    days: usize,
    time: usize,
    others: Vec<(usize, String)>,
}

impl ColumnIndex {
    pub(super) fn from_headers<'h, I>(headers: I, columns: &ColumnMapping) -> SourceResult<Self>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let names: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let position = |wanted: &str| {
            names
                .iter()
                .position(|name| *name == wanted)
                .ok_or_else(|| SourceError::MissingColumn(wanted.to_string()))
        };
        let index = Self {
            crn: position(&columns.crn)?,
            room: position(&columns.room)?,
            activity: position(&columns.activity)?,
            days: position(&columns.days)?,
            time: position(&columns.time)?,
            others: Vec::new(),
        };
        let mapped = [index.crn, index.room, index.activity, index.days, index.time];
        let others = names
            .iter()
            .enumerate()
            .filter(|(idx, name)| !mapped.contains(idx) && !name.is_empty())
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();
        Ok(Self { others, ..index })
    }

    /// Builds a row from `cell`, which returns the non-empty text at a column position.
    pub(super) fn to_meeting<F>(&self, cell: F) -> RawMeeting
    where
        F: Fn(usize) -> Option<String>,
    {
        RawMeeting {
            crn: cell(self.crn),
            room: cell(self.room),
            activity: cell(self.activity),
            days: cell(self.days),
            time: cell(self.time),
            attributes: self
                .others
                .iter()
                .map(|(idx, name)| (name.clone(), cell(*idx)))
                .collect(),
        }
    }
}

/// Reads CSV rows, addressing the mapped columns by header name.
pub fn read_csv_meetings<R: Read>(reader: R, columns: &ColumnMapping) -> SourceResult<Vec<RawMeeting>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let index = ColumnIndex::from_headers(reader.headers()?.iter(), columns)?;
    let mut meetings = Vec::new();
    for record in reader.records() {
        let record = record?;
        meetings.push(index.to_meeting(|idx| record.get(idx).and_then(|v| non_empty(v.to_string()))));
    }
    Ok(meetings)
}

fn json_cell(row: usize, column: &str, value: Option<&Value>) -> SourceResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(non_empty(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(SourceError::InvalidRow {
            row,
            reason: format!("column '{column}' must be a string, number or null"),
        }),
    }
}

/// Reads a JSON array of row objects.
///
/// The column set is the union of keys over all rows, so a key absent from one
/// object is an empty cell in that row.
pub fn read_json_meetings<R: Read>(reader: R, columns: &ColumnMapping) -> SourceResult<Vec<RawMeeting>> {
    let rows: Vec<Map<String, Value>> = serde_json::from_reader(reader)?;
    let mapped = columns.names();
    let extra_columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|object| object.keys().map(String::as_str))
        .filter(|name| !mapped.contains(name))
        .collect();
    let mut meetings = Vec::with_capacity(rows.len());
    for (row, object) in rows.iter().enumerate() {
        let field = |name: &str| json_cell(row, name, object.get(name));
        let mut attributes = BTreeMap::new();
        for name in &extra_columns {
            attributes.insert(name.to_string(), field(name)?);
        }
        meetings.push(RawMeeting {
            crn: field(&columns.crn)?,
            room: field(&columns.room)?,
            activity: field(&columns.activity)?,
            days: field(&columns.days)?,
            time: field(&columns.time)?,
            attributes,
        });
    }
    Ok(meetings)
}
