use crate::config::ColumnMapping;
use crate::error::{SourceError, SourceResult};
use crate::meeting::RawMeeting;
use std::path::{Path, PathBuf};

pub mod file;
pub mod xlsx;

pub use file::{read_csv_meetings, read_json_meetings, CsvMeetingSource, JsonMeetingSource};
pub use xlsx::{read_xlsx_meetings, XlsxMeetingSource};

/// Anything that can hand the normalizer a batch of raw schedule rows.
pub trait MeetingSource {
    fn load_meetings(&self) -> SourceResult<Vec<RawMeeting>>;
}

impl MeetingSource for Vec<RawMeeting> {
    fn load_meetings(&self) -> SourceResult<Vec<RawMeeting>> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Xlsx,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            "xlsx" => Ok(SourceFormat::Xlsx),
            _ => Err(SourceError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// File-backed source whose format is picked from the extension.
#[derive(Debug, Clone)]
pub struct FileMeetingSource {
    path: PathBuf,
    columns: ColumnMapping,
}

impl FileMeetingSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMapping) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MeetingSource for FileMeetingSource {
    fn load_meetings(&self) -> SourceResult<Vec<RawMeeting>> {
        match SourceFormat::from_path(&self.path)? {
            SourceFormat::Csv => CsvMeetingSource::new(&self.path, self.columns.clone()).load_meetings(),
            SourceFormat::Json => JsonMeetingSource::new(&self.path, self.columns.clone()).load_meetings(),
            SourceFormat::Xlsx => XlsxMeetingSource::new(&self.path, self.columns.clone()).load_meetings(),
        }
    }
}

pub fn load_meetings<P: AsRef<Path>>(path: P, columns: &ColumnMapping) -> SourceResult<Vec<RawMeeting>> {
    FileMeetingSource::new(path.as_ref(), columns.clone()).load_meetings()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("fall.CSV")).unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("fall.json")).unwrap(), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("fall.xlsx")).unwrap(), SourceFormat::Xlsx);
        assert!(matches!(
            SourceFormat::from_path(Path::new("fall.xls")),
            Err(SourceError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn in_memory_rows_are_a_source() {
        let rows = vec![RawMeeting::new("1", "HALL 1", "LEC", "MW", "9:00-9:50am")];
        assert_eq!(rows.load_meetings().unwrap(), rows);
    }
}
