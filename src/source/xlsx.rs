use super::MeetingSource;
use super::file::ColumnIndex;
use crate::config::ColumnMapping;
use crate::error::{SourceError, SourceResult};
use crate::meeting::{RawMeeting, non_empty};
use calamine::{Data, Reader, Xlsx};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::PathBuf;
use tracing::debug;

/// The registrar's `.xlsx` workbook; rows come from the first worksheet.
#[derive(Debug, Clone)]
pub struct XlsxMeetingSource {
    path: PathBuf,
    columns: ColumnMapping,
}

impl XlsxMeetingSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMapping) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }
}

impl MeetingSource for XlsxMeetingSource {
    fn load_meetings(&self) -> SourceResult<Vec<RawMeeting>> {
        let file = File::open(&self.path).map_err(|source| SourceError::Unavailable {
            path: self.path.clone(),
            source,
        })?;
        let rows = read_xlsx_meetings(BufReader::new(file), &self.columns)?;
        debug!(path = %self.path.display(), rows = rows.len(), "read xlsx schedule");
        Ok(rows)
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => non_empty(s.clone()),
        // CRNs typed into the sheet come back as floats.
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
    }
}

/// Reads the first worksheet, taking its first row as the header.
pub fn read_xlsx_meetings<R: Read + Seek>(
    reader: R,
    columns: &ColumnMapping,
) -> SourceResult<Vec<RawMeeting>> {
    let mut workbook: Xlsx<R> = Xlsx::new(reader)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SourceError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
        .unwrap_or_default();
    let index = ColumnIndex::from_headers(headers.iter().map(String::as_str), columns)?;

    Ok(rows
        .map(|row| index.to_meeting(|idx| row.get(idx).and_then(cell_text)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_read_as_integers() {
        assert_eq!(cell_text(&Data::Float(40123.0)).as_deref(), Some("40123"));
        assert_eq!(cell_text(&Data::Float(1.5)).as_deref(), Some("1.5"));
        assert_eq!(cell_text(&Data::String("  ".into())), None);
        assert_eq!(cell_text(&Data::Empty), None);
    }

    #[test]
    fn missing_workbook_is_unavailable() {
        let source = XlsxMeetingSource::new("/definitely/not/here.xlsx", ColumnMapping::default());
        assert!(matches!(
            source.load_meetings(),
            Err(SourceError::Unavailable { .. })
        ));
    }
}
