use polars::prelude::PolarsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reading raw schedule rows from a data source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("schedule source {} is unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("schedule source is missing required column '{0}'")]
    MissingColumn(String),

    #[error("unsupported schedule format '{0}' (expected .csv, .json or .xlsx)")]
    UnsupportedFormat(String),

    #[error("invalid row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Failures turning raw rows into a [`crate::ScheduleDataset`].
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("malformed schedule row {crn}: {reason}")]
    MalformedScheduleRow { crn: String, reason: String },

    #[error("dataframe error: {0}")]
    DataFrame(#[from] PolarsError),
}

pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Failures validating or evaluating an availability query.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("dataframe error: {0}")]
    DataFrame(#[from] PolarsError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {} could not be read: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file is not valid json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Umbrella error for callers driving the whole load, normalize and query pipeline.
#[derive(Error, Debug)]
pub enum FinderError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type FinderResult<T> = Result<T, FinderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn malformed_row_names_the_crn() {
        let err = NormalizeError::MalformedScheduleRow {
            crn: "40123".into(),
            reason: "missing meridiem".into(),
        };
        assert_eq!(err.to_string(), "malformed schedule row 40123: missing meridiem");
    }

    #[test]
    fn unavailable_source_keeps_io_cause() {
        let err = SourceError::Unavailable {
            path: PathBuf::from("schedule.csv"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("schedule.csv"));
        assert!(err.source().is_some());
    }

    #[test]
    fn finder_error_is_transparent() {
        let err: FinderError = QueryError::InvalidQuery("day 'S'".into()).into();
        assert_eq!(err.to_string(), "invalid query: day 'S'");
    }
}
