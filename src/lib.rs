pub mod clock;
pub mod config;
pub mod dataset;
pub mod error;
pub mod finder;
pub mod meeting;
pub mod normalize;
pub mod query;
pub mod source;

pub use clock::{ClockError, MeetingDay, parse_query_time, parse_time_range};
pub use config::{ColumnMapping, FinderConfig, load_config_from_json};
pub use dataset::{RoomCatalog, ScheduleDataset};
pub use error::{ConfigError, FinderError, NormalizeError, QueryError, SourceError};
pub use finder::RoomFinder;
pub use meeting::{NormalizedMeeting, RawMeeting, RequiredColumns};
pub use normalize::{NormalizeOptions, NormalizeSummary, normalize_meetings};
pub use query::{Query, QueryResult, find_rooms};
pub use source::{
    CsvMeetingSource, FileMeetingSource, JsonMeetingSource, MeetingSource, XlsxMeetingSource, load_meetings,
};
