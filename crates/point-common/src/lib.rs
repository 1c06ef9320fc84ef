//! Common types and utilities shared across the point-data crates.

pub mod error;
pub mod time;
pub mod types;

pub use error::{PointDataError, PointDataResult};
pub use time::{datetime_argument, is_canonical_datetime, TimeRange};
pub use types::{
    CornerSeries, InterpolationMode, InterpolationResult, Point, Station, StationApi, TileId,
    TimeSeries,
};
