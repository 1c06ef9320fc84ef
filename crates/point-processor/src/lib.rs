//! Point Data Processing
//!
//! The algorithmic core behind the point-data API:
//!
//! - **Station lookup**: nearest station (great-circle distance) among the
//!   candidates that report every required parameter
//! - **Grid interpolation**: a groundwater depth series at an arbitrary
//!   projected point, blended from the four 100 m grid corners around it
//!
//! # Architecture
//!
//! ```text
//! HTTP handler
//!      │
//!      ▼
//! GridInterpolator::interpolate(point, range, mode)
//!      │
//!      ├─► mode = none: one corner query, upstream snapping passed through
//!      │
//!      └─► mode = bilinear:
//!               │
//!               ├─► GridCell::containing(point)       (O(1) arithmetic)
//!               │
//!               ├─► 4 × CornerSeriesSource::query_corner (concurrent)
//!               │
//!               └─► length/date checks, bilinear blend per time step
//! ```
//!
//! Both components are stateless; the upstream data arrives through the
//! [`CornerSeriesSource`] and [`StationSource`] traits.

pub mod interpolation;
pub mod source;
pub mod station;

pub use interpolation::{bilinear_blend, GridCell, GridInterpolator, CELL_SIZE, MAX_COORDINATE};
pub use source::{CornerSeriesSource, StationSource};
pub use station::{
    find_closest, find_closest_index, find_closest_with_distance, great_circle_distance,
    parse_parameter_list, EARTH_DIAMETER_KM,
};
