//! Generators for synthetic corner series.
//!
//! These generators create predictable, verifiable series so interpolated
//! values can be checked against a closed-form expectation.

use chrono::{Duration, NaiveDate};
use point_common::{CornerSeries, Point, TimeSeries};

/// First day used by the generators (2019-01-01).
pub const FIRST_DAY: (i32, u32, u32) = (2019, 1, 1);

/// Creates `n` consecutive daily dates starting at [`FIRST_DAY`].
///
/// # Example
///
/// ```
/// use test_utils::daily_dates;
///
/// let dates = daily_dates(3);
/// assert_eq!(dates, vec!["2019-01-01", "2019-01-02", "2019-01-03"]);
/// ```
pub fn daily_dates(n: usize) -> Vec<String> {
    let (y, m, d) = FIRST_DAY;
    let start = NaiveDate::from_ymd_opt(y, m, d).expect("valid start date");
    (0..n)
        .map(|i| (start + Duration::days(i as i64)).format("%Y-%m-%d").to_string())
        .collect()
}

/// Depth of the synthetic affine surface at `point` on day `day`.
///
/// `depth = 0.01 * x - 0.02 * y + day`
///
/// Bilinear interpolation reproduces affine surfaces exactly, which makes
/// this the reference for interpolation tests.
pub fn plane_depth(point: Point, day: usize) -> f64 {
    0.01 * point.x - 0.02 * point.y + day as f64
}

/// Creates a corner series sampled from [`plane_depth`].
pub fn plane_series(point: Point, n: usize) -> CornerSeries {
    let values = (0..n).map(|day| plane_depth(point, day)).collect();
    CornerSeries::new(
        TimeSeries {
            dates: daily_dates(n),
            values,
        },
        point,
    )
}

/// Creates a corner series with the same value on every day.
pub fn constant_series(point: Point, n: usize, value: f64) -> CornerSeries {
    CornerSeries::new(
        TimeSeries {
            dates: daily_dates(n),
            values: vec![value; n],
        },
        point,
    )
}
