use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Inverse of [`datetime_to_unix_seconds`] at millisecond precision.
///
/// Returns `None` for non-finite input or timestamps chrono cannot represent.
#[must_use]
pub fn unix_seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let millis = (seconds * 1000.0).round();
    if millis > (i64::MAX as f64) || millis < (i64::MIN as f64) {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
}

/// Rounds `value` up to the next physical pixel boundary.
///
/// `pixel_scale` is the number of physical pixels per logical point; invalid
/// scales fall back to `1.0`.
#[must_use]
pub fn pixel_ceil(value: f64, pixel_scale: f64) -> f64 {
    let scale = if pixel_scale.is_finite() && pixel_scale > 0.0 {
        pixel_scale
    } else {
        1.0
    };
    (value * scale).ceil() / scale
}

#[cfg(test)]
mod tests {
    use super::{datetime_to_unix_seconds, pixel_ceil, unix_seconds_to_datetime};

    #[test]
    fn pixel_ceil_snaps_to_physical_pixels() {
        assert_eq!(pixel_ceil(10.1, 1.0), 11.0);
        assert_eq!(pixel_ceil(10.1, 2.0), 10.5);
        assert_eq!(pixel_ceil(10.0, 3.0), 10.0);
        assert_eq!(pixel_ceil(10.2, 0.0), 11.0);
    }

    #[test]
    fn unix_seconds_round_trip_at_millis() {
        let date = unix_seconds_to_datetime(1_700_000_000.25).expect("representable");
        assert_eq!(datetime_to_unix_seconds(date), 1_700_000_000.25);
        assert!(unix_seconds_to_datetime(f64::NAN).is_none());
    }
}
