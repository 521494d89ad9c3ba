use chrono::{DateTime, NaiveDateTime, Utc};
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

/// Elapsed seconds since the Unix epoch for a zone-less calendar time.
#[must_use]
pub fn naive_to_unix_seconds(time: NaiveDateTime) -> f64 {
    datetime_to_unix_seconds(time.and_utc())
}

pub fn unix_seconds_to_naive(seconds: f64) -> ChartResult<NaiveDateTime> {
    if !seconds.is_finite() {
        return Err(ChartError::InvalidData(
            "elapsed seconds must be finite".to_owned(),
        ));
    }
    let millis = (seconds * 1000.0).round() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|time| time.naive_utc())
        .ok_or_else(|| ChartError::InvalidData(format!("{seconds}s is out of calendar range")))
}
