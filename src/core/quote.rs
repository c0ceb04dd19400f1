use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, decimal_to_f64, unix_seconds_to_datetime};
use crate::error::{ChartError, ChartResult};

/// One OHLC sample of the charted series.
///
/// `bid` and `sell` are optional trade markers attached to the sample;
/// their values are informational, only their presence is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub time: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub sell: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Quote {
    /// Builds a validated quote from raw floating values.
    ///
    /// Invariants:
    /// - all values are finite
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    pub fn new(time: f64, open: f64, high: f64, low: f64, close: f64) -> ChartResult<Self> {
        if !time.is_finite()
            || !open.is_finite()
            || !high.is_finite()
            || !low.is_finite()
            || !close.is_finite()
        {
            return Err(ChartError::InvalidData(
                "quote values must be finite".to_owned(),
            ));
        }

        if low > high {
            return Err(ChartError::InvalidData(
                "quote low must be <= high".to_owned(),
            ));
        }

        if open < low || open > high || close < low || close > high {
            return Err(ChartError::InvalidData(
                "quote open/close must be within low/high range".to_owned(),
            ));
        }

        Ok(Self {
            time,
            open,
            high,
            low,
            close,
            bid: None,
            sell: None,
            volume: None,
        })
    }

    /// Converts strongly-typed temporal/decimal input into a validated quote.
    pub fn from_decimal_time(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> ChartResult<Self> {
        Self::new(
            datetime_to_unix_seconds(time),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
        )
    }

    pub fn with_bid(mut self, bid: f64) -> ChartResult<Self> {
        self.bid = Some(finite_field(bid, "bid")?);
        Ok(self)
    }

    pub fn with_sell(mut self, sell: f64) -> ChartResult<Self> {
        self.sell = Some(finite_field(sell, "sell")?);
        Ok(self)
    }

    pub fn with_volume(mut self, volume: f64) -> ChartResult<Self> {
        let volume = finite_field(volume, "volume")?;
        if volume < 0.0 {
            return Err(ChartError::InvalidData(
                "quote volume must be >= 0".to_owned(),
            ));
        }
        self.volume = Some(volume);
        Ok(self)
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_rising(self) -> bool {
        self.close >= self.open
    }

    #[must_use]
    pub fn date(self) -> Option<DateTime<Utc>> {
        unix_seconds_to_datetime(self.time)
    }
}

fn finite_field(value: f64, name: &str) -> ChartResult<f64> {
    if !value.is_finite() {
        return Err(ChartError::InvalidData(format!(
            "quote {name} must be finite"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::Quote;

    #[test]
    fn rejects_open_outside_range() {
        assert!(Quote::new(0.0, 14.0, 13.0, 9.0, 12.0).is_err());
        assert!(Quote::new(0.0, 10.0, 9.0, 13.0, 12.0).is_err());
        assert!(Quote::new(f64::NAN, 10.0, 13.0, 9.0, 12.0).is_err());
    }

    #[test]
    fn decimal_input_converts_to_unix_seconds() {
        let time = Utc.with_ymd_and_hms(2024, 1, 17, 8, 0, 0).single().expect("time");
        let quote = Quote::from_decimal_time(
            time,
            Decimal::new(1000, 2),
            Decimal::new(1300, 2),
            Decimal::new(900, 2),
            Decimal::new(1200, 2),
        )
        .expect("valid quote");
        assert_eq!(quote.time, time.timestamp() as f64);
        assert_eq!(quote.close, 12.0);
        assert_eq!(quote.date(), Some(time));
        assert!(quote.is_rising());
    }

    #[test]
    fn markers_must_be_finite() {
        let quote = Quote::new(0.0, 10.0, 13.0, 9.0, 12.0).expect("valid quote");
        assert!(quote.with_bid(f64::INFINITY).is_err());
        assert!(quote.with_volume(-1.0).is_err());
        let marked = quote.with_bid(9.5).and_then(|q| q.with_sell(12.5)).expect("markers");
        assert_eq!(marked.bid, Some(9.5));
        assert_eq!(marked.sell, Some(12.5));
    }
}
