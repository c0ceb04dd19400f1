use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Turns a value-axis number into caption text.
pub trait ValueFormatter {
    fn format(&self, value: f64) -> String;
}

/// Turns a quote date into caption text.
pub trait DateFormatter {
    fn format(&self, date: DateTime<Utc>) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecimalSeparator {
    #[default]
    Dot,
    Comma,
}

/// Fixed-precision decimal formatter; the chart default for prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalFormatter {
    pub precision: usize,
    pub separator: DecimalSeparator,
    pub trim_trailing_zeros: bool,
}

impl DecimalFormatter {
    #[must_use]
    pub fn new(precision: usize) -> Self {
        Self {
            precision,
            separator: DecimalSeparator::Dot,
            trim_trailing_zeros: false,
        }
    }

    /// Formatter whose precision is just enough to distinguish labels spaced
    /// `step` apart.
    #[must_use]
    pub fn for_step(step: f64) -> Self {
        let nice = normalize_step_for_precision(step.abs());
        Self::new(precision_from_step(nice))
    }

    #[must_use]
    pub fn with_separator(mut self, separator: DecimalSeparator) -> Self {
        self.separator = separator;
        self
    }

    #[must_use]
    pub fn with_trimmed_zeros(mut self, trim: bool) -> Self {
        self.trim_trailing_zeros = trim;
        self
    }
}

impl Default for DecimalFormatter {
    fn default() -> Self {
        Self::new(2)
    }
}

impl ValueFormatter for DecimalFormatter {
    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return "nan".to_owned();
        }
        let precision = self.precision;
        let mut text = format!("{value:.precision$}");
        if self.trim_trailing_zeros {
            text = trim_decimal(text);
        }
        if text.trim_start_matches('-').chars().all(|ch| ch == '0' || ch == '.') {
            text = text.trim_start_matches('-').to_owned();
        }
        match self.separator {
            DecimalSeparator::Dot => text,
            DecimalSeparator::Comma => text.replace('.', ","),
        }
    }
}

/// `strftime`-style date formatter evaluated at a fixed UTC offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDateFormatter {
    pattern: String,
    offset: FixedOffset,
}

impl PatternDateFormatter {
    pub fn new(pattern: impl Into<String>) -> ChartResult<Self> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(ChartError::InvalidConfiguration(
                "date pattern must not be empty".to_owned(),
            ));
        }
        // Formatting an invalid specifier panics inside chrono.
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(ChartError::InvalidConfiguration(format!(
                "date pattern `{pattern}` contains an invalid specifier"
            )));
        }
        Ok(Self {
            pattern,
            offset: Utc.fix(),
        })
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> ChartResult<Self> {
        self.offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ChartError::InvalidConfiguration(format!(
                    "utc offset of {minutes} minutes is out of range"
                ))
            })?;
        Ok(self)
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for PatternDateFormatter {
    fn default() -> Self {
        Self {
            pattern: "%m-%d %H:%M".to_owned(),
            offset: Utc.fix(),
        }
    }
}

impl DateFormatter for PatternDateFormatter {
    fn format(&self, date: DateTime<Utc>) -> String {
        date.with_timezone(&self.offset)
            .format(&self.pattern)
            .to_string()
    }
}

fn normalize_step_for_precision(step_abs: f64) -> f64 {
    if !step_abs.is_finite() || step_abs <= 0.0 {
        return 0.01;
    }

    let magnitude = 10.0_f64.powf(step_abs.log10().floor());
    if !magnitude.is_finite() || magnitude <= 0.0 {
        return step_abs;
    }

    let normalized = step_abs / magnitude;
    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn precision_from_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return 2;
    }
    let text = format!("{:.12}", step.abs());
    let Some((_, fraction)) = text.split_once('.') else {
        return 0;
    };
    fraction.trim_end_matches('0').len().clamp(0, 12)
}

fn trim_decimal(mut text: String) -> String {
    if text.contains('.') {
        let trimmed_len = text.trim_end_matches('0').len();
        text.truncate(trimmed_len);
        if text.ends_with('.') {
            text.pop();
        }
    }
    text
}
