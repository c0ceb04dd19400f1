use std::cmp::Ordering;

use tracing::{debug, trace, warn};

use crate::core::Quote;
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Replaces the quote series.
    ///
    /// Quotes violating OHLC invariants are dropped, the rest are ordered by
    /// time, and every plugin re-derives its values.
    pub fn set_quotes(&mut self, quotes: Vec<Quote>) {
        let original_count = quotes.len();
        let quotes = canonicalize_quotes(quotes);
        debug!(
            original_count,
            canonical_count = quotes.len(),
            "set quotes"
        );
        self.values.replace_quotes(quotes);
        self.pipeline.process_quotes(&mut self.values);
        self.last_frame = None;
    }

    /// Updates the series using realtime semantics:
    /// - appends when `quote.time` is newer than the latest quote
    /// - replaces the latest quote when `quote.time` is equal
    /// - rejects out-of-order updates
    pub fn update_quote(&mut self, quote: Quote) -> ChartResult<()> {
        validate_quote(&quote)?;
        let ordering = self
            .values
            .quotes()
            .last()
            .map(|last| quote.time.total_cmp(&last.time));
        if ordering == Some(Ordering::Less) {
            return Err(ChartError::InvalidData(
                "quote update is older than the latest quote".to_owned(),
            ));
        }

        let mut quotes = std::mem::take(&mut self.values).into_quotes();
        match quotes.last_mut() {
            Some(last) if ordering == Some(Ordering::Equal) => *last = quote,
            _ => quotes.push(quote),
        }
        trace!(count = quotes.len(), "update quote");
        self.values.replace_quotes(quotes);
        self.pipeline.process_quotes(&mut self.values);
        self.last_frame = None;
        Ok(())
    }

    pub fn clear_quotes(&mut self) {
        self.values.replace_quotes(Vec::new());
        self.selection = super::SelectionState::default();
        self.last_frame = None;
    }
}

fn validate_quote(quote: &Quote) -> ChartResult<()> {
    Quote::new(quote.time, quote.open, quote.high, quote.low, quote.close)?;
    for (value, name) in [(quote.bid, "bid"), (quote.sell, "sell")] {
        if value.is_some_and(|value| !value.is_finite()) {
            return Err(ChartError::InvalidData(format!(
                "quote {name} must be finite"
            )));
        }
    }
    if quote
        .volume
        .is_some_and(|volume| !volume.is_finite() || volume < 0.0)
    {
        return Err(ChartError::InvalidData(
            "quote volume must be finite and >= 0".to_owned(),
        ));
    }
    Ok(())
}

fn canonicalize_quotes(quotes: Vec<Quote>) -> Vec<Quote> {
    let mut quotes: Vec<Quote> = quotes
        .into_iter()
        .filter(|quote| match validate_quote(quote) {
            Ok(()) => true,
            Err(err) => {
                warn!(time = quote.time, error = %err, "dropping invalid quote");
                false
            }
        })
        .collect();
    quotes.sort_by(|a, b| a.time.total_cmp(&b.time));
    quotes
}

#[cfg(test)]
mod tests {
    use super::canonicalize_quotes;
    use crate::core::Quote;

    #[test]
    fn canonicalization_drops_invalid_and_orders_by_time() {
        let valid = Quote::new(120.0, 10.0, 12.0, 9.0, 11.0).expect("valid quote");
        let earlier = Quote::new(60.0, 10.0, 12.0, 9.0, 11.0).expect("valid quote");
        let mut broken = valid;
        broken.low = 20.0;

        let quotes = canonicalize_quotes(vec![valid, broken, earlier]);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].time, 60.0);
        assert_eq!(quotes[1].time, 120.0);
    }
}
