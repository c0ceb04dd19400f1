use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::core::Quote;

/// Typed slot in [`ContextValues`].
///
/// Implement it on a marker type; the marker's `TypeId` is the slot key.
pub trait ContextKey: 'static {
    type Value: 'static;
}

/// Quote series plus values derived from it once per data change.
///
/// Plugins fill derived slots from `process_quotes` and read them back while
/// rendering or contributing extreme points.
#[derive(Default)]
pub struct ContextValues {
    quotes: Vec<Quote>,
    derived: HashMap<TypeId, Box<dyn Any>>,
}

impl fmt::Debug for ContextValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextValues")
            .field("quotes", &self.quotes.len())
            .field("derived", &self.derived.len())
            .finish()
    }
}

impl ContextValues {
    #[must_use]
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self {
            quotes,
            derived: HashMap::new(),
        }
    }

    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Quotes inside `range`, clamped to the series bounds.
    #[must_use]
    pub fn quotes_in(&self, range: Range<usize>) -> &[Quote] {
        let end = range.end.min(self.quotes.len());
        let start = range.start.min(end);
        &self.quotes[start..end]
    }

    #[must_use]
    pub fn last_quote(&self) -> Option<&Quote> {
        self.quotes.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Replaces the series and drops every derived value.
    pub fn replace_quotes(&mut self, quotes: Vec<Quote>) {
        self.quotes = quotes;
        self.derived.clear();
    }

    #[must_use]
    pub fn into_quotes(self) -> Vec<Quote> {
        self.quotes
    }

    pub fn push_quote(&mut self, quote: Quote) {
        self.quotes.push(quote);
        self.derived.clear();
    }

    pub fn insert<K: ContextKey>(&mut self, value: K::Value) -> Option<K::Value> {
        self.derived
            .insert(TypeId::of::<K>(), Box::new(value))
            .and_then(|previous| previous.downcast::<K::Value>().ok())
            .map(|boxed| *boxed)
    }

    #[must_use]
    pub fn get<K: ContextKey>(&self) -> Option<&K::Value> {
        self.derived
            .get(&TypeId::of::<K>())
            .and_then(|value| value.downcast_ref::<K::Value>())
    }

    pub fn get_or_insert_with<K: ContextKey>(
        &mut self,
        default: impl FnOnce() -> K::Value,
    ) -> &mut K::Value {
        let slot = self
            .derived
            .entry(TypeId::of::<K>())
            .or_insert_with(|| Box::new(default()));
        match slot.downcast_mut::<K::Value>() {
            Some(value) => value,
            None => unreachable!("slots are only written with their key's value type"),
        }
    }

    pub fn remove<K: ContextKey>(&mut self) -> Option<K::Value> {
        self.derived
            .remove(&TypeId::of::<K>())
            .and_then(|value| value.downcast::<K::Value>().ok())
            .map(|boxed| *boxed)
    }

    #[must_use]
    pub fn derived_count(&self) -> usize {
        self.derived.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ContextKey, ContextValues};
    use crate::core::Quote;

    struct Totals;

    impl ContextKey for Totals {
        type Value = Vec<f64>;
    }

    fn quote(time: f64, close: f64) -> Quote {
        Quote::new(time, close, close + 1.0, close - 1.0, close).expect("valid quote")
    }

    #[test]
    fn typed_slots_store_and_replace_values() {
        let mut values = ContextValues::new(vec![quote(0.0, 10.0)]);
        assert!(values.get::<Totals>().is_none());
        assert!(values.insert::<Totals>(vec![1.0]).is_none());
        assert_eq!(values.insert::<Totals>(vec![2.0]), Some(vec![1.0]));
        values.get_or_insert_with::<Totals>(Vec::new).push(3.0);
        assert_eq!(values.get::<Totals>(), Some(&vec![2.0, 3.0]));
    }

    #[test]
    fn data_change_drops_derived_values() {
        let mut values = ContextValues::new(vec![quote(0.0, 10.0)]);
        values.insert::<Totals>(vec![1.0]);
        values.push_quote(quote(60.0, 11.0));
        assert_eq!(values.derived_count(), 0);
        assert_eq!(values.len(), 2);
        assert_eq!(values.quotes_in(1..10).len(), 1);
        assert!(values.quotes_in(5..10).is_empty());
    }
}
