use serde::{Deserialize, Serialize};
use tracing::debug;

/// Value range `(min, max)` a vertical scale must cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremePoint {
    pub min: f64,
    pub max: f64,
}

impl ExtremePoint {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Builds a range from an unordered pair; `None` if either bound is not finite.
    #[must_use]
    pub fn from_bounds(a: f64, b: f64) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        Some(Self::new(a.min(b), a.max(b)))
    }

    /// Finite and ordered (`max >= min`).
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max >= self.min
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    /// Flat range: no vertical mapping can be derived from it.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !self.is_valid() || self.span() <= 0.0
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Reduces optional contributions into one range.
///
/// `None` entries do not constrain the scale. Non-finite or inverted ranges
/// are discarded so they can never poison the result.
#[must_use]
pub fn reduce_extreme_points<I>(contributions: I) -> Option<ExtremePoint>
where
    I: IntoIterator<Item = Option<ExtremePoint>>,
{
    contributions
        .into_iter()
        .flatten()
        .filter(|candidate| {
            let keep = candidate.is_valid();
            if !keep {
                debug!(
                    min = candidate.min,
                    max = candidate.max,
                    "discarding invalid extreme point contribution"
                );
            }
            keep
        })
        .reduce(ExtremePoint::union)
}

/// Low/high envelope of `values`, skipping non-finite entries.
#[must_use]
pub fn extreme_of<I>(values: I) -> Option<ExtremePoint>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    values
        .into_iter()
        .filter_map(|(low, high)| ExtremePoint::from_bounds(low, high))
        .reduce(ExtremePoint::union)
}
