//! Explicit "no data" sentinel for enriched edge attributes.
//!
//! Enrichment keeps numeric attributes always present, but a computed zero
//! and an absent measurement are not the same thing.  `Measure` keeps them
//! apart; [`Measure::value_or_zero`] is the numeric view for consumers that
//! expect a plain number in every field.

/// A scalar edge attribute produced by an enrichment pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Measure {
    /// A computed value.  May legitimately be `0.0`.
    Known(f64),
    /// The pass ran but had no data to compute from.
    Unknown,
}

impl Measure {
    /// `Known` value, or `None` for `Unknown`.
    #[inline]
    pub fn known(self) -> Option<f64> {
        match self {
            Measure::Known(v) => Some(v),
            Measure::Unknown => None,
        }
    }

    /// Numeric view: `Unknown` reads as `0.0`.
    #[inline]
    pub fn value_or_zero(self) -> f64 {
        self.known().unwrap_or(0.0)
    }

    #[inline]
    pub fn is_known(self) -> bool {
        matches!(self, Measure::Known(_))
    }
}

impl From<Option<f64>> for Measure {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(x) => Measure::Known(x),
            None => Measure::Unknown,
        }
    }
}
