//! Per-edge enrichment attributes.
//!
//! Each attribute is `Option<Measure>`: `None` until its pass has run,
//! then `Some(Known(v))` or `Some(Unknown)` when the pass had nothing to
//! compute from.  A pass never clears an attribute back to `None`.

use ts_core::{EdgeId, Measure};

/// Attribute written by one enrichment pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeAttr {
    Dplus,
    Distance,
    Popularity,
}

/// Snapshot of one edge's enrichment attributes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EdgeAttrs {
    /// Cumulative elevation gain, metres.
    pub dplus:      Option<Measure>,
    /// Geodesic length, metres.
    pub distance:   Option<Measure>,
    /// Mean positive heatmap intensity.
    pub popularity: Option<Measure>,
}

impl EdgeAttrs {
    pub fn get(&self, attr: EdgeAttr) -> Option<Measure> {
        match attr {
            EdgeAttr::Dplus      => self.dplus,
            EdgeAttr::Distance   => self.distance,
            EdgeAttr::Popularity => self.popularity,
        }
    }

    pub fn set(&mut self, attr: EdgeAttr, value: Measure) {
        let slot = match attr {
            EdgeAttr::Dplus      => &mut self.dplus,
            EdgeAttr::Distance   => &mut self.distance,
            EdgeAttr::Popularity => &mut self.popularity,
        };
        *slot = Some(value);
    }

    /// `true` when both `distance` and `dplus` carry known values, the
    /// condition for an edge to appear in the dataset.
    pub fn is_enriched(&self) -> bool {
        matches!(self.distance, Some(Measure::Known(_))) && matches!(self.dplus, Some(Measure::Known(_)))
    }
}

/// Attribute rows for every edge, indexed by `EdgeId`.
#[derive(Clone, Debug, Default)]
pub struct EdgeAttrTable {
    rows: Vec<EdgeAttrs>,
}

impl EdgeAttrTable {
    pub(crate) fn from_rows(rows: Vec<EdgeAttrs>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn get(&self, edge: EdgeId) -> &EdgeAttrs {
        &self.rows[edge.index()]
    }

    #[inline]
    pub fn set(&mut self, edge: EdgeId, attr: EdgeAttr, value: Measure) {
        self.rows[edge.index()].set(attr, value);
    }

    /// Overwrite one attribute for all edges from a column indexed by
    /// `EdgeId`.  Rerunning a pass with the same inputs writes the same
    /// column.
    ///
    /// # Panics
    ///
    /// If `values.len()` differs from the edge count.
    pub fn apply(&mut self, attr: EdgeAttr, values: Vec<Measure>) {
        assert_eq!(values.len(), self.rows.len(), "attribute column length mismatch");
        for (row, v) in self.rows.iter_mut().zip(values) {
            row.set(attr, v);
        }
    }

    /// Number of edges whose `attr` has been set by a pass.
    pub fn count_set(&self, attr: EdgeAttr) -> usize {
        self.rows.iter().filter(|r| r.get(attr).is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, &EdgeAttrs)> + '_ {
        self.rows.iter().enumerate().map(|(i, r)| (EdgeId(i as u32), r))
    }
}
