//! Nearest-node spatial index.
//!
//! Node coordinates are stored in an R-tree (`rstar`) in a local
//! equirectangular plane: longitude is scaled by `cos(φ₀)`, with `φ₀` the
//! mean latitude of the indexed nodes.  Within a regional graph this ranks
//! neighbours the same way haversine does; the distance bound of
//! [`NearestNodeIndex::nearest_within`] is then checked with haversine on
//! the winning node.
//!
//! Nodes without coordinates are never indexed.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use ts_core::{GeoPoint, NodeId};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon · cos φ₀]
    pos:   GeoPoint,
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dy = self.point[0] - point[0];
        let dx = self.point[1] - point[1];
        dy * dy + dx * dx
    }
}

// ── NearestNodeIndex ──────────────────────────────────────────────────────────

/// Read-only spatial index over a graph's node coordinates.
///
/// Built once by [`RoadGraphBuilder::build`](crate::RoadGraphBuilder::build);
/// the node set of a `RoadGraph` never changes afterwards, so the index
/// never goes stale.
pub struct NearestNodeIndex {
    tree:      RTree<NodeEntry>,
    lon_scale: f64,
}

impl NearestNodeIndex {
    /// Bulk-load from `(id, position)` pairs.
    pub fn build(nodes: impl IntoIterator<Item = (NodeId, GeoPoint)>) -> Self {
        let nodes: Vec<(NodeId, GeoPoint)> = nodes.into_iter().collect();
        let lon_scale = if nodes.is_empty() {
            1.0
        } else {
            let mean_lat = nodes.iter().map(|(_, p)| p.lat).sum::<f64>() / nodes.len() as f64;
            mean_lat.to_radians().cos()
        };
        let entries = nodes
            .into_iter()
            .map(|(id, pos)| NodeEntry { point: [pos.lat, pos.lon * lon_scale], pos, id })
            .collect();
        Self { tree: RTree::bulk_load(entries), lon_scale }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    #[inline]
    fn key(&self, pos: GeoPoint) -> [f64; 2] {
        [pos.lat, pos.lon * self.lon_scale]
    }

    /// Closest indexed node to `pos`.  `None` only for an empty index.
    pub fn nearest(&self, pos: GeoPoint) -> Option<NodeId> {
        self.tree.nearest_neighbor(&self.key(pos)).map(|e| e.id)
    }

    /// Closest node to `pos` if it lies within `max_m` metres (haversine).
    ///
    /// A node farther than the bound is reported as no match rather than a
    /// distant false positive.
    pub fn nearest_within(&self, pos: GeoPoint, max_m: f64) -> Option<NodeId> {
        self.tree
            .nearest_neighbor(&self.key(pos))
            .filter(|e| e.pos.distance_m(pos) <= max_m)
            .map(|e| e.id)
    }

    /// Up to `k` nearest nodes, closest first.
    pub fn k_nearest(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.tree
            .nearest_neighbor_iter(&self.key(pos))
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}
