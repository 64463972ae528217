//! Road multigraph representation and builder.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** order.
//! Given a `NodeId n`, its outgoing edges are the `EdgeId`s
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! Edges are sorted by `(from, to, key)`, so parallel edges between one
//! node pair are contiguous and ordered by key.  A hash index maps each
//! ordered node pair to its parallel edges for O(1) `has_edge` /
//! `edges_between` lookups.
//!
//! Nodes carry their external (OSM) id; an edge's stable identity is its
//! [`EdgeKey`] `(from_osm, to_osm, key)`.

use std::borrow::Cow;

use rustc_hash::{FxHashMap, FxHashSet};

use ts_core::{path_length_m, EdgeId, EdgeKey, GeoPoint, NodeId, Surface};

use crate::{EdgeAttrTable, EdgeAttrs, GraphError, GraphResult, NearestNodeIndex};

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed multigraph in CSR format, with a nearest-node index and an
/// enrichment attribute table.
///
/// Topology and geometry fields are `pub` for indexed access on hot paths.
/// Do not construct directly; use [`RoadGraphBuilder`] or
/// [`RoadGraph::load_json`].
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// External (OSM) id of each node.  Indexed by `NodeId`.
    pub node_osm_id: Vec<i64>,

    /// Coordinates of each node, `None` where the source had none.
    pub node_pos: Vec<Option<GeoPoint>>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from: Vec<NodeId>,
    pub edge_to:   Vec<NodeId>,

    /// Parallel-edge key, unique per `(from, to)` pair.
    pub edge_key: Vec<u32>,

    /// Stored geometry.  `None` means the edge is the straight segment
    /// between its endpoints; see [`RoadGraph::edge_geometry`].
    pub edge_shape: Vec<Option<Vec<GeoPoint>>>,

    /// `highway` tag values, in source order.
    pub edge_highway: Vec<Vec<String>>,

    pub edge_surface: Vec<Surface>,

    /// Routing weight in metres.  `f64::INFINITY` when no length can be
    /// derived; such edges are never traversed.
    pub edge_length_m: Vec<f64>,

    // ── Lookups ───────────────────────────────────────────────────────────
    attrs:      EdgeAttrTable,
    osm_lookup: FxHashMap<i64, NodeId>,
    pair_index: FxHashMap<(NodeId, NodeId), Vec<EdgeId>>,
    index:      NearestNodeIndex,
}

impl RoadGraph {
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_osm_id.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_osm_id.is_empty()
    }

    // ── Nodes ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn node_pos(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos[node.index()]
    }

    /// Dense id of the node with external id `osm_id`.
    pub fn node_by_osm(&self, osm_id: i64) -> Option<NodeId> {
        self.osm_lookup.get(&osm_id).copied()
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// Outgoing edges of `node`, as a contiguous id range.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// `true` if at least one edge is stored in the `u → v` direction.
    ///
    /// Direction matters: callers matching a trace against the graph check
    /// both `(u, v)` and `(v, u)`.
    #[inline]
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.pair_index.contains_key(&(u, v))
    }

    /// All parallel edges stored `u → v`, in ascending key order.
    #[inline]
    pub fn edges_between(&self, u: NodeId, v: NodeId) -> &[EdgeId] {
        self.pair_index.get(&(u, v)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stable identity `(from_osm, to_osm, key)` of `edge`.
    pub fn edge_key(&self, edge: EdgeId) -> EdgeKey {
        let e = edge.index();
        EdgeKey::new(
            self.node_osm_id[self.edge_from[e].index()],
            self.node_osm_id[self.edge_to[e].index()],
            self.edge_key[e],
        )
    }

    /// Dense id of the edge with stable identity `key`.
    pub fn edge_by_key(&self, key: EdgeKey) -> Option<EdgeId> {
        let u = self.node_by_osm(key.from)?;
        let v = self.node_by_osm(key.to)?;
        self.edges_between(u, v)
            .iter()
            .copied()
            .find(|&e| self.edge_key[e.index()] == key.key)
    }

    /// Geometry as stored on the edge, without the straight-line default.
    #[inline]
    pub fn stored_geometry(&self, edge: EdgeId) -> Option<&[GeoPoint]> {
        self.edge_shape[edge.index()].as_deref()
    }

    /// Physical path of `edge`: the stored geometry, else the straight
    /// segment between its endpoints.  `None` when the edge has no geometry
    /// and an endpoint lacks coordinates.
    pub fn edge_geometry(&self, edge: EdgeId) -> Option<Cow<'_, [GeoPoint]>> {
        if let Some(shape) = self.stored_geometry(edge) {
            return Some(Cow::Borrowed(shape));
        }
        let a = self.node_pos(self.edge_from[edge.index()])?;
        let b = self.node_pos(self.edge_to[edge.index()])?;
        Some(Cow::Owned(vec![a, b]))
    }

    // ── Attributes ────────────────────────────────────────────────────────

    #[inline]
    pub fn attrs(&self) -> &EdgeAttrTable {
        &self.attrs
    }

    /// Exclusive write access to the attribute table for one enrichment
    /// pass.  Topology and geometry stay immutable.
    #[inline]
    pub fn attrs_mut(&mut self) -> &mut EdgeAttrTable {
        &mut self.attrs
    }

    #[inline]
    pub fn edge_attrs(&self, edge: EdgeId) -> &EdgeAttrs {
        self.attrs.get(edge)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    pub fn spatial_index(&self) -> &NearestNodeIndex {
        &self.index
    }

    /// Nearest node to `pos`, optionally bounded by `max_m` metres.
    /// Returns `None` when the graph has no located nodes or the nearest
    /// exceeds the bound.
    pub fn nearest_node(&self, pos: GeoPoint, max_m: Option<f64>) -> Option<NodeId> {
        match max_m {
            Some(m) => self.index.nearest_within(pos, m),
            None    => self.index.nearest(pos),
        }
    }
}

// ── EdgeSpec ──────────────────────────────────────────────────────────────────

/// Description of one edge handed to [`RoadGraphBuilder::add_edge`].
///
/// ```
/// use ts_graph::EdgeSpec;
///
/// let spec = EdgeSpec::new().key(1).highway("track").surface("gravel");
/// ```
#[derive(Clone, Debug, Default)]
pub struct EdgeSpec {
    key:      Option<u32>,
    geometry: Option<Vec<GeoPoint>>,
    highway:  Vec<String>,
    surface:  Option<String>,
    length_m: Option<f64>,
    attrs:    EdgeAttrs,
}

impl EdgeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit parallel key.  Without one, the next free key for the node
    /// pair is assigned in insertion order.
    pub fn key(mut self, key: u32) -> Self {
        self.key = Some(key);
        self
    }

    pub fn geometry(mut self, geometry: Vec<GeoPoint>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Append one `highway` tag value.
    pub fn highway(mut self, highway: impl Into<String>) -> Self {
        self.highway.push(highway.into());
        self
    }

    pub fn surface(mut self, surface: impl Into<String>) -> Self {
        self.surface = Some(surface.into());
        self
    }

    /// Source-provided length, used as the routing weight.
    pub fn length_m(mut self, length_m: f64) -> Self {
        self.length_m = Some(length_m);
        self
    }

    /// Attributes carried over from a previous enrichment run.
    pub fn attrs(mut self, attrs: EdgeAttrs) -> Self {
        self.attrs = attrs;
        self
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use ts_core::GeoPoint;
/// use ts_graph::{EdgeSpec, RoadGraphBuilder};
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(101, Some(GeoPoint::new(48.40, 2.70)));
/// let c = b.add_node(102, Some(GeoPoint::new(48.41, 2.70)));
/// b.add_edge(a, c, EdgeSpec::new().highway("path")).unwrap();
/// b.add_edge(a, c, EdgeSpec::new().highway("track")).unwrap(); // parallel, key 1
/// let g = b.build();
/// assert_eq!(g.edges_between(a, c).len(), 2);
/// ```
pub struct RoadGraphBuilder {
    osm_ids:    Vec<i64>,
    positions:  Vec<Option<GeoPoint>>,
    osm_lookup: FxHashMap<i64, NodeId>,
    raw_edges:  Vec<RawEdge>,
    next_key:   FxHashMap<(NodeId, NodeId), u32>,
    used_keys:  FxHashSet<(NodeId, NodeId, u32)>,
}

struct RawEdge {
    from: NodeId,
    to:   NodeId,
    key:  u32,
    spec: EdgeSpec,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            osm_ids:    Vec::with_capacity(nodes),
            positions:  Vec::with_capacity(nodes),
            osm_lookup: FxHashMap::default(),
            raw_edges:  Vec::with_capacity(edges),
            next_key:   FxHashMap::default(),
            used_keys:  FxHashSet::default(),
        }
    }

    /// Add a node with external id `osm_id`.  Adding an id twice returns
    /// the existing `NodeId` and keeps the first coordinates.
    pub fn add_node(&mut self, osm_id: i64, pos: Option<GeoPoint>) -> NodeId {
        if let Some(&id) = self.osm_lookup.get(&osm_id) {
            return id;
        }
        let id = NodeId(self.osm_ids.len() as u32);
        self.osm_ids.push(osm_id);
        self.positions.push(pos);
        self.osm_lookup.insert(osm_id, id);
        id
    }

    pub fn node_by_osm(&self, osm_id: i64) -> Option<NodeId> {
        self.osm_lookup.get(&osm_id).copied()
    }

    /// Add a **directed** edge `from → to`.  Returns its parallel key.
    ///
    /// # Errors
    ///
    /// `GraphError::DuplicateEdge` when `(from, to, key)` is already taken,
    /// either by an explicit key or because the pair's auto keys have run
    /// up to `u32::MAX`.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, spec: EdgeSpec) -> GraphResult<u32> {
        let next = self.next_key.entry((from, to)).or_insert(0);
        let key = spec.key.unwrap_or(*next);
        if !self.used_keys.insert((from, to, key)) {
            return Err(GraphError::DuplicateEdge(EdgeKey::new(
                self.osm_ids[from.index()],
                self.osm_ids[to.index()],
                key,
            )));
        }
        *next = (*next).max(key.saturating_add(1));
        self.raw_edges.push(RawEdge { from, to, key, spec });
        Ok(key)
    }

    pub fn node_count(&self) -> usize { self.osm_ids.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Sorts edges by `(from, to, key)`, builds the CSR and pair index,
    /// resolves surfaces and routing lengths, and bulk-loads the spatial
    /// index from located nodes.
    pub fn build(self) -> RoadGraph {
        let node_count = self.osm_ids.len();
        let edge_count = self.raw_edges.len();

        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| (e.from, e.to, e.key));

        let positions = self.positions;
        let mut edge_from     = Vec::with_capacity(edge_count);
        let mut edge_to       = Vec::with_capacity(edge_count);
        let mut edge_key      = Vec::with_capacity(edge_count);
        let mut edge_shape    = Vec::with_capacity(edge_count);
        let mut edge_highway  = Vec::with_capacity(edge_count);
        let mut edge_surface  = Vec::with_capacity(edge_count);
        let mut edge_length_m = Vec::with_capacity(edge_count);
        let mut attr_rows     = Vec::with_capacity(edge_count);
        let mut pair_index: FxHashMap<(NodeId, NodeId), Vec<EdgeId>> = FxHashMap::default();
        let mut node_out_start = vec![0u32; node_count + 1];

        for (i, e) in raw.into_iter().enumerate() {
            let spec = e.spec;
            let length = spec
                .length_m
                .or_else(|| spec.geometry.as_deref().map(path_length_m))
                .or_else(|| {
                    let a = positions[e.from.index()]?;
                    let b = positions[e.to.index()]?;
                    Some(a.geodesic_m(b))
                })
                .unwrap_or(f64::INFINITY);
            let surface = Surface::from_tags(
                spec.surface.as_deref(),
                spec.highway.iter().map(String::as_str),
            );

            node_out_start[e.from.index() + 1] += 1;
            pair_index.entry((e.from, e.to)).or_default().push(EdgeId(i as u32));
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_key.push(e.key);
            edge_shape.push(spec.geometry);
            edge_highway.push(spec.highway);
            edge_surface.push(surface);
            edge_length_m.push(length);
            attr_rows.push(spec.attrs);
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let index = NearestNodeIndex::build(
            positions
                .iter()
                .enumerate()
                .filter_map(|(i, p)| p.map(|p| (NodeId(i as u32), p))),
        );

        RoadGraph {
            node_osm_id: self.osm_ids,
            node_pos: positions,
            node_out_start,
            edge_from,
            edge_to,
            edge_key,
            edge_shape,
            edge_highway,
            edge_surface,
            edge_length_m,
            attrs: EdgeAttrTable::from_rows(attr_rows),
            osm_lookup: self.osm_lookup,
            pair_index,
            index,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
