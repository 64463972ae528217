//! Shortest paths over the road multigraph.
//!
//! Dijkstra on `edge_length_m`, respecting edge direction.  Costs are
//! accumulated as integer **millimetres** (u64) so heap ordering is total
//! and deterministic; edges with no derivable length saturate to
//! `u64::MAX` and are never relaxed.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ts_core::{EdgeId, NodeId};

use crate::{GraphError, GraphResult, RoadGraph};

#[inline]
fn edge_cost_mm(graph: &RoadGraph, edge: EdgeId) -> u64 {
    // Float-to-int casts saturate: INFINITY becomes u64::MAX.
    (graph.edge_length_m[edge.index()] * 1000.0).round() as u64
}

impl RoadGraph {
    /// Ordered node sequence of the shortest `from → to` path by length,
    /// endpoints included.  `from == to` yields `[from]`.
    ///
    /// # Errors
    ///
    /// [`GraphError::NoPath`] when `to` is unreachable from `from`.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> GraphResult<Vec<NodeId>> {
        if from == to {
            return Ok(vec![from]);
        }

        let n = self.node_count();
        let mut dist      = vec![u64::MAX; n];
        let mut prev_edge = vec![EdgeId::INVALID; n];
        dist[from.index()] = 0;

        // Reverse turns the max-heap into a min-heap; NodeId breaks ties.
        let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
        heap.push(Reverse((0, from)));

        while let Some(Reverse((cost, node))) = heap.pop() {
            if node == to {
                return Ok(self.reconstruct(&prev_edge, from, to));
            }
            if cost > dist[node.index()] {
                continue;
            }
            for edge in self.out_edges(node) {
                let next = self.edge_to[edge.index()];
                let new_cost = cost.saturating_add(edge_cost_mm(self, edge));
                if new_cost < dist[next.index()] {
                    dist[next.index()] = new_cost;
                    prev_edge[next.index()] = edge;
                    heap.push(Reverse((new_cost, next)));
                }
            }
        }

        Err(GraphError::NoPath { from, to })
    }

    fn reconstruct(&self, prev_edge: &[EdgeId], from: NodeId, to: NodeId) -> Vec<NodeId> {
        let mut path = vec![to];
        let mut cur = to;
        while cur != from {
            let e = prev_edge[cur.index()];
            if e == EdgeId::INVALID {
                break;
            }
            cur = self.edge_from[e.index()];
            path.push(cur);
        }
        path.reverse();
        path
    }
}
