//! `ts-graph`: the road/trail multigraph the pipeline is built around.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`network`] | `RoadGraph` (CSR + pair index), `RoadGraphBuilder`, `EdgeSpec` |
//! | [`attrs`]   | `EdgeAttrs`, `EdgeAttrTable`, `EdgeAttr`                     |
//! | [`index`]   | `NearestNodeIndex` (R-tree over node coordinates)           |
//! | [`router`]  | `shortest_path` (Dijkstra on edge length)                   |
//! | [`json`]    | Node-link JSON load/save                                     |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                               |
//!
//! # Ownership
//!
//! Node and edge records are immutable once built.  The only mutable part
//! of a `RoadGraph` is its [`EdgeAttrTable`], handed out through
//! [`RoadGraph::attrs_mut`] to one enrichment pass at a time.

pub mod attrs;
pub mod error;
pub mod index;
pub mod json;
pub mod network;
pub mod router;


pub use attrs::{EdgeAttr, EdgeAttrTable, EdgeAttrs};
pub use error::{GraphError, GraphResult};
pub use index::NearestNodeIndex;
pub use network::{EdgeSpec, RoadGraph, RoadGraphBuilder};
