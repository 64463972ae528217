//! `ts-enrich`: attach `dplus`, `distance`, and `popularity` to every edge.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                |
//! |----------------|---------------------------------------------------------|
//! | [`enricher`]   | `EdgeEnricher`, `EnrichConfig`                          |
//! | [`elevation`]  | D+ from a DEM sampled at each geometry vertex           |
//! | [`distance`]   | Ellipsoidal length of the edge geometry                 |
//! | [`popularity`] | Mean positive heatmap intensity along the geometry      |
//! | [`report`]     | `PassReport` counters                                   |
//! | [`error`]      | `EnrichError`, `EnrichResult<T>`                        |
//!
//! # Pass contract
//!
//! Each pass is a pure function from (edge geometry, raster) to one
//! attribute column.  The column is computed against a shared `&RoadGraph`
//! and then written in one step through `RoadGraph::attrs_mut`, so passes
//! never overlap and rerunning one rewrites the same values.  Sampling
//! misses are absorbed per point; no pass fails part-way.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Computes each column with a Rayon parallel map.        |

pub mod distance;
pub mod elevation;
pub mod enricher;
pub mod error;
pub mod popularity;
pub mod report;


pub use enricher::{EdgeEnricher, EnrichConfig};
pub use error::{EnrichError, EnrichResult};
pub use report::PassReport;
