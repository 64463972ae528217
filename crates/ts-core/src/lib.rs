//! `ts-core`: foundational types for the `trailset` dataset pipeline.
//!
//! Every other `ts-*` crate depends on this one.  It has no `ts-*`
//! dependencies.  `geo` supplies ellipsoidal distance and `proj` the raster
//! reprojection; `serde` is optional.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `EdgeKey`                         |
//! | [`geo`]         | `GeoPoint`, `BoundingBox`, distances, interpolation   |
//! | [`projection`]  | `Projection`, WGS-84 to raster CRS through PROJ        |
//! | [`measure`]     | `Measure`: known value vs. explicit "no data"         |
//! | [`surface`]     | `Surface` tag and the highway default table           |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to value types.             |

pub mod error;
pub mod geo;
pub mod ids;
pub mod measure;
pub mod projection;
pub mod surface;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use crate::geo::{BoundingBox, GeoPoint, densify, interpolate_normalized, path_length_m};
pub use ids::{EdgeId, EdgeKey, NodeId};
pub use measure::Measure;
pub use projection::Projection;
pub use surface::Surface;
