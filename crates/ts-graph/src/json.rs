//! Node-link JSON graph format.
//!
//! ```json
//! {
//!   "nodes": [{"id": 101, "lat": 48.40, "lon": 2.70}, ...],
//!   "edges": [{"source": 101, "target": 102, "key": 0,
//!              "geometry": [[2.70, 48.40], [2.70, 48.41]],
//!              "highway": "path", "surface": "dirt", "length": 1112.0,
//!              "dplus": 12.5, "distance": 1111.9,
//!              "popularity": 0.0, "popularity_known": false}]
//! }
//! ```
//!
//! `x`/`y` and `links` are accepted as aliases, matching common
//! node-link exports.  Geometry vertices are `[lon, lat]`.
//!
//! An absent enrichment field is a pass that has not run.  Once a pass has
//! run its field is always written: `dplus` and `popularity` are never
//! `null`, [`Measure::Unknown`] is saved as `0.0` plus a `<field>_known:
//! false` flag so the distinction survives a reload.  `distance` is the one
//! field saved as `null` when unknown.  On load, `null` in any enrichment
//! field also reads as `Unknown`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Deserializer, Serialize};

use ts_core::{EdgeId, GeoPoint, Measure};

use crate::{EdgeAttrs, EdgeSpec, GraphError, GraphResult, RoadGraph, RoadGraphBuilder};

#[derive(Serialize, Deserialize)]
struct GraphDoc {
    nodes: Vec<NodeDoc>,
    #[serde(alias = "links")]
    edges: Vec<EdgeDoc>,
}

#[derive(Serialize, Deserialize)]
struct NodeDoc {
    id: i64,
    #[serde(default, alias = "y", skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(default, alias = "x", skip_serializing_if = "Option::is_none")]
    lon: Option<f64>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Serialize, Deserialize)]
struct EdgeDoc {
    source: i64,
    target: i64,
    #[serde(default)]
    key: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geometry: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    highway: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    surface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<f64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    dplus: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dplus_known: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    distance: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    popularity: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    popularity_known: Option<bool>,
}

/// Distinguishes a field set to `null` (`Some(None)`) from an absent one
/// (`None`, via `#[serde(default)]`).
fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<f64>>, D::Error> {
    Option::<f64>::deserialize(d).map(Some)
}

fn measure_of(field: Option<Option<f64>>) -> Option<Measure> {
    field.map(Measure::from)
}

/// Read a zero-sentinel field: a `false` flag marks the stored `0.0` as
/// unknown.
fn flagged_measure_of(field: Option<Option<f64>>, known: Option<bool>) -> Option<Measure> {
    match known {
        Some(false) => field.map(|_| Measure::Unknown),
        _ => measure_of(field),
    }
}

/// `distance`: unknown is written as `null`.
fn field_of(m: Option<Measure>) -> Option<Option<f64>> {
    m.map(Measure::known)
}

/// `dplus` and `popularity`: unknown is written as `0.0` plus a `false`
/// flag.
fn zero_field_of(m: Option<Measure>) -> (Option<Option<f64>>, Option<bool>) {
    match m {
        None => (None, None),
        Some(Measure::Known(v)) => (Some(Some(v)), None),
        Some(Measure::Unknown) => (Some(Some(0.0)), Some(false)),
    }
}

impl RoadGraph {
    /// Parse a node-link JSON graph.
    ///
    /// # Errors
    ///
    /// Malformed JSON, an edge whose endpoint is not in `nodes`, or two
    /// edges with the same `(source, target, key)`.
    pub fn from_json_reader<R: Read>(reader: R) -> GraphResult<Self> {
        let doc: GraphDoc = serde_json::from_reader(reader)?;

        let mut b = RoadGraphBuilder::with_capacity(doc.nodes.len(), doc.edges.len());
        for n in &doc.nodes {
            let pos = match (n.lat, n.lon) {
                (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
                _ => None,
            };
            b.add_node(n.id, pos);
        }

        for e in doc.edges {
            let from = b.node_by_osm(e.source).ok_or(GraphError::UnknownNode(e.source))?;
            let to = b.node_by_osm(e.target).ok_or(GraphError::UnknownNode(e.target))?;

            let mut spec = EdgeSpec::new().attrs(EdgeAttrs {
                dplus:      flagged_measure_of(e.dplus, e.dplus_known),
                distance:   measure_of(e.distance),
                popularity: flagged_measure_of(e.popularity, e.popularity_known),
            });
            if let Some(k) = e.key {
                spec = spec.key(k);
            }
            if let Some(coords) = e.geometry {
                spec = spec.geometry(coords.iter().map(|&[lon, lat]| GeoPoint::new(lat, lon)).collect());
            }
            match e.highway {
                Some(OneOrMany::One(h)) => spec = spec.highway(h),
                Some(OneOrMany::Many(hs)) => {
                    for h in hs {
                        spec = spec.highway(h);
                    }
                }
                None => {}
            }
            if let Some(s) = e.surface {
                spec = spec.surface(s);
            }
            if let Some(l) = e.length {
                spec = spec.length_m(l);
            }
            b.add_edge(from, to, spec)?;
        }

        Ok(b.build())
    }

    /// Load a graph from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let graph = Self::from_json_reader(BufReader::new(File::open(path)?))?;
        info!(
            "loaded graph {}: {} nodes, {} edges",
            path.display(),
            graph.node_count(),
            graph.edge_count(),
        );
        Ok(graph)
    }

    /// Serialise the graph, with its current attributes, as node-link JSON.
    pub fn to_json_writer<W: Write>(&self, writer: W) -> GraphResult<()> {
        let nodes = (0..self.node_count())
            .map(|i| NodeDoc {
                id:  self.node_osm_id[i],
                lat: self.node_pos[i].map(|p| p.lat),
                lon: self.node_pos[i].map(|p| p.lon),
            })
            .collect();

        let edges = (0..self.edge_count())
            .map(|i| {
                let id = EdgeId(i as u32);
                let key = self.edge_key(id);
                let attrs = self.edge_attrs(id);
                let highway = match self.edge_highway[i].as_slice() {
                    [] => None,
                    [one] => Some(OneOrMany::One(one.clone())),
                    many => Some(OneOrMany::Many(many.to_vec())),
                };
                let length = self.edge_length_m[i];
                let (dplus, dplus_known) = zero_field_of(attrs.dplus);
                let (popularity, popularity_known) = zero_field_of(attrs.popularity);
                EdgeDoc {
                    source:     key.from,
                    target:     key.to,
                    key:        Some(key.key),
                    geometry:   self.stored_geometry(id)
                        .map(|g| g.iter().map(|p| [p.lon, p.lat]).collect()),
                    highway,
                    surface:    Some(self.edge_surface[i].to_string()),
                    length:     length.is_finite().then_some(length),
                    dplus,
                    dplus_known,
                    distance:   field_of(attrs.distance),
                    popularity,
                    popularity_known,
                }
            })
            .collect();

        serde_json::to_writer(writer, &GraphDoc { nodes, edges })?;
        Ok(())
    }

    /// Write the graph to a JSON file, replacing it if present.
    pub fn save_json(&self, path: impl AsRef<Path>) -> GraphResult<()> {
        let path = path.as_ref();
        let mut w = BufWriter::new(File::create(path)?);
        self.to_json_writer(&mut w)?;
        w.flush()?;
        info!("saved graph {} ({} edges)", path.display(), self.edge_count());
        Ok(())
    }
}
