//! Persisted network record: the structured JSON exchanged with loaders,
//! exporters and viewers.
//!
//! Shape (read/written wholesale, no streaming, no versioning):
//! `periods` 3×3 rows, `vertices` ambient positions, `halfedges`
//! `[tail, head, [c0, c1, c2]]`, `inversions` twin index per half-edge,
//! optional `normals` aligned with `vertices`, optional `faces` as half-edge
//! index lists in walk order. Unknown top-level keys are carried through.

use std::fs;
use std::path::Path;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NetError;
use crate::faces::FaceSet;
use crate::graph::{Cell, HalfEdge, HalfEdgeId, PeriodicGraph};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub periods: [[f64; 3]; 3],
    pub vertices: Vec<[f64; 3]>,
    pub halfedges: Vec<(usize, usize, [i32; 3])>,
    /// Empty means "derive from the half-edge list".
    #[serde(default)]
    pub inversions: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub normals: Vec<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faces: Option<Vec<Vec<usize>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NetworkRecord {
    /// Snapshot of a validated graph (no normals, no faces).
    pub fn from_graph(graph: &PeriodicGraph) -> Self {
        let p = graph.periods();
        Self {
            periods: [
                [p[(0, 0)], p[(0, 1)], p[(0, 2)]],
                [p[(1, 0)], p[(1, 1)], p[(1, 2)]],
                [p[(2, 0)], p[(2, 1)], p[(2, 2)]],
            ],
            vertices: graph.positions().iter().map(|v| [v.x, v.y, v.z]).collect(),
            halfedges: graph
                .halfedges()
                .iter()
                .map(|he| (he.tail.0, he.head.0, he.cell.0))
                .collect(),
            inversions: graph.inversions().iter().map(|h| h.0).collect(),
            ..Self::default()
        }
    }

    /// Validate into a graph; derives inversions when the record has none.
    pub fn to_graph(&self) -> Result<PeriodicGraph, NetError> {
        let periods = Matrix3::from_fn(|r, c| self.periods[r][c]);
        let positions = self
            .vertices
            .iter()
            .map(|v| Vector3::new(v[0], v[1], v[2]))
            .collect();
        let halfedges: Vec<HalfEdge> = self
            .halfedges
            .iter()
            .map(|&(t, h, c)| HalfEdge::new(t, h, Cell(c)))
            .collect();
        if self.inversions.is_empty() && !halfedges.is_empty() {
            return PeriodicGraph::with_derived_inversions(periods, positions, halfedges);
        }
        let inversions = self.inversions.iter().map(|&i| HalfEdgeId(i)).collect();
        PeriodicGraph::new(periods, positions, halfedges, inversions)
    }

    /// Stored normals, if any; a length mismatch with `vertices` is malformed.
    pub fn normals(&self) -> Result<Option<Vec<Vector3<f64>>>, NetError> {
        if self.normals.is_empty() {
            return Ok(None);
        }
        if self.normals.len() != self.vertices.len() {
            return Err(NetError::malformed(format!(
                "{} normals for {} vertices",
                self.normals.len(),
                self.vertices.len()
            )));
        }
        Ok(Some(
            self.normals
                .iter()
                .map(|n| Vector3::new(n[0], n[1], n[2]))
                .collect(),
        ))
    }

    pub fn set_normals(&mut self, normals: &[Vector3<f64>]) {
        self.normals = normals.iter().map(|n| [n.x, n.y, n.z]).collect();
    }

    pub fn set_faces(&mut self, faces: &FaceSet) {
        self.faces = Some(faces.to_index_lists());
    }

    pub fn from_json_str(s: &str) -> Result<Self, NetError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String, NetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, NetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| NetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Write pretty JSON, creating parent directories as needed.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), NetError> {
        let path = path.as_ref();
        let io_err = |source| NetError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        fs::write(path, self.to_json_string()?).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use tempfile::tempdir;

    const SQUARE_JSON: &str = r#"{
        "periods": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        "vertices": [[0.0, 0.0, 0.0]],
        "halfedges": [[0, 0, [1, 0, 0]], [0, 0, [-1, 0, 0]], [0, 0, [0, 1, 0]], [0, 0, [0, -1, 0]]],
        "inversions": [1, 0, 3, 2],
        "normals": [],
        "symbol": "sql"
    }"#;

    #[test]
    fn parses_loader_output() {
        let rec = NetworkRecord::from_json_str(SQUARE_JSON).unwrap();
        assert_eq!(rec.halfedges[1], (0, 0, [-1, 0, 0]));
        assert_eq!(rec.normals().unwrap(), None);
        assert_eq!(rec.extra["symbol"], "sql");
        let g = rec.to_graph().unwrap();
        assert_eq!(g.num_halfedges(), 4);
        assert_eq!(g.inversion(HalfEdgeId(2)), HalfEdgeId(3));
    }

    #[test]
    fn missing_inversions_are_derived() {
        let mut rec = NetworkRecord::from_json_str(SQUARE_JSON).unwrap();
        rec.inversions.clear();
        let g = rec.to_graph().unwrap();
        let expected: Vec<HalfEdgeId> = [1, 0, 3, 2].into_iter().map(HalfEdgeId).collect();
        assert_eq!(g.inversions(), expected.as_slice());
    }

    #[test]
    fn broken_pairing_is_rejected() {
        let mut rec = NetworkRecord::from_json_str(SQUARE_JSON).unwrap();
        rec.inversions = vec![2, 3, 0, 1];
        assert!(matches!(
            rec.to_graph(),
            Err(NetError::MalformedGraph { .. })
        ));
    }

    #[test]
    fn unnegatable_cell_in_json_is_malformed() {
        let json = r#"{
            "periods": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            "vertices": [[0.0, 0.0, 0.0]],
            "halfedges": [[0, 0, [-2147483648, 0, 0]], [0, 0, [-2147483648, 0, 0]]],
            "inversions": [1, 0]
        }"#;
        let mut rec = NetworkRecord::from_json_str(json).unwrap();
        assert!(matches!(rec.to_graph(), Err(NetError::MalformedGraph { .. })));
        rec.inversions.clear();
        assert!(matches!(rec.to_graph(), Err(NetError::MalformedGraph { .. })));
    }

    #[test]
    fn normals_length_must_match() {
        let mut rec = NetworkRecord::from_json_str(SQUARE_JSON).unwrap();
        rec.normals = vec![[0.0, 0.0, 1.0], [0.0, 0.0, 1.0]];
        assert!(rec.normals().is_err());
    }

    #[test]
    fn file_round_trip_keeps_normals_and_extras() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("network_data.json");
        let g = fixtures::skew_triangular_net().unwrap();
        let mut rec = NetworkRecord::from_graph(&g);
        rec.set_normals(&[Vector3::z()]);
        rec.extra.insert("symbol".into(), Value::from("hxl"));
        rec.write(&path).unwrap();
        let back = NetworkRecord::read(&path).unwrap();
        assert_eq!(back, rec);
        assert_eq!(back.normals().unwrap(), Some(vec![Vector3::z()]));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = NetworkRecord::read("/nonexistent/network_data.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/network_data.json"));
    }
}
