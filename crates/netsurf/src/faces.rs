//! Face tracing over the half-edge structure and the triviality check.
//!
//! Rule: the face successor of `h` is `rotation[inversion[h]]` (step to the
//! twin at the head vertex, then turn to the next edge around that vertex).
//! Because rotation and inversion are both permutations, so is the face
//! successor; every walk returns to its start and each half-edge lies on
//! exactly one face.
//!
//! Translation bookkeeping is per walk: `offsets[i]` is the lattice cell in
//! which the i-th half-edge of the face starts, relative to the walk's first
//! half-edge, and `translation` is the total after the last step. A face is
//! trivial iff its translation is zero.

use nalgebra::Vector3;
use tracing::debug;

use crate::error::NetError;
use crate::graph::{Cell, FaceId, HalfEdgeId, PeriodicGraph};
use crate::rotation::RotationSystem;

/// One closed face walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Face {
    halfedges: Vec<HalfEdgeId>,
    offsets: Vec<Cell>,
    translation: Cell,
}

impl Face {
    #[inline]
    pub fn halfedges(&self) -> &[HalfEdgeId] {
        &self.halfedges
    }
    #[inline]
    pub fn offsets(&self) -> &[Cell] {
        &self.offsets
    }
    /// Sum of the cells along the walk.
    #[inline]
    pub fn translation(&self) -> Cell {
        self.translation
    }
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.translation.is_zero()
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.halfedges.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.halfedges.is_empty()
    }

    /// Ambient corner positions in walk order, unrolled through the periodic images.
    pub fn corners(&self, graph: &PeriodicGraph) -> Vec<Vector3<f64>> {
        self.halfedges
            .iter()
            .zip(&self.offsets)
            .map(|(&h, off)| graph.position(graph.halfedge(h).tail) + off.to_ambient(graph.periods()))
            .collect()
    }

    /// Mean of the unrolled corners.
    pub fn centroid(&self, graph: &PeriodicGraph) -> Vector3<f64> {
        let corners = self.corners(graph);
        if corners.is_empty() {
            return Vector3::zeros();
        }
        corners.iter().sum::<Vector3<f64>>() / corners.len() as f64
    }
}

/// Outcome of the triviality check. A non-trivial face is a result, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Triviality {
    Trivial,
    NonTrivial { face: FaceId, translation: Cell },
}

impl Triviality {
    #[inline]
    pub fn is_trivial(&self) -> bool {
        matches!(self, Triviality::Trivial)
    }
}

/// All faces of a traced surface plus the half-edge → face map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceSet {
    faces: Vec<Face>,
    face_of: Vec<FaceId>,
}

impl FaceSet {
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }
    #[inline]
    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f.0]
    }
    #[inline]
    pub fn face_of(&self, h: HalfEdgeId) -> FaceId {
        self.face_of[h.0]
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter().enumerate().map(|(i, f)| (FaceId(i), f))
    }

    /// First face with nonzero translation, in tracing order.
    pub fn triviality(&self) -> Triviality {
        self.iter()
            .find(|(_, f)| !f.is_trivial())
            .map_or(Triviality::Trivial, |(face, f)| Triviality::NonTrivial {
                face,
                translation: f.translation(),
            })
    }

    /// Faces as plain index lists, the persisted form.
    pub fn to_index_lists(&self) -> Vec<Vec<usize>> {
        self.faces
            .iter()
            .map(|f| f.halfedges.iter().map(|h| h.0).collect())
            .collect()
    }
}

/// `rotation[inversion[h]]`.
#[inline]
pub fn face_successor(graph: &PeriodicGraph, rotation: &RotationSystem, h: HalfEdgeId) -> HalfEdgeId {
    rotation.next(graph.inversion(h))
}

/// Trace every face. Starts are taken in half-edge index order, so the first
/// face begins at half-edge 0.
pub fn trace_faces(graph: &PeriodicGraph, rotation: &RotationSystem) -> Result<FaceSet, NetError> {
    let m = graph.num_halfedges();
    if rotation.len() != m {
        return Err(NetError::malformed(format!(
            "rotation system covers {} half-edges, graph has {m}",
            rotation.len()
        )));
    }
    let mut face_of: Vec<Option<FaceId>> = vec![None; m];
    let mut faces: Vec<Face> = Vec::new();
    for start in graph.halfedge_ids() {
        if face_of[start.0].is_some() {
            continue;
        }
        let id = FaceId(faces.len());
        let mut halfedges = Vec::new();
        let mut offsets = Vec::new();
        let mut offset = Cell::ZERO;
        let mut h = start;
        loop {
            if face_of[h.0].is_some() {
                return Err(NetError::malformed(format!(
                    "face walk from {start} re-entered {h} before closing"
                )));
            }
            face_of[h.0] = Some(id);
            halfedges.push(h);
            offsets.push(offset);
            offset = offset.checked_add(graph.halfedge(h).cell).ok_or_else(|| {
                NetError::malformed(format!("face walk from {start} overflows its cell offset at {h}"))
            })?;
            h = face_successor(graph, rotation, h);
            if h == start {
                break;
            }
        }
        faces.push(Face {
            halfedges,
            offsets,
            translation: offset,
        });
    }
    debug!(faces = faces.len(), halfedges = m, "faces traced");
    let face_of = face_of
        .into_iter()
        .map(|f| f.unwrap_or(FaceId(usize::MAX)))
        .collect();
    Ok(FaceSet { faces, face_of })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::NetCfg;
    use crate::fixtures;
    use crate::rotation::build_rotation_system;

    fn ids(v: &[usize]) -> Vec<HalfEdgeId> {
        v.iter().map(|&i| HalfEdgeId(i)).collect()
    }

    fn trace_with_normal(graph: &PeriodicGraph, normal: Vector3<f64>) -> FaceSet {
        let normals = vec![normal; graph.num_vertices()];
        let rot = build_rotation_system(graph, &normals, NetCfg::default()).unwrap();
        trace_faces(graph, &rot).unwrap()
    }

    #[test]
    fn square_net_traces_one_square() {
        let g = fixtures::square_net().unwrap();
        let faces = trace_with_normal(&g, Vector3::z());
        assert_eq!(faces.len(), 1);
        let f = faces.face(FaceId(0));
        assert_eq!(f.halfedges(), ids(&[0, 3, 1, 2]).as_slice());
        assert_eq!(
            f.offsets(),
            &[
                Cell::ZERO,
                Cell::new(1, 0, 0),
                Cell::new(1, -1, 0),
                Cell::new(0, -1, 0)
            ]
        );
        assert!(faces.triviality().is_trivial());
    }

    #[test]
    fn square_corners_unroll_through_images() {
        let g = fixtures::square_net().unwrap();
        let faces = trace_with_normal(&g, Vector3::z());
        let corners = faces.face(FaceId(0)).corners(&g);
        let expected = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
        ];
        for (c, e) in corners.iter().zip(expected.iter()) {
            assert!((c - e).norm() < 1e-12);
        }
        let centroid = faces.face(FaceId(0)).centroid(&g);
        assert!((centroid - Vector3::new(0.5, -0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn triangular_net_traces_two_trivial_triangles() {
        let g = fixtures::triangular_net().unwrap();
        let faces = trace_with_normal(&g, Vector3::z());
        assert_eq!(faces.to_index_lists(), vec![vec![0, 5, 2], vec![1, 4, 3]]);
        assert_eq!(faces.triviality(), Triviality::Trivial);
    }

    #[test]
    fn skew_net_faces_do_not_close_in_the_lattice() {
        let g = fixtures::skew_triangular_net().unwrap();
        for normal in [Vector3::z(), -Vector3::z()] {
            let faces = trace_with_normal(&g, normal);
            assert_eq!(faces.len(), 2);
            assert!(faces.faces().iter().all(|f| f.len() == 3));
            let mut translations: Vec<[i32; 3]> =
                faces.faces().iter().map(|f| f.translation().0).collect();
            translations.sort();
            assert_eq!(translations, vec![[-1, -1, 1], [1, 1, -1]]);
            assert_eq!(
                faces.triviality(),
                Triviality::NonTrivial {
                    face: FaceId(0),
                    translation: Cell::new(1, 1, -1)
                }
            );
        }
    }

    #[test]
    fn every_halfedge_belongs_to_exactly_one_face() {
        let g = fixtures::icosahedron().unwrap();
        let normals: Vec<_> = g.positions().iter().map(|p| p.normalize()).collect();
        let rot = build_rotation_system(&g, &normals, NetCfg::default()).unwrap();
        let faces = trace_faces(&g, &rot).unwrap();
        assert_eq!(faces.len(), 20);
        let mut seen = vec![0usize; g.num_halfedges()];
        for (id, f) in faces.iter() {
            assert_eq!(f.len(), 3);
            for &h in f.halfedges() {
                seen[h.0] += 1;
                assert_eq!(faces.face_of(h), id);
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
        assert!(faces.triviality().is_trivial());
    }

    #[test]
    fn rejects_rotation_of_another_graph() {
        let square = fixtures::square_net().unwrap();
        let tri = fixtures::triangular_net().unwrap();
        let rot = build_rotation_system(&tri, &[Vector3::z()], NetCfg::default()).unwrap();
        assert!(matches!(
            trace_faces(&square, &rot),
            Err(NetError::MalformedGraph { .. })
        ));
    }
}
