//! Face reconstruction for 3-periodic nets.
//!
//! Given a quotient graph (vertex positions, a 3×3 period matrix, half-edges
//! tagged with the lattice cell they cross, and their pairing), estimate a
//! tangent-plane normal per vertex, orient the normals consistently, build the
//! rotation system and trace it into faces; a net embeds as a periodic
//! polyhedral surface iff every face has zero net lattice translation.
//!
//! Stages (leaves first): `graph` → `frame` → `orient` → `rotation` → `faces`;
//! `diagnostics` only needs `graph` and `frame`. `pipeline` chains the stages,
//! `record` is the persisted JSON form, `fixtures` holds hand-built nets.

pub mod api;
pub mod cfg;
pub mod diagnostics;
pub mod error;
pub mod faces;
pub mod fixtures;
pub mod frame;
pub mod graph;
pub mod orient;
pub mod pipeline;
pub mod record;
pub mod rotation;

#[cfg(test)]
mod properties;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::NetCfg;
pub use error::NetError;
pub use nalgebra::{Matrix3 as Mat3, Vector3 as Vec3};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::NetCfg;
    pub use crate::diagnostics::{check_coplanarity, check_orthogonality, Coplanarity, OrthogonalEdge};
    pub use crate::error::NetError;
    pub use crate::faces::{Face, FaceSet, Triviality};
    pub use crate::graph::{Cell, FaceId, HalfEdge, HalfEdgeId, PeriodicGraph, VertexId};
    pub use crate::pipeline::{reconstruct_surface, Surface};
    pub use crate::record::NetworkRecord;
    pub use nalgebra::{Matrix3 as Mat3, Vector3 as Vec3};
}
