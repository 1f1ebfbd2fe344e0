//! Periodic graph model: vertices, lattice periods, half-edges and their pairing.
//!
//! Purpose
//! - Hold the quotient graph of a 3-periodic net exactly as the external loader
//!   produced it, validated once at construction and immutable afterwards.
//! - Provide the one adjacency-by-tail index reused by frame fitting, rotation
//!   building and every diagnostic.
//!
//! Conventions
//! - Positions are ambient (already expanded through the period matrix).
//! - `periods` rows are the lattice basis vectors; a half-edge `(t, h, c)` ends at
//!   `position[h] + c · periods`.
//! - Every graph edge contributes two half-edges whose cells are negatives of
//!   each other; `inversion` pairs them.
//!
//! Layout: `types.rs` (ids, cells, half-edges), `build.rs` (construction,
//! validation, inversion derivation).

mod build;
mod types;

pub use build::{derive_inversions, PeriodicGraph};
pub use types::{Cell, FaceId, HalfEdge, HalfEdgeId, VertexId};
