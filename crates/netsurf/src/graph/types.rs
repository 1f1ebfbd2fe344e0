//! Identifier and value types of the periodic graph.
//!
//! Kept small and explicit so `build`, the traversals and the record layer read
//! the same vocabulary.

use std::fmt;
use std::ops::{Add, AddAssign, Neg};

use nalgebra::{Matrix3, Vector3};

/// Identifier types for clarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdgeId(pub usize);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for HalfEdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Lattice translation: how many periods along each basis vector a half-edge crosses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell(pub [i32; 3]);

impl Cell {
    pub const ZERO: Cell = Cell([0, 0, 0]);

    #[inline]
    pub fn new(a: i32, b: i32, c: i32) -> Self {
        Self([a, b, c])
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0]
    }

    /// `-self`, or `None` when a component is `i32::MIN`.
    pub fn checked_neg(&self) -> Option<Cell> {
        Some(Cell([
            self.0[0].checked_neg()?,
            self.0[1].checked_neg()?,
            self.0[2].checked_neg()?,
        ]))
    }

    pub fn checked_add(&self, rhs: Cell) -> Option<Cell> {
        Some(Cell([
            self.0[0].checked_add(rhs.0[0])?,
            self.0[1].checked_add(rhs.0[1])?,
            self.0[2].checked_add(rhs.0[2])?,
        ]))
    }

    /// Ambient translation `c · periods` (rows of `periods` are the basis).
    #[inline]
    pub fn to_ambient(&self, periods: &Matrix3<f64>) -> Vector3<f64> {
        let c = Vector3::new(self.0[0] as f64, self.0[1] as f64, self.0[2] as f64);
        periods.transpose() * c
    }
}

impl Add for Cell {
    type Output = Cell;
    #[inline]
    fn add(self, rhs: Cell) -> Cell {
        Cell([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
        ])
    }
}

impl AddAssign for Cell {
    #[inline]
    fn add_assign(&mut self, rhs: Cell) {
        *self = *self + rhs;
    }
}

impl Neg for Cell {
    type Output = Cell;
    #[inline]
    fn neg(self) -> Cell {
        Cell([-self.0[0], -self.0[1], -self.0[2]])
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

/// Directed edge from `tail` to the image of `head` in lattice cell `cell`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HalfEdge {
    pub tail: VertexId,
    pub head: VertexId,
    pub cell: Cell,
}

impl HalfEdge {
    #[inline]
    pub fn new(tail: usize, head: usize, cell: Cell) -> Self {
        Self {
            tail: VertexId(tail),
            head: VertexId(head),
            cell,
        }
    }

    /// The reverse-direction twin this half-edge must be paired with.
    #[inline]
    pub fn reversed(&self) -> Self {
        Self {
            tail: self.head,
            head: self.tail,
            cell: -self.cell,
        }
    }

    /// [`HalfEdge::reversed`] for cells read from untrusted input.
    pub fn checked_reversed(&self) -> Option<Self> {
        Some(Self {
            tail: self.head,
            head: self.tail,
            cell: self.cell.checked_neg()?,
        })
    }
}
