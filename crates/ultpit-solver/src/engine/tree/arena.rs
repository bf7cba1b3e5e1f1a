//! Vertex and edge storage for the normalized tree.
//!
//! Vertices and edges live in flat vectors and refer to each other by index.
//! Every vertex owns exactly one edge towards the root (its `root_edge`), so
//! there are as many edges as vertices.

use smallvec::SmallVec;

/// Parent of edges that hang directly from the root.
pub(super) const ROOT: usize = usize::MAX;

pub(super) type ChildEdges = SmallVec<[usize; 4]>;

/// Orientation of an edge relative to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Direction {
    /// Points away from the root: `source` is the parent.
    Outbound,
    /// Points towards the root: `target` is the parent.
    Inbound,
}

#[derive(Debug, Clone)]
pub(super) struct Edge {
    pub source: usize,
    pub target: usize,
    /// Total value of the subtree on the child side.
    pub mass: f64,
    pub direction: Direction,
}

impl Edge {
    pub fn root(child: usize, mass: f64) -> Self {
        Self {
            source: ROOT,
            target: child,
            mass,
            direction: Direction::Outbound,
        }
    }

    #[inline]
    pub fn parent(&self) -> usize {
        match self.direction {
            Direction::Outbound => self.source,
            Direction::Inbound => self.target,
        }
    }

    #[inline]
    pub fn child(&self) -> usize {
        match self.direction {
            Direction::Outbound => self.target,
            Direction::Inbound => self.source,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent() == ROOT
    }

    /// An outbound edge carrying positive mass, or an inbound edge carrying
    /// none. Root edges are never strong.
    #[inline]
    pub fn is_strong(&self) -> bool {
        !self.is_root() && (self.mass > 0.0) == (self.direction == Direction::Outbound)
    }

    /// Swaps parent and child without moving the endpoints.
    pub fn flip(&mut self) {
        self.direction = match self.direction {
            Direction::Outbound => Direction::Inbound,
            Direction::Inbound => Direction::Outbound,
        };
    }
}

#[derive(Debug, Clone)]
pub(super) struct Vertex {
    /// Member of a branch with positive mass.
    pub strong: bool,
    pub root_edge: usize,
    /// Child edges pointing away from this vertex.
    pub out_edges: ChildEdges,
    /// Child edges pointing into this vertex.
    pub in_edges: ChildEdges,
}

impl Vertex {
    pub fn new(root_edge: usize, strong: bool) -> Self {
        Self {
            strong,
            root_edge,
            out_edges: ChildEdges::new(),
            in_edges: ChildEdges::new(),
        }
    }

    pub fn children_mut(&mut self, direction: Direction) -> &mut ChildEdges {
        match direction {
            Direction::Outbound => &mut self.out_edges,
            Direction::Inbound => &mut self.in_edges,
        }
    }

    /// Removes `edge` from the child list for `direction`.
    pub fn detach(&mut self, edge: usize, direction: Direction) -> bool {
        let list = self.children_mut(direction);
        match list.iter().position(|&e| e == edge) {
            Some(pos) => {
                list.swap_remove(pos);
                true
            }
            None => false,
        }
    }
}
