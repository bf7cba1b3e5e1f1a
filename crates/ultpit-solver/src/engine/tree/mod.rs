//! Normalized-tree (Lerchs-Grossmann) maximum closure.
//!
//! Every block is a vertex hanging in a forest below an implicit root. The
//! edge above a vertex carries the total value of the subtree below it. A
//! branch (the subtree under one root edge) is strong when its mass is
//! positive, and every vertex of a strong branch is in the current pit.
//!
//! The solver scans vertices cyclically. A strong vertex with a weak support
//! is merged into the support's branch, which may leave edges whose mass
//! disagrees with their direction ("strong edges"). Those are cut off into
//! branches of their own until the tree is normalized again. When a full
//! cycle finds no violated support the strong vertices form the optimal pit.

mod arena;

use std::collections::VecDeque;

use tracing::{debug, trace};
use ultpit_core::Precedence;

use self::arena::{Direction, Edge, Vertex, ROOT};
use super::{check_problem, Engine};
use crate::error::EngineError;

/// Work counters of one normalized-tree solve.
///
/// # Example
///
/// ```
/// use ultpit_core::Precedence;
/// use ultpit_solver::NormalizedTree;
///
/// let mut pre = Precedence::with_block_count(2);
/// let above = pre.add_definition(vec![1]);
/// pre.set_key(0, Some(above));
///
/// let mut tree = NormalizedTree::new(&[5.0, -2.0], &pre).unwrap();
/// tree.solve().unwrap();
/// assert_eq!(tree.selection(), vec![true, true]);
/// assert_eq!(tree.stats().merges, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Vertices inspected by the scan.
    pub visits: u64,
    /// Strong branches merged under a weak support.
    pub merges: u64,
    /// Strong edges cut into branches of their own.
    pub cuts: u64,
}

/// Mutable forest state for one realization.
#[derive(Debug)]
pub struct NormalizedTree<'p> {
    values: Vec<f64>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    precedence: &'p Precedence,
    plus_queue: VecDeque<usize>,
    minus_queue: VecDeque<usize>,
    stack: Vec<usize>,
    stats: TreeStats,
    visit_limit: Option<u64>,
}

impl<'p> NormalizedTree<'p> {
    /// Builds the initial forest: every vertex hangs directly from the root
    /// and is strong exactly when its own value is positive.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidProblem`] if `precedence` doesn't fit
    /// `values` or a value is not finite.
    pub fn new(values: &[f64], precedence: &'p Precedence) -> Result<Self, EngineError> {
        check_problem(values, precedence)?;
        let edges: Vec<Edge> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Edge::root(i, v))
            .collect();
        let vertices = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Vertex::new(i, v > 0.0))
            .collect();
        Ok(Self {
            values: values.to_vec(),
            vertices,
            edges,
            precedence,
            plus_queue: VecDeque::new(),
            minus_queue: VecDeque::new(),
            stack: Vec::new(),
            stats: TreeStats::default(),
            visit_limit: None,
        })
    }

    /// Aborts the scan with an internal error after `limit` visits.
    pub fn with_visit_limit(mut self, limit: u64) -> Self {
        self.visit_limit = Some(limit);
        self
    }

    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    /// Current pit: the vertices of strong branches.
    pub fn selection(&self) -> Vec<bool> {
        self.vertices.iter().map(|v| v.strong).collect()
    }

    /// Scans until a full cycle over the vertices makes no change.
    pub fn solve(&mut self) -> Result<(), EngineError> {
        let n = self.vertices.len();
        let mut since_change = 0usize;
        let mut xk = 0usize;

        while since_change < n {
            self.stats.visits += 1;
            if let Some(limit) = self.visit_limit {
                if self.stats.visits > limit {
                    return Err(EngineError::Internal(format!(
                        "scan exceeded {limit} vertex visits"
                    )));
                }
            }

            match self.weak_support(xk) {
                Some(xi) => {
                    self.merge(xk, xi)?;
                    self.normalize()?;
                    since_change = 0;
                }
                None => since_change += 1,
            }
            xk = (xk + 1) % n;
        }
        Ok(())
    }

    /// First unselected support of a selected vertex.
    fn weak_support(&self, xk: usize) -> Option<usize> {
        if !self.vertices[xk].strong {
            return None;
        }
        self.precedence
            .supports(xk)
            .find(|&xi| !self.vertices[xi].strong)
    }

    /// Edges from `v` up to and including its branch's root edge.
    fn path_to_root(&self, v: usize) -> Result<Vec<usize>, EngineError> {
        let mut path = Vec::new();
        let mut current = v;
        loop {
            let e = self.vertices[current].root_edge;
            path.push(e);
            let parent = self.edges[e].parent();
            if parent == ROOT {
                return Ok(path);
            }
            if path.len() > self.vertices.len() {
                return Err(EngineError::Internal(format!(
                    "no path to root from vertex {v}"
                )));
            }
            current = parent;
        }
    }

    fn detach_child(&mut self, e: usize) -> Result<(), EngineError> {
        let edge = &self.edges[e];
        let (parent, direction) = (edge.parent(), edge.direction);
        if parent == ROOT || !self.vertices[parent].detach(e, direction) {
            return Err(EngineError::Internal(format!(
                "edge {e} missing from the children of vertex {parent}"
            )));
        }
        Ok(())
    }

    fn attach_child(&mut self, e: usize) {
        let edge = &self.edges[e];
        let (parent, direction) = (edge.parent(), edge.direction);
        self.vertices[parent].children_mut(direction).push(e);
    }

    fn enqueue_if_strong(&mut self, e: usize) {
        let edge = &self.edges[e];
        if edge.is_strong() {
            match edge.direction {
                Direction::Outbound => self.plus_queue.push_back(e),
                Direction::Inbound => self.minus_queue.push_back(e),
            }
        }
    }

    /// Hangs the strong branch of `xk` below the weak vertex `xi`.
    ///
    /// The branch is re-rooted at `xk` by reversing the path from `xk` to its
    /// old branch root, and the freed root edge becomes the edge `xk -> xi`.
    fn merge(&mut self, xk: usize, xi: usize) -> Result<(), EngineError> {
        let mut path = self.path_to_root(xk)?;
        let base = path
            .pop()
            .ok_or_else(|| EngineError::Internal(format!("empty root path at vertex {xk}")))?;
        let total = self.edges[base].mass;

        for &e in path.iter().rev() {
            let far = self.edges[e].parent();
            self.detach_child(e)?;
            let edge = &mut self.edges[e];
            edge.flip();
            edge.mass = total - edge.mass;
            self.vertices[far].root_edge = e;
            self.attach_child(e);
            self.enqueue_if_strong(e);
        }

        self.edges[base] = Edge {
            source: xk,
            target: xi,
            mass: total,
            direction: Direction::Inbound,
        };
        self.vertices[xk].root_edge = base;
        self.attach_child(base);
        self.enqueue_if_strong(base);

        let path = self.path_to_root(xi)?;
        for &e in &path {
            self.edges[e].mass += total;
            self.enqueue_if_strong(e);
        }
        let top = *path
            .last()
            .ok_or_else(|| EngineError::Internal(format!("empty root path at vertex {xi}")))?;
        let mass = self.edges[top].mass;
        let branch_root = self.edges[top].child();

        self.stats.merges += 1;
        trace!(event = "merge", xk, xi, moved = total, branch_mass = mass);

        if mass > 0.0 {
            // The subtree under `xk` was a strong branch already.
            self.mark_branch(branch_root, true, Some(xk));
        } else {
            self.mark_branch(branch_root, false, None);
        }
        Ok(())
    }

    /// Cuts queued strong edges, plus queue first, until none remain.
    fn normalize(&mut self) -> Result<(), EngineError> {
        loop {
            let Some(e) = self
                .plus_queue
                .pop_front()
                .or_else(|| self.minus_queue.pop_front())
            else {
                return Ok(());
            };
            if self.edges[e].is_strong() {
                self.cut(e)?;
            }
        }
    }

    /// Detaches the subtree below strong edge `e` into its own branch.
    fn cut(&mut self, e: usize) -> Result<(), EngineError> {
        let parent = self.edges[e].parent();
        let child = self.edges[e].child();
        let mass = self.edges[e].mass;

        self.detach_child(e)?;
        let path = self.path_to_root(parent)?;
        for &p in &path {
            self.edges[p].mass -= mass;
            self.enqueue_if_strong(p);
        }
        self.edges[e] = Edge::root(child, mass);
        self.stats.cuts += 1;

        let top = *path
            .last()
            .ok_or_else(|| EngineError::Internal(format!("empty root path at vertex {parent}")))?;
        let rest_root = self.edges[top].child();
        let rest_strong = self.edges[top].mass > 0.0;
        let cut_strong = mass > 0.0;

        // Both pieces still carry the strength of the branch they came from.
        if self.vertices[child].strong != cut_strong {
            self.mark_branch(child, cut_strong, None);
        }
        if self.vertices[rest_root].strong != rest_strong {
            self.mark_branch(rest_root, rest_strong, None);
        }
        Ok(())
    }

    /// Sets the strength of every vertex below and including `start`.
    fn mark_branch(&mut self, start: usize, strong: bool, skip_below: Option<usize>) {
        let mut stack = std::mem::take(&mut self.stack);
        stack.push(start);
        while let Some(v) = stack.pop() {
            let vertex = &mut self.vertices[v];
            vertex.strong = strong;
            if skip_below == Some(v) {
                continue;
            }
            stack.extend(vertex.out_edges.iter().map(|&e| self.edges[e].target));
            stack.extend(vertex.in_edges.iter().map(|&e| self.edges[e].source));
        }
        self.stack = stack;
    }

    /// Checks the structural invariants of the forest.
    ///
    /// Every vertex reaches the root, every non-root edge is listed among its
    /// parent's children, edge masses equal subtree value sums, and vertex
    /// strength matches the sign of its branch mass. After [`solve`](Self::solve)
    /// no edge is strong either.
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        let n = self.vertices.len();
        let mut depth = vec![0usize; n];
        let mut branch_mass = vec![0.0f64; n];

        for (v, vertex) in self.vertices.iter().enumerate() {
            let edge = &self.edges[vertex.root_edge];
            if edge.child() != v {
                return Err(EngineError::Internal(format!(
                    "root edge {} of vertex {v} has child {}",
                    vertex.root_edge,
                    edge.child()
                )));
            }
            if !edge.is_root() {
                let parent = &self.vertices[edge.parent()];
                let listed = match edge.direction {
                    Direction::Outbound => &parent.out_edges,
                    Direction::Inbound => &parent.in_edges,
                };
                if !listed.contains(&vertex.root_edge) {
                    return Err(EngineError::Internal(format!(
                        "edge {} not listed at its parent",
                        vertex.root_edge
                    )));
                }
            }
            let path = self.path_to_root(v)?;
            depth[v] = path.len();
            if let Some(&top) = path.last() {
                branch_mass[v] = self.edges[top].mass;
            }
        }

        let listed: usize = self
            .vertices
            .iter()
            .map(|v| v.out_edges.len() + v.in_edges.len())
            .sum();
        let roots = self.edges.iter().filter(|e| e.is_root()).count();
        if listed + roots != n {
            return Err(EngineError::Internal(format!(
                "{listed} child edges and {roots} root edges for {n} vertices"
            )));
        }

        // Deepest vertices first, so children are summed before parents.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_unstable_by(|a, b| depth[*b].cmp(&depth[*a]));
        let mut sums = self.values.clone();
        for &v in &order {
            let e = self.vertices[v].root_edge;
            let edge = &self.edges[e];
            let tolerance = 1e-6 * (1.0 + sums[v].abs());
            if (edge.mass - sums[v]).abs() > tolerance {
                return Err(EngineError::Internal(format!(
                    "edge {e} has mass {} but its subtree sums to {}",
                    edge.mass, sums[v]
                )));
            }
            if !edge.is_root() {
                sums[edge.parent()] += sums[v];
            }
            if self.vertices[v].strong != (branch_mass[v] > 0.0) {
                return Err(EngineError::Internal(format!(
                    "vertex {v} strength disagrees with branch mass {}",
                    branch_mass[v]
                )));
            }
        }
        Ok(())
    }

    /// True if some non-root edge is strong.
    pub fn has_strong_edges(&self) -> bool {
        self.edges.iter().any(Edge::is_strong)
    }
}

/// Engine backed by [`NormalizedTree`].
#[derive(Debug, Default)]
pub struct LerchsGrossmannEngine {
    visit_limit: Option<u64>,
    last_stats: Option<TreeStats>,
}

impl LerchsGrossmannEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails any solve that needs more than `limit` vertex visits.
    pub fn with_visit_limit(mut self, limit: u64) -> Self {
        self.visit_limit = Some(limit);
        self
    }

    /// Counters of the most recent successful solve.
    pub fn last_stats(&self) -> Option<TreeStats> {
        self.last_stats
    }
}

impl Engine for LerchsGrossmannEngine {
    fn engine_name(&self) -> &'static str {
        "lerchs_grossmann"
    }

    fn solve(
        &mut self,
        values: &[f64],
        precedence: &Precedence,
    ) -> Result<Vec<bool>, EngineError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let mut tree = NormalizedTree::new(values, precedence)?;
        if let Some(limit) = self.visit_limit {
            tree = tree.with_visit_limit(limit);
        }
        tree.solve()?;

        let stats = tree.stats();
        debug!(
            event = "tree_solved",
            vertices = values.len(),
            visits = stats.visits,
            merges = stats.merges,
            cuts = stats.cuts,
        );
        self.last_stats = Some(stats);
        Ok(tree.selection())
    }
}
