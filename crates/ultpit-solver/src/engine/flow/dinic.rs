//! Dinic's maximum flow over an adjacency arena.
//!
//! Arcs are stored in pairs: arc `a` and its residual twin `a ^ 1`.

use std::collections::VecDeque;

use super::network::FlowNetwork;

const UNREACHED: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub(super) struct Dinic {
    adjacency: Vec<Vec<usize>>,
    head: Vec<usize>,
    residual: Vec<u64>,
    level: Vec<u32>,
    cursor: Vec<usize>,
}

impl Dinic {
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            head: Vec::new(),
            residual: Vec::new(),
            level: vec![UNREACHED; node_count],
            cursor: vec![0; node_count],
        }
    }

    pub fn from_network(network: &FlowNetwork) -> Self {
        let mut dinic = Self::new(network.node_count());
        for arc in network.arcs() {
            dinic.add_arc(arc.from, arc.to, arc.capacity);
        }
        dinic
    }

    pub fn add_arc(&mut self, from: usize, to: usize, capacity: u64) {
        let a = self.head.len();
        self.head.push(to);
        self.residual.push(capacity);
        self.adjacency[from].push(a);
        self.head.push(from);
        self.residual.push(0);
        self.adjacency[to].push(a + 1);
    }

    /// Pushes as much flow as possible from `source` to `sink`.
    pub fn max_flow(&mut self, source: usize, sink: usize) -> u64 {
        let mut flow = 0u64;
        if source == sink {
            return flow;
        }
        while self.build_levels(source, sink) {
            self.cursor.iter_mut().for_each(|c| *c = 0);
            flow = flow.saturating_add(self.blocking_flow(source, sink));
        }
        flow
    }

    /// Nodes reachable from `source` through arcs with residual capacity.
    pub fn reachable_from(&self, source: usize) -> Vec<bool> {
        let mut seen = vec![false; self.adjacency.len()];
        let mut queue = VecDeque::from([source]);
        seen[source] = true;
        while let Some(u) = queue.pop_front() {
            for &a in &self.adjacency[u] {
                let v = self.head[a];
                if self.residual[a] > 0 && !seen[v] {
                    seen[v] = true;
                    queue.push_back(v);
                }
            }
        }
        seen
    }

    fn build_levels(&mut self, source: usize, sink: usize) -> bool {
        self.level.iter_mut().for_each(|l| *l = UNREACHED);
        self.level[source] = 0;
        let mut queue = VecDeque::from([source]);
        while let Some(u) = queue.pop_front() {
            for &a in &self.adjacency[u] {
                let v = self.head[a];
                if self.residual[a] > 0 && self.level[v] == UNREACHED {
                    self.level[v] = self.level[u] + 1;
                    queue.push_back(v);
                }
            }
        }
        self.level[sink] != UNREACHED
    }

    /// Saturates every shortest augmenting path in the level graph.
    fn blocking_flow(&mut self, source: usize, sink: usize) -> u64 {
        let mut total = 0u64;
        let mut path: Vec<usize> = Vec::new();
        let mut u = source;

        loop {
            if u == sink {
                let push = path.iter().map(|&a| self.residual[a]).min().unwrap_or(0);
                for &a in &path {
                    self.residual[a] -= push;
                    self.residual[a ^ 1] = self.residual[a ^ 1].saturating_add(push);
                }
                total = total.saturating_add(push);

                // Resume from the tail of the first saturated arc.
                let saturated = path
                    .iter()
                    .position(|&a| self.residual[a] == 0)
                    .unwrap_or(0);
                path.truncate(saturated);
                u = path.last().map_or(source, |&a| self.head[a]);
                continue;
            }

            let mut advanced = false;
            while self.cursor[u] < self.adjacency[u].len() {
                let a = self.adjacency[u][self.cursor[u]];
                let v = self.head[a];
                if self.residual[a] > 0
                    && self.level[v] != UNREACHED
                    && self.level[v] == self.level[u] + 1
                {
                    path.push(a);
                    u = v;
                    advanced = true;
                    break;
                }
                self.cursor[u] += 1;
            }
            if advanced {
                continue;
            }

            // Dead end: retreat one arc and skip it from now on.
            self.level[u] = UNREACHED;
            match path.pop() {
                Some(a) => {
                    u = self.head[a ^ 1];
                    self.cursor[u] += 1;
                }
                None => return total,
            }
        }
    }
}
