//! Precedence (support) constraints between blocks.
//!
//! A *definition* is a list of 1D index offsets: block `i` may only be mined
//! when every block `i + offset` is mined too. Blocks share definitions through
//! a small deduplicated table and point into it with a per-block *key*.

mod bench;

use std::collections::HashMap;

use tracing::info;

use crate::error::{Result, UltpitError};

pub use bench::{
    generate, BenchTemplate, PrecedenceMethod, PrecedenceParams, MAX_BENCHES, MAX_SLOPE,
    MIN_BENCHES, MIN_SLOPE,
};

/// Per-block keys into a deduplicated table of support-offset definitions.
///
/// # Example
///
/// ```
/// use ultpit_core::Precedence;
///
/// let mut pre = Precedence::with_block_count(4);
/// let above = pre.add_definition(vec![2]);
/// assert_eq!(pre.add_definition(vec![2]), above);
/// pre.set_key(0, Some(above));
/// pre.set_key(1, Some(above));
///
/// assert_eq!(pre.definition_count(), 1);
/// assert_eq!(pre.supports(1).collect::<Vec<_>>(), vec![3]);
/// assert_eq!(pre.supports(2).count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Precedence {
    keys: Vec<Option<usize>>,
    defs: Vec<Vec<isize>>,
    lookup: HashMap<Vec<isize>, usize>,
}

impl PartialEq for Precedence {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.defs == other.defs
    }
}

impl Precedence {
    /// An unconstrained table for `n` blocks.
    pub fn with_block_count(n: usize) -> Self {
        Self {
            keys: vec![None; n],
            defs: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Builds a table from explicit keys and definitions.
    ///
    /// Duplicate definitions are kept as given; lookups resolve to the first.
    pub fn from_parts(keys: Vec<Option<usize>>, defs: Vec<Vec<isize>>) -> Self {
        let mut lookup = HashMap::with_capacity(defs.len());
        for (idx, def) in defs.iter().enumerate() {
            lookup.entry(def.clone()).or_insert(idx);
        }
        Self { keys, defs, lookup }
    }

    /// Adds a definition unless an identical sequence exists; returns its key.
    pub fn add_definition(&mut self, def: Vec<isize>) -> usize {
        if let Some(&idx) = self.lookup.get(&def) {
            return idx;
        }
        let idx = self.defs.len();
        self.lookup.insert(def.clone(), idx);
        self.defs.push(def);
        idx
    }

    pub fn set_key(&mut self, block: usize, key: Option<usize>) {
        self.keys[block] = key;
    }

    /// Number of blocks covered by the key array.
    pub fn block_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[Option<usize>] {
        &self.keys
    }

    pub fn definitions(&self) -> &[Vec<isize>] {
        &self.defs
    }

    pub fn definition_count(&self) -> usize {
        self.defs.len()
    }

    #[inline]
    pub fn key(&self, block: usize) -> Option<usize> {
        self.keys[block]
    }

    /// Support offsets of `block`, if it has a key.
    #[inline]
    pub fn definition(&self, block: usize) -> Option<&[isize]> {
        self.keys[block].map(|k| self.defs[k].as_slice())
    }

    /// Absolute indices of the blocks that must be mined with `block`.
    pub fn supports(&self, block: usize) -> impl Iterator<Item = usize> + '_ {
        self.definition(block)
            .unwrap_or(&[])
            .iter()
            .map(move |&off| block.wrapping_add_signed(off))
    }

    /// Number of blocks carrying a key.
    pub fn keyed_count(&self) -> usize {
        self.keys.iter().filter(|k| k.is_some()).count()
    }

    /// Total number of support arcs over all blocks.
    pub fn arc_count(&self) -> u64 {
        self.keys
            .iter()
            .flatten()
            .map(|&k| self.defs[k].len() as u64)
            .sum()
    }

    /// Checks that keys and offsets are consistent with `block_count` blocks.
    ///
    /// # Errors
    ///
    /// Returns [`UltpitError::InputData`] describing the first inconsistency.
    pub fn validate(&self, block_count: usize) -> Result<()> {
        if self.keys.len() != block_count {
            return Err(UltpitError::InputData(format!(
                "precedence covers {} blocks, problem has {block_count}",
                self.keys.len()
            )));
        }
        for (block, key) in self.keys.iter().enumerate() {
            let Some(key) = *key else { continue };
            let def = self.defs.get(key).ok_or_else(|| {
                UltpitError::InputData(format!("block {block} has unknown key {key}"))
            })?;
            for &off in def {
                let target = block as isize + off;
                if target < 0 || target >= block_count as isize || off == 0 {
                    return Err(UltpitError::InputData(format!(
                        "block {block} has support offset {off} outside the problem"
                    )));
                }
            }
        }
        Ok(())
    }

    /// One ascending pass marking the supports of every marked block.
    ///
    /// Generated offsets always point to higher indices, so a single pass
    /// reaches the whole support chain.
    pub fn close(&self, marks: &mut [bool]) {
        for i in 0..marks.len() {
            if !marks[i] {
                continue;
            }
            if let Some(key) = self.keys[i] {
                for &off in &self.defs[key] {
                    marks[i.wrapping_add_signed(off)] = true;
                }
            }
        }
    }

    /// True if every marked block has all of its supports marked.
    pub fn is_closed(&self, marks: &[bool]) -> bool {
        (0..marks.len())
            .filter(|&i| marks[i])
            .all(|i| self.supports(i).all(|t| marks[t]))
    }

    /// Logs key and arc counts under `label`.
    pub fn log_summary(&self, label: &str) {
        let keyed = self.keyed_count();
        info!(
            event = "precedence_summary",
            label,
            keys = self.keys.len(),
            with_arcs = keyed,
            without_arcs = self.keys.len() - keyed,
            definitions = self.defs.len(),
            arcs = self.arc_count(),
        );
    }
}
