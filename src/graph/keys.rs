//! Multigraph edge-key allocation
//!
//! Keys are allocated per endpoint pair from a counter that starts at 0 and
//! only moves forward, so a key is never handed out twice even after the
//! edge it named was removed. Each pair also tracks its live keys in
//! insertion order, which gives keyless removal its LIFO order.

use super::types::{EdgeKey, NodeId};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;

type PairId = (NodeId, NodeId);

#[derive(Debug, Clone, Default)]
struct PairKeys {
    /// Next key to hand out.
    next: u64,
    /// Live keys, oldest first.
    live: IndexSet<EdgeKey, FxBuildHasher>,
}

/// Per-store key allocator, partitioned by endpoint pair.
///
/// For undirected stores `(u, v)` and `(v, u)` name the same partition.
///
/// A partition outlives its last edge so its counter keeps moving forward;
/// memory grows with the number of distinct pairs ever touched, including
/// across `clear()`.
#[derive(Debug, Clone)]
pub struct EdgeKeyAllocator {
    directed: bool,
    pairs: IndexMap<PairId, PairKeys, FxBuildHasher>,
}

impl EdgeKeyAllocator {
    pub fn new(directed: bool) -> Self {
        EdgeKeyAllocator {
            directed,
            pairs: IndexMap::default(),
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    fn pair_id(&self, u: &NodeId, v: &NodeId) -> PairId {
        if !self.directed && v < u {
            (v.clone(), u.clone())
        } else {
            (u.clone(), v.clone())
        }
    }

    fn pair(&self, u: &NodeId, v: &NodeId) -> Option<&PairKeys> {
        self.pairs.get(&self.pair_id(u, v))
    }

    /// Hand out the next key for `(u, v)` and mark it live.
    pub fn allocate(&mut self, u: &NodeId, v: &NodeId) -> EdgeKey {
        let id = self.pair_id(u, v);
        let pair = self.pairs.entry(id).or_default();
        let key = EdgeKey(pair.next);
        pair.next += 1;
        pair.live.insert(key);
        key
    }

    /// Mark a caller-chosen key live. The counter is raised past it so
    /// later allocations cannot collide with it.
    ///
    /// Returns `false` if the key was already live.
    pub fn register(&mut self, u: &NodeId, v: &NodeId, key: EdgeKey) -> bool {
        let id = self.pair_id(u, v);
        let pair = self.pairs.entry(id).or_default();
        if key.0 >= pair.next {
            pair.next = key.0.saturating_add(1);
        }
        pair.live.insert(key)
    }

    /// Drop `key` from the live set. The counter is untouched.
    pub fn release(&mut self, u: &NodeId, v: &NodeId, key: EdgeKey) -> bool {
        let id = self.pair_id(u, v);
        match self.pairs.get_mut(&id) {
            Some(pair) => pair.live.shift_remove(&key),
            None => false,
        }
    }

    /// Most recently inserted key that is still live.
    pub fn most_recent(&self, u: &NodeId, v: &NodeId) -> Option<EdgeKey> {
        self.pair(u, v).and_then(|pair| pair.live.last().copied())
    }

    /// Key the next [`allocate`](Self::allocate) would return.
    pub fn peek(&self, u: &NodeId, v: &NodeId) -> EdgeKey {
        EdgeKey(self.pair(u, v).map_or(0, |pair| pair.next))
    }

    /// Live keys for `(u, v)`, oldest first.
    pub fn live_keys(&self, u: &NodeId, v: &NodeId) -> Vec<EdgeKey> {
        self.pair(u, v)
            .map(|pair| pair.live.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Release every live key; counters are kept.
    pub fn release_all(&mut self) {
        for pair in self.pairs.values_mut() {
            pair.live.clear();
        }
    }

    /// Raise this allocator's counters to at least those of `other`.
    ///
    /// Used after a copy or conversion so the new store keeps honouring
    /// the never-reuse rule of its source. With `swap` the source pairs are
    /// read as `(v, u)`; pairs are re-canonicalized for this allocator's
    /// directedness, so one undirected pair may absorb both directed
    /// counters and vice versa.
    pub fn absorb_counters(&mut self, other: &EdgeKeyAllocator, swap: bool) {
        for ((a, b), theirs) in &other.pairs {
            let (u, v) = if swap { (b, a) } else { (a, b) };
            let mut targets = vec![self.pair_id(u, v)];
            if self.directed && !other.directed && u != v {
                targets.push(self.pair_id(v, u));
            }
            for id in targets {
                let pair = self.pairs.entry(id).or_default();
                pair.next = pair.next.max(theirs.next);
            }
        }
    }
}
