//! Node memory.
//!
//! Every node remembers the last `capacity` rumor instances it heard, oldest
//! first, together with a tally of how often each rumor appears. The tally
//! drives everything a node does: what it repeats, how uncertain it is, and
//! which opinion it is counted as holding.

use crate::rumor::{Rumor, RUMOR_SPACE};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Bounded FIFO of heard rumors with per-rumor counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    /// Maximum number of rumor instances retained
    capacity: usize,

    /// Heard rumors, oldest at the front
    entries: VecDeque<Rumor>,

    /// Occurrences of each rumor in `entries`
    counts: Vec<u32>,
}

impl Memory {
    /// Creates an empty memory holding at most `capacity` rumors.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
            counts: vec![0; RUMOR_SPACE],
        }
    }

    /// Records a heard rumor, evicting the oldest entry when full.
    ///
    /// Returns the evicted rumor, if any.
    pub fn hear(&mut self, rumor: Rumor) -> Option<Rumor> {
        self.entries.push_back(rumor);
        self.counts[rumor.index()] += 1;

        if self.entries.len() > self.capacity {
            let evicted = self.entries.pop_front()?;
            self.counts[evicted.index()] -= 1;
            Some(evicted)
        } else {
            None
        }
    }

    /// Implants an initial rumor (initiator or consistent actor).
    pub fn seed(&mut self, rumor: Rumor) {
        self.hear(rumor);
    }

    /// Maximum number of retained rumors.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of rumor instances currently held.
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// True if the node has not heard anything.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Occurrences of `rumor` in memory.
    pub fn count(&self, rumor: Rumor) -> u32 {
        self.counts[rumor.index()]
    }

    /// Distinct rumors present, with their counts, in numeric order.
    pub fn distinct(&self) -> impl Iterator<Item = (Rumor, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(i, &c)| (Rumor::from_index(i), c))
    }

    /// Heard rumors, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = Rumor> + '_ {
        self.entries.iter().copied()
    }

    /// Shannon entropy of the rumor distribution, in bits.
    pub fn entropy(&self) -> f64 {
        let total = self.entries.len() as f64;
        if total == 0.0 {
            return 0.0;
        }

        self.counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                -p * p.log2()
            })
            .sum()
    }

    /// Most frequently heard rumor, ties broken uniformly at random.
    ///
    /// Breaking ties by value would bias every tie towards the truth.
    pub fn most_common<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Rumor> {
        let largest = *self.counts.iter().max()?;
        if largest == 0 {
            return None;
        }

        let leaders: Vec<Rumor> = self
            .distinct()
            .filter(|&(_, c)| c == largest)
            .map(|(r, _)| r)
            .collect();

        leaders.choose(rng).copied()
    }

    /// Rumor drawn with probability proportional to its count.
    pub fn sample_proportional<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Rumor> {
        if self.is_empty() {
            return None;
        }
        let dist = WeightedIndex::new(&self.counts).ok()?;
        Some(Rumor::from_index(dist.sample(rng)))
    }

    /// Rewrites the oldest occurrence of `from` as `to`, keeping FIFO order.
    ///
    /// Returns false when `from` is not in memory.
    pub fn replace_oldest(&mut self, from: Rumor, to: Rumor) -> bool {
        match self.entries.iter_mut().find(|r| **r == from) {
            Some(slot) => {
                *slot = to;
                self.counts[from.index()] -= 1;
                self.counts[to.index()] += 1;
                true
            }
            None => false,
        }
    }
}
