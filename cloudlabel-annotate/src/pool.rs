//! Set of unlabeled point indices with O(1) insert, remove and uniform sampling

use cloudlabel_core::LabelMap;
use rand::Rng;

const ABSENT: usize = usize::MAX;

#[derive(Debug, Clone)]
pub struct UnlabeledPool {
    /// Unlabeled indices in arbitrary order
    members: Vec<usize>,
    /// `slots[i]` is the position of `i` in `members`, or `ABSENT`
    slots: Vec<usize>,
}

impl UnlabeledPool {
    /// Every index in `0..len` that has no label
    pub fn new(len: usize, labels: &LabelMap) -> Self {
        let mut members = Vec::with_capacity(len.saturating_sub(labels.len()));
        let mut slots = vec![ABSENT; len];
        for index in (0..len).filter(|&i| !labels.contains(i)) {
            slots[index] = members.len();
            members.push(index);
        }
        Self { members, slots }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|&slot| slot != ABSENT)
    }

    /// Returns false if the index was already present or is out of range
    pub fn insert(&mut self, index: usize) -> bool {
        if index >= self.slots.len() || self.contains(index) {
            return false;
        }
        self.slots[index] = self.members.len();
        self.members.push(index);
        true
    }

    /// Returns false if the index was not present
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        let slot = self.slots[index];
        self.members.swap_remove(slot);
        if let Some(&moved) = self.members.get(slot) {
            self.slots[moved] = slot;
        }
        self.slots[index] = ABSENT;
        true
    }

    /// Uniformly random member, `None` when every point is labeled
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.members.is_empty() {
            return None;
        }
        Some(self.members[rng.gen_range(0..self.members.len())])
    }
}
