use crate::variable::VarId;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

const WORD_BITS: usize = 64;

/// A bitset over variable lattice-position indices. Used as the canonical,
/// hashable identity of a variable subset so relation caches and the
/// search driver's visited set can key on it directly instead of
/// sorting/hashing a `Vec<VarId>` on every lookup.
///
/// Inline-stores up to 128 variables (two `u64` words) before spilling to
/// the heap, matching the small-set-optimized collections the rest of the
/// workspace favors over a bare `Vec`.
#[derive(Clone, Default, Eq)]
pub struct VarSet {
    words: SmallVec<[u64; 2]>,
}

impl VarSet {
    pub fn empty() -> Self {
        Self { words: SmallVec::new() }
    }

    pub fn single(v: VarId) -> Self {
        let mut s = Self::empty();
        s.insert(v);
        s
    }

    pub fn from_iter(vars: impl IntoIterator<Item = VarId>) -> Self {
        let mut s = Self::empty();
        for v in vars {
            s.insert(v);
        }
        s
    }

    #[inline]
    fn ensure_word(&mut self, word_idx: usize) {
        if self.words.len() <= word_idx {
            self.words.resize(word_idx + 1, 0);
        }
    }

    pub fn insert(&mut self, v: VarId) {
        let (w, b) = (v.0 / WORD_BITS, v.0 % WORD_BITS);
        self.ensure_word(w);
        self.words[w] |= 1u64 << b;
    }

    pub fn remove(&mut self, v: VarId) {
        let (w, b) = (v.0 / WORD_BITS, v.0 % WORD_BITS);
        if w < self.words.len() {
            self.words[w] &= !(1u64 << b);
        }
    }

    pub fn contains(&self, v: VarId) -> bool {
        let (w, b) = (v.0 / WORD_BITS, v.0 % WORD_BITS);
        self.words.get(w).map(|word| word & (1u64 << b) != 0).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Variable ids in ascending lattice-position order.
    pub fn iter(&self) -> impl Iterator<Item = VarId> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            (0..WORD_BITS).filter_map(move |b| {
                if word & (1u64 << b) != 0 {
                    Some(VarId(wi * WORD_BITS + b))
                } else {
                    None
                }
            })
        })
    }

    pub fn to_vec(&self) -> Vec<VarId> {
        self.iter().collect()
    }

    pub fn is_subset_of(&self, other: &VarSet) -> bool {
        for (i, &w) in self.words.iter().enumerate() {
            let ow = other.words.get(i).copied().unwrap_or(0);
            if w & !ow != 0 {
                return false;
            }
        }
        true
    }

    pub fn is_superset_of(&self, other: &VarSet) -> bool {
        other.is_subset_of(self)
    }

    pub fn union(&self, other: &VarSet) -> VarSet {
        let len = self.words.len().max(other.words.len());
        let mut words = SmallVec::with_capacity(len);
        for i in 0..len {
            let a = self.words.get(i).copied().unwrap_or(0);
            let b = other.words.get(i).copied().unwrap_or(0);
            words.push(a | b);
        }
        VarSet { words }
    }

    pub fn intersection(&self, other: &VarSet) -> VarSet {
        let len = self.words.len().min(other.words.len());
        let mut words = SmallVec::with_capacity(len);
        for i in 0..len {
            words.push(self.words[i] & other.words[i]);
        }
        VarSet { words }
    }

    pub fn difference(&self, other: &VarSet) -> VarSet {
        let mut words = self.words.clone();
        for (i, w) in words.iter_mut().enumerate() {
            let ow = other.words.get(i).copied().unwrap_or(0);
            *w &= !ow;
        }
        VarSet { words }
    }

    pub fn intersects(&self, other: &VarSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }
}

impl PartialEq for VarSet {
    fn eq(&self, other: &Self) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }
}

impl Hash for VarSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Trim trailing zero words so two sets that differ only in spare
        // capacity still hash identically.
        let mut last = self.words.len();
        while last > 0 && self.words[last - 1] == 0 {
            last -= 1;
        }
        self.words[..last].hash(state);
    }
}

impl fmt::Debug for VarSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<VarId> for VarSet {
    fn from_iter<I: IntoIterator<Item = VarId>>(iter: I) -> Self {
        VarSet::from_iter(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: usize) -> VarId {
        VarId(i)
    }

    #[test]
    fn insert_contains_and_len() {
        let mut s = VarSet::empty();
        s.insert(v(0));
        s.insert(v(64));
        s.insert(v(127));
        assert!(s.contains(v(0)));
        assert!(s.contains(v(64)));
        assert!(s.contains(v(127)));
        assert!(!s.contains(v(1)));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn subset_and_union_and_intersection() {
        let a = VarSet::from_iter([v(0), v(1), v(2)]);
        let b = VarSet::from_iter([v(1), v(2)]);
        assert!(b.is_subset_of(&a));
        assert!(!a.is_subset_of(&b));
        assert_eq!(a.union(&b), a);
        assert_eq!(a.intersection(&b), b);
        assert_eq!(a.difference(&b), VarSet::from_iter([v(0)]));
    }

    #[test]
    fn equal_sets_hash_equal_regardless_of_spare_words() {
        let mut a = VarSet::empty();
        a.insert(v(200));
        a.remove(v(200));
        let b = VarSet::empty();
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn iter_is_ascending() {
        let s = VarSet::from_iter([v(5), v(1), v(64), v(3)]);
        let got: Vec<usize> = s.iter().map(|v| v.0).collect();
        assert_eq!(got, vec![1, 3, 5, 64]);
    }
}
