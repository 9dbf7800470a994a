//! Sorted, deduplicated series-identifier sets.
//!
//! Backs every posting list in the reverse index and every query result.
//! Growth rounds `current + need` up to the next power of two.

/// A sorted, deduplicated set of series identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet {
    ids: Vec<u32>,
}

impl IdSet {
    /// Creates an empty set with the given initial capacity (rounded up to
    /// the next power of two).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity.next_power_of_two()),
        }
    }

    /// Creates an empty set with no preallocated capacity.
    #[must_use]
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Number of distinct ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Borrowed view of the sorted ids.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.ids
    }

    /// `O(log n)` membership test via binary search.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Inserts `id`, maintaining sortedness and uniqueness.
    ///
    /// `O(1)` amortized when `id` is greater than every id already present
    /// (the common case, since ids are assigned densely increasing);
    /// `O(n)` worst case otherwise, since a general insertion point
    /// requires shifting every following element.
    pub fn insert(&mut self, id: u32) {
        match self.ids.last() {
            Some(&last) if id > last => {
                self.ids.push(id);
            }
            Some(&last) if id == last => {}
            _ => match self.ids.binary_search(&id) {
                Ok(_) => {}
                Err(pos) => self.ids.insert(pos, id),
            },
        }
    }

    /// Returns the union of `a` and `b` as a freshly allocated, sorted set.
    #[must_use]
    pub fn union(a: &Self, b: &Self) -> Self {
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.ids.len() && j < b.ids.len() {
            match a.ids[i].cmp(&b.ids[j]) {
                std::cmp::Ordering::Less => {
                    out.push(a.ids[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    out.push(b.ids[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    out.push(a.ids[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a.ids[i..]);
        out.extend_from_slice(&b.ids[j..]);
        Self { ids: out }
    }

    /// Returns the intersection of `a` and `b` as a freshly allocated,
    /// sorted set.
    #[must_use]
    pub fn intersect(a: &Self, b: &Self) -> Self {
        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.ids.len() && j < b.ids.len() {
            match a.ids[i].cmp(&b.ids[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push(a.ids[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Self { ids: out }
    }

    /// Returns `a \ b` (ids present in `a` but absent from `b`) as a
    /// freshly allocated, sorted set.
    #[must_use]
    pub fn difference(a: &Self, b: &Self) -> Self {
        let mut out = Vec::with_capacity(a.len());
        let (mut i, mut j) = (0, 0);
        while i < a.ids.len() {
            if j >= b.ids.len() || a.ids[i] < b.ids[j] {
                out.push(a.ids[i]);
                i += 1;
            } else if a.ids[i] > b.ids[j] {
                j += 1;
            } else {
                i += 1;
                j += 1;
            }
        }
        Self { ids: out }
    }

    /// Builds a set from an arbitrary iterator, sorting and deduplicating.
    pub fn from_iter_dedup<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut ids: Vec<u32> = iter.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// Iterates over ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn monotonic_insert_is_dense() {
        let mut s = IdSet::new();
        for i in 0..100 {
            s.insert(i);
        }
        assert_eq!(s.len(), 100);
        assert_eq!(s.as_slice(), (0..100).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut s = IdSet::new();
        s.insert(5);
        s.insert(5);
        s.insert(5);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn out_of_order_insert_keeps_sorted() {
        let mut s = IdSet::new();
        for i in [5, 1, 3, 1, 9, 0] {
            s.insert(i);
        }
        assert_eq!(s.as_slice(), &[0, 1, 3, 5, 9]);
    }

    proptest! {
        #[test]
        fn union_size_matches_set_union(mut a in prop::collection::vec(0u32..200, 0..50),
                                          mut b in prop::collection::vec(0u32..200, 0..50)) {
            a.sort_unstable(); a.dedup();
            b.sort_unstable(); b.dedup();
            let sa = IdSet::from_iter_dedup(a.iter().copied());
            let sb = IdSet::from_iter_dedup(b.iter().copied());
            let u = IdSet::union(&sa, &sb);
            let mut expect: std::collections::BTreeSet<u32> = a.iter().copied().collect();
            expect.extend(b.iter().copied());
            prop_assert_eq!(u.as_slice().to_vec(), expect.into_iter().collect::<Vec<_>>());
        }

        #[test]
        fn intersect_matches_set_intersection(mut a in prop::collection::vec(0u32..200, 0..50),
                                                mut b in prop::collection::vec(0u32..200, 0..50)) {
            a.sort_unstable(); a.dedup();
            b.sort_unstable(); b.dedup();
            let sa = IdSet::from_iter_dedup(a.iter().copied());
            let sb = IdSet::from_iter_dedup(b.iter().copied());
            let i = IdSet::intersect(&sa, &sb);
            let sa_set: std::collections::BTreeSet<u32> = a.iter().copied().collect();
            let sb_set: std::collections::BTreeSet<u32> = b.iter().copied().collect();
            let expect: Vec<u32> = sa_set.intersection(&sb_set).copied().collect();
            prop_assert_eq!(i.as_slice().to_vec(), expect);
        }

        #[test]
        fn difference_matches_set_difference(mut a in prop::collection::vec(0u32..200, 0..50),
                                               mut b in prop::collection::vec(0u32..200, 0..50)) {
            a.sort_unstable(); a.dedup();
            b.sort_unstable(); b.dedup();
            let sa = IdSet::from_iter_dedup(a.iter().copied());
            let sb = IdSet::from_iter_dedup(b.iter().copied());
            let d = IdSet::difference(&sa, &sb);
            let sa_set: std::collections::BTreeSet<u32> = a.iter().copied().collect();
            let sb_set: std::collections::BTreeSet<u32> = b.iter().copied().collect();
            let expect: Vec<u32> = sa_set.difference(&sb_set).copied().collect();
            prop_assert_eq!(d.as_slice().to_vec(), expect);
        }
    }
}
