use std::slice::Iter;

use crate::r#type::IndexableNum;

/// A distance paired with the identifier it belongs to.
///
/// A candidate that came out of a [`CandidateList`] remembers the position it held, which lets
/// [`CandidateList::change_priority`] and [`CandidateList::delete`] find it without a scan.
/// Equality compares only `distance` and `id`, never the remembered position.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<N: IndexableNum> {
    /// The ranking value. Lower sorts first.
    pub distance: N,
    /// The identifier this candidate stands for.
    pub id: usize,
    position: Option<usize>,
}

impl<N: IndexableNum> PartialEq for Candidate<N> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.id == other.id
    }
}

impl<N: IndexableNum> Candidate<N> {
    /// Create a candidate that is not yet held by any list.
    pub fn new(distance: N, id: usize) -> Self {
        Self {
            distance,
            id,
            position: None,
        }
    }

    /// The position this candidate held in its list when it was read, if any.
    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

/// A list of candidates kept in ascending order of distance.
///
/// Equal distances keep their arrival order. Locating a position is a binary search; the
/// insertion or removal itself shifts the tail, so mutations are `O(n)` overall.
///
/// A NaN distance sorts after every other distance, and NaN entries keep their arrival order
/// among themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateList<N: IndexableNum> {
    entries: Vec<Candidate<N>>,
}

impl<N: IndexableNum> CandidateList<N> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The number of candidates held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no candidates.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The candidates in ascending order of distance.
    pub fn as_slice(&self) -> &[Candidate<N>] {
        &self.entries
    }

    /// Iterate over the candidates in ascending order of distance.
    pub fn iter(&self) -> Iter<'_, Candidate<N>> {
        self.entries.iter()
    }

    /// The candidate at `position`, carrying that position.
    pub fn get(&self, position: usize) -> Option<Candidate<N>> {
        self.entries.get(position).copied()
    }

    /// The distance at `position`, or infinity when the list is shorter than `position + 1`.
    ///
    /// With `position = k - 1` this is the pruning bound of a k-nearest search.
    #[inline]
    pub fn kth(&self, position: usize) -> N {
        self.entries
            .get(position)
            .map_or_else(N::infinity, |c| c.distance)
    }

    /// Insert a candidate after any existing candidates of equal distance and return where it
    /// landed.
    pub fn insert(&mut self, distance: N, id: usize) -> usize {
        let position = self.where_insert(distance, false);
        self.entries.insert(position, Candidate::new(distance, id));
        self.reindex(position);
        position
    }

    /// Where a candidate of `distance` would be inserted.
    ///
    /// For a run of equal distances, `prefer_left` returns the index of the first entry of the
    /// run, otherwise the index just past its last entry.
    pub fn where_insert(&self, distance: N, prefer_left: bool) -> usize {
        if distance.is_nan() {
            return self.entries.len();
        }
        if prefer_left {
            self.entries.partition_point(|c| c.distance < distance)
        } else {
            self.entries.partition_point(|c| c.distance <= distance)
        }
    }

    /// Remove the candidate at `position`. Returns `false` if `position` is out of range.
    pub fn delete_at(&mut self, position: usize) -> bool {
        if position >= self.entries.len() {
            return false;
        }
        self.entries.remove(position);
        self.reindex(position);
        true
    }

    /// Remove the first candidate with `id`, found by linear scan.
    pub fn delete_by_id(&mut self, id: usize) -> bool {
        match self.entries.iter().position(|c| c.id == id) {
            Some(position) => self.delete_at(position),
            None => false,
        }
    }

    /// Remove a candidate previously read from this list.
    ///
    /// The remembered position is tried first; if the list has moved on since the candidate was
    /// read, this falls back to [`delete_by_id`][Self::delete_by_id].
    pub fn delete(&mut self, candidate: &Candidate<N>) -> bool {
        match candidate.position {
            Some(position) if self.id_at(position) == Some(candidate.id) => {
                self.delete_at(position)
            }
            Some(_) => self.delete_by_id(candidate.id),
            None => false,
        }
    }

    /// Reposition a candidate whose distance changed and return its new position.
    ///
    /// The old entry is removed through [`delete`][Self::delete] before the candidate is
    /// reinserted, so a candidate that was never in the list is simply inserted.
    pub fn change_priority(&mut self, candidate: Candidate<N>) -> usize {
        self.delete(&candidate);
        self.insert(candidate.distance, candidate.id)
    }

    /// Remove and return the nearest candidate.
    pub fn pop_front(&mut self) -> Option<Candidate<N>> {
        if self.entries.is_empty() {
            return None;
        }
        let mut front = self.entries.remove(0);
        front.position = None;
        self.reindex(0);
        Some(front)
    }

    #[inline]
    fn id_at(&self, position: usize) -> Option<usize> {
        self.entries.get(position).map(|c| c.id)
    }

    /// Refresh remembered positions from `start` to the end.
    fn reindex(&mut self, start: usize) {
        for (position, candidate) in self.entries.iter_mut().enumerate().skip(start) {
            candidate.position = Some(position);
        }
    }
}

impl<N: IndexableNum> FromIterator<(N, usize)> for CandidateList<N> {
    fn from_iter<T: IntoIterator<Item = (N, usize)>>(iter: T) -> Self {
        let mut list = Self::new();
        for (distance, id) in iter {
            list.insert(distance, id);
        }
        list
    }
}

impl<'a, N: IndexableNum> IntoIterator for &'a CandidateList<N> {
    type Item = &'a Candidate<N>;
    type IntoIter = Iter<'a, Candidate<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
