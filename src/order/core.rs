use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Engine-owned record of each tile's original order.
///
/// Original order is the caller's intended sequence and drives packing; it is
/// independent of where tiles currently sit in the host's child list.
#[derive(Debug, Clone)]
pub struct OrderBook<T> {
    entries: Vec<T>,
    /// Position of each entry in `entries`.
    index: HashMap<T, usize>,
}

impl<T> Default for OrderBook<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash + Debug> OrderBook<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, tile: &T) -> bool {
        self.index.contains_key(tile)
    }

    pub fn index_of(&self, tile: &T) -> Option<usize> {
        self.index.get(tile).copied()
    }

    /// Append tiles not yet tracked, keeping the order they are given in.
    pub fn adopt<'a, I>(&mut self, tiles: I) -> usize
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut added = 0;
        for tile in tiles {
            if !self.contains(tile) {
                self.index.insert(tile.clone(), self.entries.len());
                self.entries.push(tile.clone());
                added += 1;
            }
        }
        added
    }

    /// Insert at `index` (clamped to the end). Later tiles shift up by one.
    /// A tile already tracked is moved instead.
    pub fn insert(&mut self, tile: T, index: usize) {
        self.remove(&tile);
        let index = index.min(self.entries.len());
        self.entries.insert(index, tile);
        self.reindex(index);
    }

    pub fn remove(&mut self, tile: &T) -> Option<usize> {
        let index = self.index.remove(tile)?;
        self.entries.remove(index);
        self.reindex(index);
        Some(index)
    }

    /// Move a tracked tile to `index`. Returns false for an untracked tile.
    pub fn move_to(&mut self, tile: &T, index: usize) -> bool {
        if !self.contains(tile) {
            return false;
        }
        self.insert(tile.clone(), index);
        true
    }

    /// Stable sort of `tiles` by original order.
    ///
    /// # Panics
    /// Panics if any tile has no recorded original order
    pub fn sorted(&self, tiles: &[T]) -> Vec<T> {
        let mut keyed: Vec<(usize, T)> = tiles
            .iter()
            .map(|tile| match self.index_of(tile) {
                Some(index) => (index, tile.clone()),
                None => panic!("tile {:?} has no original order", tile),
            })
            .collect();
        keyed.sort_by_key(|(index, _)| *index);
        keyed.into_iter().map(|(_, tile)| tile).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    fn reindex(&mut self, from: usize) {
        for (offset, entry) in self.entries[from..].iter().enumerate() {
            self.index.insert(entry.clone(), from + offset);
        }
    }
}
