use std::collections::HashMap;
use std::hash::Hash;

/// Flat storage with stable ids and dense slots.
///
/// Ids grow monotonically and are never reused. Removal compacts the slot
/// array while keeping insertion order, so slot order always equals id order.
/// Iteration is in slot order, which keeps every consumer deterministic.
pub struct IdTable<I, T> {
    items: Vec<T>,
    ids: Vec<I>,
    index: HashMap<I, usize>,
    next_id: u32,
}

impl<I, T> IdTable<I, T>
where
    I: Copy + Eq + Hash + From<u32>,
{
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            ids: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            next_id: 0,
        }
    }

    /// Store an item in the last slot and return its new id.
    pub fn insert(&mut self, item: T) -> I {
        let id = I::from(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.items.len());
        self.items.push(item);
        self.ids.push(id);
        id
    }

    /// Remove an item by id. Slots above it shift down by one.
    pub fn remove(&mut self, id: I) -> Option<(usize, T)> {
        let slot = self.index.remove(&id)?;
        let item = self.items.remove(slot);
        self.ids.remove(slot);
        for (i, moved) in self.ids.iter().enumerate().skip(slot) {
            self.index.insert(*moved, i);
        }
        Some((slot, item))
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.items[i]),
            None => None,
        }
    }

    /// Two disjoint mutable borrows by slot. `None` if the slots coincide or
    /// either is out of range.
    pub fn get2_mut(&mut self, a: usize, b: usize) -> Option<(&mut T, &mut T)> {
        if a == b || a >= self.items.len() || b >= self.items.len() {
            return None;
        }
        if a < b {
            let (lo, hi) = self.items.split_at_mut(b);
            Some((&mut lo[a], &mut hi[0]))
        } else {
            let (lo, hi) = self.items.split_at_mut(a);
            Some((&mut hi[0], &mut lo[b]))
        }
    }

    pub fn index_of(&self, id: I) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn id_at(&self, slot: usize) -> Option<I> {
        self.ids.get(slot).copied()
    }

    pub fn get_index(&self, slot: usize) -> Option<&T> {
        self.items.get(slot)
    }

    pub fn contains(&self, id: I) -> bool {
        self.index.contains_key(&id)
    }

    /// Ids in slot order.
    pub fn ids(&self) -> &[I] {
        &self.ids
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.ids.iter().copied().zip(self.items.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.ids.iter().copied().zip(self.items.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<I, T> Default for IdTable<I, T>
where
    I: Copy + Eq + Hash + From<u32>,
{
    fn default() -> Self {
        Self::new()
    }
}
