use super::arbiter::Arbiter;
use super::narrowphase::ContactGeometry;
use crate::api::types::BodyId;

/// Extra table rows allocated whenever the pair table has to grow.
const RESERVED_SLOTS: usize = 64;

/// Index of a pair in the store. Stable while the pair lives.
pub type PairKey = usize;

/// Two bodies whose broadphase extents overlap. `b1` has the lower id.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub b1: BodyId,
    pub b2: BodyId,
    /// Current slots of `b1` and `b2`. Kept in step with removals.
    pub(crate) s1: usize,
    pub(crate) s2: usize,
    /// Geometry from the last narrowphase test that found a contact.
    pub contact: Option<ContactGeometry>,
    /// Present while the pair is in real contact.
    pub arbiter: Option<Arbiter>,
}

impl Pair {
    fn new(b1: BodyId, b2: BodyId, s1: usize, s2: usize) -> Self {
        Self {
            b1,
            b2,
            s1,
            s2,
            contact: None,
            arbiter: None,
        }
    }

    pub fn other_than(&self, id: BodyId) -> BodyId {
        if self.b1 == id {
            self.b2
        } else {
            self.b1
        }
    }
}

/// Owns every live pair plus a symmetric slot-by-slot lookup table.
///
/// `table[i][j] == table[j][i]` always holds, so existence checks are O(1)
/// from either side. Pairs are listed per lower slot in insertion order,
/// which fixes the order the narrowphase and solver see them in.
pub struct PairStore {
    table: Vec<Option<PairKey>>,
    capacity: usize,
    pairs: Vec<Option<Pair>>,
    free: Vec<PairKey>,
    owned: Vec<Vec<PairKey>>,
}

impl PairStore {
    pub fn new() -> Self {
        Self {
            table: vec![None; RESERVED_SLOTS * RESERVED_SLOTS],
            capacity: RESERVED_SLOTS,
            pairs: Vec::new(),
            free: Vec::new(),
            owned: Vec::new(),
        }
    }

    /// Number of body slots tracked.
    pub fn slots(&self) -> usize {
        self.owned.len()
    }

    /// Register one more body slot at the end.
    pub fn add_slot(&mut self) {
        self.owned.push(Vec::new());
        if self.owned.len() > self.capacity {
            self.grow(self.owned.len() + RESERVED_SLOTS);
        }
    }

    fn grow(&mut self, capacity: usize) {
        log::debug!("pair table grows from {} to {} slots", self.capacity, capacity);
        let mut table = vec![None; capacity * capacity];
        for i in 0..self.capacity {
            for j in 0..self.capacity {
                table[i * capacity + j] = self.table[i * self.capacity + j];
            }
        }
        self.table = table;
        self.capacity = capacity;
    }

    fn cell(&self, a: usize, b: usize) -> usize {
        a * self.capacity + b
    }

    pub fn find(&self, a: usize, b: usize) -> Option<PairKey> {
        if a >= self.slots() || b >= self.slots() {
            return None;
        }
        self.table[self.cell(a, b)]
    }

    /// Create the pair for slots `a` and `b`. `None` if it already exists.
    pub fn insert(&mut self, a: usize, b: usize, id_a: BodyId, id_b: BodyId) -> Option<PairKey> {
        if a == b || self.find(a, b).is_some() || a.max(b) >= self.slots() {
            return None;
        }
        let (lo, hi, id_lo, id_hi) = if a < b {
            (a, b, id_a, id_b)
        } else {
            (b, a, id_b, id_a)
        };
        let pair = Pair::new(id_lo, id_hi, lo, hi);
        let key = match self.free.pop() {
            Some(key) => {
                self.pairs[key] = Some(pair);
                key
            }
            None => {
                self.pairs.push(Some(pair));
                self.pairs.len() - 1
            }
        };
        let (ab, ba) = (self.cell(lo, hi), self.cell(hi, lo));
        self.table[ab] = Some(key);
        self.table[ba] = Some(key);
        self.owned[lo].push(key);
        Some(key)
    }

    pub fn remove(&mut self, a: usize, b: usize) -> Option<Pair> {
        let key = self.find(a, b)?;
        let (ab, ba) = (self.cell(a, b), self.cell(b, a));
        self.table[ab] = None;
        self.table[ba] = None;
        self.owned[a.min(b)].retain(|k| *k != key);
        self.free.push(key);
        self.pairs[key].take()
    }

    /// Drop every pair of `slot` and close the gap it leaves in the table.
    /// Returns the dropped pairs.
    pub fn remove_slot(&mut self, slot: usize) -> Vec<Pair> {
        if slot >= self.slots() {
            return Vec::new();
        }
        let removed: Vec<Pair> = (0..self.slots())
            .filter_map(|other| self.remove(slot, other))
            .collect();

        let n = self.slots();
        for i in 0..n {
            for j in 0..n {
                if i == slot || j == slot {
                    continue;
                }
                let ni = if i > slot { i - 1 } else { i };
                let nj = if j > slot { j - 1 } else { j };
                let (from, to) = (self.cell(i, j), self.cell(ni, nj));
                self.table[to] = self.table[from];
            }
        }
        for i in 0..n {
            let (last_row, last_col) = (self.cell(n - 1, i), self.cell(i, n - 1));
            self.table[last_row] = None;
            self.table[last_col] = None;
        }
        self.owned.remove(slot);
        for pair in self.pairs.iter_mut().flatten() {
            if pair.s1 > slot {
                pair.s1 -= 1;
            }
            if pair.s2 > slot {
                pair.s2 -= 1;
            }
        }
        removed
    }

    /// Keys of every pair touching `slot`, in slot order of the partner.
    pub fn keys_of(&self, slot: usize) -> Vec<PairKey> {
        (0..self.slots()).filter_map(|other| self.find(slot, other)).collect()
    }

    /// All live pair keys in deterministic order.
    pub fn keys(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.owned.iter().flat_map(|keys| keys.iter().copied())
    }

    pub fn get(&self, key: PairKey) -> Option<&Pair> {
        self.pairs.get(key).and_then(|p| p.as_ref())
    }

    pub fn get_mut(&mut self, key: PairKey) -> Option<&mut Pair> {
        self.pairs.get_mut(key).and_then(|p| p.as_mut())
    }

    pub fn len(&self) -> usize {
        self.owned.iter().map(|keys| keys.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn is_symmetric(&self) -> bool {
        let n = self.slots();
        (0..n).all(|i| (0..n).all(|j| self.find(i, j) == self.find(j, i)))
    }
}

impl Default for PairStore {
    fn default() -> Self {
        Self::new()
    }
}
