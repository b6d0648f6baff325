use glam::Vec2;

use super::pair::PairStore;
use crate::api::types::BodyId;
use crate::core::body::Body;

/// One end of a body's extent on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Delimiter {
    value: f32,
    slot: usize,
    is_start: bool,
}

/// Positions of a body's start and end delimiters in a sorted axis array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Incremental sweep and prune over both axes.
///
/// Each body contributes a start and an end delimiter per axis, placed at its
/// bounding box grown by the distance it can travel this step plus a margin.
/// Every step the arrays are re-sorted with insertion sort. Since bodies move
/// little between steps the arrays are nearly sorted, and each swap is an
/// overlap event: a start passing an end opens a pair if the other axis also
/// overlaps, an end passing a start closes it.
pub struct Broadphase {
    xs: Vec<Delimiter>,
    ys: Vec<Delimiter>,
    x_spans: Vec<Span>,
    y_spans: Vec<Span>,
    margin: f32,
}

impl Broadphase {
    pub fn new(margin: f32) -> Self {
        Self {
            xs: Vec::new(),
            ys: Vec::new(),
            x_spans: Vec::new(),
            y_spans: Vec::new(),
            margin,
        }
    }

    pub fn len(&self) -> usize {
        self.x_spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_spans.is_empty()
    }

    /// Track the body in the last slot of `bodies` and open a pair with every
    /// body it already overlaps.
    pub fn add_body(&mut self, bodies: &[Body], ids: &[BodyId], dt: f32, pairs: &mut PairStore) {
        let slot = self.len();
        let Some(body) = bodies.get(slot) else {
            return;
        };
        let extent = reach(body, dt, self.margin);
        let lo = body.pos - extent;
        let hi = body.pos + extent;

        insert_sorted(&mut self.xs, Delimiter { value: lo.x, slot, is_start: true });
        insert_sorted(&mut self.xs, Delimiter { value: hi.x, slot, is_start: false });
        insert_sorted(&mut self.ys, Delimiter { value: lo.y, slot, is_start: true });
        insert_sorted(&mut self.ys, Delimiter { value: hi.y, slot, is_start: false });
        self.x_spans.push(Span::default());
        self.y_spans.push(Span::default());
        reindex(&self.xs, &mut self.x_spans);
        reindex(&self.ys, &mut self.y_spans);

        for other in 0..slot {
            if self.x_spans[slot].overlaps(&self.x_spans[other])
                && self.y_spans[slot].overlaps(&self.y_spans[other])
            {
                pairs.insert(other, slot, ids[other], ids[slot]);
            }
        }
    }

    /// Forget the body in `slot`. Slots above it move down by one.
    pub fn remove_body(&mut self, slot: usize) {
        if slot >= self.len() {
            return;
        }
        for dels in [&mut self.xs, &mut self.ys] {
            dels.retain(|d| d.slot != slot);
            for d in dels.iter_mut().filter(|d| d.slot > slot) {
                d.slot -= 1;
            }
        }
        self.x_spans.remove(slot);
        self.y_spans.remove(slot);
        reindex(&self.xs, &mut self.x_spans);
        reindex(&self.ys, &mut self.y_spans);
    }

    /// Move every delimiter to its body's current swept extent and re-sort,
    /// opening and closing pairs on the way.
    pub fn update(&mut self, bodies: &[Body], ids: &[BodyId], dt: f32, pairs: &mut PairStore) {
        let margin = self.margin;
        for (dels, axis) in [(&mut self.xs, 0), (&mut self.ys, 1)] {
            for d in dels.iter_mut() {
                let body = &bodies[d.slot];
                let reach = reach(body, dt, margin)[axis];
                d.value = if d.is_start {
                    body.pos[axis] - reach
                } else {
                    body.pos[axis] + reach
                };
            }
        }

        sweep(&mut self.xs, &self.y_spans, ids, pairs);
        reindex(&self.xs, &mut self.x_spans);
        sweep(&mut self.ys, &self.x_spans, ids, pairs);
        reindex(&self.ys, &mut self.y_spans);
    }

    /// Whether the stored extents of two slots overlap on both axes.
    pub fn overlaps(&self, a: usize, b: usize) -> bool {
        match (self.x_spans.get(a), self.x_spans.get(b)) {
            (Some(xa), Some(xb)) => {
                xa.overlaps(xb) && self.y_spans[a].overlaps(&self.y_spans[b])
            }
            _ => false,
        }
    }
}

/// Half size of a body's swept box: its extents, the distance it can cover
/// this step, and the margin.
fn reach(body: &Body, dt: f32, margin: f32) -> Vec2 {
    body.half_extents + body.vel.abs() * dt + margin
}

fn insert_sorted(dels: &mut Vec<Delimiter>, del: Delimiter) {
    let at = dels.partition_point(|d| d.value <= del.value);
    dels.insert(at, del);
}

fn reindex(dels: &[Delimiter], spans: &mut [Span]) {
    for (i, d) in dels.iter().enumerate() {
        if d.is_start {
            spans[d.slot].start = i;
        } else {
            spans[d.slot].end = i;
        }
    }
}

/// Insertion sort that reports every start/end crossing to the pair store.
fn sweep(dels: &mut [Delimiter], other_axis: &[Span], ids: &[BodyId], pairs: &mut PairStore) {
    for j in 1..dels.len() {
        let mut i = j;
        while i > 0 && dels[i - 1].value > dels[i].value {
            let key = dels[i];
            let passed = dels[i - 1];
            if key.slot != passed.slot {
                if key.is_start && !passed.is_start {
                    if other_axis[key.slot].overlaps(&other_axis[passed.slot]) {
                        pairs.insert(key.slot, passed.slot, ids[key.slot], ids[passed.slot]);
                    }
                } else if !key.is_start && passed.is_start {
                    pairs.remove(key.slot, passed.slot);
                }
            }
            dels.swap(i - 1, i);
            i -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scene {
        bodies: Vec<Body>,
        ids: Vec<BodyId>,
        broadphase: Broadphase,
        pairs: PairStore,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                bodies: Vec::new(),
                ids: Vec::new(),
                broadphase: Broadphase::new(0.1),
                pairs: PairStore::new(),
            }
        }

        fn add(&mut self, x: f32, y: f32) -> usize {
            self.bodies.push(Body::circle(Vec2::new(x, y), 1.0, 1.0));
            self.ids.push(BodyId(self.ids.len() as u32));
            self.pairs.add_slot();
            self.broadphase.add_body(&self.bodies, &self.ids, 0.025, &mut self.pairs);
            self.bodies.len() - 1
        }

        fn move_to(&mut self, slot: usize, x: f32, y: f32) {
            self.bodies[slot].set_position(Vec2::new(x, y));
            self.broadphase.update(&self.bodies, &self.ids, 0.025, &mut self.pairs);
        }
    }

    #[test]
    fn adding_overlapping_bodies_opens_pair() {
        let mut scene = Scene::new();
        scene.add(0.0, 0.0);
        scene.add(1.5, 0.5);
        scene.add(10.0, 0.0);
        assert!(scene.pairs.find(0, 1).is_some());
        assert!(scene.pairs.find(0, 2).is_none());
        assert_eq!(scene.pairs.len(), 1);
    }

    #[test]
    fn moving_apart_closes_pair() {
        let mut scene = Scene::new();
        scene.add(0.0, 0.0);
        scene.add(1.5, 0.0);
        scene.move_to(1, 5.0, 0.0);
        assert!(scene.pairs.is_empty());
    }

    #[test]
    fn moving_together_needs_both_axes() {
        let mut scene = Scene::new();
        scene.add(0.0, 0.0);
        scene.add(5.0, 5.0);
        // Overlap on x only.
        scene.move_to(1, 0.5, 5.0);
        assert!(scene.pairs.is_empty());
        // Now on y as well.
        scene.move_to(1, 0.5, 1.0);
        assert!(scene.pairs.find(0, 1).is_some());
    }

    #[test]
    fn diagonal_approach_in_one_step_is_found() {
        let mut scene = Scene::new();
        scene.add(0.0, 0.0);
        scene.add(5.0, 5.0);
        scene.move_to(1, 1.0, 1.0);
        assert!(scene.pairs.find(0, 1).is_some());
    }

    #[test]
    fn fast_body_extent_includes_travel() {
        let mut scene = Scene::new();
        scene.add(0.0, 0.0);
        scene.add(3.0, 0.0);
        scene.bodies[1].vel = Vec2::new(-40.0, 0.0);
        scene.broadphase.update(&scene.bodies, &scene.ids, 0.025, &mut scene.pairs);
        assert!(scene.pairs.find(0, 1).is_some());
    }

    #[test]
    fn fast_body_is_paired_when_added() {
        let mut scene = Scene::new();
        scene.add(0.0, 0.0);
        let fast = Body::circle(Vec2::new(3.0, 0.0), 1.0, 1.0).with_velocity(Vec2::new(-40.0, 0.0));
        scene.bodies.push(fast);
        scene.ids.push(BodyId(1));
        scene.pairs.add_slot();
        scene.broadphase.add_body(&scene.bodies, &scene.ids, 0.025, &mut scene.pairs);
        assert!(scene.pairs.find(0, 1).is_some());
    }

    #[test]
    fn removal_keeps_remaining_pairs_consistent() {
        let mut scene = Scene::new();
        scene.add(0.0, 0.0);
        scene.add(20.0, 0.0);
        scene.add(21.0, 0.0);
        assert!(scene.pairs.find(1, 2).is_some());

        scene.pairs.remove_slot(0);
        scene.broadphase.remove_body(0);
        scene.bodies.remove(0);
        scene.ids.remove(0);
        assert!(scene.broadphase.overlaps(0, 1));
        assert!(scene.pairs.find(0, 1).is_some());

        scene.move_to(1, 30.0, 0.0);
        assert!(scene.pairs.is_empty());
    }
}
