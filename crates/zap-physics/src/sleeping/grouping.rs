use crate::api::types::BodyId;
use crate::core::body::Body;
use crate::core::id_table::IdTable;

/// Partitions bodies into collision groups: sets of bodies linked through
/// contacts or joints, directly or transitively.
///
/// Static bodies join every group that reaches them but never carry the walk
/// further, so a shared floor does not merge everything resting on it.
#[derive(Debug, Default)]
pub struct CollisionGrouping {
    visited: Vec<bool>,
    /// Per slot: index + 1 of the last group a static body was added to.
    static_mark: Vec<usize>,
    stack: Vec<usize>,
    groups: Vec<Vec<usize>>,
}

impl CollisionGrouping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the groups from the bodies' current connections. Groups hold
    /// body slots, each group starting from its lowest dynamic slot.
    pub fn update(&mut self, bodies: &IdTable<BodyId, Body>) -> &[Vec<usize>] {
        let n = bodies.len();
        self.visited.clear();
        self.visited.resize(n, false);
        self.static_mark.clear();
        self.static_mark.resize(n, 0);
        self.groups.clear();

        for root in 0..n {
            let Some(body) = bodies.get_index(root) else {
                continue;
            };
            if body.is_static() || self.visited[root] {
                continue;
            }
            let group_mark = self.groups.len() + 1;
            let mut group = Vec::new();
            self.visited[root] = true;
            self.stack.push(root);

            while let Some(slot) = self.stack.pop() {
                group.push(slot);
                let (Some(id), Some(body)) = (bodies.id_at(slot), bodies.get_index(slot)) else {
                    continue;
                };
                for connection in body.connections() {
                    let Some(other) = bodies.index_of(connection.other_than(id)) else {
                        continue;
                    };
                    let other_static = bodies.get_index(other).map_or(true, Body::is_static);
                    if other_static {
                        if self.static_mark[other] != group_mark {
                            self.static_mark[other] = group_mark;
                            group.push(other);
                        }
                    } else if !self.visited[other] {
                        self.visited[other] = true;
                        self.stack.push(other);
                    }
                }
            }
            self.groups.push(group);
        }
        &self.groups
    }

    /// Groups from the last `update`.
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }
}
