use crate::api::types::{BodyId, JointId};

/// What links two bodies for collision grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Joint(JointId),
    /// A live contact. Rebuilt every step.
    Contact,
}

/// Non-owning edge of the body graph walked by collision grouping.
/// Each connection is stored on both of its bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub b1: BodyId,
    pub b2: BodyId,
    pub link: Link,
}

impl Connection {
    pub fn new(b1: BodyId, b2: BodyId, link: Link) -> Self {
        Self { b1, b2, link }
    }

    pub fn other_than(&self, id: BodyId) -> BodyId {
        if self.b1 == id {
            self.b2
        } else {
            self.b1
        }
    }

    pub fn is_contact(&self) -> bool {
        self.link == Link::Contact
    }
}
