use std::fmt;

use bytemuck::{Pod, Zeroable};

/// Stable identifier of a body in the world. Survives removal of other bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

/// Stable identifier of a joint in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(pub u32);

impl From<u32> for BodyId {
    fn from(raw: u32) -> Self {
        BodyId(raw)
    }
}

impl From<u32> for JointId {
    fn from(raw: u32) -> Self {
        JointId(raw)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat per-body record exported by `World::snapshot`.
/// Plain-old-data so a whole frame can be hashed or shipped as bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BodyState {
    pub id: u32,
    /// 1 when the body is asleep, 0 otherwise.
    pub sleeping: u32,
    pub pos: [f32; 2],
    pub angle: f32,
    pub vel: [f32; 2],
    pub ang_vel: f32,
}

impl BodyState {
    pub const FLOATS: usize = 8;

    /// View a slice of states as raw bytes.
    pub fn as_bytes(states: &[BodyState]) -> &[u8] {
        bytemuck::cast_slice(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_state_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<BodyState>(), BodyState::FLOATS * 4);
        let states = [BodyState::default(); 3];
        assert_eq!(BodyState::as_bytes(&states).len(), 3 * BodyState::FLOATS * 4);
    }

    #[test]
    fn ids_display_as_plain_numbers() {
        assert_eq!(BodyId(7).to_string(), "7");
        assert_eq!(JointId::from(12).to_string(), "12");
    }
}
