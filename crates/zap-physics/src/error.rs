use crate::api::types::{BodyId, JointId};

/// Recoverable failures surfaced by the physics API.
///
/// Numeric degeneracy inside the simulation (zero-length normals, non-real
/// impact times) is never an error: those cases resolve to "no contact".
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("no body with id {0}")]
    UnknownBody(BodyId),

    #[error("no joint with id {0}")]
    UnknownJoint(JointId),

    #[error("a joint needs at least one dynamic body")]
    StaticJoint,

    #[error("polygon is degenerate ({vertices} vertices, zero area or too few points)")]
    DegeneratePolygon { vertices: usize },

    #[error("malformed joint `{input}`: {reason}")]
    JointFormat { input: String, reason: String },

    #[error("invalid simulation config: {0}")]
    Config(#[from] serde_json::Error),
}

impl PhysicsError {
    pub(crate) fn joint_format(input: &str, reason: impl Into<String>) -> Self {
        PhysicsError::JointFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
