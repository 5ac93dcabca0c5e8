use crate::AgentId;

/// Read-only world access.
///
/// Subsystems (navigation, bots) define extension traits on top of this one; the
/// core only fixes the agent id type.
pub trait WorldView {
    type Agent: AgentId;
}
