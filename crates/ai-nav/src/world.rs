use ai_core::WorldView;

use crate::Vec3;

/// World queries the navigation layer needs from the game.
pub trait NavWorldView: WorldView {
    /// Current origin of `agent`, `None` if it is not spawned.
    fn position(&self, agent: Self::Agent) -> Option<Vec3>;
}
