use ai_nav::Vec3;

use crate::EntityId;

/// Where a goal points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GoalTarget {
    /// Follows the entity while it lives.
    Entity(EntityId),
    Position(Vec3),
}

/// The bot's current destination with the distance measured at the last update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub target: GoalTarget,
    pub distance: f32,
}

impl Goal {
    pub fn new(target: GoalTarget) -> Self {
        Self {
            target,
            distance: f32::MAX,
        }
    }

    pub fn entity(&self) -> Option<EntityId> {
        match self.target {
            GoalTarget::Entity(e) => Some(e),
            GoalTarget::Position(_) => None,
        }
    }
}
