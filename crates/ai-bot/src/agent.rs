use std::sync::Arc;

use ai_bt::{BtConfig, BtMind};
use ai_nav::{MeshHandle, NavAgent, NavCmd, NavConfig};

use crate::{BotTree, Goal, GoalTarget};

/// Everything one bot remembers between ticks.
#[derive(Debug, Clone)]
pub struct BotAgent {
    pub(crate) tree: Option<Arc<BotTree>>,
    pub(crate) mind: BtMind,
    pub(crate) nav: NavAgent,
    pub(crate) goal: Option<Goal>,
    pub(crate) enemy_last_seen_ms: u64,
}

impl BotAgent {
    pub fn new(config: &BtConfig) -> Self {
        Self {
            tree: None,
            mind: BtMind::new(config),
            nav: NavAgent::new(),
            goal: None,
            enemy_last_seen_ms: 0,
        }
    }

    /// Bind to `mesh`; navigation restarts from scratch on the next update.
    pub(crate) fn assign_mesh(&mut self, mesh: MeshHandle, config: &NavConfig) {
        self.nav.assign_mesh(mesh, config);
    }

    pub fn tree(&self) -> Option<&Arc<BotTree>> {
        self.tree.as_ref()
    }

    /// Switch trees. Progress in the previous tree is forgotten.
    pub fn set_tree(&mut self, tree: Arc<BotTree>) {
        self.tree = Some(tree);
        self.mind.reset();
    }

    pub fn mind(&self) -> &BtMind {
        &self.mind
    }

    pub fn nav(&self) -> &NavAgent {
        &self.nav
    }

    pub fn mesh(&self) -> Option<MeshHandle> {
        self.nav.mesh()
    }

    /// Steering computed by the latest path update.
    pub fn nav_cmd(&self) -> &NavCmd {
        self.nav.last_cmd()
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    /// Replace the goal without planning a route; the next path update replans.
    pub fn set_goal(&mut self, target: GoalTarget) {
        self.goal = Some(Goal::new(target));
        self.nav.request_replan();
    }

    pub fn clear_goal(&mut self) {
        self.goal = None;
    }

    pub fn enemy_last_seen_ms(&self) -> u64 {
        self.enemy_last_seen_ms
    }
}
