use ai_bt::{ActionPhase, BtContext, BtMind, BtStatus, NodeId, Value};
use ai_core::{SplitMix64, TickContext};
use ai_nav::{random_point_in_radius, NavConfig, NavMeshBackend, NavMeshes, RouteTarget, Vec3};
use tracing::debug;

use crate::{actions, conditions};
use crate::{BotAction, BotAgent, BotConfig, BotFunc, BotWorld, EntityId, Goal, GoalTarget, Team, TargetKind};

/// RNG streams of one agent within a tick.
pub(crate) const ROAM_STREAM: u64 = 1;
pub(crate) const RANDOM_STREAM: u64 = 2;
pub(crate) const POINT_STREAM: u64 = 3;

/// One bot's view of the world while its tree is evaluated.
pub(crate) struct BotCtx<'a, W: BotWorld, B> {
    pub(crate) agent: W::Agent,
    pub(crate) bot: &'a mut BotAgent,
    pub(crate) world: &'a mut W,
    pub(crate) meshes: &'a NavMeshes<B>,
    pub(crate) config: &'a BotConfig,
    pub(crate) tick: TickContext,
    /// Advanced by every draw, so repeated draws within one tick differ.
    pub(crate) roam_rng: SplitMix64,
    pub(crate) random_rng: SplitMix64,
}

impl<'a, W, B> BotCtx<'a, W, B>
where
    W: BotWorld,
    B: NavMeshBackend,
{
    pub(crate) fn new(
        agent: W::Agent,
        bot: &'a mut BotAgent,
        world: &'a mut W,
        meshes: &'a NavMeshes<B>,
        config: &'a BotConfig,
        tick: TickContext,
    ) -> Self {
        Self {
            agent,
            bot,
            world,
            meshes,
            config,
            roam_rng: tick.rng_for_agent(agent, ROAM_STREAM),
            random_rng: tick.rng_for_agent(agent, RANDOM_STREAM),
            tick,
        }
    }
}

impl<W, B> BotCtx<'_, W, B>
where
    W: BotWorld,
    B: NavMeshBackend,
{
    pub(crate) fn now_ms(&self) -> u64 {
        self.tick.time_ms
    }

    pub(crate) fn position(&self) -> Option<Vec3> {
        self.world.position(self.agent)
    }

    pub(crate) fn team(&self) -> Team {
        self.world.team(self.agent)
    }

    pub(crate) fn phase(&self, node: NodeId) -> ActionPhase {
        self.bot.mind.phase(node)
    }

    pub(crate) fn target_position(&self, target: GoalTarget) -> Option<Vec3> {
        match target {
            GoalTarget::Entity(e) => self.world.entity_position(e),
            GoalTarget::Position(p) => Some(p),
        }
    }

    pub(crate) fn goal_target(&self) -> Option<GoalTarget> {
        self.bot.goal.map(|g| g.target)
    }

    /// A goal is set and, for entity goals, the entity is still alive.
    pub(crate) fn goal_is_valid(&self) -> bool {
        self.goal_target()
            .is_some_and(|t| self.target_position(t).is_some())
    }

    pub(crate) fn goal_entity(&self) -> Option<EntityId> {
        match self.goal_target() {
            Some(GoalTarget::Entity(e)) if self.world.entity_position(e).is_some() => Some(e),
            _ => None,
        }
    }

    /// Distance to the goal, also refreshed in the goal record. `f32::MAX` when either
    /// end is unknown.
    pub(crate) fn distance_to_goal(&mut self) -> f32 {
        let goal_pos = self.goal_target().and_then(|t| self.target_position(t));
        let distance = match (self.position(), goal_pos) {
            (Some(a), Some(b)) => a.distance(b),
            _ => f32::MAX,
        };
        if let Some(goal) = &mut self.bot.goal {
            goal.distance = distance;
        }
        distance
    }

    pub(crate) fn goal_radius(&self) -> f32 {
        self.world
            .goal_radius(self.agent)
            .unwrap_or(self.config.nav.goal_radius)
    }

    /// Entity goals count as reached at the entity's edge.
    pub(crate) fn goal_in_range(&mut self, radius: f32) -> bool {
        let edge = self
            .goal_entity()
            .map_or(0.0, |e| self.world.entity_radius(e));
        self.distance_to_goal() <= radius + edge
    }

    /// Plan a route to `target`, make it the goal and steer along the new route. The
    /// goal is kept when no full route exists.
    pub(crate) fn change_goal(&mut self, target: GoalTarget) -> bool {
        let Some(target_pos) = self.target_position(target) else {
            return false;
        };
        let Some(pos) = self.position() else {
            return false;
        };
        let meshes = self.meshes;
        let Some(mesh) = self.bot.nav.mesh().and_then(|h| meshes.get(h)) else {
            return false;
        };

        let route = route_target(target, target_pos, &self.config.nav);
        if let Err(err) = self
            .bot
            .nav
            .find_route(mesh, &self.config.nav, pos, &route, false)
        {
            debug!(agent = ?self.agent, %err, "goal change rejected");
            return false;
        }
        self.bot.nav.update_path(mesh, &self.config.nav, pos, &route);

        self.bot.goal = Some(Goal {
            target,
            distance: pos.distance(target_pos),
        });
        true
    }

    pub(crate) fn change_goal_entity(&mut self, entity: Option<EntityId>) -> bool {
        match entity {
            Some(e) => self.change_goal(GoalTarget::Entity(e)),
            None => false,
        }
    }

    /// Walk along this tick's steering command. `false` when there is no path.
    pub(crate) fn move_to_goal(&mut self) -> bool {
        let cmd = *self.bot.nav.last_cmd();
        if !cmd.have_path {
            return false;
        }
        self.world.steer(self.agent, &cmd);
        true
    }

    /// Entity selected by `kind` and its distance from the bot.
    pub(crate) fn resolve(&mut self, kind: TargetKind) -> Option<(EntityId, f32)> {
        match kind {
            TargetKind::None => None,
            TargetKind::Goal => {
                let e = self.goal_entity()?;
                Some((e, self.distance_to_goal()))
            }
            TargetKind::SelfEntity => Some((self.world.entity_of(self.agent), 0.0)),
            _ => {
                let e = self.world.find_entity(self.agent, kind)?;
                let distance = match (self.position(), self.world.entity_position(e)) {
                    (Some(a), Some(b)) => a.distance(b),
                    _ => f32::MAX,
                };
                Some((e, distance))
            }
        }
    }

    /// Random reachable point around `origin` on the bot's mesh.
    pub(crate) fn random_point(&mut self, origin: Vec3, radius: f32) -> Option<Vec3> {
        let meshes = self.meshes;
        let mesh = self.bot.nav.mesh().and_then(|h| meshes.get(h))?;
        random_point_in_radius(mesh, &self.config.nav, origin, radius, &mut self.roam_rng)
            .map_err(|err| debug!(agent = ?self.agent, %err, "no random point"))
            .ok()
    }
}

impl<W, B> BtContext for BotCtx<'_, W, B>
where
    W: BotWorld,
    B: NavMeshBackend,
{
    type Action = BotAction;
    type Func = BotFunc;

    fn tick(&self) -> &TickContext {
        &self.tick
    }

    fn mind(&mut self) -> &mut BtMind {
        &mut self.bot.mind
    }

    fn call(&mut self, func: BotFunc, params: &[Value]) -> Value {
        conditions::call(self, func, params)
    }

    fn act(&mut self, node: NodeId, action: BotAction, params: &[Value]) -> BtStatus {
        actions::act(self, node, action, params)
    }
}

/// Corridor target for a goal whose position is `pos`; entity goals may move.
pub(crate) fn route_target(target: GoalTarget, pos: Vec3, config: &NavConfig) -> RouteTarget {
    match target {
        GoalTarget::Entity(_) => RouteTarget::entity(pos, config.target_extents),
        GoalTarget::Position(_) => RouteTarget::position(pos, config.target_extents),
    }
}
