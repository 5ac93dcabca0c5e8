use std::collections::BTreeMap;
use std::sync::Arc;

use ai_bt::{evaluate, BtStatus};
use ai_core::{AgentId, TickContext};
use ai_nav::{
    disable_area, enable_area, nav_trace, random_point_in_radius, Aabb, MeshHandle, NavCmd,
    NavError, NavMeshBackend, NavMeshes, NavWorldView, ObstacleManager, RaycastHit, RouteTarget,
    Vec3,
};
use tracing::{debug, warn};

use crate::context::{route_target, BotCtx, POINT_STREAM};
use crate::{BotAgent, BotConfig, BotTree, BotWorld, GoalTarget};

/// Owns every bot record, the navigation meshes and the obstacles injected into them.
///
/// Driven from the game thread: `tick` once per frame, the rest as game events happen.
#[derive(Debug)]
pub struct BotSystem<A, B> {
    config: BotConfig,
    meshes: NavMeshes<B>,
    obstacles: ObstacleManager,
    agents: BTreeMap<A, BotAgent>,
}

impl<A, B> BotSystem<A, B>
where
    A: AgentId,
    B: NavMeshBackend,
{
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            meshes: NavMeshes::new(),
            obstacles: ObstacleManager::new(),
            agents: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn meshes(&self) -> &NavMeshes<B> {
        &self.meshes
    }

    pub fn obstacles(&self) -> &ObstacleManager {
        &self.obstacles
    }

    /// Install navigation data and realize the obstacles added before it. Returns the
    /// number of obstacles realized.
    pub fn load_meshes(&mut self, meshes: Vec<B>) -> usize {
        self.meshes.load(meshes);
        let realized = self.obstacles.apply_pending(&mut self.meshes);
        debug!(meshes = self.meshes.len(), realized, "navigation meshes loaded");
        realized
    }

    /// Bind `agent` to `mesh`, creating its record on first use. Navigation restarts
    /// from scratch.
    ///
    /// # Panics
    ///
    /// If the agent's corridor cannot be allocated.
    pub fn set_agent_mesh(&mut self, agent: A, mesh: MeshHandle) -> Result<(), NavError> {
        let mesh = self.meshes.check(mesh)?;
        let bt = &self.config.bt;
        self.agents
            .entry(agent)
            .or_insert_with(|| BotAgent::new(bt))
            .assign_mesh(mesh, &self.config.nav);
        debug!(agent = ?agent, mesh = mesh.0, "bot navigation mesh assigned");
        Ok(())
    }

    /// Returns `false` when the agent has no record yet.
    pub fn set_agent_tree(&mut self, agent: A, tree: Arc<BotTree>) -> bool {
        match self.agents.get_mut(&agent) {
            Some(bot) => {
                bot.set_tree(tree);
                true
            }
            None => false,
        }
    }

    pub fn remove_agent(&mut self, agent: A) -> Option<BotAgent> {
        self.agents.remove(&agent)
    }

    pub fn agent(&self, agent: A) -> Option<&BotAgent> {
        self.agents.get(&agent)
    }

    pub fn agent_mut(&mut self, agent: A) -> Option<&mut BotAgent> {
        self.agents.get_mut(&agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = (A, &BotAgent)> {
        self.agents.iter().map(|(a, bot)| (*a, bot))
    }

    /// Advance `agent`'s corridor toward `target` and compute its steering.
    pub fn update_path<W>(
        &mut self,
        world: &W,
        agent: A,
        target: &RouteTarget,
    ) -> Result<NavCmd, NavError>
    where
        W: NavWorldView<Agent = A>,
    {
        let (bot, mesh) = agent_mesh(&mut self.agents, &self.meshes, agent)?;
        let pos = world.position(agent).ok_or(NavError::NotSpawned)?;
        Ok(bot.nav.update_path(mesh, &self.config.nav, pos, target))
    }

    /// Plan a fresh corridor. On failure the next `update_path` replans and reports no
    /// path until it succeeds.
    pub fn find_route<W>(
        &mut self,
        world: &W,
        agent: A,
        target: &RouteTarget,
        allow_partial: bool,
    ) -> bool
    where
        W: NavWorldView<Agent = A>,
    {
        let result = agent_mesh(&mut self.agents, &self.meshes, agent).and_then(|(bot, mesh)| {
            let pos = world.position(agent).ok_or(NavError::NotSpawned)?;
            bot.nav
                .find_route(mesh, &self.config.nav, pos, target, allow_partial)
        });
        match result {
            Ok(()) => true,
            Err(err) => {
                debug!(agent = ?agent, %err, "route not found");
                false
            }
        }
    }

    /// Evaluate `agent`'s behavior tree once.
    pub fn evaluate<W>(&mut self, world: &mut W, agent: A, tick: &TickContext) -> BtStatus
    where
        W: BotWorld<Agent = A>,
    {
        let Some(bot) = self.agents.get_mut(&agent) else {
            warn!(agent = ?agent, "evaluating unknown bot");
            return BtStatus::Failure;
        };
        let Some(tree) = bot.tree.clone() else {
            warn!(agent = ?agent, "bot has no behavior tree");
            return BtStatus::Failure;
        };

        let mut ctx = BotCtx::new(agent, bot, world, &self.meshes, &self.config, *tick);
        evaluate(&*tree, &mut ctx, tree.root())
    }

    /// One frame: advance obstacle rebuilds, then for every bot with a tree follow its
    /// goal and evaluate the tree.
    pub fn tick<W>(&mut self, world: &mut W, tick: &TickContext) -> Vec<(A, BtStatus)>
    where
        W: BotWorld<Agent = A>,
    {
        self.obstacles.tick(&mut self.meshes);

        let thinking: Vec<A> = self
            .agents
            .iter()
            .filter(|(_, bot)| bot.tree.is_some())
            .map(|(a, _)| *a)
            .collect();

        thinking
            .into_iter()
            .map(|agent| {
                self.follow_goal(world, agent);
                (agent, self.evaluate(world, agent, tick))
            })
            .collect()
    }

    fn follow_goal<W>(&mut self, world: &W, agent: A)
    where
        W: BotWorld<Agent = A>,
    {
        let Some(goal) = self.agents.get(&agent).and_then(|bot| bot.goal) else {
            return;
        };
        let goal_pos = match goal.target {
            GoalTarget::Entity(e) => world.entity_position(e),
            GoalTarget::Position(p) => Some(p),
        };
        let Some(goal_pos) = goal_pos else {
            return;
        };

        let target = route_target(goal.target, goal_pos, &self.config.nav);
        if let Err(err) = self.update_path(world, agent, &target) {
            debug!(agent = ?agent, %err, "path update failed");
        }

        let distance = world.position(agent).map_or(f32::MAX, |p| p.distance(goal_pos));
        if let Some(g) = self.agents.get_mut(&agent).and_then(|bot| bot.goal.as_mut()) {
            g.distance = distance;
        }
    }

    pub fn add_obstacle(&mut self, id: u32, bounds: Aabb) -> Result<(), NavError> {
        self.obstacles.add_obstacle(&mut self.meshes, id, bounds)
    }

    pub fn remove_obstacle(&mut self, id: u32) -> bool {
        self.obstacles.remove_obstacle(&mut self.meshes, id)
    }

    /// Block every polygon touched by `bounds` in every mesh.
    pub fn disable_area(&mut self, bounds: Aabb) {
        disable_area(&mut self.meshes, bounds);
    }

    pub fn enable_area(&mut self, bounds: Aabb) {
        enable_area(&mut self.meshes, bounds);
    }

    /// Random reachable point within `radius` of `origin` on `agent`'s mesh.
    pub fn random_point(
        &self,
        agent: A,
        tick: &TickContext,
        origin: Vec3,
        radius: f32,
    ) -> Result<Vec3, NavError> {
        let mesh = self.agent_mesh_ref(agent)?;
        let mut rng = tick.rng_for_agent(agent, POINT_STREAM);
        random_point_in_radius(mesh, &self.config.nav, origin, radius, &mut rng)
    }

    /// Walkability trace on `agent`'s mesh.
    pub fn nav_trace(&self, agent: A, start: Vec3, end: Vec3) -> Result<RaycastHit, NavError> {
        let mesh = self.agent_mesh_ref(agent)?;
        nav_trace(mesh, &self.config.nav, start, end)
    }

    fn agent_mesh_ref(&self, agent: A) -> Result<&B, NavError> {
        let handle = self
            .agents
            .get(&agent)
            .and_then(BotAgent::mesh)
            .ok_or(NavError::NoMesh)?;
        let handle = self.meshes.check(handle)?;
        self.meshes.get(handle).ok_or(NavError::NoMesh)
    }
}

fn agent_mesh<'s, A: AgentId, B: NavMeshBackend>(
    agents: &'s mut BTreeMap<A, BotAgent>,
    meshes: &'s NavMeshes<B>,
    agent: A,
) -> Result<(&'s mut BotAgent, &'s B), NavError> {
    let bot = agents.get_mut(&agent).ok_or(NavError::NoMesh)?;
    let handle = meshes.check(bot.mesh().ok_or(NavError::NoMesh)?)?;
    let mesh = meshes.get(handle).ok_or(NavError::NoMesh)?;
    Ok((bot, mesh))
}
