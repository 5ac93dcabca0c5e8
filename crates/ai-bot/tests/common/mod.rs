#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ai_bot::{
    BotAction, BotConfig, BotSystem, BotTree, BotTreeBuilder, BotWorld, EntityId, GoalTarget,
    Loadout, MoveDir, TargetKind, TargetRole, Team, Upgrade, Weapon, WeaponClass,
};
use ai_bt::Value;
use ai_core::{TickContext, WorldView};
use ai_nav::{MeshHandle, NavCmd, NavMesh, NavWorldView, Vec3};

pub const BOT: u32 = 1;

pub const BLASTER: Weapon = Weapon(1);
pub const BUILD_TOOL: Weapon = Weapon(2);
pub const PAIN_SAW: Weapon = Weapon(3);
pub const RIFLE: Weapon = Weapon(5);

pub fn v(x: f32, y: f32) -> Vec3 {
    Vec3::new(x, y, 0.0)
}

/// `n` connected 10x10 squares along x.
pub fn strip(n: usize) -> NavMesh {
    let mut tris = Vec::new();
    for k in 0..n {
        let x0 = k as f32 * 10.0;
        let x1 = x0 + 10.0;
        tris.push([v(x0, 0.0), v(x1, 0.0), v(x1, 10.0)]);
        tris.push([v(x0, 0.0), v(x1, 10.0), v(x0, 10.0)]);
    }
    NavMesh::from_triangles(tris)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Fire,
    ForceWeapon(Weapon),
    Teleport(Vec3),
    SetUpgrade(Upgrade, bool),
    AimAtEnemy,
    AimAt(Vec3),
    Move(MoveDir),
    Steer(Vec3),
    StrafeDodge,
    AlternateStrafe,
    ClassMovement(bool),
    StandStill,
    Sprint,
    Evolve(i32),
    Say(String, i32),
    Suicide,
    Jump,
    ResetStuckTime,
    Gesture,
    SellWeapons,
    SellUpgrades,
    BuyWeapon(Weapon),
    BuyUpgrade(Upgrade),
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub pos: Vec3,
    pub team: Team,
    pub health: f32,
    pub buildable: bool,
    pub powered: bool,
}

impl Entity {
    pub fn player(pos: Vec3, team: Team) -> Self {
        Self {
            pos,
            team,
            health: 1.0,
            buildable: false,
            powered: false,
        }
    }

    pub fn building(pos: Vec3, team: Team) -> Self {
        Self {
            pos,
            team,
            health: 1.0,
            buildable: true,
            powered: true,
        }
    }
}

/// Scriptable game: entities by id (bots are entities with their agent id), plus
/// a log of every effect the bots asked for.
#[derive(Debug, Default)]
pub struct TestWorld {
    pub entities: BTreeMap<EntityId, Entity>,
    pub found: BTreeMap<u8, EntityId>,
    pub roles: BTreeMap<TargetRole, EntityId>,
    pub visible: BTreeSet<EntityId>,
    pub in_range: bool,
    pub walkable: bool,
    pub skill: i32,
    pub weapon: Weapon,
    pub weapon_empty: bool,
    pub weapons: BTreeSet<Weapon>,
    pub upgrades: BTreeSet<Upgrade>,
    pub active: BTreeSet<Upgrade>,
    pub medkit: bool,
    pub loadout: Loadout,
    pub heal_range: f32,
    pub station_busy: bool,
    pub can_jump: bool,
    pub events: Vec<Event>,
}

fn kind_key(kind: TargetKind) -> u8 {
    match kind {
        TargetKind::Enemy => 0,
        TargetKind::DamagedBuilding => 1,
        TargetKind::FriendlyBuilding => 2,
        TargetKind::EnemyBuilding => 3,
        _ => 255,
    }
}

impl TestWorld {
    pub fn new(bot_pos: Vec3, team: Team) -> Self {
        let mut world = Self {
            weapon: BLASTER,
            heal_range: 30.0,
            ..Self::default()
        };
        world.entities.insert(EntityId(BOT), Entity::player(bot_pos, team));
        world
    }

    pub fn spawn(&mut self, id: u32, entity: Entity) -> EntityId {
        self.entities.insert(EntityId(id), entity);
        EntityId(id)
    }

    pub fn place(&mut self, id: u32, pos: Vec3) {
        if let Some(e) = self.entities.get_mut(&EntityId(id)) {
            e.pos = pos;
        }
    }

    pub fn set_found(&mut self, kind: TargetKind, entity: EntityId) {
        self.found.insert(kind_key(kind), entity);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl WorldView for TestWorld {
    type Agent = u32;
}

impl NavWorldView for TestWorld {
    fn position(&self, agent: u32) -> Option<Vec3> {
        self.entity_position(EntityId(agent))
    }
}

impl BotWorld for TestWorld {
    fn entity_of(&self, agent: u32) -> EntityId {
        EntityId(agent)
    }

    fn skill_level(&self, _agent: u32) -> i32 {
        self.skill
    }

    fn entity_position(&self, entity: EntityId) -> Option<Vec3> {
        self.entities.get(&entity).map(|e| e.pos)
    }

    fn entity_team(&self, entity: EntityId) -> Team {
        self.entities.get(&entity).map_or(Team::None, |e| e.team)
    }

    fn is_buildable(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.buildable)
    }

    fn is_powered(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.powered)
    }

    fn health_fraction(&self, entity: EntityId) -> f32 {
        self.entities.get(&entity).map_or(0.0, |e| e.health)
    }

    fn find_entity(&self, _agent: u32, kind: TargetKind) -> Option<EntityId> {
        self.found
            .get(&kind_key(kind))
            .copied()
            .filter(|e| self.entities.contains_key(e))
    }

    fn role_target(&self, _agent: u32, role: TargetRole) -> Option<EntityId> {
        self.roles.get(&role).copied()
    }

    fn is_valid_enemy(&self, agent: u32, entity: EntityId) -> bool {
        let mine = self.team(agent);
        self.entities
            .get(&entity)
            .is_some_and(|e| e.team != Team::None && e.team != mine)
    }

    fn is_visible(&self, _agent: u32, target: GoalTarget) -> bool {
        match target {
            GoalTarget::Entity(e) => self.visible.contains(&e),
            GoalTarget::Position(_) => true,
        }
    }

    fn in_attack_range(&self, _agent: u32, _target: GoalTarget) -> bool {
        self.in_range
    }

    fn path_is_walkable(&self, _agent: u32, _entity: EntityId) -> bool {
        self.walkable
    }

    fn heal_range(&self, _station: EntityId) -> f32 {
        self.heal_range
    }

    fn heal_station_busy(&self, _station: EntityId, _agent: u32) -> bool {
        self.station_busy
    }

    fn current_weapon(&self, _agent: u32) -> Weapon {
        self.weapon
    }

    fn weapon_class(&self, weapon: Weapon) -> WeaponClass {
        match weapon {
            BLASTER => WeaponClass::Blaster,
            BUILD_TOOL => WeaponClass::BuildTool,
            PAIN_SAW => WeaponClass::PainSaw,
            _ => WeaponClass::Other,
        }
    }

    fn weapon_of_class(&self, class: WeaponClass) -> Weapon {
        match class {
            WeaponClass::BuildTool => BUILD_TOOL,
            WeaponClass::PainSaw => PAIN_SAW,
            _ => BLASTER,
        }
    }

    fn weapon_is_empty(&self, _agent: u32) -> bool {
        self.weapon_empty
    }

    fn has_weapon(&self, _agent: u32, weapon: Weapon) -> bool {
        self.weapons.contains(&weapon)
    }

    fn has_upgrade(&self, _agent: u32, upgrade: Upgrade) -> bool {
        self.upgrades.contains(&upgrade)
    }

    fn upgrade_active(&self, _agent: u32, upgrade: Upgrade) -> bool {
        self.active.contains(&upgrade)
    }

    fn has_medkit(&self, _agent: u32) -> bool {
        self.medkit
    }

    fn weapon_count(&self) -> i32 {
        10
    }

    fn upgrade_count(&self) -> i32 {
        8
    }

    fn desired_loadout(&self, _agent: u32) -> Loadout {
        self.loadout.clone()
    }

    fn force_weapon(&mut self, _agent: u32, weapon: Weapon) {
        self.weapon = weapon;
        self.events.push(Event::ForceWeapon(weapon));
    }

    fn fire_weapon(&mut self, _agent: u32) {
        self.events.push(Event::Fire);
    }

    fn teleport(&mut self, agent: u32, pos: Vec3) {
        self.place(agent, pos);
        self.events.push(Event::Teleport(pos));
    }

    fn set_upgrade_active(&mut self, _agent: u32, upgrade: Upgrade, active: bool) {
        if active {
            self.active.insert(upgrade);
        } else {
            self.active.remove(&upgrade);
        }
        self.events.push(Event::SetUpgrade(upgrade, active));
    }

    fn aim_at_enemy(&mut self, _agent: u32) {
        self.events.push(Event::AimAtEnemy);
    }

    fn aim_at_location(&mut self, _agent: u32, pos: Vec3) {
        self.events.push(Event::AimAt(pos));
    }

    fn move_in_dir(&mut self, _agent: u32, dir: MoveDir) {
        self.events.push(Event::Move(dir));
    }

    fn steer(&mut self, _agent: u32, cmd: &NavCmd) {
        self.events.push(Event::Steer(cmd.dir));
    }

    fn strafe_dodge(&mut self, _agent: u32) {
        self.events.push(Event::StrafeDodge);
    }

    fn alternate_strafe(&mut self, _agent: u32) {
        self.events.push(Event::AlternateStrafe);
    }

    fn class_movement(&mut self, _agent: u32, in_attack_range: bool) {
        self.events.push(Event::ClassMovement(in_attack_range));
    }

    fn stand_still(&mut self, _agent: u32) {
        self.events.push(Event::StandStill);
    }

    fn sprint(&mut self, _agent: u32) {
        self.events.push(Event::Sprint);
    }

    fn evolve(&mut self, _agent: u32, class: i32) -> bool {
        self.events.push(Event::Evolve(class));
        class > 0
    }

    fn say(&mut self, _agent: u32, text: &str, mode: i32) {
        self.events.push(Event::Say(text.to_owned(), mode));
    }

    fn suicide(&mut self, _agent: u32) {
        self.events.push(Event::Suicide);
    }

    fn jump(&mut self, _agent: u32) -> bool {
        self.events.push(Event::Jump);
        self.can_jump
    }

    fn reset_stuck_time(&mut self, _agent: u32) {
        self.events.push(Event::ResetStuckTime);
    }

    fn gesture(&mut self, _agent: u32) {
        self.events.push(Event::Gesture);
    }

    fn sell_weapons(&mut self, _agent: u32) {
        self.events.push(Event::SellWeapons);
    }

    fn sell_upgrades(&mut self, _agent: u32) {
        self.events.push(Event::SellUpgrades);
    }

    fn buy_weapon(&mut self, _agent: u32, weapon: Weapon) -> bool {
        self.weapons.insert(weapon);
        self.events.push(Event::BuyWeapon(weapon));
        true
    }

    fn buy_upgrade(&mut self, _agent: u32, upgrade: Upgrade) -> bool {
        self.upgrades.insert(upgrade);
        self.events.push(Event::BuyUpgrade(upgrade));
        true
    }
}

/// Tree holding a single action leaf.
pub fn leaf(action: BotAction, params: Vec<Value>) -> Arc<BotTree> {
    let mut b = BotTreeBuilder::new();
    let node = b.action(action, params);
    Arc::new(b.build(action.name(), node).expect("valid tree"))
}

/// Route bot logs to the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A system with `mesh` loaded and `BOT` bound to it running `tree`.
pub fn system_with(mesh: NavMesh, tree: Arc<BotTree>) -> BotSystem<u32, NavMesh> {
    init_tracing();
    let mut system = BotSystem::new(BotConfig::default());
    system.load_meshes(vec![mesh]);
    system.set_agent_mesh(BOT, MeshHandle(0)).expect("mesh");
    assert!(system.set_agent_tree(BOT, tree));
    system
}

pub fn at(time_ms: u64) -> TickContext {
    TickContext::new(time_ms / 100, time_ms, 9)
}
