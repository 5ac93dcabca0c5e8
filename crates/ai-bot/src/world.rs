use ai_nav::{NavCmd, NavWorldView, Vec3};
use bitflags::bitflags;
use tracing::warn;

use crate::GoalTarget;

/// Game entity (player, buildable, missile) as seen by the bots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Team {
    #[default]
    None,
    Aliens,
    Humans,
}

impl Team {
    /// Condition encoding: 0 none, 1 aliens, 2 humans.
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Aliens => 1,
            Self::Humans => 2,
        }
    }
}

/// Game weapon code; `0` is "no weapon".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Weapon(pub i32);

impl Weapon {
    pub const NONE: Self = Self(0);
}

/// Game upgrade code; `0` is "no upgrade".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Upgrade(pub i32);

impl Upgrade {
    pub const NONE: Self = Self(0);
}

/// Weapons the bot logic treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponClass {
    /// Infinite-ammo sidearm every human carries.
    Blaster,
    /// Construction tool; cannot shoot.
    BuildTool,
    /// Short range, fired even outside attack range.
    PainSaw,
    Flamer,
    Other,
}

bitflags! {
    /// Movement keys pressed by `move_in_dir`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MoveDir: u8 {
        const FORWARD = 0x01;
        const BACKWARD = 0x02;
        const LEFT = 0x04;
        const RIGHT = 0x08;
    }
}

/// Entity selector used by action and condition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    None,
    /// Entity of the current goal.
    Goal,
    /// Best visible enemy.
    Enemy,
    DamagedBuilding,
    FriendlyBuilding,
    EnemyBuilding,
    SelfEntity,
    /// Closest building of a game-defined type.
    Building(u32),
}

const BUILDING_BASE: i32 = 100;

impl TargetKind {
    /// Parameter encoding: 0 none, 1 goal, 2 enemy, 3 damaged building, 4 friendly
    /// building, 5 enemy building, 6 self, `100 + n` building type `n`.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::Goal,
            2 => Self::Enemy,
            3 => Self::DamagedBuilding,
            4 => Self::FriendlyBuilding,
            5 => Self::EnemyBuilding,
            6 => Self::SelfEntity,
            c if c >= BUILDING_BASE => Self::Building((c - BUILDING_BASE) as u32),
            _ => return None,
        })
    }

    /// Like `from_code`, warning about and mapping unknown codes to `None`.
    pub fn from_param(code: i32) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            warn!(code, "unknown target kind");
            Self::None
        })
    }

    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Goal => 1,
            Self::Enemy => 2,
            Self::DamagedBuilding => 3,
            Self::FriendlyBuilding => 4,
            Self::EnemyBuilding => 5,
            Self::SelfEntity => 6,
            Self::Building(n) => BUILDING_BASE.saturating_add(n as i32),
        }
    }
}

/// Destinations picked by the game for the compound actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetRole {
    Retreat,
    Rush,
    Heal,
    Armoury,
}

/// What the bot would buy given free choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Loadout {
    pub weapon: Weapon,
    pub upgrades: Vec<Upgrade>,
}

/// Game interface used by bot actions and conditions.
///
/// Queries take `&self`; effects take `&mut self` and are applied by the game when it
/// builds the bot's command for this frame.
pub trait BotWorld: NavWorldView {
    fn entity_of(&self, agent: Self::Agent) -> EntityId;

    fn team(&self, agent: Self::Agent) -> Team {
        self.entity_team(self.entity_of(agent))
    }

    fn skill_level(&self, agent: Self::Agent) -> i32;

    /// Reach radius overriding the configured default.
    fn goal_radius(&self, _agent: Self::Agent) -> Option<f32> {
        None
    }

    // Entities.

    /// Origin of a live entity; `None` once it is dead or freed.
    fn entity_position(&self, entity: EntityId) -> Option<Vec3>;
    fn entity_team(&self, entity: EntityId) -> Team;
    fn entity_radius(&self, _entity: EntityId) -> f32 {
        0.0
    }
    fn is_buildable(&self, entity: EntityId) -> bool;
    fn is_powered(&self, entity: EntityId) -> bool;
    fn health_fraction(&self, entity: EntityId) -> f32;
    fn has_full_health(&self, entity: EntityId) -> bool {
        self.health_fraction(entity) >= 1.0
    }

    /// Resolve the world-backed kinds: enemy and the building selectors. `Goal`,
    /// `SelfEntity` and `None` are resolved by the bot itself.
    fn find_entity(&self, agent: Self::Agent, kind: TargetKind) -> Option<EntityId>;
    fn role_target(&self, agent: Self::Agent, role: TargetRole) -> Option<EntityId>;
    fn is_valid_enemy(&self, agent: Self::Agent, entity: EntityId) -> bool;

    // Perception.

    fn is_visible(&self, agent: Self::Agent, target: GoalTarget) -> bool;
    fn in_attack_range(&self, agent: Self::Agent, target: GoalTarget) -> bool;
    fn path_is_walkable(&self, agent: Self::Agent, entity: EntityId) -> bool;
    /// Distance from which `station` heals.
    fn heal_range(&self, station: EntityId) -> f32;
    /// `station` is occupied by someone other than `agent`.
    fn heal_station_busy(&self, station: EntityId, agent: Self::Agent) -> bool;

    // Inventory.

    fn current_weapon(&self, agent: Self::Agent) -> Weapon;
    fn weapon_class(&self, weapon: Weapon) -> WeaponClass;
    fn weapon_of_class(&self, class: WeaponClass) -> Weapon;
    fn weapon_is_empty(&self, agent: Self::Agent) -> bool;
    fn has_weapon(&self, agent: Self::Agent, weapon: Weapon) -> bool;
    fn has_upgrade(&self, agent: Self::Agent, upgrade: Upgrade) -> bool;
    fn upgrade_active(&self, agent: Self::Agent, upgrade: Upgrade) -> bool;
    /// Skill check: whether the bot knows how to use `upgrade`.
    fn knows_upgrade(&self, _agent: Self::Agent, _upgrade: Upgrade) -> bool {
        true
    }
    fn has_medkit(&self, agent: Self::Agent) -> bool;
    /// One past the highest valid weapon code.
    fn weapon_count(&self) -> i32;
    /// One past the highest valid upgrade code.
    fn upgrade_count(&self) -> i32;
    fn desired_loadout(&self, agent: Self::Agent) -> Loadout;

    // Effects.

    fn force_weapon(&mut self, agent: Self::Agent, weapon: Weapon);
    fn fire_weapon(&mut self, agent: Self::Agent);
    fn teleport(&mut self, agent: Self::Agent, pos: Vec3);
    fn set_upgrade_active(&mut self, agent: Self::Agent, upgrade: Upgrade, active: bool);
    fn aim_at_enemy(&mut self, agent: Self::Agent);
    fn aim_at_location(&mut self, agent: Self::Agent, pos: Vec3);
    fn move_in_dir(&mut self, agent: Self::Agent, dir: MoveDir);
    /// Walk along the corridor steering command.
    fn steer(&mut self, agent: Self::Agent, cmd: &NavCmd);
    fn strafe_dodge(&mut self, agent: Self::Agent);
    fn alternate_strafe(&mut self, agent: Self::Agent);
    fn class_movement(&mut self, agent: Self::Agent, in_attack_range: bool);
    fn stand_still(&mut self, agent: Self::Agent);
    fn sprint(&mut self, agent: Self::Agent);
    fn evolve(&mut self, agent: Self::Agent, class: i32) -> bool;
    fn say(&mut self, agent: Self::Agent, text: &str, mode: i32);
    fn suicide(&mut self, agent: Self::Agent);
    fn jump(&mut self, agent: Self::Agent) -> bool;
    fn reset_stuck_time(&mut self, agent: Self::Agent);
    fn gesture(&mut self, agent: Self::Agent);
    fn sell_weapons(&mut self, agent: Self::Agent);
    fn sell_upgrades(&mut self, agent: Self::Agent);
    fn buy_weapon(&mut self, agent: Self::Agent, weapon: Weapon) -> bool;
    fn buy_upgrade(&mut self, agent: Self::Agent, upgrade: Upgrade) -> bool;
}
