//! Action leaves: what a bot does when the tree reaches an `Action` node.
//!
//! Compound actions (fight, flee, roam, move-to, rush, heal, repair, buy) acquire their
//! goal on the first evaluation, mark themselves as the agent's current node, then
//! report Running until their end condition holds.

use std::ops::RangeInclusive;

use ai_bt::{ActionPhase, BtStatus, NodeId, Value};
use ai_nav::{NavMeshBackend, Vec3};
use tracing::warn;

use crate::context::BotCtx;
use crate::{
    BotWorld, EntityId, GoalTarget, MoveDir, TargetKind, TargetRole, Team, Upgrade, Weapon,
    WeaponClass,
};

use BtStatus::{Failure, Running, Success};

/// Upgrades bought by one `buy` action.
const MAX_BUY_UPGRADES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotAction {
    FireWeapon,
    /// Params: x, y, z.
    Teleport,
    /// Param: upgrade.
    ActivateUpgrade,
    /// Param: upgrade.
    DeactivateUpgrade,
    AimAtGoal,
    MoveToGoal,
    /// Params: direction bits, optionally more bits OR'd in.
    MoveInDir,
    StrafeDodge,
    AlternateStrafe,
    ClassDodge,
    /// Params: a target kind, or x, y, z.
    ChangeGoal,
    /// Param: class.
    EvolveTo,
    /// Params: text, say mode.
    Say,
    Suicide,
    Jump,
    ResetStuckTime,
    Gesture,
    Fight,
    Flee,
    Roam,
    /// Params: target kind, radius.
    RoamInRadius,
    /// Params: target kind, optional reach radius.
    MoveTo,
    Rush,
    Heal,
    Repair,
    /// Params: weapon then upgrades; none buys the desired loadout.
    Buy,
}

impl BotAction {
    pub const ALL: [Self; 26] = [
        Self::FireWeapon,
        Self::Teleport,
        Self::ActivateUpgrade,
        Self::DeactivateUpgrade,
        Self::AimAtGoal,
        Self::MoveToGoal,
        Self::MoveInDir,
        Self::StrafeDodge,
        Self::AlternateStrafe,
        Self::ClassDodge,
        Self::ChangeGoal,
        Self::EvolveTo,
        Self::Say,
        Self::Suicide,
        Self::Jump,
        Self::ResetStuckTime,
        Self::Gesture,
        Self::Fight,
        Self::Flee,
        Self::Roam,
        Self::RoamInRadius,
        Self::MoveTo,
        Self::Rush,
        Self::Heal,
        Self::Repair,
        Self::Buy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::FireWeapon => "fireWeapon",
            Self::Teleport => "teleport",
            Self::ActivateUpgrade => "activateUpgrade",
            Self::DeactivateUpgrade => "deactivateUpgrade",
            Self::AimAtGoal => "aimAtGoal",
            Self::MoveToGoal => "moveToGoal",
            Self::MoveInDir => "moveInDir",
            Self::StrafeDodge => "strafeDodge",
            Self::AlternateStrafe => "alternateStrafe",
            Self::ClassDodge => "classDodge",
            Self::ChangeGoal => "changeGoal",
            Self::EvolveTo => "evolveTo",
            Self::Say => "say",
            Self::Suicide => "suicide",
            Self::Jump => "jump",
            Self::ResetStuckTime => "resetStuckTime",
            Self::Gesture => "gesture",
            Self::Fight => "fight",
            Self::Flee => "flee",
            Self::Roam => "roam",
            Self::RoamInRadius => "roamInRadius",
            Self::MoveTo => "moveTo",
            Self::Rush => "rush",
            Self::Heal => "heal",
            Self::Repair => "repair",
            Self::Buy => "buy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Accepted parameter counts.
    pub fn param_count(self) -> RangeInclusive<usize> {
        match self {
            Self::Teleport => 3..=3,
            Self::ActivateUpgrade | Self::DeactivateUpgrade | Self::EvolveTo => 1..=1,
            Self::MoveInDir | Self::MoveTo => 1..=2,
            Self::ChangeGoal => 1..=3,
            Self::Say | Self::RoamInRadius => 2..=2,
            Self::Buy => 0..=1 + MAX_BUY_UPGRADES,
            _ => 0..=0,
        }
    }
}

pub(crate) fn act<W, B>(
    ctx: &mut BotCtx<'_, W, B>,
    node: NodeId,
    action: BotAction,
    params: &[Value],
) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    if !action.param_count().contains(&params.len()) {
        warn!(
            agent = ?ctx.agent,
            action = action.name(),
            params = params.len(),
            "wrong number of action parameters"
        );
        return Failure;
    }

    let agent = ctx.agent;
    match action {
        BotAction::FireWeapon => {
            switch_off_unusable_weapon(ctx);
            ctx.world.fire_weapon(agent);
            Success
        }
        BotAction::Teleport => {
            ctx.world.teleport(agent, vec3(params));
            Success
        }
        BotAction::ActivateUpgrade => {
            let u = Upgrade(int(params, 0));
            if !ctx.world.knows_upgrade(agent, u)
                || !ctx.world.has_upgrade(agent, u)
                || ctx.world.upgrade_active(agent, u)
            {
                return Failure;
            }
            ctx.world.set_upgrade_active(agent, u, true);
            Success
        }
        BotAction::DeactivateUpgrade => {
            let u = Upgrade(int(params, 0));
            if !ctx.world.has_upgrade(agent, u) || !ctx.world.upgrade_active(agent, u) {
                return Failure;
            }
            ctx.world.set_upgrade_active(agent, u, false);
            Success
        }
        BotAction::AimAtGoal => aim_at_goal(ctx),
        BotAction::MoveToGoal => {
            if !ctx.goal_is_valid() {
                return Failure;
            }
            let radius = ctx.goal_radius();
            approach_goal(ctx, radius)
        }
        BotAction::MoveInDir => {
            let mut bits = int(params, 0);
            if params.len() == 2 {
                bits |= int(params, 1);
            }
            ctx.world
                .move_in_dir(agent, MoveDir::from_bits_truncate(bits as u8));
            Success
        }
        BotAction::StrafeDodge => {
            ctx.world.strafe_dodge(agent);
            Success
        }
        BotAction::AlternateStrafe => {
            ctx.world.alternate_strafe(agent);
            Success
        }
        BotAction::ClassDodge => {
            let in_range = ctx
                .goal_target()
                .is_some_and(|t| ctx.world.in_attack_range(agent, t));
            ctx.world.class_movement(agent, in_range);
            Success
        }
        BotAction::ChangeGoal => change_goal(ctx, node, params),
        BotAction::EvolveTo => status(ctx.world.evolve(agent, int(params, 0))),
        BotAction::Say => {
            let text = params[0].as_text();
            ctx.world.say(agent, &text, int(params, 1));
            Success
        }
        BotAction::Suicide => {
            ctx.world.suicide(agent);
            Success
        }
        BotAction::Jump => status(ctx.world.jump(agent)),
        BotAction::ResetStuckTime => {
            ctx.world.reset_stuck_time(agent);
            Success
        }
        BotAction::Gesture => {
            ctx.world.gesture(agent);
            Success
        }
        BotAction::Fight => fight(ctx, node),
        BotAction::Flee => flee(ctx, node),
        BotAction::Roam => roam(ctx, node),
        BotAction::RoamInRadius => roam_in_radius(ctx, node, params),
        BotAction::MoveTo => move_to(ctx, node, params),
        BotAction::Rush => rush(ctx, node),
        BotAction::Heal => heal(ctx, node),
        BotAction::Repair => repair(ctx, node),
        BotAction::Buy => buy(ctx, node, params),
    }
}

fn int(params: &[Value], i: usize) -> i32 {
    params.get(i).map_or(0, Value::as_int)
}

fn float(params: &[Value], i: usize) -> f32 {
    params.get(i).map_or(0.0, Value::as_float)
}

fn vec3(params: &[Value]) -> Vec3 {
    Vec3::new(float(params, 0), float(params, 1), float(params, 2))
}

fn status(ok: bool) -> BtStatus {
    if ok {
        Success
    } else {
        Failure
    }
}

/// Humans drop an empty weapon and nobody fights with the build tool.
fn switch_off_unusable_weapon<W, B>(ctx: &mut BotCtx<'_, W, B>)
where
    W: BotWorld,
    B: NavMeshBackend,
{
    let agent = ctx.agent;
    let weapon = ctx.world.current_weapon(agent);
    let empty = ctx.world.weapon_is_empty(agent) && ctx.team() == Team::Humans;
    if empty || ctx.world.weapon_class(weapon) == WeaponClass::BuildTool {
        let blaster = ctx.world.weapon_of_class(WeaponClass::Blaster);
        ctx.world.force_weapon(agent, blaster);
    }
}

/// Success once within `radius`, otherwise walk; Failure without a path.
fn approach_goal<W, B>(ctx: &mut BotCtx<'_, W, B>, radius: f32) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    if ctx.goal_in_range(radius) {
        return Success;
    }
    if ctx.move_to_goal() {
        Running
    } else {
        Failure
    }
}

fn aim_at_goal<W, B>(ctx: &mut BotCtx<'_, W, B>) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    let agent = ctx.agent;
    let Some(target) = ctx.goal_target() else {
        return Failure;
    };
    let Some(pos) = ctx.target_position(target) else {
        return Failure;
    };

    let enemy = ctx
        .goal_entity()
        .is_some_and(|e| ctx.world.entity_team(e) != ctx.team());
    if enemy {
        ctx.world.aim_at_enemy(agent);
    } else {
        ctx.world.aim_at_location(agent, pos);
    }
    Success
}

fn change_goal<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId, params: &[Value]) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    let changed = match params.len() {
        1 => {
            let entity = ctx
                .resolve(TargetKind::from_param(int(params, 0)))
                .map(|(e, _)| e);
            ctx.change_goal_entity(entity)
        }
        3 => ctx.change_goal(GoalTarget::Position(vec3(params))),
        _ => false,
    };
    if !changed {
        return Failure;
    }
    ctx.bot.mind.set_current(node);
    Success
}

fn fight<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    let agent = ctx.agent;
    let team = ctx.team();
    let now = ctx.now_ms();

    if ctx.phase(node) != ActionPhase::InProgress {
        let enemy = ctx
            .world
            .find_entity(agent, TargetKind::Enemy)
            .filter(|&e| ctx.world.is_valid_enemy(agent, e));
        if !ctx.change_goal_entity(enemy) {
            return Failure;
        }
        ctx.bot.mind.set_current(node);
        ctx.bot.enemy_last_seen_ms = now;
        return Running;
    }

    // Target dead or no longer hostile.
    let Some(target) = ctx
        .goal_entity()
        .filter(|&e| ctx.world.is_valid_enemy(agent, e))
    else {
        return Success;
    };

    if !ctx.bot.nav.last_cmd().have_path {
        return Failure;
    }

    switch_off_unusable_weapon(ctx);

    let distance = ctx.distance_to_goal();
    if team == Team::Aliens && distance <= ctx.config.alien_sense_range {
        ctx.bot.enemy_last_seen_ms = now;
    }

    let goal = GoalTarget::Entity(target);
    if !ctx.world.is_visible(agent, goal) {
        let other_walkable = ctx
            .world
            .find_entity(agent, TargetKind::Enemy)
            .is_some_and(|e| e != target && ctx.world.path_is_walkable(agent, e));
        // Retarget through a fresh tree evaluation.
        if other_walkable {
            return Success;
        }
        if now.saturating_sub(ctx.bot.enemy_last_seen_ms) >= ctx.config.chase_time_ms {
            return Success;
        }
        ctx.move_to_goal();
        return Running;
    }

    let in_range = ctx.world.in_attack_range(agent, goal);
    ctx.bot.enemy_last_seen_ms = now;

    if !(in_range && team == Team::Humans) && !ctx.bot.nav.last_cmd().direct_path_to_goal {
        ctx.move_to_goal();
        return Running;
    }

    ctx.world.aim_at_enemy(agent);
    ctx.world.move_in_dir(agent, MoveDir::FORWARD);

    let class = ctx.world.weapon_class(ctx.world.current_weapon(agent));
    if in_range || class == WeaponClass::PainSaw {
        ctx.world.fire_weapon(agent);
    }

    if team == Team::Aliens {
        ctx.world.class_movement(agent, in_range);
        return Running;
    }

    keep_fighting_distance(ctx, target, distance, in_range, class);
    ctx.world.sprint(agent);
    Running
}

/// Human footwork: back off when skilled, circle targets that got close, close in on
/// far ones.
fn keep_fighting_distance<W, B>(
    ctx: &mut BotCtx<'_, W, B>,
    target: EntityId,
    distance: f32,
    in_range: bool,
    class: WeaponClass,
) where
    W: BotWorld,
    B: NavMeshBackend,
{
    let agent = ctx.agent;
    let skill = ctx.world.skill_level(agent);
    let d2 = distance * distance;
    let min2 = ctx.config.human_dance_min * ctx.config.human_dance_min;
    let max2 = ctx.config.human_dance_max * ctx.config.human_dance_max;
    let ranged = !matches!(class, WeaponClass::PainSaw | WeaponClass::Flamer);

    if skill >= ctx.config.dance_skill
        && d2 < max2
        && (d2 > min2 || skill < ctx.config.circle_skill)
        && ranged
    {
        ctx.world.move_in_dir(agent, MoveDir::BACKWARD);
    } else if d2 <= min2 {
        ctx.world.alternate_strafe(agent);
    } else if d2 >= max2 && class != WeaponClass::PainSaw {
        if d2 - max2 < 100.0 {
            ctx.world.stand_still(agent);
        } else {
            ctx.world.strafe_dodge(agent);
        }
    }

    if in_range && ctx.world.is_buildable(target) {
        ctx.world.stand_still(agent);
    }
}

fn flee<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    if ctx.phase(node) != ActionPhase::InProgress {
        let retreat = ctx.world.role_target(ctx.agent, TargetRole::Retreat);
        if !ctx.change_goal_entity(retreat) {
            return Failure;
        }
        ctx.bot.mind.set_current(node);
    }

    if !ctx.goal_is_valid() {
        return Failure;
    }
    let reach = ctx.config.flee_reach;
    if ctx.goal_in_range(reach) {
        return Success;
    }
    ctx.move_to_goal();
    Running
}

fn roam<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    if ctx.phase(node) != ActionPhase::InProgress {
        let radius = ctx.config.roam_radius;
        let Some(point) = ctx
            .position()
            .and_then(|origin| ctx.random_point(origin, radius))
        else {
            return Failure;
        };
        if !ctx.change_goal(GoalTarget::Position(point)) {
            return Failure;
        }
        ctx.bot.mind.set_current(node);
    }

    let radius = ctx.goal_radius();
    approach_goal(ctx, radius)
}

fn roam_in_radius<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId, params: &[Value]) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    if ctx.phase(node) != ActionPhase::InProgress {
        let kind = TargetKind::from_param(int(params, 0));
        let radius = float(params, 1);
        let Some(origin) = ctx
            .resolve(kind)
            .and_then(|(e, _)| ctx.world.entity_position(e))
        else {
            return Failure;
        };
        let Some(point) = ctx.random_point(origin, radius) else {
            return Failure;
        };
        if !ctx.change_goal(GoalTarget::Position(point)) {
            return Failure;
        }
        ctx.bot.mind.set_current(node);
    }

    let radius = ctx.goal_radius();
    approach_goal(ctx, radius)
}

fn move_to<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId, params: &[Value]) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    let radius = if params.len() > 1 {
        float(params, 1).max(0.0)
    } else {
        0.0
    };

    if ctx.phase(node) != ActionPhase::InProgress {
        let entity = ctx
            .resolve(TargetKind::from_param(int(params, 0)))
            .map(|(e, _)| e);
        if !ctx.change_goal_entity(entity) {
            return Failure;
        }
        ctx.bot.mind.set_current(node);
        return Running;
    }

    if !ctx.goal_is_valid() {
        return Failure;
    }
    let radius = if radius == 0.0 {
        ctx.goal_radius()
    } else {
        radius
    };
    approach_goal(ctx, radius)
}

fn rush<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    if ctx.phase(node) != ActionPhase::InProgress {
        let target = ctx.world.role_target(ctx.agent, TargetRole::Rush);
        if !ctx.change_goal_entity(target) {
            return Failure;
        }
        ctx.bot.mind.set_current(node);
        return Running;
    }

    if !ctx.goal_is_valid() {
        return Failure;
    }
    let radius = ctx.goal_radius();
    approach_goal(ctx, radius)
}

fn heal<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    let agent = ctx.agent;
    let team = ctx.team();
    let needs_medkit = team == Team::Humans && !ctx.world.has_medkit(agent);
    let healed = ctx.world.has_full_health(ctx.world.entity_of(agent)) && !needs_medkit;

    if ctx.phase(node) != ActionPhase::InProgress {
        if healed {
            return Failure;
        }
        let station = ctx.world.role_target(agent, TargetRole::Heal);
        if !ctx.change_goal_entity(station) {
            return Failure;
        }
        ctx.bot.mind.set_current(node);
    }

    if healed {
        return Success;
    }
    let Some(station) = ctx.goal_entity() else {
        return Failure;
    };
    if !ctx.world.is_powered(station) {
        return Failure;
    }

    match team {
        Team::Aliens => {
            let reach = ctx.world.heal_range(station) - 1.0;
            if !ctx.goal_in_range(reach) {
                ctx.move_to_goal();
            }
            Running
        }
        Team::Humans => {
            let distance = ctx.distance_to_goal();
            if ctx.world.heal_station_busy(station, agent) && distance > ctx.config.heal_wait_range
            {
                return Failure;
            }
            // Keep walking until standing on the station.
            if distance > ctx.world.heal_range(station) {
                ctx.move_to_goal();
            }
            Running
        }
        Team::None => Failure,
    }
}

fn repair<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    let agent = ctx.agent;
    if ctx.phase(node) != ActionPhase::InProgress {
        let damaged = ctx.world.find_entity(agent, TargetKind::DamagedBuilding);
        if !ctx.change_goal_entity(damaged) {
            return Failure;
        }
        ctx.bot.mind.set_current(node);
    }

    let Some(building) = ctx.goal_entity() else {
        return Failure;
    };
    if ctx.world.has_full_health(building) {
        return Success;
    }

    let weapon = ctx.world.current_weapon(agent);
    if ctx.world.weapon_class(weapon) != WeaponClass::BuildTool {
        let tool = ctx.world.weapon_of_class(WeaponClass::BuildTool);
        ctx.world.force_weapon(agent, tool);
    }

    let visible = ctx.world.is_visible(agent, GoalTarget::Entity(building));
    if !visible || ctx.distance_to_goal() > ctx.config.repair_range {
        ctx.move_to_goal();
        return Running;
    }

    // Buildings are repaired by aiming at them from close by.
    if let Some(pos) = ctx.world.entity_position(building) {
        ctx.world.aim_at_location(agent, pos);
    }
    Running
}

/// Weapon and upgrades named by the `buy` parameters. Out-of-range codes are dropped
/// with a warning.
fn buy_params<W: BotWorld>(world: &W, params: &[Value]) -> (Weapon, Vec<Upgrade>) {
    let mut weapon = Weapon(int(params, 0));
    if weapon.0 < 0 || weapon.0 >= world.weapon_count() {
        warn!(param = 1, code = weapon.0, "buy parameter out of range");
        weapon = Weapon::NONE;
    }

    let mut upgrades = Vec::with_capacity(MAX_BUY_UPGRADES);
    for (i, p) in params.iter().enumerate().skip(1) {
        let u = Upgrade(p.as_int());
        if u.0 <= Upgrade::NONE.0 || u.0 >= world.upgrade_count() {
            warn!(param = i + 1, code = u.0, "buy parameter out of range");
            continue;
        }
        upgrades.push(u);
    }
    (weapon, upgrades)
}

fn buy<W, B>(ctx: &mut BotCtx<'_, W, B>, node: NodeId, params: &[Value]) -> BtStatus
where
    W: BotWorld,
    B: NavMeshBackend,
{
    let agent = ctx.agent;
    let (weapon, upgrades) = if params.is_empty() {
        let loadout = ctx.world.desired_loadout(agent);
        (loadout.weapon, loadout.upgrades)
    } else {
        buy_params(&*ctx.world, params)
    };

    if !ctx.config.buying || ctx.team() != Team::Humans {
        return Failure;
    }

    let has_weapon = weapon == Weapon::NONE || ctx.world.has_weapon(agent, weapon);
    if has_weapon && upgrades.iter().all(|&u| ctx.world.has_upgrade(agent, u)) {
        return Failure;
    }

    if ctx.phase(node) != ActionPhase::InProgress {
        let armoury = ctx.world.role_target(agent, TargetRole::Armoury);
        if !ctx.change_goal_entity(armoury) {
            return Failure;
        }
        ctx.bot.mind.set_current(node);
    }

    let Some(armoury) = ctx.goal_entity() else {
        return Failure;
    };
    if !ctx.world.is_powered(armoury) {
        return Failure;
    }

    let use_range = ctx.config.use_range;
    if !ctx.goal_in_range(use_range) {
        ctx.move_to_goal();
        return Running;
    }

    if !upgrades.is_empty() {
        ctx.world.sell_upgrades(agent);
        for &u in &upgrades {
            if !ctx.world.buy_upgrade(agent, u) {
                return Failure;
            }
        }
    }
    if weapon != Weapon::NONE {
        ctx.world.sell_weapons(agent);
        if !ctx.world.buy_weapon(agent, weapon) {
            return Failure;
        }
        ctx.world.force_weapon(agent, weapon);
    }
    Success
}
