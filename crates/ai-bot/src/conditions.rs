use ai_bt::Value;
use ai_core::DeterministicRng;
use ai_nav::NavMeshBackend;

use crate::context::BotCtx;
use crate::{BotWorld, GoalTarget, TargetKind, Upgrade, Weapon};

/// World queries available to condition expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotFunc {
    /// Own team code (0 none, 1 aliens, 2 humans).
    Team,
    Skill,
    /// Own health as a fraction of the maximum.
    Health,
    /// Code of the held weapon.
    Weapon,
    /// Param: weapon.
    HaveWeapon,
    /// Param: upgrade.
    HaveUpgrade,
    /// Param: upgrade.
    UpgradeActive,
    /// Param: target kind. `f32::MAX` when nothing matches.
    Distance,
    /// Param: target kind.
    IsVisible,
    GoalIsValid,
    /// Team code of the goal entity, 0 for position goals.
    GoalTeam,
    HavePath,
    DirectPathToGoal,
    /// Milliseconds since the fight target was last seen.
    TimeSinceEnemySeen,
    /// Uniform sample in `[0, 1)`, stable within a tick.
    Random,
    BuyingEnabled,
}

pub(crate) fn call<W, B>(ctx: &mut BotCtx<'_, W, B>, func: BotFunc, params: &[Value]) -> Value
where
    W: BotWorld,
    B: NavMeshBackend,
{
    let agent = ctx.agent;
    let param = params.first().map_or(0, Value::as_int);

    match func {
        BotFunc::Team => Value::Int(ctx.team().code()),
        BotFunc::Skill => Value::Int(ctx.world.skill_level(agent)),
        BotFunc::Health => Value::Float(ctx.world.health_fraction(ctx.world.entity_of(agent))),
        BotFunc::Weapon => Value::Int(ctx.world.current_weapon(agent).0),
        BotFunc::HaveWeapon => Value::from(ctx.world.has_weapon(agent, Weapon(param))),
        BotFunc::HaveUpgrade => Value::from(ctx.world.has_upgrade(agent, Upgrade(param))),
        BotFunc::UpgradeActive => Value::from(ctx.world.upgrade_active(agent, Upgrade(param))),
        BotFunc::Distance => {
            let distance = ctx
                .resolve(TargetKind::from_param(param))
                .map_or(f32::MAX, |(_, d)| d);
            Value::Float(distance)
        }
        BotFunc::IsVisible => {
            let visible = ctx
                .resolve(TargetKind::from_param(param))
                .is_some_and(|(e, _)| ctx.world.is_visible(agent, GoalTarget::Entity(e)));
            Value::from(visible)
        }
        BotFunc::GoalIsValid => Value::from(ctx.goal_is_valid()),
        BotFunc::GoalTeam => Value::Int(
            ctx.goal_entity()
                .map_or(0, |e| ctx.world.entity_team(e).code()),
        ),
        BotFunc::HavePath => Value::from(ctx.bot.nav.last_cmd().have_path),
        BotFunc::DirectPathToGoal => Value::from(ctx.bot.nav.last_cmd().direct_path_to_goal),
        BotFunc::TimeSinceEnemySeen => {
            let elapsed = ctx.now_ms().saturating_sub(ctx.bot.enemy_last_seen_ms);
            Value::Int(i32::try_from(elapsed).unwrap_or(i32::MAX))
        }
        BotFunc::Random => Value::Float(ctx.random_rng.next_f32_unit()),
        BotFunc::BuyingEnabled => Value::from(ctx.config.buying),
    }
}
