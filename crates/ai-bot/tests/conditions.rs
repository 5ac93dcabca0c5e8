mod common;

use std::sync::Arc;

use ai_bot::{BotFunc, BotSystem, BotTreeBuilder, EntityId, GoalTarget, TargetKind, Team};
use ai_bt::{BinaryOp, BtStatus, Expr, Value};
use ai_nav::NavMesh;
use common::{at, strip, system_with, v, Entity, TestWorld, BOT, RIFLE};

type BotExpr = Expr<BotFunc>;

fn func(func: BotFunc) -> BotExpr {
    Expr::func(func, vec![])
}

fn func1(func: BotFunc, param: i32) -> BotExpr {
    Expr::func(func, vec![Value::Int(param)])
}

fn cmp(op: BinaryOp, lhs: BotExpr, rhs: impl Into<Value>) -> BotExpr {
    Expr::binary(op, lhs, Expr::value(rhs))
}

/// Bot with a single condition leaf over `expr`.
fn system(expr: BotExpr) -> BotSystem<u32, NavMesh> {
    let mut b = BotTreeBuilder::new();
    let root = b.condition(expr, None);
    system_with(strip(5), Arc::new(b.build("check", root).expect("tree")))
}

fn holds(world: &mut TestWorld, expr: BotExpr, time_ms: u64) -> bool {
    let mut system = system(expr);
    system.tick(world, &at(time_ms)) == vec![(BOT, BtStatus::Success)]
}

#[test]
fn own_state() {
    let mut world = TestWorld::new(v(1.0, 5.0), Team::Humans);
    world.skill = 4;
    world.weapons.insert(RIFLE);

    assert!(holds(&mut world, cmp(BinaryOp::Eq, func(BotFunc::Team), 2), 0));
    assert!(holds(&mut world, cmp(BinaryOp::Ge, func(BotFunc::Skill), 4), 0));
    assert!(holds(&mut world, cmp(BinaryOp::Ge, func(BotFunc::Health), 1.0f32), 0));
    assert!(holds(&mut world, cmp(BinaryOp::Eq, func(BotFunc::Weapon), 1), 0));
    assert!(holds(&mut world, func1(BotFunc::HaveWeapon, RIFLE.0), 0));
    assert!(!holds(&mut world, func1(BotFunc::HaveUpgrade, 3), 0));
    assert!(!holds(&mut world, func1(BotFunc::UpgradeActive, 3), 0));
    assert!(holds(&mut world, func(BotFunc::BuyingEnabled), 0));
}

#[test]
fn distance_and_visibility_by_kind() {
    let mut world = TestWorld::new(v(1.0, 5.0), Team::Humans);
    let enemy_code = TargetKind::Enemy.code();
    let near = cmp(BinaryOp::Lt, func1(BotFunc::Distance, enemy_code), 30);

    // Nothing to measure against.
    assert!(!holds(&mut world, near.clone(), 0));
    assert!(holds(
        &mut world,
        cmp(BinaryOp::Gt, func1(BotFunc::Distance, enemy_code), 1.0e6f32),
        0
    ));

    let enemy = world.spawn(2, Entity::player(v(25.0, 5.0), Team::Aliens));
    world.set_found(TargetKind::Enemy, enemy);
    assert!(holds(&mut world, near.clone(), 0));
    assert!(!holds(&mut world, func1(BotFunc::IsVisible, enemy_code), 0));

    world.visible.insert(enemy);
    assert!(holds(&mut world, func1(BotFunc::IsVisible, enemy_code), 0));

    world.place(2, v(45.0, 5.0));
    assert!(!holds(&mut world, near, 0));

    let self_code = TargetKind::SelfEntity.code();
    assert!(holds(
        &mut world,
        cmp(BinaryOp::Eq, func1(BotFunc::Distance, self_code), 0),
        0
    ));
}

#[test]
fn goal_queries_follow_the_path_update() {
    let mut world = TestWorld::new(v(1.0, 5.0), Team::Humans);
    let enemy = world.spawn(2, Entity::player(v(25.0, 5.0), Team::Aliens));

    let expr = Expr::and(
        Expr::and(func(BotFunc::GoalIsValid), func(BotFunc::HavePath)),
        Expr::and(
            func(BotFunc::DirectPathToGoal),
            cmp(BinaryOp::Eq, func(BotFunc::GoalTeam), Team::Aliens.code()),
        ),
    );
    let mut system = system(expr);
    assert_eq!(system.tick(&mut world, &at(0)), vec![(BOT, BtStatus::Failure)]);

    system
        .agent_mut(BOT)
        .expect("bot")
        .set_goal(GoalTarget::Entity(enemy));
    assert_eq!(system.tick(&mut world, &at(100)), vec![(BOT, BtStatus::Success)]);

    world.entities.remove(&EntityId(2));
    assert_eq!(system.tick(&mut world, &at(200)), vec![(BOT, BtStatus::Failure)]);
}

#[test]
fn clocks_and_dice() {
    let mut world = TestWorld::new(v(1.0, 5.0), Team::Humans);
    let since = cmp(BinaryOp::Eq, func(BotFunc::TimeSinceEnemySeen), 700);
    assert!(holds(&mut world, since, 700));

    let die = Expr::and(
        cmp(BinaryOp::Ge, func(BotFunc::Random), 0),
        cmp(BinaryOp::Lt, func(BotFunc::Random), 1),
    );
    for t in [0, 100, 200, 300] {
        assert!(holds(&mut world, die.clone(), t));
    }
}

#[test]
fn dice_rolled_twice_in_one_tick_differ() {
    let mut world = TestWorld::new(v(1.0, 5.0), Team::Humans);
    let rolls_differ = Expr::binary(BinaryOp::Ne, func(BotFunc::Random), func(BotFunc::Random));
    for t in [0, 100, 200, 300] {
        assert!(holds(&mut world, rolls_differ.clone(), t));
    }
}
