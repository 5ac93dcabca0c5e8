//! Bot agents: the behavior-tree action and condition leaves, goals, and the
//! `BotSystem` that drives path following and tree evaluation every frame.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod actions;
pub mod agent;
pub mod conditions;
pub mod config;
mod context;
pub mod goal;
pub mod system;
pub mod world;

pub use actions::BotAction;
pub use agent::BotAgent;
pub use conditions::BotFunc;
pub use config::{BotConfig, ConfigError};
pub use goal::{Goal, GoalTarget};
pub use system::BotSystem;
pub use world::{
    BotWorld, EntityId, Loadout, MoveDir, TargetKind, TargetRole, Team, Upgrade, Weapon,
    WeaponClass,
};

/// Behavior tree over the bot leaves.
pub type BotTree = ai_bt::BehaviorTree<BotAction, BotFunc>;

/// Builder for `BotTree`.
pub type BotTreeBuilder = ai_bt::TreeBuilder<BotAction, BotFunc>;
