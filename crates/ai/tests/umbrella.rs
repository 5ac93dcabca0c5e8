#![cfg(feature = "bot")]

use ai::bot::{BotAction, BotConfig, BotTreeBuilder};
use ai::bt::{BtStatus, Value};

#[test]
fn bot_config_reads_json_with_defaults() {
    let config: BotConfig =
        serde_json::from_str(r#"{ "chase_time_ms": 2000, "nav": { "goal_radius": 4.0 } }"#)
            .expect("config");

    assert_eq!(config.chase_time_ms, 2000);
    assert_eq!(config.nav.goal_radius, 4.0);
    assert_eq!(config.nav.max_path_polys, ai::nav::NavConfig::default().max_path_polys);
    assert_eq!(config.bt, ai::bt::BtConfig::default());
}

#[test]
fn trees_build_through_the_umbrella() {
    let mut b = BotTreeBuilder::new();
    let fight = b.action(BotAction::Fight, vec![]);
    let roam = b.action(BotAction::Roam, vec![]);
    let done = b.action(BotAction::Say, vec![Value::from("gg"), Value::Int(0)]);
    let ret = b.returns(done, BtStatus::Success);
    let root = b.selector(vec![fight, roam, ret]);
    let tree = b.build("default", root).expect("tree");

    assert_eq!(tree.name(), "default");
    assert_eq!(tree.len(), 6);
}
