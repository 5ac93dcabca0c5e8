mod common;

use ai_nav::{
    Aabb, MeshHandle, NavAgent, NavConfig, NavError, NavMeshBackend, PolyRef, RouteTarget, Vec3,
};
use common::{islands, islands_with_jump, strip, v};

fn agent(config: &NavConfig) -> NavAgent {
    let mut agent = NavAgent::new();
    agent.assign_mesh(MeshHandle(0), config);
    agent
}

#[test]
fn fresh_agent_replans_on_first_update() {
    let config = NavConfig::default();
    let mesh = strip(3);
    let mut agent = agent(&config);
    assert!(agent.need_replan());

    let target = RouteTarget::position(v(29.0, 5.0), config.target_extents);
    let cmd = agent.update_path(&mesh, &config, v(1.0, 5.0), &target);

    assert!(cmd.have_path);
    assert!(!agent.need_replan());
    assert!(cmd.direct_path_to_goal);
    assert!((cmd.dir.x - 1.0).abs() < 1e-4, "{:?}", cmd.dir);
    assert_eq!(cmd.pos, v(1.0, 5.0));
    assert_eq!(cmd.tpos, v(29.0, 5.0));
    assert_eq!(agent.corridor().first_poly(), Some(PolyRef(1)));
    assert_eq!(agent.corridor().path().len(), 6);
    assert_eq!(agent.last_cmd(), &cmd);
}

#[test]
fn corridor_follows_the_agent() {
    let config = NavConfig::default();
    let mesh = strip(3);
    let mut agent = agent(&config);
    let target = RouteTarget::position(v(29.0, 5.0), config.target_extents);

    agent.update_path(&mesh, &config, v(1.0, 5.0), &target);
    for x in [4.0, 8.0, 12.0, 15.0, 19.0, 24.0] {
        let pos = v(x, 5.0);
        let cmd = agent.update_path(&mesh, &config, pos, &target);
        assert!(cmd.have_path, "lost path at x = {x}");

        let first = agent.corridor().first_poly().expect("corridor");
        assert!(agent.need_replan() || mesh.point_in_poly(first, pos));
        assert_eq!(agent.corridor().last_poly(), Some(PolyRef(4)));
    }
}

#[test]
fn unreachable_target_reports_no_path() {
    let config = NavConfig::default();
    let mesh = islands();
    let mut agent = agent(&config);
    let target = RouteTarget::position(v(25.0, 5.0), config.target_extents);

    let err = agent
        .find_route(&mesh, &config, v(1.0, 5.0), &target, false)
        .unwrap_err();
    assert!(matches!(err, NavError::PartialRoute(_)), "{err}");
    assert!(agent.need_replan());

    let cmd = agent.update_path(&mesh, &config, v(1.0, 5.0), &target);
    assert!(!cmd.have_path);
    assert!(agent.need_replan());
}

#[test]
fn partial_route_clamps_the_end() {
    let config = NavConfig::default();
    let mesh = islands();
    let mut agent = agent(&config);
    let target = RouteTarget::position(v(25.0, 5.0), config.target_extents);

    agent
        .find_route(&mesh, &config, v(1.0, 5.0), &target, true)
        .expect("partial allowed");
    assert!(!agent.need_replan());

    let end = agent.corridor().target();
    let last = agent.corridor().last_poly().expect("corridor");
    assert!(mesh.point_in_poly(last, end));
    assert!(end.x <= 10.0 + 1e-4);
}

#[test]
fn off_mesh_connection_is_entered_and_left_within_its_radius() {
    let config = NavConfig::default();
    let mesh = islands_with_jump();
    let mut agent = agent(&config);
    let target = RouteTarget::position(v(29.0, 5.0), config.target_extents);

    let cmd = agent.update_path(&mesh, &config, v(5.0, 5.0), &target);
    assert!(cmd.have_path);
    assert_eq!(agent.corners().len(), 1);
    assert!(agent.corners()[0].is_off_mesh());
    assert_eq!(agent.corners()[0].pos, v(9.0, 5.0));

    // Exactly on the radius is still outside.
    agent.update_path(&mesh, &config, v(7.0, 5.0), &target);
    assert!(!agent.is_off_mesh());

    let cmd = agent.update_path(&mesh, &config, v(7.5, 5.0), &target);
    assert!(agent.is_off_mesh());
    assert!(cmd.have_path);
    assert!(!cmd.direct_path_to_goal);
    assert_eq!(cmd.pos, v(9.0, 5.0));
    assert!((cmd.dir.x - 1.0).abs() < 1e-5);
    let traversal = agent.off_mesh().copied().expect("traversal");
    assert_eq!(traversal.start, v(9.0, 5.0));
    assert_eq!(traversal.end, v(21.0, 5.0));

    agent.update_path(&mesh, &config, v(18.5, 5.0), &target);
    assert!(agent.is_off_mesh());

    let cmd = agent.update_path(&mesh, &config, v(19.5, 5.0), &target);
    assert!(cmd.have_path);
    assert!(!agent.is_off_mesh());

    let cmd = agent.update_path(&mesh, &config, v(22.0, 5.0), &target);
    assert!(cmd.have_path);
    assert!(!agent.need_replan());
    assert_eq!(agent.corridor().first_poly(), Some(PolyRef(3)));
}

#[test]
fn blocked_corridor_is_trimmed_and_replanned() {
    let config = NavConfig::default();
    let mut mesh = strip(3);
    let mut agent = agent(&config);
    let target = RouteTarget::position(v(29.0, 5.0), config.target_extents);
    assert!(agent.update_path(&mesh, &config, v(1.0, 5.0), &target).have_path);

    let door = mesh
        .add_box_obstacle(Aabb::new(Vec3::new(12.0, -1.0, -1.0), Vec3::new(18.0, 11.0, 1.0)))
        .expect("obstacle");
    mesh.update();

    let cmd = agent.update_path(&mesh, &config, v(2.0, 5.0), &target);
    assert!(!cmd.have_path);
    assert!(agent.need_replan());
    assert_eq!(agent.corridor().path(), &[PolyRef(1), PolyRef(0)]);

    mesh.remove_obstacle(door);
    mesh.update();
    let cmd = agent.update_path(&mesh, &config, v(2.0, 5.0), &target);
    assert!(cmd.have_path);
    assert_eq!(agent.corridor().path().len(), 6);
}

#[test]
fn moving_target_drags_the_corridor_end() {
    let config = NavConfig::default();
    let mesh = strip(3);
    let mut agent = agent(&config);

    let target = RouteTarget::entity(v(25.0, 5.0), config.target_extents);
    assert!(agent.update_path(&mesh, &config, v(1.0, 5.0), &target).have_path);

    let target = RouteTarget::entity(v(27.0, 2.0), config.target_extents);
    let cmd = agent.update_path(&mesh, &config, v(1.0, 5.0), &target);
    assert!(cmd.have_path);
    assert_eq!(agent.corridor().target(), v(27.0, 2.0));
    assert_eq!(agent.corridor().last_poly(), Some(PolyRef(4)));
}
