use ai_nav::{
    CornerFlags, NavMesh, NavMeshBackend, OffMeshConnection, PolyFlags, PolyRef, Vec3,
};

fn v(x: f32, y: f32) -> Vec3 {
    Vec3::new(x, y, 0.0)
}

fn l_shape_mesh() -> NavMesh {
    NavMesh::from_triangles(vec![
        // Lower-left quad split.
        [v(0.0, 0.0), v(4.0, 0.0), v(3.0, 1.0)],
        [v(0.0, 0.0), v(3.0, 1.0), v(0.0, 1.0)],
        // Upper-right quad split.
        [v(4.0, 0.0), v(4.0, 4.0), v(3.0, 4.0)],
        [v(4.0, 0.0), v(3.0, 4.0), v(3.0, 1.0)],
    ])
}

/// Two disjoint 10x10 squares, `[0, 10]` and `[20, 30]` along x.
fn islands() -> Vec<[Vec3; 3]> {
    let mut tris = Vec::new();
    for x0 in [0.0, 20.0] {
        let x1 = x0 + 10.0;
        tris.push([v(x0, 0.0), v(x1, 0.0), v(x1, 10.0)]);
        tris.push([v(x0, 0.0), v(x1, 10.0), v(x0, 10.0)]);
    }
    tris
}

#[test]
fn straight_path_turns_the_corner() {
    let mesh = l_shape_mesh();
    let start = v(0.2, 0.2);
    let goal = v(3.8, 3.8);

    let start_ref = mesh.find_triangle(start).expect("start on mesh");
    let goal_ref = mesh.find_triangle(goal).expect("goal on mesh");
    assert_eq!(start_ref, PolyRef(1));
    assert_eq!(goal_ref, PolyRef(2));

    let path = mesh
        .find_path(start_ref, goal_ref, start, goal, 64)
        .expect("path");
    assert!(!path.partial);
    assert_eq!(path.polys, vec![PolyRef(1), PolyRef(0), PolyRef(3), PolyRef(2)]);

    let corners = mesh.find_straight_path(start, goal, &path.polys, 8);
    assert_eq!(corners.len(), 2, "{corners:?}");
    assert_eq!(corners[0].pos, v(3.0, 1.0));
    assert!(corners[0].flags.is_empty());
    assert_eq!(corners[1].pos, goal);
    assert!(corners[1].flags.contains(CornerFlags::END));
}

#[test]
fn straight_path_respects_corner_budget() {
    let mesh = l_shape_mesh();
    let start = v(0.2, 0.2);
    let goal = v(3.8, 3.8);
    let path = mesh
        .find_path(PolyRef(1), PolyRef(2), start, goal, 64)
        .expect("path");

    let corners = mesh.find_straight_path(start, goal, &path.polys, 1);
    assert_eq!(corners.len(), 1);
    assert_eq!(corners[0].pos, v(3.0, 1.0));
}

#[test]
fn raycast_stops_at_the_missing_square() {
    let mesh = l_shape_mesh();
    let hit = mesh
        .raycast(PolyRef(1), v(0.2, 0.2), v(3.8, 3.8))
        .expect("raycast");

    assert!(hit.is_hit());
    assert!((hit.t - 2.0 / 9.0).abs() < 1e-4, "t = {}", hit.t);
    assert!((hit.normal.y + 1.0).abs() < 1e-5, "normal = {:?}", hit.normal);
}

#[test]
fn raycast_inside_the_mesh_reaches_the_end() {
    let mesh = l_shape_mesh();
    let hit = mesh
        .raycast(PolyRef(1), v(0.2, 0.5), v(3.0, 0.5))
        .expect("raycast");
    assert!(!hit.is_hit());
}

#[test]
fn nearest_poly_projects_outside_points() {
    let mesh = l_shape_mesh();
    let p = v(2.0, 2.0);
    let (_, q) = mesh
        .find_nearest_poly(p, Vec3::new(2.0, 2.0, 2.0))
        .expect("projection");
    assert!((p.distance(q) - 1.0).abs() < 1e-3);

    assert!(mesh.find_nearest_poly(v(20.0, 20.0), Vec3::new(1.0, 1.0, 1.0)).is_none());
}

#[test]
fn disabled_polygons_are_not_walkable() {
    let mut mesh = l_shape_mesh();
    assert!(mesh.is_valid_poly(PolyRef(0)));

    mesh.set_poly_flags(PolyRef(0), PolyFlags::DISABLED);
    assert!(!mesh.is_valid_poly(PolyRef(0)));

    let path = mesh
        .find_path(PolyRef(1), PolyRef(2), v(0.2, 0.2), v(3.8, 3.8), 64)
        .expect("partial path");
    assert!(path.partial);
    assert_eq!(path.polys, vec![PolyRef(1)]);
}

#[test]
fn box_obstacles_apply_on_update() {
    let mut mesh = l_shape_mesh();
    let obstacle = mesh
        .add_box_obstacle(ai_nav::Aabb::new(Vec3::new(3.2, 2.0, -1.0), Vec3::new(3.8, 3.0, 1.0)))
        .expect("accepted");
    assert_eq!(mesh.obstacle_count(), 1);
    assert!(!mesh.is_blocked(PolyRef(2)));

    mesh.update();
    assert!(mesh.is_blocked(PolyRef(2)));
    assert!(mesh.is_blocked(PolyRef(3)));
    assert!(!mesh.is_valid_poly(PolyRef(2)));

    assert!(mesh.remove_obstacle(obstacle));
    mesh.update();
    assert_eq!(mesh.obstacle_count(), 0);
    assert!(mesh.is_valid_poly(PolyRef(2)));
}

#[test]
fn off_mesh_connection_links_islands_one_way() {
    let mesh = NavMesh::from_triangles(islands()).with_off_mesh_connection(OffMeshConnection {
        start: v(9.0, 5.0),
        end: v(21.0, 5.0),
        radius: 2.0,
        bidirectional: false,
    });
    let link = PolyRef(4);
    assert!(mesh.off_mesh_connection(link).is_some());

    let start = v(1.0, 5.0);
    let goal = v(29.0, 5.0);
    let start_ref = mesh.find_triangle(start).expect("start");
    let goal_ref = mesh.find_triangle(goal).expect("goal");

    let path = mesh
        .find_path(start_ref, goal_ref, start, goal, 64)
        .expect("path");
    assert!(!path.partial);
    assert!(path.polys.contains(&link));

    let corners = mesh.find_straight_path(start, goal, &path.polys, 8);
    let off = corners
        .iter()
        .position(|c| c.flags.contains(CornerFlags::OFFMESH_CONNECTION))
        .expect("off-mesh corner");
    assert_eq!(corners[off].pos, v(9.0, 5.0));
    assert_eq!(corners[off].poly, link);
    assert_eq!(corners[off + 1].pos, v(21.0, 5.0));
    assert_eq!(corners.last().map(|c| c.pos), Some(goal));

    let back = mesh
        .find_path(goal_ref, start_ref, goal, start, 64)
        .expect("partial path");
    assert!(back.partial);
    assert!(!back.polys.contains(&link));
}

#[test]
fn move_along_surface_slides_along_walls() {
    let mesh = NavMesh::from_triangles(islands());
    let (pos, visited) = mesh
        .move_along_surface(PolyRef(1), v(5.0, 5.0), v(15.0, 5.0))
        .expect("move");
    assert!((pos.x - 10.0).abs() < 1e-4, "{pos:?}");
    assert!((pos.y - 5.0).abs() < 1e-4);
    assert_eq!(visited.first(), Some(&PolyRef(1)));
    assert_eq!(visited.last(), Some(&PolyRef(0)));
}
