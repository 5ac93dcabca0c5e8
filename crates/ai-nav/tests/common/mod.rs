#![allow(dead_code)]

use ai_nav::{NavMesh, OffMeshConnection, Vec3};

pub fn v(x: f32, y: f32) -> Vec3 {
    Vec3::new(x, y, 0.0)
}

/// Two triangles covering the 10x10 square starting at `x0`.
fn square(x0: f32, tris: &mut Vec<[Vec3; 3]>) {
    let x1 = x0 + 10.0;
    tris.push([v(x0, 0.0), v(x1, 0.0), v(x1, 10.0)]);
    tris.push([v(x0, 0.0), v(x1, 10.0), v(x0, 10.0)]);
}

/// `n` connected squares along x; square `k` holds triangles `2k` (below its diagonal)
/// and `2k + 1` (above it).
pub fn strip(n: usize) -> NavMesh {
    let mut tris = Vec::new();
    for k in 0..n {
        square(k as f32 * 10.0, &mut tris);
    }
    NavMesh::from_triangles(tris)
}

/// Squares at `[0, 10]` and `[20, 30]` with nothing walkable in between.
pub fn islands() -> NavMesh {
    let mut tris = Vec::new();
    square(0.0, &mut tris);
    square(20.0, &mut tris);
    NavMesh::from_triangles(tris)
}

/// `islands` joined by a one-way jump from `(9, 5)` to `(21, 5)`.
pub fn islands_with_jump() -> NavMesh {
    islands().with_off_mesh_connection(OffMeshConnection {
        start: v(9.0, 5.0),
        end: v(21.0, 5.0),
        radius: 2.0,
        bidirectional: false,
    })
}
