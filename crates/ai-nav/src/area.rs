use crate::{Aabb, NavMeshBackend, NavMeshes, PolyFlags};

/// Polygons touched per mesh by one area toggle.
const MAX_AREA_POLYS: usize = 20;

/// Overwrite the flags of every polygon touched by `bounds`, disabled ones included,
/// in every loaded mesh.
pub fn set_area_flags<B: NavMeshBackend>(meshes: &mut NavMeshes<B>, bounds: Aabb, flags: PolyFlags) {
    for (_, mesh) in meshes.iter_mut() {
        let polys = mesh.query_polygons(bounds);
        for poly in polys.into_iter().take(MAX_AREA_POLYS) {
            mesh.set_poly_flags(poly, flags);
        }
    }
}

pub fn disable_area<B: NavMeshBackend>(meshes: &mut NavMeshes<B>, bounds: Aabb) {
    set_area_flags(meshes, bounds, PolyFlags::DISABLED);
}

pub fn enable_area<B: NavMeshBackend>(meshes: &mut NavMeshes<B>, bounds: Aabb) {
    set_area_flags(meshes, bounds, PolyFlags::WALK);
}
