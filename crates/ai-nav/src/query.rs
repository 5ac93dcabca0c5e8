use ai_core::DeterministicRng;
use tracing::trace;

use crate::{NavConfig, NavError, NavMeshBackend, PolyRef, RaycastHit, Vec3};

/// Snap `p` onto the mesh, retrying once with a taller search box for points high
/// above the floor (jumping agents, entities on ledges).
pub fn find_nearest_poly<B>(nav: &B, config: &NavConfig, p: Vec3) -> Result<(PolyRef, Vec3), NavError>
where
    B: NavMeshBackend + ?Sized,
{
    if let Some(hit) = nav.find_nearest_poly(p, config.poly_half_extents) {
        return Ok(hit);
    }
    let mut extents = config.poly_half_extents;
    extents.z += config.poly_retry_vertical;
    trace!(?p, "nearest polygon retry with widened vertical extent");
    nav.find_nearest_poly(p, extents).ok_or(NavError::NoPolygon(p))
}

/// Random reachable point near `origin`.
pub fn random_point_in_radius<B>(
    nav: &B,
    config: &NavConfig,
    origin: Vec3,
    radius: f32,
    rng: &mut dyn DeterministicRng,
) -> Result<Vec3, NavError>
where
    B: NavMeshBackend + ?Sized,
{
    let (poly, _) = find_nearest_poly(nav, config, origin)?;
    nav.random_point_around_circle(poly, origin, radius, rng)
        .map(|(_, p)| p)
        .ok_or(NavError::NoPolygon(origin))
}

/// Walkability ray cast from `start` toward `end` along the mesh surface.
pub fn nav_trace<B>(nav: &B, config: &NavConfig, start: Vec3, end: Vec3) -> Result<RaycastHit, NavError>
where
    B: NavMeshBackend + ?Sized,
{
    let (poly, _) = find_nearest_poly(nav, config, start)?;
    nav.raycast(poly, start, end).ok_or(NavError::Raycast(start))
}
