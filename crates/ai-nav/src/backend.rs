use ai_core::DeterministicRng;
use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, Vec3};

/// Backend polygon reference. Off-mesh connections are polygons too.
///
/// References are stable for the lifetime of the loaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolyRef(pub u32);

/// Backend handle of a materialized box obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObstacleRef(pub u32);

bitflags! {
    /// Per-corner flags reported by the straight path query.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CornerFlags: u8 {
        const START = 0x01;
        const END = 0x02;
        const OFFMESH_CONNECTION = 0x04;
    }
}

bitflags! {
    /// Polygon traversal flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PolyFlags: u16 {
        const WALK = 0x01;
        const JUMP = 0x02;
        const DISABLED = 0x10;
    }
}

/// One straight-path point in front of the agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub pos: Vec3,
    pub flags: CornerFlags,
    pub poly: PolyRef,
}

impl Corner {
    pub fn is_off_mesh(&self) -> bool {
        self.flags.contains(CornerFlags::OFFMESH_CONNECTION)
    }
}

/// Authored link between two mesh points that is not walkable surface (jump pad, ledge).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OffMeshConnection {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    pub bidirectional: bool,
}

/// Ray cast result: `t` is the hit fraction along the segment, `f32::MAX` when the ray
/// reached its end without leaving walkable space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub t: f32,
    pub normal: Vec3,
}

impl RaycastHit {
    pub fn is_hit(&self) -> bool {
        self.t <= 1.0
    }
}

/// Polygon path returned by `find_path`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyPath {
    pub polys: Vec<PolyRef>,
    /// The path ends at the reachable polygon closest to the requested end.
    pub partial: bool,
}

/// Agent dimensions the mesh was built for.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshParams {
    pub walkable_radius: f32,
    pub walkable_height: f32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            walkable_radius: 15.0,
            walkable_height: 56.0,
        }
    }
}

/// Query and obstacle primitives of one loaded navigation mesh.
///
/// Implementations own mesh geometry and the tile cache. Every query is read-only;
/// the obstacle and flag operations are only called from the thread driving the tick.
pub trait NavMeshBackend {
    fn params(&self) -> MeshParams;

    /// Nearest walkable polygon within `half_extents` of `center`, with the closest
    /// point on it.
    fn find_nearest_poly(&self, center: Vec3, half_extents: Vec3) -> Option<(PolyRef, Vec3)>;

    /// Polygon path from `start_ref` toward `end_ref`, capped at `max_path` polygons.
    fn find_path(
        &self,
        start_ref: PolyRef,
        end_ref: PolyRef,
        start: Vec3,
        end: Vec3,
        max_path: usize,
    ) -> Option<PolyPath>;

    /// String-pulled corners along `path`, starting after `start`.
    fn find_straight_path(
        &self,
        start: Vec3,
        end: Vec3,
        path: &[PolyRef],
        max_corners: usize,
    ) -> Vec<Corner>;

    /// Slide from `start` toward `end` constrained to the surface. Returns the reached
    /// point and the visited polygons, `start_ref` first.
    fn move_along_surface(
        &self,
        start_ref: PolyRef,
        start: Vec3,
        end: Vec3,
    ) -> Option<(Vec3, Vec<PolyRef>)>;

    fn is_valid_poly(&self, poly: PolyRef) -> bool;

    fn closest_point_on_poly(&self, poly: PolyRef, p: Vec3) -> Option<Vec3>;

    /// 2-D containment test.
    fn point_in_poly(&self, poly: PolyRef, p: Vec3) -> bool;

    fn poly_bounds(&self, poly: PolyRef) -> Option<Aabb>;

    /// Surface height under `p`, if `p` is over the polygon.
    fn poly_height(&self, poly: PolyRef, p: Vec3) -> Option<f32>;

    fn raycast(&self, start_ref: PolyRef, start: Vec3, end: Vec3) -> Option<RaycastHit>;

    /// Random reachable point, roughly within `radius` of `center`, uniform over area.
    fn random_point_around_circle(
        &self,
        start_ref: PolyRef,
        center: Vec3,
        radius: f32,
        rng: &mut dyn DeterministicRng,
    ) -> Option<(PolyRef, Vec3)>;

    fn off_mesh_connection(&self, poly: PolyRef) -> Option<OffMeshConnection>;

    /// Traversal direction endpoints of `con` when entered from `prev`.
    fn off_mesh_connection_end_points(&self, prev: PolyRef, con: PolyRef) -> Option<(Vec3, Vec3)>;

    /// All polygons, disabled ones included, overlapping `bounds`.
    fn query_polygons(&self, bounds: Aabb) -> Vec<PolyRef>;

    fn poly_flags(&self, poly: PolyRef) -> Option<PolyFlags>;

    fn set_poly_flags(&mut self, poly: PolyRef, flags: PolyFlags);

    /// Queue a box obstacle; `None` when the cache refuses it.
    fn add_box_obstacle(&mut self, bounds: Aabb) -> Option<ObstacleRef>;

    fn remove_obstacle(&mut self, obstacle: ObstacleRef) -> bool;

    fn obstacle_count(&self) -> usize;

    /// Advance the incremental obstacle rebuild by one step.
    fn update(&mut self);
}
