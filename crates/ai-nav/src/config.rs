#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Vec3;

/// Navigation tunables shared by every agent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Corridor capacity in polygons.
    pub max_path_polys: usize,
    /// Corners kept per update; the steering function reads the first two.
    pub max_corners: usize,
    /// Polygons checked by the corridor validity test.
    pub max_path_lookahead: usize,
    /// Half extents used when snapping a point onto the mesh.
    pub poly_half_extents: Vec3,
    /// Extra vertical reach for the single nearest-polygon retry.
    pub poly_retry_vertical: f32,
    /// Extents around a static target used to test whether it is inside the last polygon.
    pub target_extents: Vec3,
    /// Default reach radius for goals.
    pub goal_radius: f32,
}

fn default_max_path_polys() -> usize {
    512
}

fn default_max_corners() -> usize {
    4
}

fn default_max_path_lookahead() -> usize {
    10
}

fn default_poly_half_extents() -> Vec3 {
    Vec3::new(75.0, 75.0, 96.0)
}

fn default_poly_retry_vertical() -> f32 {
    500.0
}

fn default_target_extents() -> Vec3 {
    Vec3::new(1.0, 1.0, 2.0)
}

fn default_goal_radius() -> f32 {
    10.0
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            max_path_polys: default_max_path_polys(),
            max_corners: default_max_corners(),
            max_path_lookahead: default_max_path_lookahead(),
            poly_half_extents: default_poly_half_extents(),
            poly_retry_vertical: default_poly_retry_vertical(),
            target_extents: default_target_extents(),
            goal_radius: default_goal_radius(),
        }
    }
}
