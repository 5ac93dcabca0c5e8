use thiserror::Error;

use crate::Vec3;

/// Failures of navigation API calls. Per-tick path following reports through `NavCmd`
/// flags instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    #[error("navigation mesh handle {handle} out of range ({count} meshes loaded)")]
    InvalidMesh { handle: usize, count: usize },

    #[error("navigation data is not loaded")]
    NotLoaded,

    #[error("agent has no navigation mesh assigned")]
    NoMesh,

    #[error("agent is not spawned")]
    NotSpawned,

    #[error("no navigation polygon near {0:?}")]
    NoPolygon(Vec3),

    #[error("no route between {start:?} and {end:?}")]
    NoRoute { start: Vec3, end: Vec3 },

    #[error("route to {0:?} is only partial")]
    PartialRoute(Vec3),

    #[error("ray cast failed from {0:?}")]
    Raycast(Vec3),

    #[error("obstacle {0} already exists")]
    DuplicateObstacle(u32),
}
