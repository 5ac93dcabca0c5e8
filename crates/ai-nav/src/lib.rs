//! Navigation for bots: mesh backend seam, reference triangle mesh, path corridors,
//! per-agent path following and dynamic obstacles.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod area;
pub mod backend;
pub mod config;
pub mod corridor;
pub mod error;
pub mod math;
pub mod mesh;
pub mod meshes;
pub mod obstacles;
pub mod query;
pub mod world;

pub use agent::{smooth_steer_dir, NavAgent, NavCmd, RouteTarget, RouteTargetKind};
pub use area::{disable_area, enable_area, set_area_flags};
pub use backend::{
    Corner, CornerFlags, MeshParams, NavMeshBackend, ObstacleRef, OffMeshConnection, PolyFlags,
    PolyPath, PolyRef, RaycastHit,
};
pub use config::NavConfig;
pub use corridor::{OffMeshTraversal, PathCorridor};
pub use error::NavError;
pub use math::{Aabb, Vec3};
pub use mesh::NavMesh;
pub use meshes::{MeshHandle, NavMeshes};
pub use obstacles::{ObstacleManager, SavedObstacle};
pub use query::{find_nearest_poly, nav_trace, random_point_in_radius};
pub use world::NavWorldView;
