use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{Aabb, NavError, NavMeshBackend, NavMeshes, ObstacleRef};

/// Obstacle registered by the game, kept until it is removed.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedObstacle {
    /// Box as given by the game, before agent expansion.
    pub bounds: Aabb,
    /// Materialized in every loaded mesh.
    pub realized: bool,
    /// Per-mesh backend handle, indexed like the mesh set; `None` where a mesh refused it.
    pub handles: Vec<Option<ObstacleRef>>,
    /// Mesh-set generation `handles` belong to.
    pub generation: u64,
}

impl SavedObstacle {
    fn is_realized_in(&self, generation: u64) -> bool {
        self.realized && self.generation == generation
    }
}

/// Runtime no-go boxes (doors, buildables) injected into every loaded mesh.
///
/// Obstacles may be added before navigation data exists; they are remembered and
/// realized by `apply_pending` once the meshes are loaded.
#[derive(Debug, Clone, Default)]
pub struct ObstacleManager {
    saved: BTreeMap<u32, SavedObstacle>,
}

impl ObstacleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_obstacle<B: NavMeshBackend>(
        &mut self,
        meshes: &mut NavMeshes<B>,
        id: u32,
        bounds: Aabb,
    ) -> Result<(), NavError> {
        if self.saved.contains_key(&id) {
            warn!(obstacle = id, "insertion of obstacle failed: id already present");
            return Err(NavError::DuplicateObstacle(id));
        }

        let mut entry = SavedObstacle {
            bounds,
            realized: false,
            handles: Vec::new(),
            generation: meshes.generation(),
        };
        if meshes.is_loaded() {
            realize(&mut entry, meshes);
        }
        debug!(obstacle = id, realized = entry.realized, "obstacle added");
        self.saved.insert(id, entry);
        Ok(())
    }

    /// Realize every obstacle added before the current meshes were loaded, including
    /// those realized in a previously loaded set. Returns the number realized; obstacles
    /// already in the current meshes are left alone.
    pub fn apply_pending<B: NavMeshBackend>(&mut self, meshes: &mut NavMeshes<B>) -> usize {
        if !meshes.is_loaded() {
            return 0;
        }
        let generation = meshes.generation();
        let mut count = 0;
        for entry in self.saved.values_mut().filter(|e| !e.is_realized_in(generation)) {
            realize(entry, meshes);
            count += 1;
        }
        count
    }

    /// Forget `id` and release its backend handles. Returns whether it existed.
    pub fn remove_obstacle<B: NavMeshBackend>(&mut self, meshes: &mut NavMeshes<B>, id: u32) -> bool {
        let Some(entry) = self.saved.remove(&id) else {
            return false;
        };
        // Handles from an earlier mesh set would name unrelated obstacles.
        if !entry.is_realized_in(meshes.generation()) {
            debug!(obstacle = id, "obstacle removed before realization");
            return true;
        }
        for (handle, (_, mesh)) in entry.handles.iter().zip(meshes.iter_mut()) {
            if mesh.obstacle_count() == 0 {
                continue;
            }
            if let Some(h) = handle {
                mesh.remove_obstacle(*h);
            }
        }
        debug!(obstacle = id, "obstacle removed");
        true
    }

    /// Advance every mesh's incremental rebuild by one step.
    pub fn tick<B: NavMeshBackend>(&self, meshes: &mut NavMeshes<B>) {
        for (_, mesh) in meshes.iter_mut() {
            mesh.update();
        }
    }

    pub fn get(&self, id: u32) -> Option<&SavedObstacle> {
        self.saved.get(&id)
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &SavedObstacle)> {
        self.saved.iter().map(|(id, o)| (*id, o))
    }
}

fn realize<B: NavMeshBackend>(entry: &mut SavedObstacle, meshes: &mut NavMeshes<B>) {
    entry.handles = meshes
        .iter_mut()
        .map(|(handle, mesh)| {
            let params = mesh.params();
            let expanded = entry
                .bounds
                .expanded_for_agent(params.walkable_radius, params.walkable_height);
            let obstacle = mesh.add_box_obstacle(expanded);
            if obstacle.is_none() {
                warn!(mesh = handle.0, "navigation mesh refused box obstacle");
            }
            obstacle
        })
        .collect();
    entry.realized = true;
    entry.generation = meshes.generation();
}
