use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{NavError, NavMeshBackend};

/// Index of one loaded navigation mesh (one per agent class/size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshHandle(pub usize);

/// The set of loaded navigation meshes.
///
/// Meshes are loaded lazily, so the set starts out empty and unloaded; obstacles
/// registered before `load` are realized by `ObstacleManager::apply_pending`. Every
/// `load` and `unload` bumps the generation, which invalidates backend handles taken
/// from the previous set.
#[derive(Debug, Clone)]
pub struct NavMeshes<B> {
    meshes: Vec<B>,
    loaded: bool,
    generation: u64,
}

impl<B> Default for NavMeshes<B> {
    fn default() -> Self {
        Self {
            meshes: Vec::new(),
            loaded: false,
            generation: 0,
        }
    }
}

impl<B: NavMeshBackend> NavMeshes<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, meshes: Vec<B>) {
        self.meshes = meshes;
        self.loaded = true;
        self.generation += 1;
    }

    pub fn unload(&mut self) {
        self.meshes.clear();
        self.loaded = false;
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Validate `handle` against the loaded set.
    pub fn check(&self, handle: MeshHandle) -> Result<MeshHandle, NavError> {
        if !self.loaded {
            return Err(NavError::NotLoaded);
        }
        if handle.0 >= self.meshes.len() {
            warn!(handle = handle.0, count = self.meshes.len(), "navigation handle out of bounds");
            return Err(NavError::InvalidMesh {
                handle: handle.0,
                count: self.meshes.len(),
            });
        }
        Ok(handle)
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&B> {
        self.meshes.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: MeshHandle) -> Option<&mut B> {
        self.meshes.get_mut(handle.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshHandle, &B)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshHandle(i), m))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (MeshHandle, &mut B)> {
        self.meshes
            .iter_mut()
            .enumerate()
            .map(|(i, m)| (MeshHandle(i), m))
    }
}
