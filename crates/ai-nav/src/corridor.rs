use crate::{Corner, NavMeshBackend, PolyRef, Vec3};

const MIN_CORNER_DIST: f32 = 0.01;

/// Endpoints of an off-mesh connection captured when the corridor moves over it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffMeshTraversal {
    /// Polygon the agent was on before the connection.
    pub from: PolyRef,
    pub connection: PolyRef,
    pub start: Vec3,
    pub end: Vec3,
}

/// Polygon corridor between the agent and its target.
///
/// Once initialized and reset the path always holds at least one polygon, and never
/// more than the capacity given to `init`.
#[derive(Debug, Clone, Default)]
pub struct PathCorridor {
    pos: Vec3,
    target: Vec3,
    path: Vec<PolyRef>,
    max_path: usize,
}

impl PathCorridor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `max_path` polygons. Returns `false` if the storage could not be
    /// allocated.
    pub fn init(&mut self, max_path: usize) -> bool {
        if max_path == 0 || self.path.try_reserve_exact(max_path).is_err() {
            return false;
        }
        self.max_path = max_path;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.max_path > 0
    }

    pub fn capacity(&self) -> usize {
        self.max_path
    }

    /// Collapse the corridor to a single polygon at `pos`.
    pub fn reset(&mut self, poly: PolyRef, pos: Vec3) {
        self.path.clear();
        self.path.push(poly);
        self.pos = pos;
        self.target = pos;
    }

    /// Load a freshly planned path. An empty `polys` keeps the current path.
    pub fn set_corridor(&mut self, target: Vec3, polys: &[PolyRef]) {
        self.target = target;
        if polys.is_empty() {
            return;
        }
        self.path.clear();
        self.path
            .extend_from_slice(&polys[..polys.len().min(self.max_path.max(1))]);
    }

    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn path(&self) -> &[PolyRef] {
        &self.path
    }

    pub fn first_poly(&self) -> Option<PolyRef> {
        self.path.first().copied()
    }

    pub fn last_poly(&self) -> Option<PolyRef> {
        self.path.last().copied()
    }

    /// Slide the corridor start to `npos` along the surface and re-anchor the path on the
    /// polygons crossed.
    pub fn move_position<B>(&mut self, npos: Vec3, nav: &B) -> bool
    where
        B: NavMeshBackend + ?Sized,
    {
        let Some(first) = self.first_poly() else {
            return false;
        };
        let Some((result, visited)) = nav.move_along_surface(first, self.pos, npos) else {
            return false;
        };
        merge_start_moved(&mut self.path, self.max_path, &visited);
        self.pos = result;
        if let Some(h) = self.first_poly().and_then(|p| nav.poly_height(p, result)) {
            self.pos.z = h;
        }
        true
    }

    /// Slide the corridor end toward a moving target.
    pub fn move_target_position<B>(&mut self, npos: Vec3, nav: &B) -> bool
    where
        B: NavMeshBackend + ?Sized,
    {
        let Some(last) = self.last_poly() else {
            return false;
        };
        let Some((result, visited)) = nav.move_along_surface(last, self.target, npos) else {
            return false;
        };
        merge_end_moved(&mut self.path, self.max_path, &visited);
        self.target = result;
        true
    }

    /// The first `max_look_ahead` polygons are all still traversable.
    pub fn is_valid<B>(&self, max_look_ahead: usize, nav: &B) -> bool
    where
        B: NavMeshBackend + ?Sized,
    {
        self.path
            .iter()
            .take(max_look_ahead)
            .all(|&p| nav.is_valid_poly(p))
    }

    /// Cut the path at the first invalid polygon, falling back to `safe_ref` at
    /// `safe_pos` when nothing valid remains, and clamp the target into the new end.
    pub fn trim_invalid_path<B>(&mut self, safe_ref: PolyRef, safe_pos: Vec3, nav: &B)
    where
        B: NavMeshBackend + ?Sized,
    {
        let n = self
            .path
            .iter()
            .position(|&p| !nav.is_valid_poly(p))
            .unwrap_or(self.path.len());

        if n == self.path.len() {
            return;
        }
        if n == 0 {
            self.pos = safe_pos;
            self.path.clear();
            self.path.push(safe_ref);
        } else {
            self.path.truncate(n);
        }

        if let Some(t) = self
            .last_poly()
            .and_then(|p| nav.closest_point_on_poly(p, self.target))
        {
            self.target = t;
        }
    }

    /// Up to `max_corners` corners ahead of the agent. Corners on top of the agent are
    /// skipped and the list stops at the first off-mesh connection.
    pub fn find_corners<B>(&self, max_corners: usize, nav: &B) -> Vec<Corner>
    where
        B: NavMeshBackend + ?Sized,
    {
        if self.path.is_empty() || max_corners == 0 {
            return Vec::new();
        }

        let mut corners = nav.find_straight_path(self.pos, self.target, &self.path, max_corners);

        let skip = corners
            .iter()
            .take_while(|c| {
                !c.is_off_mesh()
                    && c.pos.distance_2d_squared(self.pos) <= MIN_CORNER_DIST * MIN_CORNER_DIST
            })
            .count();
        corners.drain(..skip);

        if let Some(i) = corners.iter().position(Corner::is_off_mesh) {
            corners.truncate(i + 1);
        }
        corners
    }

    /// Advance the corridor past the off-mesh connection `con`. On success the corridor
    /// position is the connection end and the path starts at the landing polygon.
    pub fn move_over_offmesh_connection<B>(
        &mut self,
        con: PolyRef,
        nav: &B,
    ) -> Option<OffMeshTraversal>
    where
        B: NavMeshBackend + ?Sized,
    {
        let idx = self.path.iter().position(|&p| p == con)?;
        let from = if idx > 0 { self.path[idx - 1] } else { con };
        let (start, end) = nav.off_mesh_connection_end_points(from, con)?;

        if idx + 1 < self.path.len() {
            self.path.drain(..=idx);
        } else {
            self.path.drain(..idx);
        }
        self.pos = end;

        Some(OffMeshTraversal {
            from,
            connection: con,
            start,
            end,
        })
    }
}

/// Prepend the polygons walked since the last update, dropping the part of the path
/// that is now behind the agent.
fn merge_start_moved(path: &mut Vec<PolyRef>, max_path: usize, visited: &[PolyRef]) {
    let common = (0..path.len()).rev().find_map(|i| {
        visited
            .iter()
            .position(|&v| v == path[i])
            .map(|j| (i, j))
    });
    let Some((furthest_path, furthest_visited)) = common else {
        return;
    };

    let mut merged: Vec<PolyRef> = visited[furthest_visited..].iter().rev().copied().collect();
    merged.extend_from_slice(&path[furthest_path + 1..]);
    if max_path > 0 {
        merged.truncate(max_path);
    }
    *path = merged;
}

/// Append the polygons walked by a moving target.
fn merge_end_moved(path: &mut Vec<PolyRef>, max_path: usize, visited: &[PolyRef]) {
    let common = (0..path.len()).find_map(|i| {
        visited
            .iter()
            .rposition(|&v| v == path[i])
            .map(|j| (i, j))
    });
    let Some((furthest_path, furthest_visited)) = common else {
        return;
    };

    path.truncate(furthest_path + 1);
    path.extend_from_slice(&visited[furthest_visited + 1..]);
    if max_path > 0 {
        path.truncate(max_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(ids: &[u32]) -> Vec<PolyRef> {
        ids.iter().copied().map(PolyRef).collect()
    }

    #[test]
    fn start_moved_drops_polygons_behind_the_agent() {
        let mut path = refs(&[1, 2, 3, 4]);
        merge_start_moved(&mut path, 16, &refs(&[1, 2, 3]));
        assert_eq!(path, refs(&[3, 4]));
    }

    #[test]
    fn start_moved_off_the_path_walks_back() {
        let mut path = refs(&[1, 2, 3]);
        merge_start_moved(&mut path, 16, &refs(&[1, 9]));
        assert_eq!(path, refs(&[9, 1, 2, 3]));
    }

    #[test]
    fn start_moved_without_overlap_keeps_path() {
        let mut path = refs(&[1, 2]);
        merge_start_moved(&mut path, 16, &refs(&[7, 8]));
        assert_eq!(path, refs(&[1, 2]));
    }

    #[test]
    fn end_moved_extends_the_tail() {
        let mut path = refs(&[1, 2, 3]);
        merge_end_moved(&mut path, 16, &refs(&[3, 5, 6]));
        assert_eq!(path, refs(&[1, 2, 3, 5, 6]));
    }

    #[test]
    fn end_moved_respects_capacity() {
        let mut path = refs(&[1, 2, 3]);
        merge_end_moved(&mut path, 4, &refs(&[3, 5, 6]));
        assert_eq!(path, refs(&[1, 2, 3, 5]));
    }
}
