use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::corridor::OffMeshTraversal;
use crate::query::find_nearest_poly;
use crate::{
    Corner, MeshHandle, NavConfig, NavError, NavMeshBackend, PathCorridor, PolyRef, Vec3,
};

/// How the route target behaves between updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RouteTargetKind {
    /// A fixed world position.
    #[default]
    Static,
    /// An entity that may move; the corridor end follows it.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteTarget {
    pub pos: Vec3,
    pub kind: RouteTargetKind,
    /// Box around `pos` that must overlap the corridor's last polygon.
    pub poly_extents: Vec3,
}

impl RouteTarget {
    pub fn position(pos: Vec3, poly_extents: Vec3) -> Self {
        Self {
            pos,
            kind: RouteTargetKind::Static,
            poly_extents,
        }
    }

    pub fn entity(pos: Vec3, poly_extents: Vec3) -> Self {
        Self {
            pos,
            kind: RouteTargetKind::Dynamic,
            poly_extents,
        }
    }
}

/// Steering command produced by `NavAgent::update_path`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavCmd {
    /// Horizontal unit direction to walk in, zero when there is nothing to follow.
    pub dir: Vec3,
    /// Agent position clamped to the corridor (or the off-mesh segment).
    pub pos: Vec3,
    /// Target position snapped to the mesh surface.
    pub tpos: Vec3,
    pub direct_path_to_goal: bool,
    pub have_path: bool,
}

/// Per-agent corridor follower.
#[derive(Debug, Clone, Default)]
pub struct NavAgent {
    mesh: Option<MeshHandle>,
    corridor: PathCorridor,
    corners: Vec<Corner>,
    need_replan: bool,
    off_mesh: Option<OffMeshTraversal>,
    cmd: NavCmd,
}

impl NavAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the agent to `mesh` and reset navigation to a state that replans on the
    /// next update.
    ///
    /// # Panics
    ///
    /// If the corridor storage cannot be allocated. The corridor is allocated once per
    /// agent, at its fixed capacity.
    pub fn assign_mesh(&mut self, mesh: MeshHandle, config: &NavConfig) {
        if !self.corridor.is_initialized() && !self.corridor.init(config.max_path_polys) {
            panic!(
                "out of memory initializing bot corridor ({} polygons)",
                config.max_path_polys
            );
        }
        self.mesh = Some(mesh);
        self.corridor.reset(PolyRef(0), Vec3::ZERO);
        self.need_replan = true;
        self.off_mesh = None;
        self.corners.clear();
        self.cmd = NavCmd::default();
    }

    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    pub fn corridor(&self) -> &PathCorridor {
        &self.corridor
    }

    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    pub fn need_replan(&self) -> bool {
        self.need_replan
    }

    /// Plan a new corridor on the next update, e.g. after the target changed.
    pub fn request_replan(&mut self) {
        self.need_replan = true;
    }

    pub fn off_mesh(&self) -> Option<&OffMeshTraversal> {
        self.off_mesh.as_ref()
    }

    pub fn is_off_mesh(&self) -> bool {
        self.off_mesh.is_some()
    }

    /// Command produced by the latest `update_path`.
    pub fn last_cmd(&self) -> &NavCmd {
        &self.cmd
    }

    /// Plan a fresh corridor from `start` to `target`. Partial routes are rejected
    /// unless `allow_partial`. On failure the corridor is left untouched and the next
    /// `update_path` replans.
    pub fn find_route<B>(
        &mut self,
        nav: &B,
        config: &NavConfig,
        start: Vec3,
        target: &RouteTarget,
        allow_partial: bool,
    ) -> Result<(), NavError>
    where
        B: NavMeshBackend + ?Sized,
    {
        let result = self.plan(nav, config, start, target, allow_partial);
        if result.is_err() {
            self.need_replan = true;
        }
        result
    }

    fn plan<B>(
        &mut self,
        nav: &B,
        config: &NavConfig,
        start: Vec3,
        target: &RouteTarget,
        allow_partial: bool,
    ) -> Result<(), NavError>
    where
        B: NavMeshBackend + ?Sized,
    {
        let (start_ref, start_pos) = find_nearest_poly(nav, config, start)?;
        let (end_ref, mut end_pos) = find_nearest_poly(nav, config, target.pos)?;

        let path = nav
            .find_path(start_ref, end_ref, start_pos, end_pos, config.max_path_polys)
            .ok_or(NavError::NoRoute {
                start: start_pos,
                end: end_pos,
            })?;

        if path.partial {
            if !allow_partial {
                debug!(?start_pos, ?end_pos, "partial route rejected");
                return Err(NavError::PartialRoute(target.pos));
            }
            if let Some(p) = path
                .polys
                .last()
                .and_then(|&last| nav.closest_point_on_poly(last, end_pos))
            {
                end_pos = p;
            }
        }

        trace!(polys = path.polys.len(), partial = path.partial, "route found");
        self.corridor.reset(start_ref, start_pos);
        self.corridor.set_corridor(end_pos, &path.polys);
        self.need_replan = false;
        self.off_mesh = None;
        Ok(())
    }

    /// Advance the corridor to the agent at `pos` and compute this tick's steering.
    pub fn update_path<B>(
        &mut self,
        nav: &B,
        config: &NavConfig,
        pos: Vec3,
        target: &RouteTarget,
    ) -> NavCmd
    where
        B: NavMeshBackend + ?Sized,
    {
        self.update_corridor(nav, config, pos, target);

        let mut cmd = NavCmd::default();

        if self.off_mesh.is_none() {
            if self.need_replan {
                match self.find_route(nav, config, pos, target, false) {
                    Ok(()) => self.corners = self.corridor.find_corners(config.max_corners, nav),
                    Err(err) => debug!(%err, "replan failed"),
                }
            }
            cmd.have_path = !self.need_replan;

            if let Some(con) = self.off_mesh_entry(nav, pos) {
                if let Some(traversal) = self.corridor.move_over_offmesh_connection(con, nav) {
                    debug!(
                        start = ?traversal.start,
                        end = ?traversal.end,
                        "entering off-mesh connection"
                    );
                    self.off_mesh = Some(traversal);
                }
            }

            let in_first = self
                .corridor
                .first_poly()
                .is_some_and(|p| nav.point_in_poly(p, pos));
            let target_in_last = target.kind == RouteTargetKind::Static
                || self
                    .corridor
                    .last_poly()
                    .is_some_and(|p| {
                        point_in_poly_extents(nav, p, target.pos, target.poly_extents)
                    });
            if !in_first || !target_in_last {
                self.need_replan = true;
            }

            cmd.dir = smooth_steer_dir(pos, &self.corners);
            cmd.direct_path_to_goal = self.corners.len() <= 1;
            cmd.pos = self.corridor.pos();
            cmd.tpos = if self.corners.is_empty() {
                cmd.pos
            } else {
                self.surface_target(nav)
            };
        }

        if let Some(traversal) = self.off_mesh {
            let start = traversal.start.with_z(pos.z);
            let end = traversal.end.with_z(pos.z);

            cmd.pos = project_onto_segment(pos, start, end);
            cmd.direct_path_to_goal = false;
            cmd.dir = (end - pos).normalize_or_zero();
            cmd.tpos = self.surface_target(nav);
            cmd.have_path = true;

            if within_connection_radius(nav, pos, traversal.end, traversal.connection) {
                debug!(end = ?traversal.end, "left off-mesh connection");
                self.off_mesh = None;
            }
        }

        self.cmd = cmd;
        cmd
    }

    fn update_corridor<B>(&mut self, nav: &B, config: &NavConfig, pos: Vec3, target: &RouteTarget)
    where
        B: NavMeshBackend + ?Sized,
    {
        self.corridor.move_position(pos, nav);
        if target.kind == RouteTargetKind::Dynamic {
            self.corridor.move_target_position(target.pos, nav);
        }

        if !self.corridor.is_valid(config.max_path_lookahead, nav) {
            if let Some(first) = self.corridor.first_poly() {
                self.corridor.trim_invalid_path(first, pos, nav);
            }
            trace!("corridor invalidated");
            self.need_replan = true;
        }

        self.corners = self.corridor.find_corners(config.max_corners, nav);
    }

    /// Off-mesh connection whose start the agent is standing on, if any.
    fn off_mesh_entry<B>(&self, nav: &B, pos: Vec3) -> Option<PolyRef>
    where
        B: NavMeshBackend + ?Sized,
    {
        let last = self.corners.last()?;
        (last.is_off_mesh() && within_connection_radius(nav, pos, last.pos, last.poly))
            .then_some(last.poly)
    }

    fn surface_target<B>(&self, nav: &B) -> Vec3
    where
        B: NavMeshBackend + ?Sized,
    {
        let target = self.corridor.target();
        match self
            .corridor
            .last_poly()
            .and_then(|p| nav.poly_height(p, target))
        {
            Some(h) => target.with_z(h),
            None => target,
        }
    }
}

fn within_connection_radius<B>(nav: &B, pos: Vec3, point: Vec3, con: PolyRef) -> bool
where
    B: NavMeshBackend + ?Sized,
{
    nav.off_mesh_connection(con)
        .is_some_and(|c| pos.distance_2d_squared(point) < c.radius * c.radius)
}

// Box test instead of a distance: entity targets usually float a little above the mesh.
fn point_in_poly_extents<B>(nav: &B, poly: PolyRef, point: Vec3, extents: Vec3) -> bool
where
    B: NavMeshBackend + ?Sized,
{
    nav.closest_point_on_poly(poly, point).is_some_and(|c| {
        (c.x - point.x).abs() <= extents.x
            && (c.y - point.y).abs() <= extents.y
            && (c.z - point.z).abs() <= extents.z
    })
}

/// Direction toward the first corner, bent toward the second one.
pub fn smooth_steer_dir(pos: Vec3, corners: &[Corner]) -> Vec3 {
    let Some(first) = corners.first() else {
        return Vec3::ZERO;
    };
    let second = corners.get(1).unwrap_or(first);

    let dir0 = (first.pos - pos).flat();
    let mut dir1 = (second.pos - pos).flat();
    let len0 = dir0.length();
    let len1 = dir1.length();
    if len1 > 0.001 {
        dir1 = dir1 / len1;
    }

    (dir0 - dir1 * (len0 * 0.5)).flat().normalize_or_zero()
}

fn project_onto_segment(p: Vec3, start: Vec3, end: Vec3) -> Vec3 {
    let seg = end - start;
    let len_sq = seg.length_squared();
    if len_sq <= f32::EPSILON {
        return start;
    }
    let t = ((p - start).dot(seg) / len_sq).clamp(0.0, 1.0);
    start + seg * t
}
