use core::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

use ai_core::DeterministicRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    Aabb, Corner, CornerFlags, MeshParams, NavMeshBackend, ObstacleRef, OffMeshConnection,
    PolyFlags, PolyPath, PolyRef, RaycastHit, Vec3,
};

const MAX_SURFACE_VISITED: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    g: u32,
    node: usize,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (u32, u32, usize, u64) {
        (self.f, self.g, self.node, self.tie)
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
struct OffMeshLink {
    con: OffMeshConnection,
    start_tri: usize,
    end_tri: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObstacleState {
    Pending,
    Active,
    Removing,
}

#[derive(Debug, Clone, Copy)]
struct ObstacleSlot {
    bounds: Aabb,
    state: ObstacleState,
}

/// Reference triangle-mesh backend.
///
/// Polygons are triangles addressed as `PolyRef(index)`; off-mesh connections follow the
/// triangles (`PolyRef(triangle_count + k)`). Adjacency is inferred from shared edges.
/// Box obstacles block every triangle whose bounds they overlap once `update` has run.
#[derive(Debug, Clone)]
pub struct NavMesh {
    tris: Vec<[Vec3; 3]>,
    neighbors: Vec<[Option<usize>; 3]>,
    centroids: Vec<Vec3>,
    bounds: Vec<Aabb>,
    flags: Vec<PolyFlags>,
    blocked: Vec<bool>,
    links: Vec<OffMeshLink>,
    params: MeshParams,
    obstacles: BTreeMap<u32, ObstacleSlot>,
    next_obstacle: u32,
    max_obstacles: usize,
}

impl NavMesh {
    /// Build a mesh from non-overlapping triangles; vertices shared between triangles must
    /// be bit-identical to be considered connected.
    pub fn from_triangles(tris: Vec<[Vec3; 3]>) -> Self {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        struct VertexKey(u32, u32, u32);

        impl VertexKey {
            fn from_vec3(p: Vec3) -> Self {
                Self(p.x.to_bits(), p.y.to_bits(), p.z.to_bits())
            }
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        struct EdgeKey(VertexKey, VertexKey);

        impl EdgeKey {
            fn new(a: Vec3, b: Vec3) -> Self {
                let ka = VertexKey::from_vec3(a);
                let kb = VertexKey::from_vec3(b);
                if ka <= kb {
                    Self(ka, kb)
                } else {
                    Self(kb, ka)
                }
            }
        }

        let mut neighbors = vec![[None; 3]; tris.len()];
        let mut edge_map: BTreeMap<EdgeKey, (usize, usize)> = BTreeMap::new();

        for (tri_idx, tri) in tris.iter().enumerate() {
            for (edge_idx, (a, b)) in tri_edges(tri).into_iter().enumerate() {
                let key = EdgeKey::new(a, b);
                if let Some((other_tri, other_edge)) = edge_map.remove(&key) {
                    neighbors[tri_idx][edge_idx] = Some(other_tri);
                    neighbors[other_tri][other_edge] = Some(tri_idx);
                } else {
                    edge_map.insert(key, (tri_idx, edge_idx));
                }
            }
        }

        let centroids = tris.iter().map(|t| tri_centroid(*t)).collect();
        let bounds = tris.iter().map(|t| Aabb::from_points(t)).collect();
        let n = tris.len();

        Self {
            tris,
            neighbors,
            centroids,
            bounds,
            flags: vec![PolyFlags::WALK; n],
            blocked: vec![false; n],
            links: Vec::new(),
            params: MeshParams::default(),
            obstacles: BTreeMap::new(),
            next_obstacle: 0,
            max_obstacles: 128,
        }
    }

    pub fn with_params(mut self, params: MeshParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_max_obstacles(mut self, max_obstacles: usize) -> Self {
        self.max_obstacles = max_obstacles;
        self
    }

    pub fn with_off_mesh_connection(mut self, con: OffMeshConnection) -> Self {
        self.add_off_mesh_connection(con);
        self
    }

    /// Attach an off-mesh connection between the triangles nearest its endpoints.
    pub fn add_off_mesh_connection(&mut self, con: OffMeshConnection) -> Option<PolyRef> {
        let start_tri = self.nearest_triangle(con.start)?;
        let end_tri = self.nearest_triangle(con.end)?;
        self.links.push(OffMeshLink {
            con,
            start_tri,
            end_tri,
        });
        Some(PolyRef((self.tris.len() + self.links.len() - 1) as u32))
    }

    pub fn triangle_count(&self) -> usize {
        self.tris.len()
    }

    pub fn triangles(&self) -> &[[Vec3; 3]] {
        &self.tris
    }

    pub fn off_mesh_connections(&self) -> impl Iterator<Item = (PolyRef, OffMeshConnection)> + '_ {
        let base = self.tris.len();
        self.links
            .iter()
            .enumerate()
            .map(move |(i, l)| (PolyRef((base + i) as u32), l.con))
    }

    /// Triangle containing `p` in 2-D, closest in height when several overlap.
    pub fn find_triangle(&self, p: Vec3) -> Option<PolyRef> {
        let mut best: Option<(f32, usize)> = None;
        for (i, tri) in self.tris.iter().enumerate() {
            if !point_in_triangle(p, *tri) {
                continue;
            }
            let dz = (tri_height(*tri, p) - p.z).abs();
            if best.is_none_or(|(d, _)| dz < d) {
                best = Some((dz, i));
            }
        }
        best.map(|(_, i)| PolyRef(i as u32))
    }

    /// True while `poly` is covered by an applied obstacle.
    pub fn is_blocked(&self, poly: PolyRef) -> bool {
        self.tri_index(poly).is_some_and(|t| self.blocked[t])
    }

    fn nearest_triangle(&self, p: Vec3) -> Option<usize> {
        let mut best: Option<(f32, usize)> = None;
        for (i, tri) in self.tris.iter().enumerate() {
            let q = closest_point_on_triangle(p, *tri);
            let d2 = q.distance_squared(p);
            if best.is_none_or(|(d, _)| d2 < d) {
                best = Some((d2, i));
            }
        }
        best.map(|(_, i)| i)
    }

    fn tri_index(&self, poly: PolyRef) -> Option<usize> {
        let i = poly.0 as usize;
        (i < self.tris.len()).then_some(i)
    }

    fn link(&self, poly: PolyRef) -> Option<&OffMeshLink> {
        (poly.0 as usize)
            .checked_sub(self.tris.len())
            .and_then(|i| self.links.get(i))
    }

    fn tri_walkable(&self, tri: usize) -> bool {
        !self.blocked[tri] && !self.flags[tri].contains(PolyFlags::DISABLED)
    }

    fn node_valid(&self, node: usize) -> bool {
        if node < self.tris.len() {
            return self.tri_walkable(node);
        }
        match self.links.get(node - self.tris.len()) {
            Some(l) => self.tri_walkable(l.start_tri) && self.tri_walkable(l.end_tri),
            None => false,
        }
    }

    fn node_pos(&self, node: usize) -> Vec3 {
        if node < self.tris.len() {
            self.centroids[node]
        } else {
            let l = &self.links[node - self.tris.len()];
            l.con.start.lerp(l.con.end, 0.5)
        }
    }

    fn node_neighbors(&self, node: usize, out: &mut Vec<usize>) {
        out.clear();
        let base = self.tris.len();
        if node < base {
            out.extend(self.neighbors[node].into_iter().flatten());
            for (i, l) in self.links.iter().enumerate() {
                if l.start_tri == node || (l.con.bidirectional && l.end_tri == node) {
                    out.push(base + i);
                }
            }
        } else if let Some(l) = self.links.get(node - base) {
            out.push(l.end_tri);
            if l.con.bidirectional {
                out.push(l.start_tri);
            }
        }
    }

    fn shared_edge(&self, from: usize, to: usize) -> Option<(Vec3, Vec3)> {
        let tri = self.tris[from];
        for (edge_idx, (a, b)) in tri_edges(&tri).into_iter().enumerate() {
            if self.neighbors[from][edge_idx] == Some(to) {
                return Some((a, b));
            }
        }
        None
    }

    fn portal(&self, from: usize, to: usize) -> Option<(Vec3, Vec3)> {
        let (p0, p1) = self.shared_edge(from, to)?;
        let c0 = self.centroids[from];
        let dir = self.centroids[to] - c0;
        let s0 = dir.perp_dot(p0 - c0);
        let s1 = dir.perp_dot(p1 - c0);
        Some(if s0 >= s1 { (p0, p1) } else { (p1, p0) })
    }

    /// Funnel one run of triangles from `start` to `target`; returns the interior corners
    /// with the polygon each was entered through.
    fn pull_segment(&self, start: Vec3, target: Vec3, tris: &[usize]) -> Vec<(Vec3, PolyRef)> {
        let mut portals = Vec::with_capacity(tris.len());
        for w in tris.windows(2) {
            match self.portal(w[0], w[1]) {
                Some(p) => portals.push(p),
                None => break,
            }
        }
        portals.push((target, target));

        string_pull(start, &portals)
            .into_iter()
            .filter(|(p, _)| *p != target)
            .map(|(p, idx)| {
                let poly = tris.get(idx + 1).or(tris.last()).copied().unwrap_or_default();
                (p, PolyRef(poly as u32))
            })
            .collect()
    }

    fn recompute_blocked(&mut self) {
        for (i, b) in self.bounds.iter().enumerate() {
            self.blocked[i] = self
                .obstacles
                .values()
                .any(|o| o.state == ObstacleState::Active && o.bounds.overlaps(b));
        }
    }
}

impl NavMeshBackend for NavMesh {
    fn params(&self) -> MeshParams {
        self.params
    }

    fn find_nearest_poly(&self, center: Vec3, half_extents: Vec3) -> Option<(PolyRef, Vec3)> {
        let query = Aabb::from_center_extents(center, half_extents);
        let mut best: Option<(f32, usize, Vec3)> = None;
        for (i, tri) in self.tris.iter().enumerate() {
            if !self.tri_walkable(i) || !self.bounds[i].overlaps(&query) {
                continue;
            }
            let q = closest_point_on_triangle(center, *tri);
            let d2 = q.distance_squared(center);
            if best.is_none_or(|(d, _, _)| d2 < d) {
                best = Some((d2, i, q));
            }
        }
        best.map(|(_, i, q)| (PolyRef(i as u32), q))
    }

    fn find_path(
        &self,
        start_ref: PolyRef,
        end_ref: PolyRef,
        _start: Vec3,
        end: Vec3,
        max_path: usize,
    ) -> Option<PolyPath> {
        let start = start_ref.0 as usize;
        let goal = end_ref.0 as usize;
        if !self.node_valid(start) || max_path == 0 {
            return None;
        }

        let quant = |d: f32| -> u32 { (d.max(0.0) * 1024.0) as u32 };
        let heuristic = |n: usize| -> u32 { quant(self.node_pos(n).distance(end)) };
        let edge_cost = |a: usize, b: usize| -> u32 {
            quant(self.node_pos(a).distance(self.node_pos(b))).saturating_add(1)
        };

        let n = self.tris.len() + self.links.len();
        let mut g_score = vec![u32::MAX; n];
        let mut came_from: Vec<Option<usize>> = vec![None; n];
        let mut open = BinaryHeap::new();
        let mut scratch = Vec::new();

        g_score[start] = 0;
        open.push(OpenNode {
            f: heuristic(start),
            g: 0,
            node: start,
            tie: 0,
        });
        let mut tie: u64 = 1;
        let mut best = (heuristic(start), start);
        let mut reached = false;

        while let Some(node) = open.pop() {
            if node.node == goal {
                reached = true;
                break;
            }
            if node.g != g_score[node.node] {
                continue;
            }
            let h = node.f.saturating_sub(node.g);
            if h < best.0 {
                best = (h, node.node);
            }

            self.node_neighbors(node.node, &mut scratch);
            for &next in scratch.iter() {
                if !self.node_valid(next) {
                    continue;
                }
                let tentative_g = node.g.saturating_add(edge_cost(node.node, next));
                if tentative_g >= g_score[next] {
                    continue;
                }
                came_from[next] = Some(node.node);
                g_score[next] = tentative_g;
                open.push(OpenNode {
                    f: tentative_g.saturating_add(heuristic(next)),
                    g: tentative_g,
                    node: next,
                    tie,
                });
                tie += 1;
            }
        }

        let last = if reached { goal } else { best.1 };
        let mut nodes = vec![last];
        let mut current = last;
        while let Some(prev) = came_from[current] {
            current = prev;
            nodes.push(current);
        }
        nodes.reverse();
        nodes.truncate(max_path);

        Some(PolyPath {
            partial: !reached || nodes.last() != Some(&goal),
            polys: nodes.into_iter().map(|i| PolyRef(i as u32)).collect(),
        })
    }

    fn find_straight_path(
        &self,
        start: Vec3,
        end: Vec3,
        path: &[PolyRef],
        max_corners: usize,
    ) -> Vec<Corner> {
        let mut out = Vec::new();
        if path.is_empty() || max_corners == 0 {
            return out;
        }

        let mut seg_start = start;
        let mut seg: Vec<usize> = Vec::new();
        let mut prev: Option<PolyRef> = None;

        for (i, &poly) in path.iter().enumerate() {
            if self.link(poly).is_none() {
                seg.push(poly.0 as usize);
                prev = Some(poly);
                continue;
            }
            let Some((con_start, con_end)) = prev
                .and_then(|p| self.off_mesh_connection_end_points(p, poly))
            else {
                break;
            };
            for (pos, poly) in self.pull_segment(seg_start, con_start, &seg) {
                out.push(Corner {
                    pos,
                    flags: CornerFlags::empty(),
                    poly,
                });
            }
            out.push(Corner {
                pos: con_start,
                flags: CornerFlags::OFFMESH_CONNECTION,
                poly,
            });
            out.push(Corner {
                pos: con_end,
                flags: CornerFlags::empty(),
                poly: path.get(i + 1).copied().unwrap_or(poly),
            });
            seg_start = con_end;
            seg.clear();
            prev = Some(poly);
            if out.len() >= max_corners {
                out.truncate(max_corners);
                return out;
            }
        }

        if !seg.is_empty() {
            for (pos, poly) in self.pull_segment(seg_start, end, &seg) {
                out.push(Corner {
                    pos,
                    flags: CornerFlags::empty(),
                    poly,
                });
            }
            out.push(Corner {
                pos: end,
                flags: CornerFlags::END,
                poly: path[path.len() - 1],
            });
        }

        out.truncate(max_corners);
        out
    }

    fn move_along_surface(
        &self,
        start_ref: PolyRef,
        start: Vec3,
        end: Vec3,
    ) -> Option<(Vec3, Vec<PolyRef>)> {
        let start_tri = self.tri_index(start_ref)?;
        if !self.tri_walkable(start_tri) {
            return None;
        }

        let search_pos = start.lerp(end, 0.5);
        let search_rad = start.distance_2d(end) * 0.5 + 0.001;
        let search_rad_sq = search_rad * search_rad;

        let mut parent: BTreeMap<usize, Option<usize>> = BTreeMap::new();
        parent.insert(start_tri, None);
        let mut queue = VecDeque::from([start_tri]);
        let mut best = (f32::MAX, start_tri, start);

        while let Some(cur) = queue.pop_front() {
            let tri = self.tris[cur];
            if point_in_triangle(end, tri) {
                best = (0.0, cur, end.with_z(tri_height(tri, end)));
                break;
            }
            let q = closest_point_on_triangle(end, tri);
            let d = q.distance_2d_squared(end);
            if d < best.0 {
                best = (d, cur, q);
            }

            for (edge_idx, (a, b)) in tri_edges(&tri).into_iter().enumerate() {
                let Some(next) = self.neighbors[cur][edge_idx] else {
                    continue;
                };
                if parent.contains_key(&next) || !self.tri_walkable(next) {
                    continue;
                }
                if dist_point_segment_2d_sq(search_pos, a, b) > search_rad_sq {
                    continue;
                }
                if parent.len() >= MAX_SURFACE_VISITED {
                    break;
                }
                parent.insert(next, Some(cur));
                queue.push_back(next);
            }
        }

        let mut visited = vec![PolyRef(best.1 as u32)];
        let mut current = best.1;
        while let Some(Some(prev)) = parent.get(&current).copied() {
            current = prev;
            visited.push(PolyRef(current as u32));
        }
        visited.reverse();

        Some((best.2, visited))
    }

    fn is_valid_poly(&self, poly: PolyRef) -> bool {
        self.node_valid(poly.0 as usize)
    }

    fn closest_point_on_poly(&self, poly: PolyRef, p: Vec3) -> Option<Vec3> {
        if let Some(l) = self.link(poly) {
            return Some(closest_point_on_segment(p, l.con.start, l.con.end));
        }
        let t = self.tri_index(poly)?;
        Some(closest_point_on_triangle(p, self.tris[t]))
    }

    fn point_in_poly(&self, poly: PolyRef, p: Vec3) -> bool {
        self.tri_index(poly)
            .is_some_and(|t| point_in_triangle(p, self.tris[t]))
    }

    fn poly_bounds(&self, poly: PolyRef) -> Option<Aabb> {
        if let Some(l) = self.link(poly) {
            return Some(Aabb::from_points(&[l.con.start, l.con.end]));
        }
        self.tri_index(poly).map(|t| self.bounds[t])
    }

    fn poly_height(&self, poly: PolyRef, p: Vec3) -> Option<f32> {
        let t = self.tri_index(poly)?;
        let tri = self.tris[t];
        point_in_triangle(p, tri).then(|| tri_height(tri, p))
    }

    fn raycast(&self, start_ref: PolyRef, start: Vec3, end: Vec3) -> Option<RaycastHit> {
        let mut cur = self.tri_index(start_ref)?;
        let mut prev: Option<usize> = None;
        let dir = end - start;

        for _ in 0..=self.tris.len() {
            let tri = self.tris[cur];
            if point_in_triangle(end, tri) {
                return Some(RaycastHit {
                    t: f32::MAX,
                    normal: Vec3::ZERO,
                });
            }

            let mut exit: Option<(f32, usize)> = None;
            for (edge_idx, (a, b)) in tri_edges(&tri).into_iter().enumerate() {
                if prev.is_some() && self.neighbors[cur][edge_idx] == prev {
                    continue;
                }
                if let Some(t) = segment_intersection_t(start, dir, a, b - a) {
                    if exit.is_none_or(|(best, _)| t > best) {
                        exit = Some((t, edge_idx));
                    }
                }
            }

            let Some((t, edge_idx)) = exit else {
                return Some(RaycastHit {
                    t: 0.0,
                    normal: Vec3::ZERO,
                });
            };

            match self.neighbors[cur][edge_idx].filter(|&n| self.tri_walkable(n)) {
                Some(next) => {
                    prev = Some(cur);
                    cur = next;
                }
                None => {
                    let (a, b) = tri_edges(&tri)[edge_idx];
                    let e = b - a;
                    let mut normal = Vec3::new(e.y, -e.x, 0.0).normalize_or_zero();
                    if normal.dot(dir) > 0.0 {
                        normal = -normal;
                    }
                    return Some(RaycastHit { t, normal });
                }
            }
        }

        None
    }

    fn random_point_around_circle(
        &self,
        start_ref: PolyRef,
        center: Vec3,
        radius: f32,
        rng: &mut dyn DeterministicRng,
    ) -> Option<(PolyRef, Vec3)> {
        let start_tri = self.tri_index(start_ref)?;
        if !self.tri_walkable(start_tri) {
            return None;
        }

        let radius_sq = radius * radius;
        let mut seen = vec![false; self.tris.len()];
        seen[start_tri] = true;
        let mut queue = VecDeque::from([start_tri]);
        let mut picked = None;
        let mut total_area = 0.0f32;

        while let Some(cur) = queue.pop_front() {
            let tri = self.tris[cur];
            let area = tri_area2(tri[0], tri[1], tri[2]).abs() * 0.5;
            total_area += area;
            if rng.next_f32_unit() * total_area <= area {
                picked = Some(cur);
            }

            for (edge_idx, (a, b)) in tri_edges(&tri).into_iter().enumerate() {
                let Some(next) = self.neighbors[cur][edge_idx] else {
                    continue;
                };
                if seen[next] || !self.tri_walkable(next) {
                    continue;
                }
                if dist_point_segment_2d_sq(center, a, b) > radius_sq {
                    continue;
                }
                seen[next] = true;
                queue.push_back(next);
            }
        }

        let t = picked?;
        let [a, b, c] = self.tris[t];
        let mut s = rng.next_f32_unit();
        let mut u = rng.next_f32_unit();
        if s + u > 1.0 {
            s = 1.0 - s;
            u = 1.0 - u;
        }
        Some((PolyRef(t as u32), a + (b - a) * s + (c - a) * u))
    }

    fn off_mesh_connection(&self, poly: PolyRef) -> Option<OffMeshConnection> {
        self.link(poly).map(|l| l.con)
    }

    fn off_mesh_connection_end_points(&self, prev: PolyRef, con: PolyRef) -> Option<(Vec3, Vec3)> {
        let l = self.link(con)?;
        match self.tri_index(prev) {
            Some(t) if t == l.end_tri && l.con.bidirectional && t != l.start_tri => {
                Some((l.con.end, l.con.start))
            }
            _ => Some((l.con.start, l.con.end)),
        }
    }

    fn query_polygons(&self, bounds: Aabb) -> Vec<PolyRef> {
        self.bounds
            .iter()
            .enumerate()
            .filter(|(_, b)| b.overlaps(&bounds))
            .map(|(i, _)| PolyRef(i as u32))
            .collect()
    }

    fn poly_flags(&self, poly: PolyRef) -> Option<PolyFlags> {
        if self.link(poly).is_some() {
            return Some(PolyFlags::JUMP);
        }
        self.tri_index(poly).map(|t| self.flags[t])
    }

    fn set_poly_flags(&mut self, poly: PolyRef, flags: PolyFlags) {
        if let Some(t) = self.tri_index(poly) {
            self.flags[t] = flags;
        }
    }

    fn add_box_obstacle(&mut self, bounds: Aabb) -> Option<ObstacleRef> {
        if self.obstacle_count() >= self.max_obstacles {
            return None;
        }
        let id = self.next_obstacle;
        self.next_obstacle = self.next_obstacle.wrapping_add(1);
        self.obstacles.insert(
            id,
            ObstacleSlot {
                bounds,
                state: ObstacleState::Pending,
            },
        );
        Some(ObstacleRef(id))
    }

    fn remove_obstacle(&mut self, obstacle: ObstacleRef) -> bool {
        match self.obstacles.get_mut(&obstacle.0) {
            Some(slot) if slot.state == ObstacleState::Pending => {
                self.obstacles.remove(&obstacle.0);
                true
            }
            Some(slot) => {
                slot.state = ObstacleState::Removing;
                true
            }
            None => false,
        }
    }

    fn obstacle_count(&self) -> usize {
        self.obstacles
            .values()
            .filter(|o| o.state != ObstacleState::Removing)
            .count()
    }

    fn update(&mut self) {
        let mut changed = false;
        self.obstacles.retain(|_, o| match o.state {
            ObstacleState::Removing => {
                changed = true;
                false
            }
            ObstacleState::Pending => {
                o.state = ObstacleState::Active;
                changed = true;
                true
            }
            ObstacleState::Active => true,
        });
        if changed {
            self.recompute_blocked();
        }
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct NavMeshSerde {
    tris: Vec<[Vec3; 3]>,
    #[serde(default)]
    off_mesh: Vec<OffMeshConnection>,
    #[serde(default)]
    params: MeshParams,
}

#[cfg(feature = "serde")]
impl Serialize for NavMesh {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        NavMeshSerde {
            tris: self.tris.clone(),
            off_mesh: self.links.iter().map(|l| l.con).collect(),
            params: self.params,
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for NavMesh {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = NavMeshSerde::deserialize(deserializer)?;
        let mut mesh = NavMesh::from_triangles(data.tris).with_params(data.params);
        for con in data.off_mesh {
            mesh.add_off_mesh_connection(con);
        }
        Ok(mesh)
    }
}

fn tri_edges(tri: &[Vec3; 3]) -> [(Vec3, Vec3); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}

fn tri_centroid(tri: [Vec3; 3]) -> Vec3 {
    (tri[0] + tri[1] + tri[2]) / 3.0
}

fn tri_area2(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).perp_dot(c - a)
}

fn point_in_triangle(p: Vec3, tri: [Vec3; 3]) -> bool {
    let eps = 1e-6;
    let [a, b, c] = tri;
    let ab = tri_area2(a, b, p);
    let bc = tri_area2(b, c, p);
    let ca = tri_area2(c, a, p);
    let has_neg = ab < -eps || bc < -eps || ca < -eps;
    let has_pos = ab > eps || bc > eps || ca > eps;
    !(has_neg && has_pos)
}

/// Height of the triangle plane at `p`'s `xy`.
fn tri_height(tri: [Vec3; 3], p: Vec3) -> f32 {
    let [a, b, c] = tri;
    let area = tri_area2(a, b, c);
    if area.abs() <= f32::EPSILON {
        return (a.z + b.z + c.z) / 3.0;
    }
    let wa = tri_area2(b, c, p) / area;
    let wb = tri_area2(c, a, p) / area;
    let wc = 1.0 - wa - wb;
    a.z * wa + b.z * wb + c.z * wc
}

fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let denom = ab.dot(ab);
    if denom <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / denom).clamp(0.0, 1.0);
    a + ab * t
}

fn dist_point_segment_2d_sq(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let q = closest_point_on_segment(p.flat(), a.flat(), b.flat());
    q.distance_2d_squared(p)
}

/// Closest surface point: inside the triangle in 2-D the surface height under `p`,
/// otherwise the nearest point on its boundary.
fn closest_point_on_triangle(p: Vec3, tri: [Vec3; 3]) -> Vec3 {
    if point_in_triangle(p, tri) {
        return p.with_z(tri_height(tri, p));
    }
    let [a, b, c] = tri;
    let ab = closest_point_on_segment(p, a, b);
    let bc = closest_point_on_segment(p, b, c);
    let ca = closest_point_on_segment(p, c, a);

    let d_ab = ab.distance_squared(p);
    let d_bc = bc.distance_squared(p);
    let d_ca = ca.distance_squared(p);

    if d_ab <= d_bc && d_ab <= d_ca {
        ab
    } else if d_bc <= d_ca {
        bc
    } else {
        ca
    }
}

// Intersection between 2-D segments p + t*r and q + u*s. Returns t if they intersect.
fn segment_intersection_t(p: Vec3, r: Vec3, q: Vec3, s: Vec3) -> Option<f32> {
    let denom = r.perp_dot(s);
    if denom.abs() <= 1e-8 {
        return None;
    }
    let qp = q - p;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Simple stupid funnel over `(left, right)` portals. Emits the apex points after
/// `start` together with the index of the portal each came from.
fn string_pull(start: Vec3, portals: &[(Vec3, Vec3)]) -> Vec<(Vec3, usize)> {
    let mut out = Vec::new();
    if portals.is_empty() {
        return out;
    }

    let mut apex = start;
    let mut left = portals[0].0;
    let mut right = portals[0].1;
    let mut left_index: usize = 0;
    let mut right_index: usize = 0;

    let mut i: usize = 1;
    while i < portals.len() {
        let (p_left, p_right) = portals[i];

        // Portals are (left, right) seen along the walk, so "inside" the funnel is
        // clockwise of the left edge and counter-clockwise of the right edge.
        if tri_area2(apex, right, p_right) >= 0.0 {
            if apex == right || tri_area2(apex, left, p_right) < 0.0 {
                right = p_right;
                right_index = i;
            } else {
                out.push((left, left_index));
                apex = left;
                right = apex;
                right_index = left_index;
                i = left_index + 1;
                continue;
            }
        }

        if tri_area2(apex, left, p_left) <= 0.0 {
            if apex == left || tri_area2(apex, right, p_left) > 0.0 {
                left = p_left;
                left_index = i;
            } else {
                out.push((right, right_index));
                apex = right;
                left = apex;
                left_index = right_index;
                i = right_index + 1;
                continue;
            }
        }

        i += 1;
    }

    out
}
