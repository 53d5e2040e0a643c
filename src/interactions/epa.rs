use log::{debug, trace, warn};
use crate::interactions::{combine_contact_ids, MinkowskiSupport};
use crate::models::{Simplex, SupportPoint};
use crate::utils::{
    add_scaled, cross_product, distance_squared, dot_product, magnitude_squared, negate_vector,
    normalize_vector, scale_vector, subtract_vectors, vector_magnitude, Vector3,
    EPA_CONVERGENCE_TOLERANCE, MAX_EPA_ITERATIONS, MAX_EPA_POINTS, MAX_EPA_TRIANGLES, ZERO_VECTOR,
};

/// Contact produced by EPA.
///
/// `normal` points from A towards B. `penetration` is negative while the shapes overlap;
/// use [`EpaResult::depth`] for the positive overlap distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpaResult {
    pub contact_a: Vector3,
    pub contact_b: Vector3,
    pub normal: Vector3,
    pub penetration: f64,
    pub id: u32,
}

impl EpaResult {
    pub fn depth(&self) -> f64 {
        -self.penetration
    }

    /// Describes the same contact with the roles of A and B exchanged.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.contact_a, &mut self.contact_b);
        self.normal = negate_vector(self.normal);
    }
}

/// Points closer than this are treated as the same polytope vertex.
const DUPLICATE_POINT_TOLERANCE: f64 = 1e-10;
/// How far in front of a neighbour's plane a new point must be to flip the shared edge.
const EDGE_FLIP_TOLERANCE: f64 = 1e-6;
const MAX_EDGE_FLIPS: usize = MAX_EPA_TRIANGLES * 3;
const MAX_FACE_WALK_STEPS: usize = MAX_EPA_TRIANGLES;

#[derive(Debug, Clone, Copy, Default)]
struct EpaTriangle {
    indices: [u8; 3],
    /// Triangle across edge `i` (from `indices[i]` to `indices[i + 1]`).
    adjacent: [u8; 3],
    /// Index, inside the adjacent triangle, of its vertex opposite the shared edge.
    opposite: [u8; 3],
    normal: Vector3,
    /// Distance from the origin to the closest point of the triangle.
    distance: f64,
    heap_index: u8,
}

/// Convex polytope grown around the origin. Sized for the worst case so it lives on the stack.
struct ExpandingSimplex {
    points: [SupportPoint; MAX_EPA_POINTS],
    point_count: usize,
    triangles: [EpaTriangle; MAX_EPA_TRIANGLES],
    triangle_count: usize,
    heap: [u8; MAX_EPA_TRIANGLES],
}

/// Barycentric weights of the point of triangle `abc` closest to the origin.
fn closest_to_origin_barycentric(a: Vector3, b: Vector3, c: Vector3) -> Vector3 {
    let ab = subtract_vectors(b, a);
    let ac = subtract_vectors(c, a);

    let ap = negate_vector(a);
    let d1 = dot_product(ab, ap);
    let d2 = dot_product(ac, ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (1.0, 0.0, 0.0);
    }

    let bp = negate_vector(b);
    let d3 = dot_product(ab, bp);
    let d4 = dot_product(ac, bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (0.0, 1.0, 0.0);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (1.0 - v, v, 0.0);
    }

    let cp = negate_vector(c);
    let d5 = dot_product(ab, cp);
    let d6 = dot_product(ac, cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (0.0, 0.0, 1.0);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (1.0 - w, 0.0, w);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (0.0, 1.0 - w, w);
    }

    let total = va + vb + vc;
    if total == 0.0 {
        return (1.0, 0.0, 0.0);
    }

    let v = vb / total;
    let w = vc / total;
    (1.0 - v - w, v, w)
}

/// Barycentric weights of `point`, assumed to lie in the plane of triangle `abc`.
fn plane_point_barycentric(a: Vector3, b: Vector3, c: Vector3, point: Vector3) -> Vector3 {
    let v0 = subtract_vectors(b, a);
    let v1 = subtract_vectors(c, a);
    let v2 = subtract_vectors(point, a);

    let d00 = dot_product(v0, v0);
    let d01 = dot_product(v0, v1);
    let d11 = dot_product(v1, v1);
    let d20 = dot_product(v2, v0);
    let d21 = dot_product(v2, v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-12 {
        return (1.0, 0.0, 0.0);
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    (1.0 - v - w, v, w)
}

impl ExpandingSimplex {
    fn new(simplex: &Simplex) -> Self {
        let mut result = Self {
            points: [SupportPoint::default(); MAX_EPA_POINTS],
            point_count: 4,
            triangles: [EpaTriangle::default(); MAX_EPA_TRIANGLES],
            triangle_count: 0,
            heap: [0; MAX_EPA_TRIANGLES],
        };

        debug_assert_eq!(simplex.size(), 4, "epa needs the tetrahedron left by an overlapping gjk");
        result.points[..4].copy_from_slice(&simplex.points);

        // wind the seed so every face normal points away from the tetrahedron
        let p = &result.points;
        let base_normal = cross_product(
            subtract_vectors(p[1].point, p[0].point),
            subtract_vectors(p[2].point, p[0].point),
        );
        if dot_product(base_normal, subtract_vectors(p[3].point, p[0].point)) > 0.0 {
            result.points.swap(1, 2);
        }

        result.push_triangle([0, 1, 2], [1, 2, 3], [2, 2, 2]);
        result.push_triangle([1, 0, 3], [0, 3, 2], [2, 1, 0]);
        result.push_triangle([2, 1, 3], [0, 1, 3], [0, 1, 0]);
        result.push_triangle([0, 2, 3], [0, 2, 1], [1, 1, 0]);

        result
    }

    fn point(&self, index: u8) -> Vector3 {
        self.points[index as usize].point
    }

    fn vertices(&self, triangle: usize) -> [Vector3; 3] {
        let indices = self.triangles[triangle].indices;
        [self.point(indices[0]), self.point(indices[1]), self.point(indices[2])]
    }

    fn add_point(&mut self, point: SupportPoint) -> Option<u8> {
        if self.point_count == MAX_EPA_POINTS {
            return None;
        }
        self.points[self.point_count] = point;
        self.point_count += 1;
        Some((self.point_count - 1) as u8)
    }

    fn has_point(&self, point: Vector3) -> bool {
        self.points[..self.point_count]
            .iter()
            .any(|existing| distance_squared(existing.point, point) < DUPLICATE_POINT_TOLERANCE)
    }

    fn refresh_triangle(&mut self, index: usize) {
        let [a, b, c] = self.vertices(index);
        let triangle = &mut self.triangles[index];

        triangle.normal = normalize_vector(cross_product(subtract_vectors(b, a), subtract_vectors(c, a)));

        let weights = closest_to_origin_barycentric(a, b, c);
        let closest = add_scaled(add_scaled(scale_vector(a, weights.0), b, weights.1), c, weights.2);
        triangle.distance = vector_magnitude(closest);
    }

    fn push_triangle(&mut self, indices: [u8; 3], adjacent: [u8; 3], opposite: [u8; 3]) -> usize {
        let index = self.triangle_count;
        self.triangle_count += 1;

        self.triangles[index] = EpaTriangle {
            indices,
            adjacent,
            opposite,
            heap_index: index as u8,
            ..EpaTriangle::default()
        };
        self.refresh_triangle(index);

        self.heap[index] = index as u8;
        self.heap_sift_up(index);

        index
    }

    fn heap_distance(&self, heap_slot: usize) -> f64 {
        self.triangles[self.heap[heap_slot] as usize].distance
    }

    fn heap_swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.triangles[self.heap[a] as usize].heap_index = a as u8;
        self.triangles[self.heap[b] as usize].heap_index = b as u8;
    }

    fn heap_sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.heap_distance(parent) <= self.heap_distance(slot) {
                break;
            }
            self.heap_swap(parent, slot);
            slot = parent;
        }
    }

    fn heap_sift_down(&mut self, mut slot: usize) {
        loop {
            let left = slot * 2 + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < self.triangle_count && self.heap_distance(left) < self.heap_distance(smallest) {
                smallest = left;
            }
            if right < self.triangle_count && self.heap_distance(right) < self.heap_distance(smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }

            self.heap_swap(slot, smallest);
            slot = smallest;
        }
    }

    /// Restores heap order after the distance of `triangle` changed.
    fn heap_fix(&mut self, triangle: usize) {
        let slot = self.triangles[triangle].heap_index as usize;
        self.heap_sift_up(slot);
        let slot = self.triangles[triangle].heap_index as usize;
        self.heap_sift_down(slot);
    }

    fn closest_triangle(&self) -> usize {
        self.heap[0] as usize
    }

    fn set_link(&mut self, triangle: usize, edge: usize, adjacent: usize, opposite: u8) {
        self.triangles[triangle].adjacent[edge] = adjacent as u8;
        self.triangles[triangle].opposite[edge] = opposite;
    }

    /// Points the neighbour across `edge` of `triangle` back at `triangle`.
    fn link_back(&mut self, triangle: usize, edge: usize) {
        let neighbour = self.triangles[triangle].adjacent[edge] as usize;
        let neighbour_edge = (self.triangles[triangle].opposite[edge] as usize + 1) % 3;
        let opposite_vertex = ((edge + 2) % 3) as u8;
        self.set_link(neighbour, neighbour_edge, triangle, opposite_vertex);
    }

    /// Replaces `face` with three triangles fanning out to `new_point`, then flips edges
    /// until the polytope is convex again. Returns false when out of room.
    fn expand(&mut self, face: usize, new_point: SupportPoint) -> bool {
        if self.triangle_count + 2 > MAX_EPA_TRIANGLES {
            warn!("epa polytope full ({} triangles), keeping current estimate", self.triangle_count);
            return false;
        }
        let Some(p) = self.add_point(new_point) else {
            warn!("epa polytope full ({} points), keeping current estimate", self.point_count);
            return false;
        };

        let old = self.triangles[face];
        let [a, b, c] = old.indices;

        let t0 = face;
        let t1 = self.triangle_count;
        let t2 = self.triangle_count + 1;

        self.triangles[t0].indices = [a, b, p];
        self.triangles[t0].adjacent = [old.adjacent[0], t1 as u8, t2 as u8];
        self.triangles[t0].opposite = [old.opposite[0], 1, 0];
        self.refresh_triangle(t0);
        self.heap_fix(t0);

        self.push_triangle([b, c, p], [old.adjacent[1], t2 as u8, t0 as u8], [old.opposite[1], 1, 0]);
        self.push_triangle([c, a, p], [old.adjacent[2], t0 as u8, t1 as u8], [old.opposite[2], 1, 0]);

        for triangle in [t0, t1, t2] {
            self.link_back(triangle, 0);
        }

        let mut pending = [(0usize, 0usize); MAX_EDGE_FLIPS];
        let mut pending_count = 0;
        for triangle in [t0, t1, t2] {
            pending[pending_count] = (triangle, 0);
            pending_count += 1;
        }

        let mut flips = 0;
        while pending_count > 0 && flips < MAX_EDGE_FLIPS {
            pending_count -= 1;
            let (triangle, edge) = pending[pending_count];

            if let Some(neighbour) = self.rotate_edge(triangle, edge) {
                flips += 1;
                for next in [(triangle, 1), (neighbour, 1)] {
                    if pending_count < MAX_EDGE_FLIPS {
                        pending[pending_count] = next;
                        pending_count += 1;
                    }
                }
            }
        }

        true
    }

    /// Flips `edge` of `triangle` when the vertex opposite it sits in front of the neighbouring
    /// triangle's plane. Returns the neighbour that took part in the flip.
    fn rotate_edge(&mut self, triangle: usize, edge: usize) -> Option<usize> {
        let t = self.triangles[triangle];
        let u = t.indices[edge];
        let v = t.indices[(edge + 1) % 3];
        let w = t.indices[(edge + 2) % 3];

        let neighbour = t.adjacent[edge] as usize;
        let n = self.triangles[neighbour];
        let k = t.opposite[edge] as usize;
        let q = n.indices[k];
        let neighbour_edge = (k + 1) % 3;

        if q == w {
            return None;
        }

        if dot_product(n.normal, subtract_vectors(self.point(w), self.point(u))) <= EDGE_FLIP_TOLERANCE {
            return None;
        }

        let a1 = (t.adjacent[(edge + 1) % 3] as usize, t.opposite[(edge + 1) % 3]);
        let a2 = (t.adjacent[(edge + 2) % 3] as usize, t.opposite[(edge + 2) % 3]);
        let b1 = (n.adjacent[(neighbour_edge + 1) % 3] as usize, n.opposite[(neighbour_edge + 1) % 3]);
        let b2 = (n.adjacent[(neighbour_edge + 2) % 3] as usize, n.opposite[(neighbour_edge + 2) % 3]);

        // the two triangles share more than one edge; flipping would fold the polytope
        if a1.0 == neighbour || a2.0 == neighbour || b1.0 == triangle || b2.0 == triangle {
            return None;
        }

        self.triangles[triangle].indices = [w, u, q];
        self.set_link(triangle, 0, a2.0, a2.1);
        self.set_link(triangle, 1, b1.0, b1.1);
        self.set_link(triangle, 2, neighbour, 2);

        self.triangles[neighbour].indices = [w, q, v];
        self.set_link(neighbour, 0, triangle, 1);
        self.set_link(neighbour, 1, b2.0, b2.1);
        self.set_link(neighbour, 2, a1.0, a1.1);

        self.link_back(triangle, 0);
        self.link_back(triangle, 1);
        self.link_back(neighbour, 1);
        self.link_back(neighbour, 2);

        // one key at a time, heap_fix assumes every other entry is already ordered
        self.refresh_triangle(triangle);
        self.heap_fix(triangle);
        self.refresh_triangle(neighbour);
        self.heap_fix(neighbour);

        Some(neighbour)
    }

    fn triangle_id(&self, triangle: usize) -> u32 {
        let indices = self.triangles[triangle].indices;
        indices.iter().fold(u32::MAX, |id, index| id & self.points[*index as usize].id)
    }

    /// Contact on A reconstructed from the barycentric weights of a point on `triangle`.
    fn contact_on_a(&self, triangle: usize, weights: Vector3) -> Vector3 {
        let indices = self.triangles[triangle].indices;
        let a = self.points[indices[0] as usize].point_a;
        let b = self.points[indices[1] as usize].point_a;
        let c = self.points[indices[2] as usize].point_a;
        add_scaled(add_scaled(scale_vector(a, weights.0), b, weights.1), c, weights.2)
    }

    fn result_for(&self, triangle: usize) -> EpaResult {
        let face = &self.triangles[triangle];
        let [a, b, c] = self.vertices(triangle);
        let contact_a = self.contact_on_a(triangle, closest_to_origin_barycentric(a, b, c));

        EpaResult {
            contact_a,
            contact_b: add_scaled(contact_a, face.normal, -face.distance),
            normal: face.normal,
            penetration: -face.distance,
            id: self.triangle_id(triangle),
        }
    }

    fn plane_distance(&self, triangle: usize) -> f64 {
        let face = &self.triangles[triangle];
        dot_product(face.normal, self.point(face.indices[0]))
    }

    /// `Ok` when the ray from the origin along `direction` passes through `triangle`, otherwise
    /// the neighbour to walk to next.
    fn ray_pierces(&self, triangle: usize, direction: Vector3) -> Result<(), usize> {
        let face = &self.triangles[triangle];
        let along = dot_product(face.normal, direction);
        let hit = if along > 0.0 {
            scale_vector(direction, self.plane_distance(triangle) / along)
        } else {
            ZERO_VECTOR
        };

        let vertices = self.vertices(triangle);
        for edge in 0..3 {
            let start = vertices[edge];
            let end = vertices[(edge + 1) % 3];
            let edge_normal = cross_product(subtract_vectors(end, start), subtract_vectors(hit, start));

            if dot_product(edge_normal, face.normal) < -1e-9 {
                return Err(face.adjacent[edge] as usize);
            }
        }

        if along > 0.0 { Ok(()) } else { Err(face.adjacent[0] as usize) }
    }

    /// Face of the polytope pierced by the ray from the origin along `direction`.
    ///
    /// Walks across edges from the closest face and falls back to a scan of every face.
    fn find_pierced_face(&self, direction: Vector3) -> Option<usize> {
        let mut current = self.closest_triangle();

        for _ in 0..MAX_FACE_WALK_STEPS {
            match self.ray_pierces(current, direction) {
                Ok(()) => return Some(current),
                Err(next) => current = next,
            }
        }

        (0..self.triangle_count).find(|triangle| self.ray_pierces(*triangle, direction).is_ok())
    }
}

fn sample_support<A, B>(a: &A, b: &B, direction: Vector3) -> SupportPoint
where
    A: MinkowskiSupport + ?Sized,
    B: MinkowskiSupport + ?Sized,
{
    let (point_a, id_a) = a.support(direction);
    let (point_b, id_b) = b.support(negate_vector(direction));

    SupportPoint {
        point: subtract_vectors(point_a, point_b),
        point_a,
        id: combine_contact_ids(id_a, id_b),
    }
}

/// Expanding polytope algorithm: finds the penetration normal and depth of two overlapping
/// convex shapes from the tetrahedron left behind by GJK.
///
/// Runs at most [`MAX_EPA_ITERATIONS`] expansions. When it does not converge the closest face
/// found so far is reported, so the call always produces a result.
pub fn epa_solve<A, B>(simplex: &Simplex, a: &A, b: &B) -> EpaResult
where
    A: MinkowskiSupport + ?Sized,
    B: MinkowskiSupport + ?Sized,
{
    let mut polytope = ExpandingSimplex::new(simplex);
    let mut converged = false;

    for iteration in 0..MAX_EPA_ITERATIONS {
        let closest = polytope.closest_triangle();
        let face = polytope.triangles[closest];
        let next = sample_support(a, b, face.normal);

        if dot_product(next.point, face.normal) - face.distance < EPA_CONVERGENCE_TOLERANCE ||
            polytope.has_point(next.point) {
            trace!("epa converged after {} iterations", iteration);
            converged = true;
            break;
        }

        if !polytope.expand(closest, next) {
            break;
        }
    }

    let result = polytope.result_for(polytope.closest_triangle());
    if !converged {
        debug!("epa stopped before converging, depth estimate {}", result.depth());
    }
    result
}

/// Swept EPA: finds where a moving B first touches A.
///
/// `b` must support the swept volume of B between `b_start` and `b_end`. The polytope is
/// expanded towards the face hit by a ray opposite to the motion. On success `b_end` is moved
/// back to the first touching position and the contact points coincide. Returns `None` when B
/// did not move or already overlapped A at `b_start`.
pub fn epa_solve_swept<A, B>(
    simplex: &Simplex,
    a: &A,
    b: &B,
    b_start: Vector3,
    b_end: &mut Vector3,
) -> Option<EpaResult>
where
    A: MinkowskiSupport + ?Sized,
    B: MinkowskiSupport + ?Sized,
{
    let movement = subtract_vectors(*b_end, b_start);
    let move_distance_sqrd = magnitude_squared(movement);

    if move_distance_sqrd < 1e-10 {
        return None;
    }

    let ray_direction = negate_vector(normalize_vector(movement));
    let mut polytope = ExpandingSimplex::new(simplex);
    let mut face = polytope.find_pierced_face(ray_direction)?;

    for _ in 0..MAX_EPA_ITERATIONS {
        let normal = polytope.triangles[face].normal;
        let next = sample_support(a, b, normal);

        if dot_product(next.point, normal) - polytope.plane_distance(face) < EPA_CONVERGENCE_TOLERANCE ||
            polytope.has_point(next.point) {
            break;
        }

        if !polytope.expand(face, next) {
            break;
        }

        face = polytope.find_pierced_face(ray_direction)?;
    }

    let normal = polytope.triangles[face].normal;
    let along = dot_product(normal, ray_direction);
    if along <= 0.0 {
        return None;
    }

    let push_back = polytope.plane_distance(face) / along;
    if push_back * push_back > move_distance_sqrd {
        return None;
    }

    *b_end = add_scaled(*b_end, ray_direction, push_back);

    let [va, vb, vc] = polytope.vertices(face);
    let hit = scale_vector(ray_direction, push_back);
    let contact_a = polytope.contact_on_a(face, plane_point_barycentric(va, vb, vc, hit));

    Some(EpaResult {
        contact_a,
        contact_b: contact_a,
        normal,
        penetration: 0.0,
        id: polytope.triangle_id(face),
    })
}
