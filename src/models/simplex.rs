use crate::utils::{subtract_vectors, Vector3, MAX_SIMPLEX_SIZE, ZERO_VECTOR};

/// support point (for use with GJK)
///
/// `point` is the Minkowski difference `A - B`; `point_a` is the contributing point on A
/// and `id` packs the feature ids of both shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportPoint {
    pub point: Vector3,
    pub point_a: Vector3,
    pub id: u32,
}

impl Default for SupportPoint {
    fn default() -> Self {
        Self { point: ZERO_VECTOR, point_a: ZERO_VECTOR, id: 0 }
    }
}

/// simplex (for use with GJK)
///
/// Fixed capacity of four points; the most recently added point is always last.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simplex {
    pub points: [SupportPoint; MAX_SIMPLEX_SIZE],
    pub n_points: usize,
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `point_a - point_b`. Returns `None` once the simplex is full.
    pub fn add_point(&mut self, point_a: Vector3, point_b: Vector3, id: u32) -> Option<Vector3> {
        if self.n_points == MAX_SIMPLEX_SIZE {
            return None;
        }

        let point = subtract_vectors(point_a, point_b);
        self.points[self.n_points] = SupportPoint { point, point_a, id };
        self.n_points += 1;
        Some(point)
    }

    pub fn size(&self) -> usize {
        self.n_points
    }

    pub fn last(&self) -> &SupportPoint {
        &self.points[self.n_points.saturating_sub(1)]
    }

    pub fn move_point(&mut self, to: usize, from: usize) {
        self.points[to] = self.points[from];
    }

    pub fn swap_points(&mut self, a: usize, b: usize) {
        self.points.swap(a, b);
    }

    pub fn truncate(&mut self, size: usize) {
        self.n_points = size.min(MAX_SIMPLEX_SIZE);
    }
}
