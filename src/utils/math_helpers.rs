/// Three component vector used throughout the collision code.
pub type Vector3 = (f64, f64, f64);

pub const ZERO_VECTOR: Vector3 = (0.0, 0.0, 0.0);
pub const RIGHT: Vector3 = (1.0, 0.0, 0.0);
pub const UP: Vector3 = (0.0, 1.0, 0.0);
pub const FORWARD: Vector3 = (0.0, 0.0, 1.0);

/// Vector utility: component-wise addition
#[inline]
pub fn add_vectors(a: Vector3, b: Vector3) -> Vector3 {
    (a.0 + b.0, a.1 + b.1, a.2 + b.2)
}

/// Vector utility: component-wise subtraction (`a - b`)
#[inline]
pub fn subtract_vectors(a: Vector3, b: Vector3) -> Vector3 {
    (a.0 - b.0, a.1 - b.1, a.2 - b.2)
}

#[inline]
pub fn scale_vector(v: Vector3, scale: f64) -> Vector3 {
    (v.0 * scale, v.1 * scale, v.2 * scale)
}

/// Returns `a + b * scale`
#[inline]
pub fn add_scaled(a: Vector3, b: Vector3, scale: f64) -> Vector3 {
    (a.0 + b.0 * scale, a.1 + b.1 * scale, a.2 + b.2 * scale)
}

#[inline]
pub fn negate_vector(v: Vector3) -> Vector3 {
    (-v.0, -v.1, -v.2)
}

#[inline]
pub fn multiply_components(a: Vector3, b: Vector3) -> Vector3 {
    (a.0 * b.0, a.1 * b.1, a.2 * b.2)
}

#[inline]
pub fn min_components(a: Vector3, b: Vector3) -> Vector3 {
    (a.0.min(b.0), a.1.min(b.1), a.2.min(b.2))
}

#[inline]
pub fn max_components(a: Vector3, b: Vector3) -> Vector3 {
    (a.0.max(b.0), a.1.max(b.1), a.2.max(b.2))
}

/// Vector utility: dot product
#[inline]
pub fn dot_product(a: Vector3, b: Vector3) -> f64 {
    a.0 * b.0 + a.1 * b.1 + a.2 * b.2
}

/// Calculates the cross product of two 3D vectors.
#[inline]
pub fn cross_product(v1: Vector3, v2: Vector3) -> Vector3 {
    (
        v1.1 * v2.2 - v1.2 * v2.1,
        v1.2 * v2.0 - v1.0 * v2.2,
        v1.0 * v2.1 - v1.1 * v2.0
    )
}

#[inline]
pub fn magnitude_squared(v: Vector3) -> f64 {
    v.0 * v.0 + v.1 * v.1 + v.2 * v.2
}

/// Vector utility: magnitude calculation
#[inline]
pub fn vector_magnitude(v: Vector3) -> f64 {
    magnitude_squared(v).sqrt()
}

#[inline]
pub fn distance_squared(a: Vector3, b: Vector3) -> f64 {
    magnitude_squared(subtract_vectors(a, b))
}

/// Vector utility: normalization
///
/// Degenerate vectors normalize to the +x axis so callers never see NaN.
#[inline]
pub fn normalize_vector(v: Vector3) -> Vector3 {
    let mag = vector_magnitude(v);
    if mag > 1e-10 {
        (v.0 / mag, v.1 / mag, v.2 / mag)
    } else {
        RIGHT
    }
}

#[inline]
pub fn is_zero_vector(v: Vector3) -> bool {
    v.0 == 0.0 && v.1 == 0.0 && v.2 == 0.0
}

/// Computes `(a x b) x c` without the intermediate cross product.
#[inline]
pub fn triple_product(a: Vector3, b: Vector3, c: Vector3) -> Vector3 {
    let ac = dot_product(a, c);
    let bc = dot_product(b, c);
    (b.0 * ac - a.0 * bc, b.1 * ac - a.1 * bc, b.2 * ac - a.2 * bc)
}

/// Some vector perpendicular to `v`, built against whichever of +x / +z is less aligned with it.
#[inline]
pub fn perpendicular_vector(v: Vector3) -> Vector3 {
    if v.0.abs() > v.2.abs() {
        cross_product(v, FORWARD)
    } else {
        cross_product(v, RIGHT)
    }
}

/// Removes the component of `v` along the unit vector `normal`.
#[inline]
pub fn project_onto_plane(v: Vector3, normal: Vector3) -> Vector3 {
    add_scaled(v, normal, -dot_product(v, normal))
}

/// Reads a component by axis index (0 = x, 1 = y, 2 = z).
#[inline]
pub fn vector_component(v: Vector3, axis: usize) -> f64 {
    match axis {
        0 => v.0,
        1 => v.1,
        _ => v.2,
    }
}

#[inline]
pub fn with_component(v: Vector3, axis: usize, value: f64) -> Vector3 {
    match axis {
        0 => (value, v.1, v.2),
        1 => (v.0, value, v.2),
        _ => (v.0, v.1, value),
    }
}

/// Returns `1 / value`, or zero when `value` is zero.
#[inline]
pub fn safe_invert(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { 1.0 / value }
}
