use crate::utils::{add_scaled, cross_product, Vector3};

/// Quaternion representation for 3D rotations to avoid gimbal lock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::identity()
    }
}

impl Quaternion {
    /// Creates a new identity quaternion (no rotation)
    pub fn identity() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn is_near_identity(&self, epsilon: f64) -> bool {
        (self.w - 1.0).abs() < epsilon &&
            self.x.abs() < epsilon &&
            self.y.abs() < epsilon &&
            self.z.abs() < epsilon
    }

    /// Creates a quaternion from axis-angle representation
    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let half_angle = angle / 2.0;
        let sin_half = half_angle.sin();
        let (ax, ay, az) = axis;
        let magnitude = (ax * ax + ay * ay + az * az).sqrt();

        if magnitude < 1e-10 {
            return Quaternion::identity();
        }

        Quaternion {
            w: half_angle.cos(),
            x: ax / magnitude * sin_half,
            y: ay / magnitude * sin_half,
            z: az / magnitude * sin_half,
        }
    }

    /// Returns the length/magnitude of the quaternion
    pub fn magnitude(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns a normalized version of the quaternion
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag < 1e-10 {
            return Quaternion::identity();
        }
        Quaternion {
            w: self.w / mag,
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
        }
    }

    /// Multiplies two quaternions (composition of rotations)
    pub fn multiply(&self, other: &Quaternion) -> Quaternion {
        Quaternion {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    /// Returns the conjugate of the quaternion
    pub fn conjugate(&self) -> Quaternion {
        Quaternion {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Returns the inverse of the quaternion
    pub fn inverse(&self) -> Quaternion {
        let mag_squared = self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z;
        if mag_squared < 1e-10 {
            return Quaternion::identity();
        }

        let conj = self.conjugate();
        Quaternion {
            w: conj.w / mag_squared,
            x: conj.x / mag_squared,
            y: conj.y / mag_squared,
            z: conj.z / mag_squared,
        }
    }

    /// Rotates a point using the quaternion
    ///
    /// Expands `q * p * q^-1` for a unit quaternion into two cross products.
    pub fn rotate_point(&self, point: Vector3) -> Vector3 {
        let q = self.normalized();
        let axis = (q.x, q.y, q.z);
        let t = cross_product(axis, point);
        let t = (t.0 * 2.0, t.1 * 2.0, t.2 * 2.0);
        add_scaled(add_scaled(point, t, q.w), cross_product(axis, t), 1.0)
    }

    /// Integrates an angular velocity over `time_step` and renormalizes.
    pub fn apply_angular_velocity(&self, angular_velocity: Vector3, time_step: f64) -> Quaternion {
        let velocity_as_quat = Quaternion {
            w: 0.0,
            x: angular_velocity.0 * time_step * 0.5,
            y: angular_velocity.1 * time_step * 0.5,
            z: angular_velocity.2 * time_step * 0.5,
        };
        let intermediate = velocity_as_quat.multiply(self);

        Quaternion {
            w: self.w + intermediate.w,
            x: self.x + intermediate.x,
            y: self.y + intermediate.y,
            z: self.z + intermediate.z,
        }.normalized()
    }

    /// Half size of the world aligned box enclosing a box with `half_size` under this rotation
    pub fn rotated_bounding_box_size(&self, half_size: Vector3) -> Vector3 {
        let q = self.normalized();
        let xx = q.x * q.x;
        let yy = q.y * q.y;
        let zz = q.z * q.z;

        let xy = q.x * q.y;
        let yz = q.y * q.z;
        let xz = q.x * q.z;

        let xw = q.x * q.w;
        let yw = q.y * q.w;
        let zw = q.z * q.w;

        (
            (1.0 - 2.0 * (yy + zz)).abs() * half_size.0 +
                (2.0 * (xy - zw)).abs() * half_size.1 +
                (2.0 * (xz + yw)).abs() * half_size.2,
            (2.0 * (xy + zw)).abs() * half_size.0 +
                (1.0 - 2.0 * (xx + zz)).abs() * half_size.1 +
                (2.0 * (yz - xw)).abs() * half_size.2,
            (2.0 * (xz - yw)).abs() * half_size.0 +
                (2.0 * (yz + xw)).abs() * half_size.1 +
                (1.0 - 2.0 * (xx + yy)).abs() * half_size.2,
        )
    }
}
