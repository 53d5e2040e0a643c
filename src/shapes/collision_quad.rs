use crate::interactions::MinkowskiSupport;
use crate::models::{Box3D, CollisionLayers, Plane, Transform};
use crate::utils::{
    add_scaled, cross_product, dot_product, normalize_vector, subtract_vectors, vector_magnitude,
    PhysicsError, Vector3, EDGE_ZERO_BIAS,
};

/// Edge bits reported by [`CollisionQuad::determine_edges`].
pub const QUAD_EDGE_A_START: u8 = 1 << 0;
pub const QUAD_EDGE_B_START: u8 = 1 << 1;
pub const QUAD_EDGE_A_END: u8 = 1 << 2;
pub const QUAD_EDGE_B_END: u8 = 1 << 3;
pub const QUAD_ALL_EDGES: u8 = 0xF;

/// Flat rectangle spanned from `corner` along two perpendicular unit edges.
///
/// The plane normal is `edge_a x edge_b`. A quad with zero thickness only collides from
/// the side its normal faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionQuad {
    pub corner: Vector3,
    pub edge_a: Vector3,
    pub edge_a_length: f64,
    pub edge_b: Vector3,
    pub edge_b_length: f64,
    pub plane: Plane,
    pub thickness: f64,
    /// Edges that may produce contacts; edges shared with a coplanar neighbour are cleared.
    pub enabled_edges: u8,
}

impl CollisionQuad {
    /// Builds a quad from its corner and two full edge vectors.
    pub fn new(corner: Vector3, edge_a: Vector3, edge_b: Vector3, thickness: f64) -> Result<Self, PhysicsError> {
        let edge_a_length = vector_magnitude(edge_a);
        let edge_b_length = vector_magnitude(edge_b);

        if !(edge_a_length > 0.0 && edge_b_length > 0.0) {
            return Err(PhysicsError::InvalidDimension("quad edges must have a length".to_string()));
        }
        if !(thickness >= 0.0) {
            return Err(PhysicsError::InvalidDimension(format!("quad thickness {}", thickness)));
        }

        let edge_a = normalize_vector(edge_a);
        let edge_b = normalize_vector(edge_b);
        let normal = normalize_vector(cross_product(edge_a, edge_b));

        Ok(Self {
            corner,
            edge_a,
            edge_a_length,
            edge_b,
            edge_b_length,
            plane: Plane::from_normal_and_point(normal, corner),
            thickness,
            enabled_edges: QUAD_ALL_EDGES,
        })
    }

    pub fn with_enabled_edges(mut self, enabled_edges: u8) -> Self {
        self.enabled_edges = enabled_edges & QUAD_ALL_EDGES;
        self
    }

    /// True when `point` lies beyond an edge that is not allowed to generate contacts.
    pub fn is_past_disabled_edge(&self, point: Vector3) -> bool {
        self.determine_edges(point) & !self.enabled_edges != 0
    }

    pub fn normal(&self) -> Vector3 {
        self.plane.normal
    }

    /// Which edges of the quad `point` lies beyond, once projected into the quad plane.
    pub fn determine_edges(&self, point: Vector3) -> u8 {
        let relative = subtract_vectors(point, self.corner);
        let mut edge_mask = 0;

        let edge_distance = dot_product(relative, self.edge_a);
        if edge_distance < -EDGE_ZERO_BIAS {
            edge_mask |= QUAD_EDGE_A_START;
        }
        if edge_distance > self.edge_a_length + EDGE_ZERO_BIAS {
            edge_mask |= QUAD_EDGE_A_END;
        }

        let edge_distance = dot_product(relative, self.edge_b);
        if edge_distance < -EDGE_ZERO_BIAS {
            edge_mask |= QUAD_EDGE_B_START;
        }
        if edge_distance > self.edge_b_length + EDGE_ZERO_BIAS {
            edge_mask |= QUAD_EDGE_B_END;
        }

        edge_mask
    }

    pub fn corners(&self) -> [Vector3; 4] {
        let end_a = add_scaled(self.corner, self.edge_a, self.edge_a_length);
        [
            self.corner,
            end_a,
            add_scaled(end_a, self.edge_b, self.edge_b_length),
            add_scaled(self.corner, self.edge_b, self.edge_b_length),
        ]
    }

    pub fn center(&self) -> Vector3 {
        let center = add_scaled(self.corner, self.edge_a, self.edge_a_length * 0.5);
        add_scaled(center, self.edge_b, self.edge_b_length * 0.5)
    }

    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        mass * (self.edge_a_length * self.edge_a_length + self.edge_b_length * self.edge_b_length) / 12.0
    }

    /// Box around the quad in the frame given by `transform`, including its thickness.
    pub fn bounding_box(&self, transform: &Transform) -> Box3D {
        let transform = transform.rigid();
        let corners = self.corners();
        let mut result = Box3D::from_point(transform.transform_point(corners[0]));

        for corner in corners {
            result = result.union_point(transform.transform_point(corner));
            if self.thickness > 0.0 {
                result = result.union_point(transform.transform_point(add_scaled(corner, self.plane.normal, -self.thickness)));
            }
        }

        result
    }
}

impl MinkowskiSupport for CollisionQuad {
    fn support(&self, direction: Vector3) -> (Vector3, u32) {
        let mut output = self.corner;
        let mut id = 0;

        if dot_product(self.edge_a, direction) > 0.0 {
            output = add_scaled(output, self.edge_a, self.edge_a_length);
            id |= 0x1;
        } else {
            id |= 0x2;
        }

        if dot_product(self.edge_b, direction) > 0.0 {
            output = add_scaled(output, self.edge_b, self.edge_b_length);
            id |= 0x4;
        } else {
            id |= 0x8;
        }

        if self.thickness > 0.0 && dot_product(self.plane.normal, direction) < 0.0 {
            output = add_scaled(output, self.plane.normal, -self.thickness);
            id |= 0x10;
        } else {
            id |= 0x20;
        }

        (output, id)
    }
}

/// A quad together with the layers and surface material it collides with.
///
/// Used both for static level geometry and for the faces of a mesh collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCollider {
    pub quad: CollisionQuad,
    pub collision_layers: CollisionLayers,
    pub bounce: f64,
    pub friction: f64,
}

impl QuadCollider {
    pub fn new(quad: CollisionQuad, collision_layers: CollisionLayers) -> Self {
        Self { quad, collision_layers, bounce: 0.0, friction: 0.5 }
    }

    pub fn with_material(mut self, bounce: f64, friction: f64) -> Self {
        self.bounce = bounce;
        self.friction = friction;
        self
    }

    pub fn bounding_box(&self) -> Box3D {
        self.quad.bounding_box(&Transform::identity())
    }
}
