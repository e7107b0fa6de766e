use glam::Vec3;

/// Collider-carrying player root. Orientation is owned by the controller state.
#[derive(Debug, Clone)]
pub struct PlayerBody {
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub grounded: bool,
    /// Half extents of the body's box collider.
    pub half_extents: Vec3,
}

impl PlayerBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            vertical_velocity: 0.0,
            grounded: false,
            half_extents: Vec3::new(0.3, 0.9, 0.3),
        }
    }

    /// Bottom-centre of the collider is the body origin.
    pub fn collider_at(&self, position: Vec3) -> Aabb {
        let center = position + Vec3::new(0.0, self.half_extents.y, 0.0);
        Aabb::from_center(center, self.half_extents)
    }
}

/// Axis-aligned box used for static scene colliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}
