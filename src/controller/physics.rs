use glam::{Vec2, Vec3};

use crate::model::{yaw_forward, Aabb, PlayerBody};

/// Moves a body by a horizontal velocity, resolving collisions internally.
pub trait Mover {
    fn simple_move(&mut self, body: &mut PlayerBody, velocity: Vec3, dt: f32);
}

/// World-space move vector from movement axes in the yaw basis, scaled by speed.
///
/// `axes.y` is forward, `axes.x` is strafe right. No acceleration or friction.
pub fn locomotion_velocity(yaw: f32, axes: Vec2, walk_speed: f32) -> Vec3 {
    let forward = yaw_forward(yaw);
    let right = forward.cross(Vec3::Y);
    (forward * axes.y + right * axes.x) * walk_speed
}

/// Handles player physics (gravity, ground, box colliders, world bounds)
pub struct GroundMover {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub colliders: Vec<Aabb>,
    /// Half size of the square the body may walk in.
    pub bounds: f32,
}

impl GroundMover {
    pub fn new(colliders: Vec<Aabb>, bounds: f32) -> Self {
        Self {
            gravity: -9.8,
            max_fall_speed: 20.0,
            colliders,
            bounds,
        }
    }

    fn blocked(&self, body: &PlayerBody, position: Vec3) -> bool {
        let aabb = body.collider_at(position);
        self.colliders.iter().any(|c| c.intersects(&aabb))
    }
}

impl Mover for GroundMover {
    /// The vertical part of `velocity` is ignored; gravity owns the y axis.
    fn simple_move(&mut self, body: &mut PlayerBody, velocity: Vec3, dt: f32) {
        // Apply gravity
        if body.grounded {
            body.vertical_velocity = 0.0;
        }
        body.vertical_velocity =
            (body.vertical_velocity + self.gravity * dt).max(-self.max_fall_speed);

        // Vertical: land on the ground plane or on top of a collider
        let mut pos = body.position;
        let next_y = pos.y + body.vertical_velocity * dt;
        let candidate = Vec3::new(pos.x, next_y, pos.z);
        if next_y <= 0.0 {
            pos.y = 0.0;
            body.grounded = true;
        } else if self.blocked(body, candidate) {
            let top = self
                .colliders
                .iter()
                .filter(|c| c.intersects(&body.collider_at(candidate)))
                .map(|c| c.max.y)
                .fold(f32::MIN, f32::max);
            pos.y = top.max(0.0).min(pos.y);
            body.grounded = true;
        } else {
            pos.y = next_y;
            body.grounded = false;
        }

        // Horizontal collision (simple axis-aligned)
        let x_next = Vec3::new(pos.x + velocity.x * dt, pos.y, pos.z);
        if !self.blocked(body, x_next) {
            pos.x = x_next.x;
        }
        let z_next = Vec3::new(pos.x, pos.y, pos.z + velocity.z * dt);
        if !self.blocked(body, z_next) {
            pos.z = z_next.z;
        }

        // Clamp to world bounds
        pos.x = pos.x.clamp(-self.bounds, self.bounds);
        pos.z = pos.z.clamp(-self.bounds, self.bounds);

        body.position = pos;
    }
}
