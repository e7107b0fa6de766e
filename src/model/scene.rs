use glam::Vec3;

use crate::model::{Aabb, RenderLayers};
use crate::utils::Mesh;

/// A static, solid piece of scenery.
#[derive(Debug, Clone)]
pub struct Prop {
    pub bounds: Aabb,
    pub color: [f32; 4],
}

/// Test level: a checkerboard floor with a ring of pillars and a few crates.
pub struct Scene {
    pub props: Vec<Prop>,
    /// Half size of the walkable square.
    pub half_extent: f32,
    pub ground_tiles: i32,
    pub tile_size: f32,
}

impl Scene {
    pub fn new() -> Self {
        let mut props = Vec::new();

        for i in 0..8 {
            let angle = i as f32 / 8.0 * std::f32::consts::TAU;
            let center = Vec3::new(angle.cos() * 12.0, 2.0, angle.sin() * 12.0);
            props.push(Prop {
                bounds: Aabb::from_center(center, Vec3::new(0.6, 2.0, 0.6)),
                color: [0.85, 0.82, 0.75, 1.0],
            });
        }

        let crates = [
            (Vec3::new(3.0, 0.5, -5.0), [0.72, 0.45, 0.22, 1.0]),
            (Vec3::new(-4.0, 0.75, -3.0), [0.25, 0.55, 0.80, 1.0]),
            (Vec3::new(-2.0, 0.4, 6.0), [0.80, 0.30, 0.30, 1.0]),
        ];
        for (center, color) in crates {
            props.push(Prop {
                bounds: Aabb::from_center(center, Vec3::splat(center.y)),
                color,
            });
        }

        Self {
            props,
            half_extent: 20.0,
            ground_tiles: 40,
            tile_size: 1.0,
        }
    }

    pub fn colliders(&self) -> Vec<Aabb> {
        self.props.iter().map(|p| p.bounds).collect()
    }

    /// Everything on the `WORLD` layer as one mesh.
    pub fn world_mesh(&self) -> (Mesh, RenderLayers) {
        let mut mesh = Mesh::checker_ground(
            self.ground_tiles,
            self.tile_size,
            [0.55, 0.70, 0.45, 1.0],
            [0.45, 0.60, 0.38, 1.0],
        );
        for prop in &self.props {
            mesh.extend(&Mesh::cuboid(prop.bounds.min, prop.bounds.max, prop.color));
        }
        (mesh, RenderLayers::WORLD)
    }

    /// The player's body around its own origin, drawn with a model transform.
    pub fn body_mesh(half_extents: Vec3) -> (Mesh, RenderLayers) {
        let torso_min = Vec3::new(-half_extents.x, 0.0, -half_extents.z);
        let torso_max = Vec3::new(half_extents.x, half_extents.y * 1.5, half_extents.z);
        let mut mesh = Mesh::cuboid(torso_min, torso_max, [0.95, 0.55, 0.20, 1.0]);

        let head = half_extents.x * 0.8;
        let head_center = Vec3::new(0.0, half_extents.y * 1.5 + head, 0.0);
        mesh.extend(&Mesh::cuboid(
            head_center - Vec3::splat(head),
            head_center + Vec3::splat(head),
            [0.98, 0.80, 0.65, 1.0],
        ));
        (mesh, RenderLayers::PLAYER_BODY)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn props_rest_on_the_ground() {
        let scene = Scene::new();
        assert!(!scene.props.is_empty());
        for prop in &scene.props {
            assert!(prop.bounds.min.y.abs() < 1e-5);
        }
    }

    #[test]
    fn spawn_point_is_clear() {
        let scene = Scene::new();
        let spawn = Aabb::from_center(Vec3::new(0.0, 0.9, 0.0), Vec3::new(0.3, 0.9, 0.3));
        assert!(scene.colliders().iter().all(|c| !c.intersects(&spawn)));
    }

    #[test]
    fn layers_split_world_and_body() {
        let scene = Scene::new();
        assert_eq!(scene.world_mesh().1, RenderLayers::WORLD);
        assert_eq!(Scene::body_mesh(Vec3::new(0.3, 0.9, 0.3)).1, RenderLayers::PLAYER_BODY);
    }
}
