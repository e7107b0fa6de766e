use glam::{EulerRot, Mat4, Quat, Vec3};

/// Bitmask of render layers a mesh lives on or a camera draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderLayers(pub u32);

impl RenderLayers {
    pub const NONE: Self = Self(0);
    pub const WORLD: Self = Self(1 << 0);
    /// The player's own body. Hidden from the first-person view, shown in selfies.
    pub const PLAYER_BODY: Self = Self(1 << 1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for RenderLayers {
    fn default() -> Self {
        Self::WORLD
    }
}

/// Camera mounted on the player body.
///
/// `local_offset` and `local_rotation` are relative to the body origin, which never
/// rotates; yaw lives entirely in the camera rotation.
#[derive(Debug, Clone)]
pub struct CameraRig {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub local_offset: Vec3,
    pub local_rotation: Quat,
    pub render_mask: RenderLayers,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl CameraRig {
    pub fn new(width: u32, height: u32, fov_y: f32, eye_height: f32) -> Self {
        Self {
            fov_y,
            local_offset: Vec3::new(0.0, eye_height, 0.0),
            local_rotation: Quat::IDENTITY,
            render_mask: RenderLayers::WORLD,
            aspect: aspect_ratio(width, height),
            z_near: 0.05,
            z_far: 500.0,
        }
    }

    /// Set rotation from pitch and yaw in degrees, no roll.
    pub fn set_euler(&mut self, pitch: f32, yaw: f32) {
        self.local_rotation = euler_rotation(pitch, yaw);
    }

    pub fn forward(&self) -> Vec3 {
        self.local_rotation * Vec3::NEG_Z
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn eye(&self, body_position: Vec3) -> Vec3 {
        body_position + self.local_offset
    }

    pub fn view_proj(&self, body_position: Vec3) -> Mat4 {
        let eye = self.eye(body_position);
        let view = Mat4::look_to_rh(eye, self.forward(), Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

/// Rotation for pitch (about X) and yaw (about Y), both in degrees.
pub fn euler_rotation(pitch: f32, yaw: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch.to_radians(), 0.0)
}

/// Horizontal forward direction for a yaw in degrees. Yaw 0 looks down -Z.
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Quat::from_rotation_y(yaw.to_radians()) * Vec3::NEG_Z
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
