use glam::Vec3;
use tracing::{debug, info};

use crate::config::ControllerSettings;
use crate::model::{yaw_forward, CameraRig, RenderLayers};
use crate::view::{CursorState, GalleryViewer, HudSurfaces};

/// Extra yaw applied while the selfie sub-mode is active.
pub const SELFIE_YAW_OFFSET: f32 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Camera,
}

/// Outcome of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Suppressed(Suppressed),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppressed {
    GalleryOpen,
    CameraModeActive,
    NotInCameraMode,
}

impl Transition {
    pub fn applied(self) -> bool {
        self == Transition::Applied
    }
}

/// Player-facing state mutated by the mode machine and the orientation updater.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub mode: Mode,
    pub selfie_active: bool,
    pub gallery_open: bool,
    /// Degrees.
    pub yaw: f32,
    /// Degrees, within +/- the vertical angle limit.
    pub pitch: f32,
    /// Degrees, within [min_fov, original_fov].
    pub field_of_view: f32,
    /// 180 while the selfie is active, 0 otherwise.
    pub selfie_yaw_offset: f32,
}

impl ControllerState {
    pub fn new(field_of_view: f32) -> Self {
        Self {
            mode: Mode::Normal,
            selfie_active: false,
            gallery_open: false,
            yaw: 0.0,
            pitch: 0.0,
            field_of_view,
            selfie_yaw_offset: 0.0,
        }
    }

    pub fn in_camera_mode(&self) -> bool {
        self.mode == Mode::Camera
    }

    /// Zoom, selfie and snap are only live in camera mode with the gallery closed.
    pub fn camera_controls_active(&self) -> bool {
        self.in_camera_mode() && !self.gallery_open
    }

    pub fn locomotion_active(&self) -> bool {
        self.mode == Mode::Normal && !self.gallery_open
    }
}

/// Camera rig values restored whenever camera mode or the selfie ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigOriginals {
    pub field_of_view: f32,
    pub local_offset: Vec3,
    pub render_mask: RenderLayers,
}

impl RigOriginals {
    pub fn capture(rig: &CameraRig) -> Self {
        Self {
            field_of_view: rig.fov_y,
            local_offset: rig.local_offset,
            render_mask: rig.render_mask,
        }
    }
}

/// Normal / Camera (+ Selfie) / Gallery transitions.
///
/// The three toggles are mutually exclusive through explicit guards:
/// - camera mode cannot toggle while the gallery is open,
/// - the gallery cannot toggle while in camera mode,
/// - the selfie only toggles in camera mode with the gallery closed.
pub struct ModeStateMachine {
    pub state: ControllerState,
    originals: RigOriginals,
    selfie_distance: f32,
}

impl ModeStateMachine {
    /// Records the rig's current FOV, offset and mask as the values to restore.
    pub fn new(rig: &CameraRig, settings: &ControllerSettings) -> Self {
        let originals = RigOriginals::capture(rig);
        Self {
            state: ControllerState::new(originals.field_of_view),
            originals,
            selfie_distance: settings.selfie_distance,
        }
    }

    pub fn toggle_camera_mode(&mut self, rig: &mut CameraRig, hud: &mut HudSurfaces) -> Transition {
        if self.state.gallery_open {
            debug!("camera mode toggle suppressed: gallery is open");
            return Transition::Suppressed(Suppressed::GalleryOpen);
        }

        self.state.mode = match self.state.mode {
            Mode::Normal => Mode::Camera,
            Mode::Camera => Mode::Normal,
        };

        let entering = self.state.in_camera_mode();
        hud.set_effect_weight(if entering { 1.0 } else { 0.0 });

        if !entering {
            self.state.field_of_view = self.originals.field_of_view;
            rig.fov_y = self.originals.field_of_view;
            self.state.selfie_active = false;
            self.state.selfie_yaw_offset = 0.0;
            rig.render_mask = self.originals.render_mask;
            rig.local_offset = self.originals.local_offset;
            self.apply_rotation(rig);
        }

        hud.show_context_panel(entering, self.state.gallery_open);
        info!(mode = ?self.state.mode, "camera mode toggled");
        Transition::Applied
    }

    pub fn toggle_gallery(
        &mut self,
        viewer: &mut GalleryViewer,
        hud: &mut HudSurfaces,
        cursor: &mut CursorState,
    ) -> Transition {
        if self.state.in_camera_mode() {
            debug!("gallery toggle suppressed: camera mode is active");
            return Transition::Suppressed(Suppressed::CameraModeActive);
        }

        self.state.gallery_open = !self.state.gallery_open;
        viewer.set_open(self.state.gallery_open);
        *cursor = if self.state.gallery_open {
            CursorState::FREE
        } else {
            CursorState::LOCKED
        };

        hud.show_context_panel(self.state.in_camera_mode(), self.state.gallery_open);
        info!(open = self.state.gallery_open, "gallery toggled");
        Transition::Applied
    }

    pub fn toggle_selfie(&mut self, rig: &mut CameraRig) -> Transition {
        if !self.state.in_camera_mode() {
            debug!("selfie toggle suppressed: not in camera mode");
            return Transition::Suppressed(Suppressed::NotInCameraMode);
        }
        if self.state.gallery_open {
            debug!("selfie toggle suppressed: gallery is open");
            return Transition::Suppressed(Suppressed::GalleryOpen);
        }

        self.state.selfie_active = !self.state.selfie_active;

        if self.state.selfie_active {
            self.state.selfie_yaw_offset = SELFIE_YAW_OFFSET;
            rig.render_mask = self.originals.render_mask.with(RenderLayers::PLAYER_BODY);
        } else {
            self.state.selfie_yaw_offset = 0.0;
            rig.local_offset = self.originals.local_offset;
            rig.render_mask = self.originals.render_mask;
        }
        self.apply_rotation(rig);

        info!(active = self.state.selfie_active, "selfie toggled");
        Transition::Applied
    }

    /// Camera rotation = Euler(pitch, yaw + selfie offset, 0). No smoothing.
    ///
    /// The body frame does not rotate, so during a selfie the pull-back follows the yaw
    /// here to keep the camera in front of the face.
    pub fn apply_rotation(&self, rig: &mut CameraRig) {
        let view_yaw = self.state.yaw + self.state.selfie_yaw_offset;
        rig.set_euler(self.state.pitch, view_yaw);
        if self.state.selfie_active {
            rig.local_offset = self.originals.local_offset - yaw_forward(view_yaw) * self.selfie_distance;
        }
    }
}
