use glam::Mat4;
use tracing::debug;

use crate::config::ControllerSettings;
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{InputProcessor, InputState, KeyBindings};
use crate::controller::mode::{ControllerState, ModeStateMachine, Transition};
use crate::controller::physics::{locomotion_velocity, Mover};
use crate::controller::snap::{FrameCapture, SnapSequence};
use crate::model::{CameraRig, PlayerBody, SharedGallery};
use crate::view::{CursorState, GalleryViewer, HudSurfaces};

/// First-person controller: one `update` per tick, one `end_of_frame` after rendering.
pub struct PlayerController {
    settings: ControllerSettings,
    input_processor: InputProcessor,
    camera_controller: CameraController,
    modes: ModeStateMachine,
    pub rig: CameraRig,
    pub body: PlayerBody,
    mover: Box<dyn Mover>,
    pub hud: HudSurfaces,
    pub viewer: GalleryViewer,
    cursor: CursorState,
    gallery: Option<SharedGallery>,
    snap: Option<SnapSequence>,
}

impl PlayerController {
    /// The rig's FOV, offset and mask at this point become the values camera mode restores.
    pub fn new(
        settings: ControllerSettings,
        keys: KeyBindings,
        mut rig: CameraRig,
        body: PlayerBody,
        mover: Box<dyn Mover>,
        mut hud: HudSurfaces,
        gallery: Option<SharedGallery>,
    ) -> Self {
        let settings = settings.sanitized();
        rig.fov_y = settings.original_fov;
        let modes = ModeStateMachine::new(&rig, &settings);
        modes.apply_rotation(&mut rig);

        hud.set_effect_weight(0.0);
        hud.set_flash_alpha(0.0);
        hud.show_context_panel(false, false);

        Self {
            camera_controller: CameraController::new(&settings),
            input_processor: InputProcessor::new(keys),
            settings,
            modes,
            rig,
            body,
            mover,
            hud,
            viewer: GalleryViewer::new(gallery.clone()),
            cursor: CursorState::LOCKED,
            gallery,
            snap: None,
        }
    }

    /// Run one tick. Consumes this frame's key edges and look delta.
    pub fn update(&mut self, input: &mut InputState, dt: f32) {
        let processor = &self.input_processor;

        if processor.wants_to_recapture_cursor(input) && !self.modes.state.gallery_open {
            self.cursor = CursorState::LOCKED;
        }

        if processor.wants_to_toggle_gallery(input) {
            self.modes
                .toggle_gallery(&mut self.viewer, &mut self.hud, &mut self.cursor);
        }

        if processor.wants_to_toggle_camera_mode(input) {
            self.modes.toggle_camera_mode(&mut self.rig, &mut self.hud);
        }

        if processor.wants_to_toggle_selfie(input) {
            self.modes.toggle_selfie(&mut self.rig);
        }

        if self.modes.state.camera_controls_active() && processor.wants_to_snap(input) {
            if self.snap.is_some() {
                debug!("snap ignored: previous snap still running");
            } else {
                self.snap = Some(SnapSequence::start(&mut self.hud, self.settings.flash_duration));
            }
        }

        if self.modes.state.gallery_open {
            if processor.wants_next_photo(input) {
                self.viewer.next();
            }
            if processor.wants_previous_photo(input) {
                self.viewer.previous();
            }
        }

        if self.modes.state.camera_controls_active() {
            self.camera_controller.apply_zoom(
                &mut self.modes.state,
                processor.is_zooming_in(input),
                processor.is_zooming_out(input),
                dt,
            );
            self.rig.fov_y = self.modes.state.field_of_view;
        }

        let (dx, dy) = input.consume_look();
        if !self.modes.state.gallery_open {
            self.camera_controller
                .apply_look(&mut self.modes.state, dx, dy);
            self.modes.apply_rotation(&mut self.rig);
        }

        if self.modes.state.locomotion_active() {
            let axes = processor.movement_axes(input);
            let velocity = locomotion_velocity(self.modes.state.yaw, axes, self.settings.walk_speed);
            self.mover.simple_move(&mut self.body, velocity, dt);
        }

        if let Some(snap) = self.snap.as_mut() {
            snap.tick(dt, &mut self.hud);
            if snap.is_finished() {
                self.snap = None;
            }
        }

        input.end_frame();
    }

    /// True when the next rendered frame must be read back.
    pub fn wants_frame_capture(&self) -> bool {
        self.snap.as_ref().is_some_and(SnapSequence::waiting_for_frame_end)
    }

    /// Call once the frame has been rendered; resumes a snap waiting on it.
    pub fn end_of_frame(&mut self, capture: &mut dyn FrameCapture) {
        let Some(snap) = self.snap.as_mut() else {
            return;
        };
        snap.on_frame_end(capture, &mut self.hud, self.gallery.as_ref());
        if snap.is_finished() {
            self.snap = None;
        }
        self.viewer.refresh();
    }

    pub fn toggle_camera_mode(&mut self) -> Transition {
        self.modes.toggle_camera_mode(&mut self.rig, &mut self.hud)
    }

    pub fn toggle_gallery(&mut self) -> Transition {
        self.modes
            .toggle_gallery(&mut self.viewer, &mut self.hud, &mut self.cursor)
    }

    pub fn toggle_selfie(&mut self) -> Transition {
        self.modes.toggle_selfie(&mut self.rig)
    }

    /// On-screen "Next" button.
    pub fn next_photo(&mut self) {
        if self.modes.state.gallery_open {
            self.viewer.next();
        }
    }

    /// On-screen "Previous" button.
    pub fn previous_photo(&mut self) {
        if self.modes.state.gallery_open {
            self.viewer.previous();
        }
    }

    /// Escape: hand the pointer back to the OS.
    pub fn release_cursor(&mut self) {
        self.cursor = CursorState::FREE;
    }

    pub fn state(&self) -> &ControllerState {
        &self.modes.state
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn snap_in_flight(&self) -> bool {
        self.snap.is_some()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.rig.view_proj(self.body.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::{InputEvent, MouseButton};
    use crate::controller::mode::Mode;
    use crate::controller::physics::GroundMover;
    use crate::error::CaptureError;
    use crate::model::GalleryStore;
    use glam::Vec3;
    use image::RgbaImage;

    struct Blank;

    impl FrameCapture for Blank {
        fn capture_frame(&mut self) -> Result<RgbaImage, CaptureError> {
            Ok(RgbaImage::new(2, 2))
        }
    }

    fn controller(gallery: Option<SharedGallery>) -> PlayerController {
        let settings = ControllerSettings::default();
        let rig = CameraRig::new(800, 600, settings.original_fov, settings.eye_height);
        PlayerController::new(
            settings,
            KeyBindings::default(),
            rig,
            PlayerBody::new(Vec3::ZERO),
            Box::new(GroundMover::new(Vec::new(), 50.0)),
            HudSurfaces::full(),
            gallery,
        )
    }

    fn press(input: &mut InputState, key: &str) {
        input.process_event(&InputEvent::KeyDown(key.to_string()));
    }

    fn release(input: &mut InputState, key: &str) {
        input.process_event(&InputEvent::KeyUp(key.to_string()));
    }

    fn tap(pc: &mut PlayerController, input: &mut InputState, key: &str) {
        press(input, key);
        pc.update(input, 1.0 / 60.0);
        release(input, key);
    }

    #[test]
    fn starts_locked_in_normal_mode() {
        let pc = controller(None);
        assert_eq!(pc.cursor(), CursorState::LOCKED);
        assert_eq!(pc.state().mode, Mode::Normal);
        assert!(pc.hud.normal_panel_visible());
        assert!(!pc.viewer.is_open());
    }

    #[test]
    fn walking_only_in_normal_mode() {
        let mut pc = controller(None);
        let mut input = InputState::new();
        press(&mut input, "w");
        for _ in 0..30 {
            pc.update(&mut input, 1.0 / 60.0);
        }
        let walked = pc.body.position;
        assert!(walked.z < -2.0);
        release(&mut input, "w");

        tap(&mut pc, &mut input, "f");
        press(&mut input, "w");
        for _ in 0..30 {
            pc.update(&mut input, 1.0 / 60.0);
        }
        assert_eq!(pc.body.position, walked);
        // W zooms instead
        assert!(pc.state().field_of_view < 60.0);
    }

    #[test]
    fn gallery_blocks_look_and_walk() {
        let mut pc = controller(None);
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        tap(&mut pc, &mut input, "g");
        assert!(pc.state().gallery_open);

        press(&mut input, "w");
        input.process_event(&InputEvent::MouseMove { dx: 100.0, dy: 100.0 });
        let before = pc.body.position;
        pc.update(&mut input, 1.0 / 60.0);
        assert_eq!(pc.body.position, before);
        assert_eq!(pc.state().yaw, 0.0);
        assert_eq!(pc.state().pitch, 0.0);
    }

    #[test]
    fn snap_needs_a_fresh_press() {
        let gallery = GalleryStore::shared();
        let mut pc = controller(Some(gallery.clone()));
        let mut input = InputState::new();
        tap(&mut pc, &mut input, "f");

        press(&mut input, " ");
        pc.update(&mut input, 1.0 / 60.0);
        assert!(pc.wants_frame_capture());
        pc.end_of_frame(&mut Blank);

        // Holding the key through later frames does not fire again
        for _ in 0..60 {
            pc.update(&mut input, 1.0 / 60.0);
            pc.end_of_frame(&mut Blank);
        }
        assert_eq!(gallery.borrow().len(), 1);
        assert!(!pc.snap_in_flight());
    }

    #[test]
    fn retrigger_during_flash_is_rejected() {
        let gallery = GalleryStore::shared();
        let mut pc = controller(Some(gallery.clone()));
        let mut input = InputState::new();
        tap(&mut pc, &mut input, "f");

        tap(&mut pc, &mut input, " ");
        pc.end_of_frame(&mut Blank);
        assert!(pc.snap_in_flight());

        tap(&mut pc, &mut input, " ");
        assert!(!pc.wants_frame_capture());
        pc.end_of_frame(&mut Blank);
        assert_eq!(gallery.borrow().len(), 1);
    }

    #[test]
    fn snap_ignored_outside_camera_mode() {
        let gallery = GalleryStore::shared();
        let mut pc = controller(Some(gallery.clone()));
        let mut input = InputState::new();
        tap(&mut pc, &mut input, " ");
        assert!(!pc.wants_frame_capture());
        pc.end_of_frame(&mut Blank);
        assert!(gallery.borrow().is_empty());
    }

    #[test]
    fn escape_and_click_cursor_handling() {
        let mut pc = controller(None);
        let mut input = InputState::new();
        let click = InputEvent::MouseClick { button: MouseButton::Left, is_down: true };

        pc.release_cursor();
        assert_eq!(pc.cursor(), CursorState::FREE);
        input.process_event(&click);
        pc.update(&mut input, 1.0 / 60.0);
        assert_eq!(pc.cursor(), CursorState::LOCKED);

        // Clicks inside the open gallery keep the pointer free
        tap(&mut pc, &mut input, "g");
        input.process_event(&click);
        pc.update(&mut input, 1.0 / 60.0);
        assert_eq!(pc.cursor(), CursorState::FREE);
    }

    #[test]
    fn arrow_keys_page_the_open_gallery() {
        let gallery = GalleryStore::shared();
        for _ in 0..3 {
            gallery.borrow_mut().add_photo(RgbaImage::new(1, 1));
        }
        let mut pc = controller(Some(gallery));
        let mut input = InputState::new();
        tap(&mut pc, &mut input, "ArrowRight");
        assert_eq!(pc.viewer.index(), 0);

        tap(&mut pc, &mut input, "g");
        tap(&mut pc, &mut input, "ArrowRight");
        assert_eq!(pc.viewer.index(), 1);
        tap(&mut pc, &mut input, "ArrowLeft");
        tap(&mut pc, &mut input, "ArrowLeft");
        assert_eq!(pc.viewer.index(), 0);
    }
}
