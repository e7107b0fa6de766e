//! End-to-end controller scenarios, driven frame by frame without a GPU.

use std::cell::Cell;
use std::rc::Rc;

use camsnap::config::ControllerSettings;
use camsnap::controller::{FrameCapture, GroundMover, InputEvent, InputState, KeyBindings, Mode, PlayerController};
use camsnap::error::CaptureError;
use camsnap::model::{CameraRig, GalleryStore, PlayerBody, RenderLayers, SharedGallery};
use camsnap::view::{CursorState, HudSurfaces};
use glam::Vec3;
use image::{Rgba, RgbaImage};

const DT: f32 = 1.0 / 60.0;

/// Fake framebuffer: each capture is a 4x4 image filled with the next shade.
struct CountingCapture {
    shade: Rc<Cell<u8>>,
}

impl CountingCapture {
    fn new() -> Self {
        Self { shade: Rc::new(Cell::new(0)) }
    }
}

impl FrameCapture for CountingCapture {
    fn capture_frame(&mut self) -> Result<RgbaImage, CaptureError> {
        let shade = self.shade.get() + 1;
        self.shade.set(shade);
        Ok(RgbaImage::from_pixel(4, 4, Rgba([shade, shade, shade, 255])))
    }
}

struct FailingCapture;

impl FrameCapture for FailingCapture {
    fn capture_frame(&mut self) -> Result<RgbaImage, CaptureError> {
        Err(CaptureError::NotCopyable)
    }
}

struct Harness {
    pc: PlayerController,
    input: InputState,
}

impl Harness {
    fn new(gallery: Option<SharedGallery>) -> Self {
        let settings = ControllerSettings::default();
        let rig = CameraRig::new(1280, 720, settings.original_fov, settings.eye_height);
        let pc = PlayerController::new(
            settings,
            KeyBindings::default(),
            rig,
            PlayerBody::new(Vec3::ZERO),
            Box::new(GroundMover::new(Vec::new(), 20.0)),
            HudSurfaces::full(),
            gallery,
        );
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        Self { pc, input }
    }

    /// One full frame: tick, then the end-of-frame hook with `capture`.
    fn frame(&mut self, capture: &mut dyn FrameCapture) {
        self.pc.update(&mut self.input, DT);
        self.pc.end_of_frame(capture);
    }

    fn tap(&mut self, key: &str, capture: &mut dyn FrameCapture) {
        self.input.process_event(&InputEvent::KeyDown(key.to_string()));
        self.frame(capture);
        self.input.process_event(&InputEvent::KeyUp(key.to_string()));
    }

    fn idle(&mut self, frames: usize, capture: &mut dyn FrameCapture) {
        for _ in 0..frames {
            self.frame(capture);
        }
    }
}

#[test]
fn empty_gallery_shows_placeholder_with_buttons_disabled() {
    let mut h = Harness::new(Some(GalleryStore::shared()));
    let mut cap = CountingCapture::new();
    h.tap("g", &mut cap);

    assert!(h.pc.viewer.is_open());
    assert_eq!(h.pc.viewer.displayed_index(), None);
    assert_eq!(h.pc.viewer.counter_text(), "0 / 0");
    assert!(!h.pc.viewer.next_button.enabled);
    assert!(!h.pc.viewer.previous_button.enabled);
    assert_eq!(h.pc.cursor(), CursorState::FREE);
}

#[test]
fn holding_zoom_in_pins_fov_at_minimum() {
    let mut h = Harness::new(None);
    let mut cap = CountingCapture::new();
    h.tap("f", &mut cap);

    h.input.process_event(&InputEvent::KeyDown("w".to_string()));
    h.idle(600, &mut cap);

    assert_eq!(h.pc.state().field_of_view, 15.0);
    assert_eq!(h.pc.rig.fov_y, 15.0);
}

#[test]
fn three_captures_then_page_to_the_end() {
    let gallery = GalleryStore::shared();
    let mut h = Harness::new(Some(gallery.clone()));
    let mut cap = CountingCapture::new();

    h.tap("f", &mut cap);
    for _ in 0..3 {
        h.tap(" ", &mut cap);
        // Let the flash finish before the next shot
        h.idle(30, &mut cap);
    }
    assert_eq!(gallery.borrow().len(), 3);
    let shades: Vec<u8> = gallery.borrow().photos().iter().map(|p| p.image.get_pixel(0, 0).0[0]).collect();
    assert_eq!(shades, vec![1, 2, 3]);

    h.tap("f", &mut cap);
    h.tap("g", &mut cap);
    assert_eq!(h.pc.viewer.counter_text(), "1 / 3");
    assert!(!h.pc.viewer.previous_button.enabled);

    h.pc.next_photo();
    h.pc.next_photo();
    assert_eq!(h.pc.viewer.counter_text(), "3 / 3");
    assert!(!h.pc.viewer.next_button.enabled);
    assert!(h.pc.viewer.previous_button.enabled);

    // Past the end is a no-op
    h.pc.next_photo();
    assert_eq!(h.pc.viewer.index(), 2);
}

#[test]
fn selfie_round_trip_restores_rig_exactly() {
    let mut h = Harness::new(None);
    let mut cap = CountingCapture::new();
    let offset = h.pc.rig.local_offset;
    let mask = h.pc.rig.render_mask;

    h.tap("f", &mut cap);
    h.tap("v", &mut cap);
    assert!(h.pc.state().selfie_active);
    assert_eq!(h.pc.state().selfie_yaw_offset, 180.0);
    assert!(((h.pc.rig.local_offset - offset).length() - 1.5).abs() < 1e-4);
    assert!(h.pc.rig.render_mask.contains(RenderLayers::PLAYER_BODY));

    h.tap("v", &mut cap);
    assert_eq!(h.pc.state().selfie_yaw_offset, 0.0);
    assert_eq!(h.pc.rig.local_offset, offset);
    assert_eq!(h.pc.rig.render_mask, mask);
}

#[test]
fn selfie_camera_keeps_facing_player_while_turning() {
    let mut h = Harness::new(None);
    let mut cap = CountingCapture::new();
    let head = h.pc.body.position + h.pc.rig.local_offset;

    h.tap("f", &mut cap);
    h.tap("v", &mut cap);

    for _ in 0..4 {
        // 900 px is a quarter turn
        h.input.process_event(&InputEvent::MouseMove { dx: -900.0, dy: 0.0 });
        h.frame(&mut cap);

        let eye = h.pc.rig.eye(h.pc.body.position);
        let to_head = (head - eye).normalize();
        assert!(h.pc.rig.forward().dot(to_head) > 0.999, "yaw {}", h.pc.state().yaw);
        assert!(((eye - head).length() - 1.5).abs() < 1e-4);
    }

    // A half turn puts the camera on the other side of the head
    h.input.process_event(&InputEvent::MouseMove { dx: -1800.0, dy: 0.0 });
    h.frame(&mut cap);
    assert!((h.pc.state().yaw - 180.0).abs() < 1e-3);
    let eye = h.pc.rig.eye(h.pc.body.position);
    assert!(eye.z > head.z + 1.49);
}

#[test]
fn exiting_camera_mode_during_selfie_restores_everything() {
    let mut h = Harness::new(None);
    let mut cap = CountingCapture::new();
    let offset = h.pc.rig.local_offset;

    h.tap("f", &mut cap);
    h.tap("v", &mut cap);
    h.input.process_event(&InputEvent::KeyDown("w".to_string()));
    h.idle(60, &mut cap);
    h.input.process_event(&InputEvent::KeyUp("w".to_string()));
    assert!(h.pc.state().field_of_view < 60.0);

    h.tap("f", &mut cap);
    assert_eq!(h.pc.state().mode, Mode::Normal);
    assert_eq!(h.pc.rig.fov_y, 60.0);
    assert_eq!(h.pc.rig.local_offset, offset);
    assert_eq!(h.pc.rig.render_mask, RenderLayers::WORLD);
    assert!(!h.pc.state().selfie_active);
}

#[test]
fn camera_mode_and_gallery_exclude_each_other() {
    let mut h = Harness::new(Some(GalleryStore::shared()));
    let mut cap = CountingCapture::new();

    h.tap("f", &mut cap);
    h.tap("g", &mut cap);
    assert!(!h.pc.state().gallery_open);
    h.tap("f", &mut cap);

    h.tap("g", &mut cap);
    h.tap("f", &mut cap);
    assert_eq!(h.pc.state().mode, Mode::Normal);
    assert!(h.pc.state().gallery_open);

    // Both keys in one frame: the gallery toggle runs first and closes the gallery, so the
    // camera toggle is allowed through
    h.input.process_event(&InputEvent::KeyDown("g".to_string()));
    h.input.process_event(&InputEvent::KeyDown("f".to_string()));
    h.frame(&mut cap);
    assert!(!h.pc.state().gallery_open);
    assert_eq!(h.pc.state().mode, Mode::Camera);
}

#[test]
fn snap_hides_hud_for_the_captured_frame_then_flashes() {
    let gallery = GalleryStore::shared();
    let mut h = Harness::new(Some(gallery.clone()));
    let mut cap = CountingCapture::new();
    h.tap("f", &mut cap);

    h.input.process_event(&InputEvent::KeyDown(" ".to_string()));
    h.pc.update(&mut h.input, DT);
    assert!(h.pc.wants_frame_capture());
    assert!(!h.pc.hud.camera_panel_visible());

    h.pc.end_of_frame(&mut cap);
    assert!(h.pc.hud.camera_panel_visible());
    assert_eq!(h.pc.hud.flash.as_ref().map(|f| f.alpha), Some(1.0));
    assert_eq!(gallery.borrow().len(), 1);

    h.idle(30, &mut cap);
    assert_eq!(h.pc.hud.flash.as_ref().map(|f| f.alpha), Some(0.0));
    assert!(!h.pc.snap_in_flight());
}

#[test]
fn snapping_again_mid_flash_is_rejected() {
    let gallery = GalleryStore::shared();
    let mut h = Harness::new(Some(gallery.clone()));
    let mut cap = CountingCapture::new();
    h.tap("f", &mut cap);

    h.tap(" ", &mut cap);
    h.tap(" ", &mut cap);
    h.idle(30, &mut cap);
    assert_eq!(gallery.borrow().len(), 1);

    // Once finished, the next press works again
    h.tap(" ", &mut cap);
    assert_eq!(gallery.borrow().len(), 2);
}

#[test]
fn missing_store_appends_nothing_but_still_flashes() {
    let mut h = Harness::new(None);
    let mut cap = CountingCapture::new();
    h.tap("f", &mut cap);
    h.tap(" ", &mut cap);

    assert_eq!(cap.shade.get(), 1);
    assert_eq!(h.pc.hud.flash.as_ref().map(|f| f.alpha), Some(1.0));
    assert!(h.pc.hud.camera_panel_visible());
}

#[test]
fn capture_failure_appends_nothing() {
    let gallery = GalleryStore::shared();
    let mut h = Harness::new(Some(gallery.clone()));
    h.tap("f", &mut FailingCapture);
    h.tap(" ", &mut FailingCapture);

    assert!(gallery.borrow().is_empty());
    assert!(h.pc.hud.camera_panel_visible());
    h.idle(30, &mut FailingCapture);
    assert!(!h.pc.snap_in_flight());
}

#[test]
fn locomotion_only_in_normal_mode_with_gallery_closed() {
    let mut h = Harness::new(Some(GalleryStore::shared()));
    let mut cap = CountingCapture::new();

    h.input.process_event(&InputEvent::KeyDown("d".to_string()));
    h.idle(60, &mut cap);
    let walked = h.pc.body.position;
    assert!((walked.x - 5.0).abs() < 0.01);
    h.input.process_event(&InputEvent::KeyUp("d".to_string()));

    h.tap("g", &mut cap);
    h.input.process_event(&InputEvent::KeyDown("d".to_string()));
    h.idle(60, &mut cap);
    assert_eq!(h.pc.body.position, walked);
    h.input.process_event(&InputEvent::KeyUp("d".to_string()));
    h.tap("g", &mut cap);

    h.tap("f", &mut cap);
    h.input.process_event(&InputEvent::KeyDown("d".to_string()));
    h.idle(60, &mut cap);
    assert_eq!(h.pc.body.position, walked);
}

#[test]
fn mouse_look_turns_camera_and_walk_direction() {
    let mut h = Harness::new(None);
    let mut cap = CountingCapture::new();

    // 900 px * 0.1 deg/px = 90 degrees to the right
    h.input.process_event(&InputEvent::MouseMove { dx: 900.0, dy: 0.0 });
    h.frame(&mut cap);
    assert!((h.pc.state().yaw - 270.0).abs() < 1e-3);
    assert!((h.pc.rig.forward() - Vec3::X).length() < 1e-4);

    h.input.process_event(&InputEvent::KeyDown("w".to_string()));
    h.idle(60, &mut cap);
    assert!(h.pc.body.position.x > 4.9);
    assert!(h.pc.body.position.z.abs() < 1e-3);

    h.input.process_event(&InputEvent::MouseMove { dx: 0.0, dy: -10_000.0 });
    h.frame(&mut cap);
    assert_eq!(h.pc.state().pitch, 80.0);
}
