//! The photo snap: hide HUD, wait for the frame to finish, capture, restore, flash.
//!
//! A run is a small state object advanced by the frame loop rather than a coroutine:
//!
//! ```text
//! start()            hide camera panel + flash          -> WaitingForFrameEnd
//! on_frame_end()     capture, restore panel, append,
//!                    flash alpha 1                      -> Flash { remaining }
//! tick(dt)           count down, then flash alpha 0     -> Finished
//! ```

use image::RgbaImage;
use tracing::{debug, warn};

use crate::error::CaptureError;
use crate::model::SharedGallery;
use crate::view::HudSurfaces;

/// Reads back the frame that was just rendered.
///
/// Only valid at the end-of-frame point, after the HUD changes made by
/// [`SnapSequence::start`] have been drawn.
pub trait FrameCapture {
    fn capture_frame(&mut self) -> Result<RgbaImage, CaptureError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapPhase {
    WaitingForFrameEnd,
    Flash { remaining: f32 },
    Finished,
}

/// One in-flight snap.
#[derive(Debug)]
pub struct SnapSequence {
    phase: SnapPhase,
    flash_duration: f32,
    photo_id: Option<u64>,
}

impl SnapSequence {
    /// Phase one runs synchronously: the camera panel and flash are hidden so the
    /// captured frame shows only the scene.
    pub fn start(hud: &mut HudSurfaces, flash_duration: f32) -> Self {
        hud.set_camera_panel_visible(false);
        hud.set_flash_visible(false);
        debug!("snap started, waiting for frame end");
        Self {
            phase: SnapPhase::WaitingForFrameEnd,
            flash_duration,
            photo_id: None,
        }
    }

    pub fn phase(&self) -> SnapPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SnapPhase::Finished
    }

    pub fn waiting_for_frame_end(&self) -> bool {
        self.phase == SnapPhase::WaitingForFrameEnd
    }

    /// Id the photo was stored under, once appended.
    pub fn photo_id(&self) -> Option<u64> {
        self.photo_id
    }

    /// The post-render suspension point. Does nothing outside `WaitingForFrameEnd`.
    pub fn on_frame_end(
        &mut self,
        capture: &mut dyn FrameCapture,
        hud: &mut HudSurfaces,
        gallery: Option<&SharedGallery>,
    ) {
        if self.phase != SnapPhase::WaitingForFrameEnd {
            return;
        }

        let frame = capture.capture_frame();

        hud.set_camera_panel_visible(true);

        match (frame, gallery) {
            (Ok(image), Some(gallery)) => {
                self.photo_id = Some(gallery.borrow_mut().add_photo(image));
            }
            (Ok(_), None) => {
                warn!("no gallery store available, captured photo dropped");
            }
            (Err(e), _) => {
                warn!("frame capture failed, no photo stored: {e}");
            }
        }

        if hud.has_flash() {
            hud.set_flash_visible(true);
            hud.set_flash_alpha(1.0);
            self.phase = SnapPhase::Flash {
                remaining: self.flash_duration,
            };
        } else {
            self.phase = SnapPhase::Finished;
        }
    }

    /// Advance the flash timer by one tick.
    pub fn tick(&mut self, dt: f32, hud: &mut HudSurfaces) {
        if let SnapPhase::Flash { remaining } = self.phase {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                hud.set_flash_alpha(0.0);
                self.phase = SnapPhase::Finished;
                debug!("snap finished");
            } else {
                self.phase = SnapPhase::Flash { remaining };
            }
        }
    }
}
