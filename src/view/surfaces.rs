//! HUD elements the controller drives.
//!
//! Every element is optional: a missing element silently skips its side effect. The UI
//! layer only reads these; the controller is the only writer.

/// A show/hide-able UI group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panel {
    visible: bool,
}

impl Panel {
    pub fn hidden() -> Self {
        Self { visible: false }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Full-screen white overlay used for the shutter flash.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashOverlay {
    pub visible: bool,
    /// 0.0 transparent, 1.0 opaque.
    pub alpha: f32,
}

impl Default for FlashOverlay {
    fn default() -> Self {
        Self {
            visible: true,
            alpha: 0.0,
        }
    }
}

/// Blend weight of the camera-mode post effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectVolume {
    pub weight: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorGrab {
    None,
    Locked,
}

/// Desired pointer state; the platform layer applies it when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub grab: CursorGrab,
    pub visible: bool,
}

impl CursorState {
    pub const FREE: Self = Self {
        grab: CursorGrab::None,
        visible: true,
    };

    pub const LOCKED: Self = Self {
        grab: CursorGrab::Locked,
        visible: false,
    };

    pub fn is_locked(&self) -> bool {
        self.grab == CursorGrab::Locked
    }
}

impl Default for CursorState {
    fn default() -> Self {
        Self::FREE
    }
}

/// Context panels, flash and post-effect.
#[derive(Debug, Clone, Default)]
pub struct HudSurfaces {
    pub normal_panel: Option<Panel>,
    pub camera_panel: Option<Panel>,
    pub gallery_panel: Option<Panel>,
    pub flash: Option<FlashOverlay>,
    pub effect_volume: Option<EffectVolume>,
}

impl HudSurfaces {
    /// Every element present.
    pub fn full() -> Self {
        Self {
            normal_panel: Some(Panel::hidden()),
            camera_panel: Some(Panel::hidden()),
            gallery_panel: Some(Panel::hidden()),
            flash: Some(FlashOverlay::default()),
            effect_volume: Some(EffectVolume::default()),
        }
    }

    /// Nothing wired up; every HUD side effect becomes a no-op.
    pub fn none() -> Self {
        Self::default()
    }

    /// Show exactly one context panel: gallery beats camera beats normal.
    pub fn show_context_panel(&mut self, camera_mode: bool, gallery_open: bool) {
        for panel in [&mut self.normal_panel, &mut self.camera_panel, &mut self.gallery_panel]
            .into_iter()
            .flatten()
        {
            panel.hide();
        }

        let target = if gallery_open {
            &mut self.gallery_panel
        } else if camera_mode {
            &mut self.camera_panel
        } else {
            &mut self.normal_panel
        };
        if let Some(panel) = target {
            panel.show();
        }
    }

    pub fn set_camera_panel_visible(&mut self, visible: bool) {
        if let Some(panel) = self.camera_panel.as_mut() {
            panel.set_visible(visible);
        }
    }

    pub fn set_effect_weight(&mut self, weight: f32) {
        if let Some(volume) = self.effect_volume.as_mut() {
            volume.weight = weight;
        }
    }

    pub fn effect_weight(&self) -> f32 {
        self.effect_volume.as_ref().map_or(0.0, |v| v.weight)
    }

    pub fn set_flash_visible(&mut self, visible: bool) {
        if let Some(flash) = self.flash.as_mut() {
            flash.visible = visible;
        }
    }

    pub fn set_flash_alpha(&mut self, alpha: f32) {
        if let Some(flash) = self.flash.as_mut() {
            flash.alpha = alpha;
        }
    }

    pub fn has_flash(&self) -> bool {
        self.flash.is_some()
    }

    pub fn normal_panel_visible(&self) -> bool {
        panel_visible(&self.normal_panel)
    }

    pub fn camera_panel_visible(&self) -> bool {
        panel_visible(&self.camera_panel)
    }

    pub fn gallery_panel_visible(&self) -> bool {
        panel_visible(&self.gallery_panel)
    }
}

fn panel_visible(panel: &Option<Panel>) -> bool {
    panel.as_ref().is_some_and(Panel::is_visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(hud: &HudSurfaces) -> [bool; 3] {
        [
            hud.normal_panel_visible(),
            hud.camera_panel_visible(),
            hud.gallery_panel_visible(),
        ]
    }

    #[test]
    fn exactly_one_context_panel() {
        let mut hud = HudSurfaces::full();
        hud.show_context_panel(false, false);
        assert_eq!(visible(&hud), [true, false, false]);
        hud.show_context_panel(true, false);
        assert_eq!(visible(&hud), [false, true, false]);
        hud.show_context_panel(false, true);
        assert_eq!(visible(&hud), [false, false, true]);
        // Gallery wins if both flags are somehow set
        hud.show_context_panel(true, true);
        assert_eq!(visible(&hud), [false, false, true]);
    }

    #[test]
    fn missing_elements_are_skipped() {
        let mut hud = HudSurfaces::none();
        hud.show_context_panel(true, false);
        hud.set_flash_alpha(1.0);
        hud.set_effect_weight(1.0);
        hud.set_camera_panel_visible(false);
        assert_eq!(visible(&hud), [false, false, false]);
        assert_eq!(hud.effect_weight(), 0.0);
        assert!(!hud.has_flash());
    }

    #[test]
    fn cursor_presets() {
        assert!(CursorState::LOCKED.is_locked());
        assert!(!CursorState::LOCKED.visible);
        assert!(!CursorState::FREE.is_locked());
        assert!(CursorState::FREE.visible);
    }
}
