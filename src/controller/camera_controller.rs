use crate::config::ControllerSettings;
use crate::controller::mode::ControllerState;

/// Handles camera orientation and the camera-mode zoom
#[derive(Debug, Clone)]
pub struct CameraController {
    pub mouse_sensitivity: f32,
    pub vertical_angle_limit: f32,
    pub zoom_speed: f32,
    pub min_fov: f32,
    pub original_fov: f32,
}

impl CameraController {
    pub fn new(settings: &ControllerSettings) -> Self {
        Self {
            mouse_sensitivity: settings.mouse_sensitivity,
            vertical_angle_limit: settings.vertical_angle_limit,
            zoom_speed: settings.zoom_speed,
            min_fov: settings.min_fov,
            original_fov: settings.original_fov,
        }
    }

    /// Apply mouse look delta (pixels) to yaw and pitch
    pub fn apply_look(&self, state: &mut ControllerState, dx: f32, dy: f32) {
        state.yaw = (state.yaw - dx * self.mouse_sensitivity).rem_euclid(360.0);
        let limit = self.vertical_angle_limit;
        state.pitch = (state.pitch - dy * self.mouse_sensitivity).clamp(-limit, limit);
    }

    /// Continuous zoom while a zoom key is held. Zoom-in wins if both are held.
    pub fn apply_zoom(&self, state: &mut ControllerState, zoom_in: bool, zoom_out: bool, dt: f32) {
        let mut fov = state.field_of_view;
        if zoom_in {
            fov -= self.zoom_speed * dt;
        } else if zoom_out {
            fov += self.zoom_speed * dt;
        }
        state.field_of_view = fov.clamp(self.min_fov, self.original_fov);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> (CameraController, ControllerState) {
        let settings = ControllerSettings::default();
        (CameraController::new(&settings), ControllerState::new(settings.original_fov))
    }

    #[test]
    fn pitch_never_leaves_limit() {
        let (cc, mut state) = controller();
        for dy in [-1.0e6, -500.0, -3.0, 0.0, 7.5, 900.0, 1.0e6, f32::MAX / 2.0] {
            cc.apply_look(&mut state, 0.0, dy);
            assert!(state.pitch >= -80.0 && state.pitch <= 80.0, "pitch {} after dy {}", state.pitch, dy);
        }
    }

    #[test]
    fn mouse_right_turns_right_and_down_looks_down() {
        let (cc, mut state) = controller();
        cc.apply_look(&mut state, 10.0, 10.0);
        // Yaw is counter-clockwise seen from above, so turning right lowers it
        assert!((state.yaw - 359.0).abs() < 1e-4);
        assert!((state.pitch + 1.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_stays_in_range_for_any_hold() {
        let (cc, mut state) = controller();
        for _ in 0..1000 {
            cc.apply_zoom(&mut state, true, false, 0.1);
            assert!(state.field_of_view >= 15.0);
        }
        assert_eq!(state.field_of_view, 15.0);

        for _ in 0..1000 {
            cc.apply_zoom(&mut state, false, true, 0.1);
            assert!(state.field_of_view <= 60.0);
        }
        assert_eq!(state.field_of_view, 60.0);
    }

    #[test]
    fn zoom_rate_follows_delta_time() {
        let (cc, mut state) = controller();
        cc.apply_zoom(&mut state, true, false, 0.5);
        assert!((state.field_of_view - 55.0).abs() < 1e-4);

        cc.apply_zoom(&mut state, true, true, 0.5);
        assert!((state.field_of_view - 50.0).abs() < 1e-4);

        cc.apply_zoom(&mut state, false, false, 0.5);
        assert!((state.field_of_view - 50.0).abs() < 1e-4);
    }
}
