// CONTROLLER: Input, mode transitions, snap sequence and the per-frame driver
pub mod camera_controller;
pub mod input;
pub mod mode;
pub mod physics;
pub mod player_controller;
pub mod snap;

pub use camera_controller::CameraController;
pub use input::{InputEvent, InputProcessor, InputState, KeyBindings, MouseButton};
pub use mode::{ControllerState, Mode, ModeStateMachine, Suppressed, Transition};
pub use physics::{locomotion_velocity, GroundMover, Mover};
pub use player_controller::PlayerController;
pub use snap::{FrameCapture, SnapPhase, SnapSequence};
