//! First-person controller with a camera mode: walk around, raise the camera, zoom,
//! flip to a selfie, snap photos into an in-memory gallery and page through them.
//!
//! The controller, model and HUD state are plain Rust and run headless; the `native`
//! feature adds the winit/wgpu front end in `main.rs`.

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod ui;
pub mod utils;
pub mod view;
