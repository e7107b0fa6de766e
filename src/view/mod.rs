// VIEW: HUD state, gallery viewer and (native only) rendering
pub mod gallery_viewer;
pub mod surfaces;

#[cfg(feature = "native")]
pub mod capture;
#[cfg(feature = "native")]
pub mod gpu_init;
#[cfg(feature = "native")]
pub mod render;

pub use gallery_viewer::{GalleryViewer, NavButton};
pub use surfaces::{CursorGrab, CursorState, EffectVolume, FlashOverlay, HudSurfaces, Panel};

#[cfg(feature = "native")]
pub use capture::SurfaceCapture;
#[cfg(feature = "native")]
pub use gpu_init::{GpuContext, GpuInitError};
#[cfg(feature = "native")]
pub use render::RenderState;
