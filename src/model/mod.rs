// MODEL: Camera rig, player body, scene and photo storage
pub mod camera;
pub mod gallery;
pub mod player;
pub mod scene;

pub use camera::{euler_rotation, yaw_forward, CameraRig, RenderLayers};
pub use gallery::{GalleryStore, Photo, SharedGallery};
pub use player::{Aabb, PlayerBody};
pub use scene::{Prop, Scene};
