use std::cell::RefCell;
use std::rc::Rc;

use image::RgbaImage;
use tracing::info;

/// Shared handle to the photo store. Everything runs on the frame thread.
pub type SharedGallery = Rc<RefCell<GalleryStore>>;

/// A captured frame.
#[derive(Debug, Clone)]
pub struct Photo {
    /// Capture order, starting at 1.
    pub id: u64,
    pub image: RgbaImage,
}

impl Photo {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Append-only, in-memory list of photos in capture order.
#[derive(Debug)]
pub struct GalleryStore {
    photos: Vec<Photo>,
    next_id: u64,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self {
            photos: Vec::new(),
            next_id: 1,
        }
    }

    pub fn shared() -> SharedGallery {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Append a captured frame and return the id it was stored under.
    pub fn add_photo(&mut self, image: RgbaImage) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.photos.push(Photo { id, image });
        info!(photo_id = id, count = self.photos.len(), "photo added to gallery");
        id
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Photo> {
        self.photos.get(index)
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }
}

impl Default for GalleryStore {
    fn default() -> Self {
        Self::new()
    }
}
