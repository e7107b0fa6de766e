use tracing::debug;

use crate::model::SharedGallery;

/// Clickable navigation control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavButton {
    pub enabled: bool,
}

/// Pages through the gallery one photo at a time.
///
/// Reads the store but never writes to it. The displayed photo is referenced by its
/// index into the store; `None` means the empty placeholder is shown.
pub struct GalleryViewer {
    gallery: Option<SharedGallery>,
    visible: bool,
    index: usize,
    displayed: Option<usize>,
    counter_text: String,
    pub next_button: NavButton,
    pub previous_button: NavButton,
}

impl GalleryViewer {
    /// Starts hidden.
    pub fn new(gallery: Option<SharedGallery>) -> Self {
        Self {
            gallery,
            visible: false,
            index: 0,
            displayed: None,
            counter_text: placeholder_counter(),
            next_button: NavButton::default(),
            previous_button: NavButton::default(),
        }
    }

    /// Show or hide the viewer. Opening always starts at the first photo.
    pub fn set_open(&mut self, open: bool) {
        self.visible = open;
        if !open {
            return;
        }

        if self.photo_count() > 0 {
            self.index = 0;
            self.show_current_photo();
        } else {
            self.show_placeholder();
        }
    }

    pub fn next(&mut self) {
        if !self.visible {
            return;
        }
        let count = self.photo_count();
        if count > 0 && self.index < count - 1 {
            self.index += 1;
            self.show_current_photo();
        } else {
            debug!(index = self.index, count, "already at last photo");
        }
    }

    pub fn previous(&mut self) {
        if !self.visible {
            return;
        }
        if self.index > 0 && self.photo_count() > 0 {
            self.index -= 1;
            self.show_current_photo();
        } else {
            debug!(index = self.index, "already at first photo");
        }
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Store index of the photo on display, `None` for the placeholder.
    pub fn displayed_index(&self) -> Option<usize> {
        self.displayed
    }

    pub fn counter_text(&self) -> &str {
        &self.counter_text
    }

    pub fn gallery(&self) -> Option<&SharedGallery> {
        self.gallery.as_ref()
    }

    fn photo_count(&self) -> usize {
        self.gallery.as_ref().map_or(0, |g| g.borrow().len())
    }

    fn show_current_photo(&mut self) {
        let count = self.photo_count();
        if count == 0 {
            self.show_placeholder();
            return;
        }
        self.index = self.index.min(count - 1);
        self.displayed = Some(self.index);
        self.previous_button.enabled = self.index > 0;
        self.next_button.enabled = self.index < count - 1;
        self.counter_text = format!("{} / {}", self.index + 1, count);
    }

    fn show_placeholder(&mut self) {
        self.index = 0;
        self.displayed = None;
        self.counter_text = placeholder_counter();
        self.next_button.enabled = false;
        self.previous_button.enabled = false;
    }

    /// Re-evaluate buttons and counter after photos were appended while open.
    pub fn refresh(&mut self) {
        if !self.visible {
            return;
        }
        match self.displayed {
            Some(_) => self.show_current_photo(),
            None if self.photo_count() > 0 => {
                self.index = 0;
                self.show_current_photo();
            }
            None => {}
        }
    }
}

fn placeholder_counter() -> String {
    "0 / 0".to_string()
}
