use std::collections::HashMap;

use egui::{Color32, Context, Pos2, Stroke};

use crate::controller::PlayerController;
use crate::model::Photo;

/// Clicks on the gallery's on-screen buttons, applied after the egui pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiActions {
    pub next_photo: bool,
    pub previous_photo: bool,
}

/// egui textures for gallery photos, uploaded once per photo id.
#[derive(Default)]
pub struct PhotoTextures {
    textures: HashMap<u64, egui::TextureHandle>,
}

impl PhotoTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_upload(&mut self, ctx: &Context, photo: &Photo) -> egui::TextureHandle {
        self.textures
            .entry(photo.id)
            .or_insert_with(|| {
                let size = [photo.width() as usize, photo.height() as usize];
                let image = egui::ColorImage::from_rgba_unmultiplied(size, photo.image.as_raw());
                ctx.load_texture(format!("photo-{}", photo.id), image, egui::TextureOptions::LINEAR)
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Build the complete UI and return egui output
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    controller: &PlayerController,
    textures: &mut PhotoTextures,
) -> (egui::FullOutput, UiActions) {
    let mut actions = UiActions::default();
    let hud = &controller.hud;

    let output = egui_ctx.run(raw_input, |ctx| {
        if hud.normal_panel_visible() {
            draw_crosshair(ctx);
            draw_hints(ctx, "F - camera    G - gallery    WASD - move");
        }
        if hud.camera_panel_visible() {
            draw_viewfinder(ctx, controller);
        }
        if hud.gallery_panel_visible() && controller.viewer.is_open() {
            actions = draw_gallery_window(ctx, controller, textures);
        }
        if let Some(flash) = hud.flash.as_ref().filter(|f| f.visible && f.alpha > 0.0) {
            draw_flash(ctx, flash.alpha);
        }
    });

    (output, actions)
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 10.0;
    let stroke = Stroke::new(1.0, Color32::WHITE);
    painter.line_segment([Pos2::new(center.x - size, center.y), Pos2::new(center.x + size, center.y)], stroke);
    painter.line_segment([Pos2::new(center.x, center.y - size), Pos2::new(center.x, center.y + size)], stroke);
}

fn draw_hints(ctx: &Context, text: &str) {
    egui::Area::new(egui::Id::new("hints"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(text).small().color(Color32::WHITE));
        });
}

/// Corner brackets, FOV readout and key hints.
fn draw_viewfinder(ctx: &Context, controller: &PlayerController) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("viewfinder")));
    let rect = ctx.available_rect().shrink(32.0);
    let arm = 28.0;
    let stroke = Stroke::new(2.0, Color32::WHITE);
    let corners = [
        (rect.left_top(), 1.0, 1.0),
        (rect.right_top(), -1.0, 1.0),
        (rect.left_bottom(), 1.0, -1.0),
        (rect.right_bottom(), -1.0, -1.0),
    ];
    for (corner, sx, sy) in corners {
        painter.line_segment([corner, Pos2::new(corner.x + arm * sx, corner.y)], stroke);
        painter.line_segment([corner, Pos2::new(corner.x, corner.y + arm * sy)], stroke);
    }

    let state = controller.state();
    egui::Area::new(egui::Id::new("viewfinder-readout"))
        .anchor(egui::Align2::LEFT_TOP, [44.0, 44.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("FOV {:.0}°", state.field_of_view))
                    .monospace()
                    .color(Color32::WHITE),
            );
            if state.selfie_active {
                ui.label(egui::RichText::new("SELFIE").monospace().color(Color32::YELLOW));
            }
        });

    draw_hints(ctx, "Space - snap    W/S - zoom    V - selfie    F - exit");
}

fn draw_gallery_window(ctx: &Context, controller: &PlayerController, textures: &mut PhotoTextures) -> UiActions {
    let viewer = &controller.viewer;
    let mut actions = UiActions::default();

    egui::Window::new("Gallery")
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            let max_size = ctx.available_rect().size() * 0.6;
            let texture = viewer.displayed_index().and_then(|index| {
                let store = viewer.gallery()?.borrow();
                let texture = store.get(index).map(|photo| textures.get_or_upload(ctx, photo));
                texture
            });

            match texture {
                Some(texture) => {
                    let size = fit_within(texture.size_vec2(), max_size);
                    ui.add(egui::Image::new(egui::load::SizedTexture::new(texture.id(), size)));
                }
                None => {
                    ui.allocate_ui(max_size, |ui| {
                        ui.centered_and_justified(|ui| {
                            ui.label("No photos yet");
                        });
                    });
                }
            }

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(viewer.previous_button.enabled, egui::Button::new("< Previous"))
                    .clicked()
                {
                    actions.previous_photo = true;
                }
                ui.label(viewer.counter_text());
                if ui
                    .add_enabled(viewer.next_button.enabled, egui::Button::new("Next >"))
                    .clicked()
                {
                    actions.next_photo = true;
                }
            });
        });

    actions
}

fn draw_flash(ctx: &Context, alpha: f32) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Tooltip, egui::Id::new("flash")));
    let a = (alpha.clamp(0.0, 1.0) * 255.0) as u8;
    painter.rect_filled(ctx.available_rect(), 0.0, Color32::from_rgba_unmultiplied(255, 255, 255, a));
}

/// Scale `size` down (never up) to fit inside `max`, keeping the aspect ratio.
fn fit_within(size: egui::Vec2, max: egui::Vec2) -> egui::Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return max;
    }
    let scale = (max.x / size.x).min(max.y / size.y).min(1.0);
    size * scale
}
