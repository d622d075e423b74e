use crate::core::constants::HIDE_AFFORDANCE_SIZE;
use crate::core::geo::Point;
use crate::core::geometry::DisplaySize;
use crate::input::events::{HitTarget, SurfaceEvent};
use crate::overlay::renderer::{LabelElement, OverlayLayout};
use crate::overlay::surface::OverlaySurface;
use crate::raster::RasterImage;
use egui::{Align2, Color32, ColorImage, CursorIcon, FontId, Pos2, Rect, Sense, TextureHandle, Ui, Vec2};

/// Parses a CSS-style hex color (`#rgb`, `#rrggbb`, `#rrggbbaa`, leading `#`
/// optional), falling back to white.
pub fn parse_hex_color(hex: &str) -> Color32 {
    let hex = hex.trim();
    let result = if hex.starts_with('#') {
        Color32::from_hex(hex)
    } else {
        Color32::from_hex(&format!("#{hex}"))
    };
    result.unwrap_or(Color32::WHITE)
}

/// egui surface for the label overlay.
///
/// Paints the map texture scaled to the available width, paints the label
/// elements it was last given and reports interaction as [`SurfaceEvent`]s
/// from [`LabelOverlayWidget::show`]. The caller forwards those events to the
/// editor that owns this surface.
pub struct LabelOverlayWidget {
    texture: Option<TextureHandle>,
    natural: DisplaySize,
    container: DisplaySize,
    image_reported: bool,
    layout: OverlayLayout,
    hovered: Option<String>,
}

impl Default for LabelOverlayWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelOverlayWidget {
    pub fn new() -> Self {
        Self {
            texture: None,
            natural: DisplaySize::default(),
            container: DisplaySize::default(),
            image_reported: false,
            layout: OverlayLayout::hidden(),
            hovered: None,
        }
    }

    /// Uploads a freshly fetched map raster. The next frame reports it as loaded.
    pub fn set_image(&mut self, ctx: &egui::Context, name: &str, raster: &RasterImage) {
        let image = ColorImage::from_rgba_unmultiplied(
            [raster.width as usize, raster.height as usize],
            &raster.rgba,
        );
        self.texture = Some(ctx.load_texture(name, image, egui::TextureOptions::LINEAR));
        self.natural = raster.natural_size();
        self.image_reported = false;
    }

    pub fn clear_image(&mut self) {
        self.texture = None;
        self.natural = DisplaySize::default();
        self.container = DisplaySize::default();
        self.image_reported = false;
        self.layout = OverlayLayout::hidden();
    }

    pub fn has_image(&self) -> bool {
        self.texture.is_some()
    }

    pub fn show(&mut self, ui: &mut Ui) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();
        let Some(texture) = self.texture.clone() else {
            return events;
        };
        if !self.natural.is_loaded() {
            return events;
        }

        let width = ui.available_width().max(1.0);
        let height = width * (self.natural.height / self.natural.width) as f32;
        let (rect, _) = ui.allocate_exact_size(Vec2::new(width, height), Sense::hover());
        let painter = ui.painter_at(rect);
        painter.image(
            texture.id(),
            rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );

        let displayed = DisplaySize::new(width as f64, height as f64);
        if !self.image_reported {
            self.image_reported = true;
            self.container = displayed;
            events.push(SurfaceEvent::ImageLoaded {
                natural: self.natural,
                displayed,
            });
        } else if displayed != self.container {
            self.container = displayed;
            events.push(SurfaceEvent::Resized { displayed });
        }

        if !self.layout.visible {
            return events;
        }

        let pointer = ui
            .input(|input| input.pointer.interact_pos())
            .map(|pos| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64));
        let mut hovered_now = None;

        for element in &self.layout.elements {
            let anchor = rect.min + Vec2::new(element.anchor.x as f32, element.anchor.y as f32);
            let font = FontId::proportional(element.font_size_px as f32);
            let color = parse_hex_color(&element.color).gamma_multiply(element.opacity);

            let text_size = painter
                .layout_no_wrap(element.name.clone(), font.clone(), color)
                .size();
            let text_rect = Rect::from_min_size(anchor - Vec2::new(text_size.x / 2.0, text_size.y), text_size);
            painter.text(anchor, Align2::CENTER_BOTTOM, &element.name, font, color);

            if !element.interactive {
                continue;
            }

            let button_rect = Rect::from_center_size(
                text_rect.right_top() + Vec2::new(HIDE_AFFORDANCE_SIZE / 2.0 + 2.0, 0.0),
                Vec2::splat(HIDE_AFFORDANCE_SIZE),
            );
            let id = ui.id().with(("maplabel", &element.name));
            let body = ui.interact(text_rect, id, Sense::drag());
            let button = ui.interact(button_rect, id.with("hide"), Sense::click());

            if body.hovered() || button.hovered() || body.dragged() {
                hovered_now = Some(element.name.clone());
            }
            if body.hovered() {
                ui.ctx().set_cursor_icon(if element.locked {
                    CursorIcon::NotAllowed
                } else {
                    CursorIcon::Grab
                });
            }

            if let Some(position) = pointer {
                if body.drag_started() {
                    events.push(SurfaceEvent::PointerDown {
                        target: HitTarget::Label(element.name.clone()),
                        position,
                    });
                } else if body.drag_released() {
                    events.push(SurfaceEvent::PointerUp { position });
                } else if body.dragged() {
                    events.push(SurfaceEvent::PointerMove { position });
                }
                if button.clicked() && element.show_hide_affordance {
                    events.push(SurfaceEvent::PointerDown {
                        target: HitTarget::HideButton(element.name.clone()),
                        position,
                    });
                }
            }

            if element.show_hide_affordance {
                paint_hide_affordance(&painter, button_rect, button.hovered());
            }
        }

        if hovered_now != self.hovered {
            if let Some(name) = self.hovered.take() {
                events.push(SurfaceEvent::PointerLeave { name });
            }
            if let Some(name) = hovered_now.clone() {
                events.push(SurfaceEvent::PointerEnter { name });
            }
            self.hovered = hovered_now;
        }
        events
    }
}

fn paint_hide_affordance(painter: &egui::Painter, rect: Rect, hovered: bool) {
    let fill = if hovered {
        Color32::from_rgba_unmultiplied(200, 40, 40, 230)
    } else {
        Color32::from_rgba_unmultiplied(0, 0, 0, 160)
    };
    painter.rect_filled(rect, 3.0, fill);
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        "×",
        FontId::proportional(HIDE_AFFORDANCE_SIZE - 2.0),
        Color32::WHITE,
    );
}

impl OverlaySurface for LabelOverlayWidget {
    fn container_size(&self) -> DisplaySize {
        self.container
    }

    fn present(&mut self, layout: &OverlayLayout) {
        self.layout = layout.clone();
    }

    fn update_element(&mut self, element: &LabelElement) {
        if let Some(existing) = self.layout.element_mut(&element.name) {
            *existing = element.clone();
        }
    }
}
