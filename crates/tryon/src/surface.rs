//! The 2D drawing surface overlays are composited onto.

use tryon_image::{Canvas, Color, FontSize, Image, Resolution};

/// A font, described like a CSS font shorthand (`30px Arial`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub size_px: u32,
    pub family: &'static str,
}

impl Font {
    pub const fn new(size_px: u32, family: &'static str) -> Self {
        Self { size_px, family }
    }
}

/// A 2D drawing surface with a transform stack, like an HTML canvas context.
///
/// The compositor only issues draw calls; it never reads pixels back.
pub trait Surface {
    fn resolution(&self) -> Resolution;

    /// Clears the whole surface, ignoring the current transform.
    fn clear(&mut self);

    /// Saves the current transform.
    fn save(&mut self);

    /// Restores the most recently saved transform.
    fn restore(&mut self);

    fn scale(&mut self, sx: f32, sy: f32);

    fn translate(&mut self, dx: f32, dy: f32);

    /// Draws `bitmap` at its natural size with its top left corner at `(x, y)`.
    fn draw_image(&mut self, bitmap: &Image, x: f32, y: f32);

    /// Draws `bitmap` stretched to `width x height` with its top left corner at `(x, y)`.
    fn draw_image_sized(&mut self, bitmap: &Image, x: f32, y: f32, width: f32, height: f32);

    /// Draws `text` with its baseline starting at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: &Font);

    /// Draws a small debug marker centered on `(x, y)`.
    fn draw_marker(&mut self, x: f32, y: f32, color: Color);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn resolution(&self) -> Resolution {
        (**self).resolution()
    }

    fn clear(&mut self) {
        (**self).clear();
    }

    fn save(&mut self) {
        (**self).save();
    }

    fn restore(&mut self) {
        (**self).restore();
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        (**self).scale(sx, sy);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        (**self).translate(dx, dy);
    }

    fn draw_image(&mut self, bitmap: &Image, x: f32, y: f32) {
        (**self).draw_image(bitmap, x, y);
    }

    fn draw_image_sized(&mut self, bitmap: &Image, x: f32, y: f32, width: f32, height: f32) {
        (**self).draw_image_sized(bitmap, x, y, width, height);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: &Font) {
        (**self).draw_text(text, x, y, font);
    }

    fn draw_marker(&mut self, x: f32, y: f32, color: Color) {
        (**self).draw_marker(x, y, color);
    }
}

impl Surface for Canvas {
    fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    fn clear(&mut self) {
        Canvas::clear(self);
    }

    fn save(&mut self) {
        Canvas::save(self);
    }

    fn restore(&mut self) {
        Canvas::restore(self);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        Canvas::scale(self, sx, sy);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        Canvas::translate(self, dx, dy);
    }

    fn draw_image(&mut self, bitmap: &Image, x: f32, y: f32) {
        Canvas::draw_image(self, bitmap, x, y);
    }

    fn draw_image_sized(&mut self, bitmap: &Image, x: f32, y: f32, width: f32, height: f32) {
        Canvas::draw_image_sized(self, bitmap, x, y, width, height);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: &Font) {
        // The software canvas only has mono fonts; the family is ignored. Like a fresh canvas
        // context, text is filled black.
        self.fill_text(text, x, y, FontSize(font.size_px), Color::BLACK);
    }

    fn draw_marker(&mut self, x: f32, y: f32, color: Color) {
        self.marker(x, y, color);
    }
}

/// A draw call recorded by a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    Save,
    Restore,
    Scale(f32, f32),
    Translate(f32, f32),
    Image {
        resolution: Resolution,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        font: Font,
    },
    Marker {
        x: f32,
        y: f32,
    },
}

/// A [`Surface`] that records draw calls instead of drawing.
///
/// Useful for headless runs and for checking what the compositor would draw.
#[derive(Debug, Clone)]
pub struct Recorder {
    resolution: Resolution,
    calls: Vec<DrawCall>,
}

impl Recorder {
    pub fn new(resolution: impl Into<Resolution>) -> Self {
        Self {
            resolution: resolution.into(),
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Returns and forgets all recorded calls.
    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Returns the image draws issued with an identity transform, i.e. outside of any
    /// `save`/`restore` pair.
    pub fn overlay_draws(&self) -> Vec<&DrawCall> {
        let mut depth = 0usize;
        let mut draws = Vec::new();
        for call in &self.calls {
            match call {
                DrawCall::Save => depth += 1,
                DrawCall::Restore => depth = depth.saturating_sub(1),
                DrawCall::Image { .. } if depth == 0 => draws.push(call),
                _ => {}
            }
        }
        draws
    }
}

impl Surface for Recorder {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn save(&mut self) {
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        self.calls.push(DrawCall::Restore);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.calls.push(DrawCall::Scale(sx, sy));
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.calls.push(DrawCall::Translate(dx, dy));
    }

    fn draw_image(&mut self, bitmap: &Image, x: f32, y: f32) {
        self.draw_image_sized(bitmap, x, y, bitmap.width() as f32, bitmap.height() as f32);
    }

    fn draw_image_sized(&mut self, bitmap: &Image, x: f32, y: f32, width: f32, height: f32) {
        self.calls.push(DrawCall::Image {
            resolution: bitmap.resolution(),
            x,
            y,
            width,
            height,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: &Font) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            font: font.clone(),
        });
    }

    fn draw_marker(&mut self, x: f32, y: f32, _color: Color) {
        self.calls.push(DrawCall::Marker { x, y });
    }
}
