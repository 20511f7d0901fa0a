use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii, MonoFont, MonoTextStyle},
    prelude::*,
    primitives::Rectangle,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use nalgebra::{Matrix3, Point2, Vector2};

use crate::{BlendMode, Color, Image, Resolution};

/// Pixel height of a font, as in the `30px` of a CSS font shorthand.
///
/// The canvas only has the fixed-size ASCII mono fonts of embedded-graphics available, so the
/// largest font not taller than the requested size is used (and the smallest one if none fit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSize(pub u32);

impl FontSize {
    fn mono_font(self) -> &'static MonoFont<'static> {
        match self.0 {
            0..=12 => &ascii::FONT_6X10,
            13..=14 => &ascii::FONT_7X13,
            15..=19 => &ascii::FONT_9X15,
            _ => &ascii::FONT_10X20,
        }
    }
}

/// A software 2D drawing surface backed by an [`Image`].
///
/// Coordinates passed to drawing methods are in *user space* and are mapped to pixels by the
/// current transform, like in an HTML canvas context.
pub struct Canvas {
    target: Image,
    transform: Matrix3<f32>,
    stack: Vec<Matrix3<f32>>,
    blend_mode: BlendMode,
}

impl Canvas {
    /// Creates a transparent canvas of the given size with an identity transform.
    pub fn new(res: impl Into<Resolution>) -> Self {
        Self {
            target: Image::new(res),
            transform: Matrix3::identity(),
            stack: Vec::new(),
            blend_mode: BlendMode::Alpha,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.target.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.target.height()
    }

    /// Returns the pixels drawn so far.
    pub fn image(&self) -> &Image {
        &self.target
    }

    /// Sets the [`BlendMode`] used by subsequent image draws. Defaults to [`BlendMode::Alpha`].
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    /// Returns the current user-space to pixel transform.
    pub fn transform(&self) -> Matrix3<f32> {
        self.transform
    }

    /// Resets every pixel to transparent black.
    ///
    /// Like `clearRect` on a full canvas, this ignores the transform.
    pub fn clear(&mut self) {
        self.target.clear(Color::NONE);
    }

    /// Pushes the current transform onto the state stack.
    pub fn save(&mut self) {
        self.stack.push(self.transform);
    }

    /// Pops the last saved transform. Does nothing if the stack is empty.
    pub fn restore(&mut self) {
        if let Some(transform) = self.stack.pop() {
            self.transform = transform;
        }
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform *= Matrix3::new_nonuniform_scaling(&Vector2::new(sx, sy));
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.transform *= Matrix3::new_translation(&Vector2::new(dx, dy));
    }

    /// Draws `image` at its natural size with its top left corner at `(x, y)`.
    pub fn draw_image(&mut self, image: &Image, x: f32, y: f32) {
        self.draw_image_sized(image, x, y, image.width() as f32, image.height() as f32);
    }

    /// Draws `image` stretched to `width x height` with its top left corner at `(x, y)`.
    pub fn draw_image_sized(&mut self, image: &Image, x: f32, y: f32, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let Some(inverse) = self.transform.try_inverse() else {
            log::trace!("singular canvas transform, skipping image draw");
            return;
        };

        let corners = [
            (x, y),
            (x + width, y),
            (x, y + height),
            (x + width, y + height),
        ]
        .map(|(x, y)| self.transform.transform_point(&Point2::new(x, y)));
        let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil().max(0.0) as u32).min(self.width());
        let y1 = (max_y.ceil().max(0.0) as u32).min(self.height());

        for dest_y in y0..y1 {
            for dest_x in x0..x1 {
                let center = Point2::new(dest_x as f32 + 0.5, dest_y as f32 + 0.5);
                let user = inverse.transform_point(&center);
                let (u, v) = ((user.x - x) / width, (user.y - y) / height);
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }

                let src_x = ((u * image.width() as f32) as u32).min(image.width() - 1);
                let src_y = ((v * image.height() as f32) as u32).min(image.height() - 1);
                let src = image.get(src_x, src_y);
                let dest = self.target.get(dest_x, dest_y);
                self.target
                    .set(dest_x, dest_y, self.blend_mode.apply(dest, src));
            }
        }
    }

    /// Draws a line of text with its left end on the alphabetic baseline at `(x, y)`.
    ///
    /// Only the anchor point is transformed; glyphs are always drawn upright and unmirrored.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32, size: FontSize, color: Color) {
        let anchor = self.transform.transform_point(&Point2::new(x, y));
        let character_style = MonoTextStyle::new(size.mono_font(), color);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Left)
            .baseline(Baseline::Alphabetic)
            .build();
        match Text::with_text_style(
            text,
            Point::new(anchor.x.round() as i32, anchor.y.round() as i32),
            character_style,
            text_style,
        )
        .draw(&mut Target(&mut self.target))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }

    /// Draws a small X-shaped marker centered on `(x, y)`.
    pub fn marker(&mut self, x: f32, y: f32, color: Color) {
        let center = self.transform.transform_point(&Point2::new(x, y));
        let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);
        let offset = 2;
        let pixels = (-offset..=offset)
            .zip(-offset..=offset)
            .chain((-offset..=offset).rev().zip(-offset..=offset))
            .map(|(xoff, yoff)| Pixel(Point::new(cx + xoff, cy + yoff), color));
        match Target(&mut self.target).draw_iter(pixels) {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

struct Target<'a>(&'a mut Image);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        let (width, height) = (self.0.width(), self.0.height());

        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size { width, height },
        }
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && (point.x as u32) < self.0.width()
                && point.y >= 0
                && (point.y as u32) < self.0.height()
            {
                let dest = self.0.get(point.x as u32, point.y as u32);
                self.0
                    .set(point.x as u32, point.y as u32, BlendMode::Alpha.apply(dest, color));
            }
        }

        Ok(())
    }
}
