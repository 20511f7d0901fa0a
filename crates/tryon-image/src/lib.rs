//! CPU image handling for the try-on compositor.
//!
//! # Overview
//!
//! ## Images
//!
//! [`Image`] is an owned 8-bit sRGBA image. Product bitmaps and video frames are both [`Image`]s.
//! Images can be loaded from PNG or JPEG files, decoded from memory, and resized to the physical
//! size a product should be drawn at.
//!
//! ## Canvas
//!
//! [`Canvas`] is a 2D drawing surface with the same model as an HTML canvas context: it has a
//! transform stack (`save`/`restore`/`scale`/`translate`), draws images with alpha blending and
//! draws text using the [embedded-graphics] mono fonts.
//!
//! [embedded-graphics]: https://docs.rs/embedded-graphics

mod blend;
mod canvas;
mod color;
mod image;
mod resolution;

#[cfg(test)]
mod tests;

pub use blend::*;
pub use canvas::{Canvas, FontSize};
pub use color::Color;
pub use image::*;
pub use resolution::Resolution;
