use approx::assert_relative_eq;
use nalgebra::Point2;

use super::*;
use Color as C;

fn mkimage<const W: usize, const H: usize>(data: [[Color; W]; H]) -> Image {
    let data = data
        .into_iter()
        .flat_map(|row| row.into_iter())
        .flat_map(|col| col.0)
        .collect::<Vec<_>>();
    Image::from_rgba8(Resolution::new(W as u32, H as u32), &data)
}

#[test]
fn draw_image_at_offset() {
    let source = mkimage([[C::RED, C::GREEN]]);
    let mut canvas = Canvas::new((4, 2));
    canvas.draw_image(&source, 1.0, 1.0);

    let image = canvas.image();
    assert_eq!(image.get(0, 1), C::NONE);
    assert_eq!(image.get(1, 1), C::RED);
    assert_eq!(image.get(2, 1), C::GREEN);
    assert_eq!(image.get(3, 1), C::NONE);
    assert_eq!(image.get(1, 0), C::NONE);
}

#[test]
fn mirrored_draw() {
    let frame = mkimage([[C::RED, C::GREEN, C::BLUE]]);
    let mut canvas = Canvas::new((3, 1));
    canvas.save();
    canvas.scale(-1.0, 1.0);
    canvas.translate(-3.0, 0.0);
    canvas.draw_image_sized(&frame, 0.0, 0.0, 3.0, 1.0);
    canvas.restore();

    let image = canvas.image();
    assert_eq!(image.get(0, 0), C::BLUE);
    assert_eq!(image.get(1, 0), C::GREEN);
    assert_eq!(image.get(2, 0), C::RED);

    // `restore` brings back the identity transform.
    let p = canvas.transform().transform_point(&Point2::new(1.0, 0.0));
    assert_relative_eq!(p.x, 1.0);
}

#[test]
fn restore_on_empty_stack_is_noop() {
    let mut canvas = Canvas::new((1, 1));
    canvas.translate(5.0, 0.0);
    canvas.restore();
    let p = canvas.transform().transform_point(&Point2::new(0.0, 0.0));
    assert_relative_eq!(p.x, 5.0);
}

#[test]
fn clipped_draw() {
    let source = Image::filled((4, 4), C::YELLOW);
    let mut canvas = Canvas::new((2, 2));
    canvas.draw_image(&source, -3.0, -3.0);
    assert_eq!(canvas.image().get(0, 0), C::YELLOW);
    assert_eq!(canvas.image().get(1, 0), C::NONE);
    assert_eq!(canvas.image().get(0, 1), C::NONE);
}

#[test]
fn alpha_blending() {
    let mut canvas = Canvas::new((1, 1));
    canvas.draw_image(&Image::filled((1, 1), C::BLUE), 0.0, 0.0);
    canvas.draw_image(&Image::filled((1, 1), C::RED.with_alpha(0)), 0.0, 0.0);
    assert_eq!(canvas.image().get(0, 0), C::BLUE);

    canvas.draw_image(&Image::filled((1, 1), C::RED.with_alpha(128)), 0.0, 0.0);
    let mixed = canvas.image().get(0, 0);
    assert_eq!(mixed.a(), 255);
    assert!(mixed.r() > 0 && mixed.b() > 0);

    canvas.set_blend_mode(BlendMode::Overwrite);
    canvas.draw_image(&Image::filled((1, 1), C::NONE), 0.0, 0.0);
    assert_eq!(canvas.image().get(0, 0), C::NONE);
}

#[test]
fn clear_resets_pixels() {
    let mut canvas = Canvas::new((2, 2));
    canvas.draw_image(&Image::filled((2, 2), C::WHITE), 0.0, 0.0);
    canvas.clear();
    assert!(canvas.image().data().iter().all(|&b| b == 0));
}

#[test]
fn text_is_rendered() {
    let mut canvas = Canvas::new((120, 40));
    canvas.fill_text("Move", 2.0, 30.0, FontSize(30), C::WHITE);
    assert!(canvas.image().data().chunks(4).any(|px| px == [255, 255, 255, 255]));
}

#[test]
fn resize() {
    let image = Image::filled((8, 4), C::CYAN);
    let resized = image.resized((2, 3));
    assert_eq!(resized.resolution(), Resolution::new(2, 3));
    assert_eq!(resized.get(1, 2), C::CYAN);
}

#[test]
fn unsupported_extension() {
    let err = Image::load("product.gif").unwrap_err();
    assert!(err.to_string().contains("supported extensions"));
}
