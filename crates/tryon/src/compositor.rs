//! Per-frame compositing of the mirrored video frame and product overlays.

use tryon_image::{Color, Image};

use crate::{
    body::{self, Anchor, DerivedAnchor, Point, Pose},
    config::Config,
    product::{ProductImage, ProductKind},
    smoother::PlacementSmoother,
    surface::{Font, Surface},
};

/// Text shown when the subject should step back from the camera.
pub const MOVE_FARTHER_TEXT: &str = "Please Move Farther";

/// Font of [`MOVE_FARTHER_TEXT`].
pub const HINT_FONT: Font = Font::new(30, "Arial");

/// What the compositor did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No pose, or the pose scored below the minimum pose confidence. Only the video was drawn.
    Skip,
    /// The video and all eligible overlays were drawn.
    Render,
}

/// Summary of one composited frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub state: FrameState,
    /// Number of product bitmaps drawn.
    pub overlays_drawn: usize,
    /// Whether the "move farther" hint was drawn.
    pub hint_drawn: bool,
}

/// Returns the offset from a smoothed anchor to the top left corner of a product bitmap.
///
/// Studs are nudged 3px towards the face; the other kinds are centered on
/// their anchor as described on [`ProductKind`].
pub fn placement_offset(kind: ProductKind, real_width: f32, real_height: f32) -> (f32, f32) {
    match kind {
        ProductKind::Stud => (-(real_width / 2.0 - 3.0), 10.0),
        ProductKind::Earring => (-real_width / 2.0, 10.0),
        ProductKind::Necklace => (-real_width / 2.0, 0.0),
        ProductKind::Bracelet => (-real_width / 2.0, -real_height / 2.0),
        ProductKind::Ring => (0.0, 0.0),
    }
}

/// Draws frames: mirrored video first, then product overlays at their smoothed anchors.
///
/// The compositor itself is stateless across frames; placement history lives in the
/// [`PlacementSmoother`] passed to [`Compositor::composite`].
#[derive(Debug, Clone)]
pub struct Compositor {
    min_pose_confidence: f32,
    min_part_confidence: f32,
    draw_keypoints: bool,
}

impl Compositor {
    pub fn new(config: &Config) -> Self {
        Self {
            min_pose_confidence: config.min_pose_confidence,
            min_part_confidence: config.min_part_confidence,
            draw_keypoints: config.draw_keypoints,
        }
    }

    /// Decides whether `pose` gets decorated this frame.
    pub fn state(&self, pose: Option<&Pose>) -> FrameState {
        match pose {
            Some(pose) if pose.score() >= self.min_pose_confidence => FrameState::Render,
            _ => FrameState::Skip,
        }
    }

    /// Clears `surface` and draws `video` horizontally mirrored across the whole surface.
    pub fn draw_video<S: Surface>(&self, surface: &mut S, video: &Image) {
        let res = surface.resolution();
        let (width, height) = (res.width() as f32, res.height() as f32);

        surface.clear();
        surface.save();
        surface.scale(-1.0, 1.0);
        surface.translate(-width, 0.0);
        surface.draw_image_sized(video, 0.0, 0.0, width, height);
        surface.restore();
    }

    /// Composites a complete frame.
    pub fn composite<'a, S, I>(
        &self,
        surface: &mut S,
        video: &Image,
        pose: Option<&Pose>,
        move_farther: bool,
        products: I,
        smoother: &mut PlacementSmoother,
    ) -> FrameReport
    where
        S: Surface,
        I: IntoIterator<Item = &'a ProductImage>,
    {
        self.draw_video(surface, video);

        let pose = match (self.state(pose), pose) {
            (FrameState::Render, Some(pose)) => pose,
            _ => {
                log::trace!(
                    "skipping frame (pose score {:?})",
                    pose.map(|pose| pose.score())
                );
                return FrameReport {
                    state: FrameState::Skip,
                    overlays_drawn: 0,
                    hint_drawn: false,
                };
            }
        };

        let overlays_drawn = products
            .into_iter()
            .map(|product| self.draw_product(surface, pose, product, smoother))
            .sum();

        if self.draw_keypoints {
            self.draw_markers(surface, pose);
        }

        if move_farther {
            let res = surface.resolution();
            let x = (res.height() as f32 / 2.0).round() - 100.0;
            let y = (res.width() as f32 / 2.0).round();
            surface.draw_text(MOVE_FARTHER_TEXT, x, y, &HINT_FONT);
        }

        FrameReport {
            state: FrameState::Render,
            overlays_drawn,
            hint_drawn: move_farther,
        }
    }

    /// Resolves `anchor` and returns it if it scores above the minimum part confidence.
    fn eligible(&self, pose: &Pose, anchor: Anchor) -> Option<DerivedAnchor> {
        let resolved = body::resolve(pose, anchor)?;
        if resolved.score > self.min_part_confidence {
            Some(resolved)
        } else {
            log::trace!(
                "{anchor} below part confidence ({} <= {})",
                resolved.score,
                self.min_part_confidence
            );
            None
        }
    }

    /// Draws `product` at every eligible placement and returns the number of bitmaps drawn.
    fn draw_product<S: Surface>(
        &self,
        surface: &mut S,
        pose: &Pose,
        product: &ProductImage,
        smoother: &mut PlacementSmoother,
    ) -> usize {
        let kind = product.kind();
        let (dx, dy) = placement_offset(kind, product.real_width(), product.real_height());

        let draw_at = |surface: &mut S, position: Point| {
            let target = position.offset(dx, dy);
            surface.draw_image(product.bitmap(), target.x, target.y);
        };

        match kind {
            ProductKind::Ring => 0,
            ProductKind::Necklace => {
                let (Some(left), Some(right)) = (
                    self.eligible(pose, Anchor::NeckLeft),
                    self.eligible(pose, Anchor::NeckRight),
                ) else {
                    return 0;
                };
                let left = smoother.commit(left.anchor, left.position);
                let right = smoother.commit(right.anchor, right.position);
                draw_at(surface, left.midpoint(right));
                1
            }
            ProductKind::Stud | ProductKind::Earring | ProductKind::Bracelet => {
                let mut drawn = 0;
                for &anchor in kind.anchors() {
                    if let Some(resolved) = self.eligible(pose, anchor) {
                        let position = smoother.commit(anchor, resolved.position);
                        draw_at(surface, position);
                        drawn += 1;
                    }
                }
                drawn
            }
        }
    }

    fn draw_markers<S: Surface>(&self, surface: &mut S, pose: &Pose) {
        for kp in pose.top_points() {
            if kp.score() >= self.min_part_confidence {
                surface.draw_marker(kp.x(), kp.y(), Color::RED);
            }
        }
        for anchor in body::derive_anchors(pose.top_points()) {
            if anchor.score >= self.min_part_confidence {
                surface.draw_marker(anchor.position.x, anchor.position.y, Color::YELLOW);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use tryon_image::Canvas;

    use crate::{
        body::{BodyPart, Keypoint},
        product::{Catalog, ProductSet, ProductSpec, ProductState},
        surface::{DrawCall, Recorder},
        test::frontal_pose,
    };

    use super::*;

    fn product(kind: ProductKind, width: u32, height: u32) -> ProductImage {
        ProductImage::new(
            ProductSpec::new("test.png", kind, width, height),
            kind,
            Image::filled((width, height), Color::YELLOW),
        )
    }

    fn video() -> Image {
        Image::filled((48, 64), Color::BLUE)
    }

    fn image_positions(recorder: &Recorder) -> Vec<(f32, f32)> {
        recorder
            .overlay_draws()
            .into_iter()
            .filter_map(|call| match call {
                DrawCall::Image { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn video_is_mirrored() {
        let compositor = Compositor::new(&Config::default());
        let mut recorder = Recorder::new((480, 640));
        compositor.draw_video(&mut recorder, &video());
        assert_eq!(
            recorder.calls(),
            &[
                DrawCall::Clear,
                DrawCall::Save,
                DrawCall::Scale(-1.0, 1.0),
                DrawCall::Translate(-480.0, 0.0),
                DrawCall::Image {
                    resolution: (48, 64).into(),
                    x: 0.0,
                    y: 0.0,
                    width: 480.0,
                    height: 640.0,
                },
                DrawCall::Restore,
            ]
        );
    }

    #[test]
    fn low_pose_score_skips_overlays() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let mut recorder = Recorder::new((480, 640));
        let products = [product(ProductKind::Stud, 20, 20)];

        let report = compositor.composite(
            &mut recorder,
            &video(),
            Some(&frontal_pose(0.05, 0.9)),
            true,
            &products,
            &mut smoother,
        );

        assert_eq!(report.state, FrameState::Skip);
        assert_eq!(report.overlays_drawn, 0);
        assert!(!report.hint_drawn);
        assert!(recorder.overlay_draws().is_empty());
        assert_eq!(recorder.calls().len(), 6);
        assert!(smoother.is_empty());

        let report = compositor.composite(
            &mut recorder,
            &video(),
            None,
            false,
            &products,
            &mut smoother,
        );
        assert_eq!(report.state, FrameState::Skip);
    }

    #[test]
    fn pose_threshold_is_inclusive() {
        let compositor = Compositor::new(&Config::default());
        assert_eq!(
            compositor.state(Some(&frontal_pose(0.1, 0.9))),
            FrameState::Render
        );
        assert_eq!(compositor.state(None), FrameState::Skip);
    }

    #[test]
    fn stud_placement() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let mut recorder = Recorder::new((480, 640));
        let products = [product(ProductKind::Stud, 20, 20)];

        let report = compositor.composite(
            &mut recorder,
            &video(),
            Some(&frontal_pose(0.9, 0.9)),
            false,
            &products,
            &mut smoother,
        );

        assert_eq!(report.state, FrameState::Render);
        assert_eq!(report.overlays_drawn, 2);
        let positions = image_positions(&recorder);
        assert_eq!(positions.len(), 2);
        // Left ear at (200, 150): x - (20 / 2 - 3), y + 10
        assert_relative_eq!(positions[0].0, 193.0);
        assert_relative_eq!(positions[0].1, 160.0);
        // Right ear at (280, 150)
        assert_relative_eq!(positions[1].0, 273.0);
        assert_relative_eq!(positions[1].1, 160.0);

        assert_eq!(smoother.get(Anchor::LeftEar), Some(Point::new(200.0, 150.0)));
    }

    #[test]
    fn low_confidence_ear_is_skipped_but_keeps_cache() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let products = [product(ProductKind::Stud, 20, 20)];

        let mut recorder = Recorder::new((480, 640));
        compositor.composite(
            &mut recorder,
            &video(),
            Some(&frontal_pose(0.9, 0.9)),
            false,
            &products,
            &mut smoother,
        );

        // Exactly at the part threshold is not enough.
        let mut recorder = Recorder::new((480, 640));
        let report = compositor.composite(
            &mut recorder,
            &video(),
            Some(&frontal_pose(0.9, 0.5)),
            false,
            &products,
            &mut smoother,
        );
        assert_eq!(report.state, FrameState::Render);
        assert_eq!(report.overlays_drawn, 0);
        assert_eq!(smoother.get(Anchor::LeftEar), Some(Point::new(200.0, 150.0)));
    }

    #[test]
    fn jitter_is_suppressed_across_frames() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let products = [product(ProductKind::Stud, 20, 20)];

        let first = frontal_pose(0.9, 0.9);
        let jittered = Pose::new(
            0.9,
            first
                .keypoints()
                .iter()
                .map(|kp| Keypoint::new(kp.part(), kp.score(), kp.position().offset(4.0, -6.0)))
                .collect(),
        );

        let mut positions = Vec::new();
        for pose in [&first, &jittered] {
            let mut recorder = Recorder::new((480, 640));
            compositor.composite(&mut recorder, &video(), Some(pose), false, &products, &mut smoother);
            positions.push(image_positions(&recorder));
        }
        assert_eq!(positions[0], positions[1]);
    }

    #[test]
    fn necklace_and_drop_earrings() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let mut recorder = Recorder::new((480, 640));
        let products = [
            product(ProductKind::Necklace, 100, 40),
            product(ProductKind::Earring, 10, 30),
        ];

        let report = compositor.composite(
            &mut recorder,
            &video(),
            Some(&frontal_pose(0.9, 0.9)),
            false,
            &products,
            &mut smoother,
        );
        assert_eq!(report.overlays_drawn, 3);

        let positions = image_positions(&recorder);
        // Necks: (200, 260) and (280, 260), midpoint (240, 260).
        assert_relative_eq!(positions[0].0, 190.0);
        assert_relative_eq!(positions[0].1, 260.0);
        assert_relative_eq!(positions[1].0, 195.0);
        assert_relative_eq!(positions[1].1, 160.0);
        assert_relative_eq!(positions[2].0, 275.0);
    }

    #[test]
    fn necklace_needs_both_necks() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let mut recorder = Recorder::new((480, 640));
        let pose = frontal_pose(0.9, 0.9);
        let pose = Pose::new(
            0.9,
            pose.keypoints()
                .iter()
                .filter(|kp| kp.part() != BodyPart::RightShoulder)
                .copied()
                .collect(),
        );

        let report = compositor.composite(
            &mut recorder,
            &video(),
            Some(&pose),
            false,
            &[product(ProductKind::Necklace, 100, 40)],
            &mut smoother,
        );
        assert_eq!(report.overlays_drawn, 0);
        assert!(smoother.is_empty());
    }

    #[test]
    fn bracelets_and_rings() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let mut recorder = Recorder::new((480, 640));
        let products = [
            product(ProductKind::Bracelet, 30, 10),
            product(ProductKind::Ring, 8, 8),
        ];

        let report = compositor.composite(
            &mut recorder,
            &video(),
            Some(&frontal_pose(0.9, 0.9)),
            false,
            &products,
            &mut smoother,
        );
        assert_eq!(report.overlays_drawn, 2);
        assert_eq!(image_positions(&recorder)[0], (105.0, 505.0));
    }

    #[test]
    fn move_farther_hint() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let mut recorder = Recorder::new((480, 640));
        let no_products: [ProductImage; 0] = [];

        let report = compositor.composite(
            &mut recorder,
            &video(),
            Some(&frontal_pose(0.9, 0.9)),
            true,
            &no_products,
            &mut smoother,
        );
        assert!(report.hint_drawn);
        assert_eq!(
            recorder.calls().last(),
            Some(&DrawCall::Text {
                text: MOVE_FARTHER_TEXT.to_string(),
                x: 220.0,
                y: 240.0,
                font: HINT_FONT,
            })
        );
    }

    #[test]
    fn keypoint_markers() {
        let config = Config {
            draw_keypoints: true,
            ..Config::default()
        };
        let compositor = Compositor::new(&config);
        let mut smoother = PlacementSmoother::default();
        let mut recorder = Recorder::new((480, 640));
        let no_products: [ProductImage; 0] = [];
        compositor.composite(
            &mut recorder,
            &video(),
            Some(&frontal_pose(0.9, 0.9)),
            false,
            &no_products,
            &mut smoother,
        );
        let markers = recorder
            .calls()
            .iter()
            .filter(|call| matches!(call, DrawCall::Marker { .. }))
            .count();
        // 7 top points and 2 neck anchors
        assert_eq!(markers, 9);
    }

    #[test]
    fn renders_onto_canvas() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let mut canvas = Canvas::new((480, 640));
        let products = [product(ProductKind::Stud, 20, 20)];

        compositor.composite(
            &mut canvas,
            &video(),
            Some(&frontal_pose(0.9, 0.9)),
            false,
            &products,
            &mut smoother,
        );

        let image = canvas.image();
        assert_eq!(image.get(0, 0), Color::BLUE);
        assert_eq!(image.get(200, 170), Color::YELLOW);
        assert_eq!(image.get(192, 170), Color::BLUE);
    }

    #[test]
    fn loading_products_are_skipped() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let mut set = ProductSet::new(
            Catalog::new(vec![
                ProductSpec::new("stud.png", ProductKind::Stud, 20, 20),
                ProductSpec::new("bangle.png", ProductKind::Bracelet, 30, 10),
            ])
            .unwrap(),
        );
        set.resolve(0, Ok(Image::filled((20, 20), Color::YELLOW)));
        assert!(matches!(set.states()[1], ProductState::Loading));

        let pose = frontal_pose(0.9, 0.9);
        let mut recorder = Recorder::new((480, 640));
        let report = compositor.composite(
            &mut recorder,
            &video(),
            Some(&pose),
            false,
            set.ready(),
            &mut smoother,
        );
        assert_eq!(report.overlays_drawn, 2);
        assert_eq!(image_positions(&recorder), [(193.0, 160.0), (273.0, 160.0)]);

        set.resolve(1, Ok(Image::filled((30, 10), Color::GREEN)));
        let mut recorder = Recorder::new((480, 640));
        let report = compositor.composite(
            &mut recorder,
            &video(),
            Some(&pose),
            false,
            set.ready(),
            &mut smoother,
        );
        assert_eq!(report.overlays_drawn, 4);
        assert_eq!(
            image_positions(&recorder),
            [(193.0, 160.0), (273.0, 160.0), (105.0, 505.0), (345.0, 505.0)]
        );
    }

    #[test]
    fn hint_is_black_on_canvas() {
        let compositor = Compositor::new(&Config::default());
        let mut smoother = PlacementSmoother::default();
        let mut canvas = Canvas::new((480, 640));
        let no_products: [ProductImage; 0] = [];

        compositor.composite(
            &mut canvas,
            &video(),
            Some(&frontal_pose(0.9, 0.9)),
            true,
            &no_products,
            &mut smoother,
        );

        // Baseline starts at (220, 240); glyphs sit above it.
        let image = canvas.image();
        let black = (215..245)
            .flat_map(|y| (220..420).map(move |x| (x, y)))
            .filter(|&(x, y)| image.get(x, y) == Color::BLACK)
            .count();
        assert!(black > 0);
        assert_eq!(image.get(0, 0), Color::BLUE);
    }
}
