//! Per-session state and the pull-based frame entry point.

use tryon_image::Image;

use crate::{
    body::Pose,
    compositor::{Compositor, FrameReport},
    config::Config,
    product::{Catalog, Preloader, ProductSet},
    smoother::PlacementSmoother,
    surface::Surface,
    timer::Timer,
};

/// Inputs of one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// The camera frame, unmirrored.
    pub video: &'a Image,
    /// The pose estimated for this frame, if any.
    pub pose: Option<&'a Pose>,
    /// Whether to show the "move farther" hint.
    pub move_farther: bool,
}

impl<'a> Frame<'a> {
    pub fn new(video: &'a Image, pose: Option<&'a Pose>) -> Self {
        Self {
            video,
            pose,
            move_farther: false,
        }
    }

    pub fn with_move_farther(self, move_farther: bool) -> Self {
        Self {
            move_farther,
            ..self
        }
    }
}

/// A try-on session.
///
/// Owns everything that lives across frames: the placement history, the product images and the
/// loader decoding them. The harness calls [`Session::process_frame`] once per frame and stops the
/// session by no longer calling it. Dropping the session joins the loader thread.
pub struct Session {
    config: Config,
    compositor: Compositor,
    smoother: PlacementSmoother,
    products: ProductSet,
    loader: Preloader,
    t_load: Timer,
    t_composite: Timer,
}

impl Session {
    /// Creates a session and starts decoding the catalog's product images in the background.
    pub fn new(config: Config, catalog: Catalog) -> anyhow::Result<Self> {
        let loader = Preloader::spawn(&catalog)?;
        log::debug!(
            "starting session with {} products at {}x{}",
            catalog.len(),
            config.frame_width,
            config.frame_height
        );

        Ok(Self {
            compositor: Compositor::new(&config),
            smoother: PlacementSmoother::new(config.smoothing),
            products: ProductSet::new(catalog),
            loader,
            config,
            t_load: Timer::new("load"),
            t_composite: Timer::new("composite"),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn products(&self) -> &ProductSet {
        &self.products
    }

    pub fn smoother(&self) -> &PlacementSmoother {
        &self.smoother
    }

    /// Blocks until every product image has been decoded or has failed.
    pub fn wait_for_products(&mut self) {
        for (index, result) in self.loader.wait() {
            self.products.resolve(index, result);
        }
    }

    /// Processes one frame, drawing it onto `surface`.
    ///
    /// Product images that arrived since the previous frame become eligible immediately.
    pub fn process_frame<S: Surface>(&mut self, frame: &Frame<'_>, surface: &mut S) -> FrameReport {
        self.t_load.time(|| {
            for (index, result) in self.loader.poll() {
                self.products.resolve(index, result);
            }
        });

        let _guard = self.t_composite.start();
        self.compositor.composite(
            surface,
            frame.video,
            frame.pose,
            frame.move_farther,
            self.products.ready(),
            &mut self.smoother,
        )
    }

    /// Returns profiling timers for logging by the harness.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_load, &self.t_composite].into_iter()
    }
}
