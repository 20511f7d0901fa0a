//! Replays recorded poses over a still background and writes the composited frames as PNGs.
//!
//! Usage: `tryon <catalog.json> <poses.json> <background image> <output dir>`

use std::{env, fs, path::PathBuf};

use anyhow::{bail, Context};
use tryon::{
    config::Config,
    product::Catalog,
    session::{Frame, Session},
    source::{PoseSource, RecordedPoses},
    timer::FpsCounter,
};
use tryon_image::{Canvas, Image, Resolution};

fn main() -> anyhow::Result<()> {
    tryon::init_logger!();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let [catalog, poses, background, out_dir] = &args[..] else {
        bail!("usage: tryon <catalog.json> <poses.json> <background image> <output dir>");
    };

    let config = Config::from_env()?;
    let catalog = Catalog::load(catalog)?;
    let mut poses = RecordedPoses::load(poses)?;
    let background = Image::load(background)?;
    let out_dir = PathBuf::from(out_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create '{}'", out_dir.display()))?;

    let res = Resolution::new(config.frame_width, config.frame_height);
    let mut canvas = Canvas::new(res);
    let mut session = Session::new(config, catalog)?;
    // Recorded runs should not depend on how fast the loader thread is.
    session.wait_for_products();

    log::info!("replaying {} poses onto {res} frames", poses.len());

    let mut fps = FpsCounter::new("tryon");
    let mut index = 0;
    while let Some(pose) = poses.next_pose()? {
        let report = session.process_frame(&Frame::new(&background, Some(&pose)), &mut canvas);
        log::trace!("frame {index}: {report:?}");

        let path = out_dir.join(format!("frame_{index:04}.png"));
        canvas.image().save(&path)?;

        index += 1;
        fps.tick_with(session.timers());
    }

    log::info!("wrote {index} frames to '{}'", out_dir.display());
    Ok(())
}
