use std::{
    io,
    panic::resume_unwind,
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
};

use anyhow::Context;
use crossbeam::channel::{self, Receiver, TryRecvError};
use tryon_image::Image;

use super::Catalog;

/// Decodes product images on a background thread and scales them to their real size.
///
/// Results are delivered in completion order and picked up with [`Preloader::poll`], which never
/// blocks. Dropping the [`Preloader`] disconnects the thread, which exits after finishing the image
/// it is currently decoding, and joins it. If the thread has panicked, the panic is forwarded to
/// the thread dropping the [`Preloader`].
pub struct Preloader {
    recv: Option<Receiver<(usize, anyhow::Result<Image>)>>,
    handle: Option<JoinHandle<()>>,
    remaining: usize,
}

impl Preloader {
    /// Spawns the loader thread and starts decoding every image in `catalog`.
    pub fn spawn(catalog: &Catalog) -> io::Result<Self> {
        let jobs = catalog
            .iter()
            .map(|(spec, _)| (spec.url.clone(), spec.real_size()))
            .collect::<Vec<_>>();
        let remaining = jobs.len();
        let (sender, recv) = channel::unbounded();

        let handle = thread::Builder::new()
            .name("product loader".into())
            .spawn(move || {
                log::trace!("product loader starting ({} images)", jobs.len());
                for (index, (url, size)) in jobs.into_iter().enumerate() {
                    let result = load_url(&url).map(|image| image.resized(size));
                    if sender.send((index, result)).is_err() {
                        log::trace!("product loader disconnected");
                        return;
                    }
                }
                log::trace!("product loader exiting");
            })?;

        Ok(Self {
            recv: Some(recv),
            handle: Some(handle),
            remaining,
        })
    }

    /// Returns all results that arrived since the last call, without blocking.
    pub fn poll(&mut self) -> Vec<(usize, anyhow::Result<Image>)> {
        let Some(recv) = &self.recv else {
            return Vec::new();
        };

        let mut results = Vec::new();
        loop {
            match recv.try_recv() {
                Ok(result) => results.push(result),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.recv = None;
                    self.wait_for_exit();
                    break;
                }
            }
        }
        self.remaining = self.remaining.saturating_sub(results.len());
        results
    }

    /// Blocks until every image has been delivered and returns all outstanding results.
    pub fn wait(&mut self) -> Vec<(usize, anyhow::Result<Image>)> {
        let results = match self.recv.take() {
            Some(recv) => recv.iter().collect::<Vec<_>>(),
            None => Vec::new(),
        };
        self.wait_for_exit();
        self.remaining = 0;
        results
    }

    /// Returns the number of images that have not been delivered yet.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn wait_for_exit(&mut self) {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => {}
                Err(payload) => {
                    if !thread::panicking() {
                        resume_unwind(payload);
                    }
                }
            }
        }
    }
}

impl Drop for Preloader {
    fn drop(&mut self) {
        // Disconnect the channel to make the thread exit.
        drop(self.recv.take());

        self.wait_for_exit();
    }
}

/// Maps a catalog URL to a file system path. Only local paths and `file://` URLs are supported.
fn url_to_path(url: &str) -> anyhow::Result<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if let Some((scheme, _)) = url.split_once("://") {
        anyhow::bail!("unsupported URL scheme '{scheme}' in '{url}'");
    }
    Ok(Path::new(url).to_path_buf())
}

fn load_url(url: &str) -> anyhow::Result<Image> {
    let path = url_to_path(url)?;
    let data = std::fs::read(&path).with_context(|| format!("failed to read '{}'", path.display()))?;
    Image::decode(&data).with_context(|| format!("failed to decode '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tryon_image::{Color, Resolution};

    use crate::{
        product::{ProductKind, ProductSpec},
        test::{write_bytes, write_png},
    };

    use super::*;

    #[test]
    fn urls() {
        assert_eq!(url_to_path("a/b.png").unwrap(), PathBuf::from("a/b.png"));
        assert_eq!(
            url_to_path("file:///srv/b.png").unwrap(),
            PathBuf::from("/srv/b.png")
        );
        assert!(url_to_path("https://example.com/b.png").is_err());
    }

    #[test]
    fn loads_all_images() {
        let dir = TempDir::new().unwrap();
        let good = write_png(&dir, "good.png", &Image::filled((6, 6), Color::GREEN));
        let bad = write_bytes(&dir, "bad.png", b"not a png");

        let catalog = Catalog::new(vec![
            ProductSpec::new(good.display().to_string(), ProductKind::Stud, 3, 3),
            ProductSpec::new(bad.display().to_string(), ProductKind::Stud, 3, 3),
            ProductSpec::new(
                dir.path().join("missing.png").display().to_string(),
                ProductKind::Ring,
                3,
                3,
            ),
        ])
        .unwrap();

        let mut loader = Preloader::spawn(&catalog).unwrap();
        assert_eq!(loader.remaining(), 3);
        let mut results = loader.wait();
        assert_eq!(loader.remaining(), 0);
        results.sort_by_key(|(index, _)| *index);

        assert_eq!(results.len(), 3);
        let good = results[0].1.as_ref().unwrap();
        assert_eq!(good.get(1, 1), Color::GREEN);
        assert_eq!(good.resolution(), Resolution::new(3, 3));
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_err());

        assert!(loader.poll().is_empty());
    }

    #[test]
    fn drop_while_loading() {
        let catalog = Catalog::new(vec![
            ProductSpec::new("does/not/exist.png", ProductKind::Earring, 1, 1);
            16
        ])
        .unwrap();
        let loader = Preloader::spawn(&catalog).unwrap();
        drop(loader);
    }
}
