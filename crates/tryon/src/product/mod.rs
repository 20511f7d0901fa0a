//! Product catalog and decoded product images.
//!
//! A [`Catalog`] lists the products to try on. Its images are decoded off the frame loop by a
//! [`Preloader`] and collected in a [`ProductSet`], where each product is either still loading,
//! ready to draw, or permanently failed.

mod loader;

use std::{fmt, fs, path::Path, str::FromStr};

use anyhow::Context;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tryon_image::{Image, Resolution};

use crate::body::Anchor;

pub use loader::Preloader;

/// Placement category of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductKind {
    /// Earring studs, placed on both ear lobes.
    Stud,
    /// Drop earrings hanging from both ear lobes.
    Earring,
    /// Necklaces, centered between the neck anchors.
    Necklace,
    /// Bracelets, placed on both wrists.
    Bracelet,
    /// Rings. The body taxonomy has no finger keypoints, so rings are never placed.
    Ring,
}

impl ProductKind {
    /// Returns the anchors a product of this kind is drawn at.
    ///
    /// For [`ProductKind::Necklace`] both anchors are required for a single placement; for every
    /// other kind each anchor is an independent placement.
    pub fn anchors(self) -> &'static [Anchor] {
        match self {
            ProductKind::Stud | ProductKind::Earring => &[Anchor::LeftEar, Anchor::RightEar],
            ProductKind::Necklace => &[Anchor::NeckLeft, Anchor::NeckRight],
            ProductKind::Bracelet => &[Anchor::LeftWrist, Anchor::RightWrist],
            ProductKind::Ring => &[],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProductKind::Stud => "stud",
            ProductKind::Earring => "earring",
            ProductKind::Necklace => "necklace",
            ProductKind::Bracelet => "bracelet",
            ProductKind::Ring => "ring",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProductKind {
    type Err = anyhow::Error;

    /// Parses a catalog type tag.
    ///
    /// Tags are matched by substring, most specific first, so `earring-stud` is a
    /// [`ProductKind::Stud`] and `earring-drop` is a [`ProductKind::Earring`].
    fn from_str(tag: &str) -> anyhow::Result<Self> {
        const ORDER: [ProductKind; 5] = [
            ProductKind::Stud,
            ProductKind::Earring,
            ProductKind::Necklace,
            ProductKind::Bracelet,
            ProductKind::Ring,
        ];

        let lower = tag.to_ascii_lowercase();
        ORDER
            .into_iter()
            .find(|kind| lower.contains(kind.name()))
            .with_context(|| {
                format!(
                    "unknown product type '{tag}' (expected one of {})",
                    ORDER.iter().join(", ")
                )
            })
    }
}

/// A catalog entry describing one product image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpec {
    /// Path or `file://` URL of the product image (PNG or JPEG).
    pub url: String,
    /// Type tag, parsed with [`ProductKind::from_str`].
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Width to draw the product at, in frame pixels.
    pub real_width: u32,
    /// Height to draw the product at, in frame pixels.
    pub real_height: u32,
}

impl ProductSpec {
    pub fn new(url: impl Into<String>, kind: ProductKind, real_width: u32, real_height: u32) -> Self {
        Self {
            url: url.into(),
            type_tag: kind.name().to_string(),
            real_width,
            real_height,
        }
    }

    pub fn kind(&self) -> anyhow::Result<ProductKind> {
        self.type_tag.parse()
    }

    pub fn real_size(&self) -> Resolution {
        Resolution::new(self.real_width, self.real_height)
    }
}

/// The list of products available in a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<(ProductSpec, ProductKind)>,
}

impl Catalog {
    /// Creates a catalog, validating every entry's type tag and size.
    pub fn new(specs: Vec<ProductSpec>) -> anyhow::Result<Self> {
        let entries = specs
            .into_iter()
            .map(|spec| {
                let kind = spec.kind()?;
                if spec.real_width == 0 || spec.real_height == 0 {
                    anyhow::bail!("product '{}' has an empty size", spec.url);
                }
                Ok((spec, kind))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Parses a catalog from a JSON array of `{ url, type, realWidth, realHeight }` objects.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let specs: Vec<ProductSpec> = serde_json::from_str(json)?;
        Self::new(specs)
    }

    /// Loads a JSON catalog from the file system.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog '{}'", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid catalog '{}'", path.display()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductSpec, ProductKind)> + '_ {
        self.entries.iter().map(|(spec, kind)| (spec, *kind))
    }
}

/// A decoded product image, resized to its real size.
#[derive(Debug, Clone)]
pub struct ProductImage {
    spec: ProductSpec,
    kind: ProductKind,
    bitmap: Image,
}

impl ProductImage {
    /// Wraps a decoded image.
    ///
    /// The [`Preloader`] already delivers images at the catalog entry's real size; other images are
    /// resized here.
    pub fn new(spec: ProductSpec, kind: ProductKind, image: Image) -> Self {
        let bitmap = if image.resolution() == spec.real_size() {
            image
        } else {
            image.resized(spec.real_size())
        };
        Self { spec, kind, bitmap }
    }

    pub fn spec(&self) -> &ProductSpec {
        &self.spec
    }

    pub fn kind(&self) -> ProductKind {
        self.kind
    }

    pub fn bitmap(&self) -> &Image {
        &self.bitmap
    }

    #[inline]
    pub fn real_width(&self) -> f32 {
        self.spec.real_width as f32
    }

    #[inline]
    pub fn real_height(&self) -> f32 {
        self.spec.real_height as f32
    }
}

/// Loading state of one catalog entry.
#[derive(Debug)]
pub enum ProductState {
    Loading,
    Ready(ProductImage),
    Failed,
}

/// The session's products, in catalog order.
#[derive(Debug)]
pub struct ProductSet {
    catalog: Catalog,
    states: Vec<ProductState>,
}

impl ProductSet {
    /// Creates a set in which every product is still [`ProductState::Loading`].
    pub fn new(catalog: Catalog) -> Self {
        let states = catalog.iter().map(|_| ProductState::Loading).collect();
        Self { catalog, states }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Records the outcome of decoding the product at `index`.
    ///
    /// Failures are logged; a failed product never becomes eligible for drawing.
    pub fn resolve(&mut self, index: usize, result: anyhow::Result<Image>) {
        let Some((spec, kind)) = self.catalog.entries.get(index) else {
            log::warn!("ignoring image for unknown product #{index}");
            return;
        };

        self.states[index] = match result {
            Ok(image) => {
                log::debug!("loaded {kind} '{}' ({})", spec.url, image.resolution());
                if kind.anchors().is_empty() {
                    log::warn!("no placement rule for {kind} '{}', it will not be drawn", spec.url);
                }
                ProductState::Ready(ProductImage::new(spec.clone(), *kind, image))
            }
            Err(e) => {
                log::error!("failed to load product image '{}': {e:#}", spec.url);
                ProductState::Failed
            }
        };
    }

    pub fn states(&self) -> &[ProductState] {
        &self.states
    }

    /// Returns the products that finished decoding, in catalog order.
    pub fn ready(&self) -> impl Iterator<Item = &ProductImage> + '_ {
        self.states.iter().filter_map(|state| match state {
            ProductState::Ready(image) => Some(image),
            _ => None,
        })
    }

    /// Returns whether no product is still loading.
    pub fn is_settled(&self) -> bool {
        self.states
            .iter()
            .all(|state| !matches!(state, ProductState::Loading))
    }
}
