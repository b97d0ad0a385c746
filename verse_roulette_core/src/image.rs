// Image pool and per-stanza image resolution.
//
// Each stanza gets exactly one image. Resolution order:
// 1. The stanza's explicit image (from its verse record), tagged
//    `story-specific`. Always wins, even if already used this pass.
// 2. A pool image whose tag is in the stanza's preferred set and whose
//    source is unused this pass.
// 3. Any unused pool image.
// 4. Any pool image at all (reuse only once the pool is exhausted).
// The chosen source is recorded in `UsedSources` in every case.
//
// When an image fails to load, `ImagePool::fallback_for` offers the first
// hosted (`https://`) pool entry with the same tag. If there is none, the
// broken image stays; the runtime never retries a block twice.
//
// The pool deliberately lists some sources more than once under different
// tags. "Used" is tracked per source, not per entry.

use std::collections::HashSet;

use serde::Serialize;
use verse_roulette_prng::{RandomSource, pick};

use crate::verse::{Act, Stanza};

/// Tag given to images that come from the verse record itself.
pub const STORY_SPECIFIC_TAG: &str = "story-specific";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
    pub tag: String,
}

impl Image {
    pub fn new(src: impl Into<String>, alt: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            tag: tag.into(),
        }
    }

    pub fn is_hosted(&self) -> bool {
        self.src.starts_with("https://")
    }
}

/// (src, alt, tag)
#[rustfmt::skip]
static DEFAULT_POOL: [(&str, &str, &str); 24] = [
    // Opening: technology and screens.
    ("https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=800&h=600&fit=crop", "Digital technology screens", "tech"),
    ("https://images.unsplash.com/photo-1451187580459-43490279c0fa?w=800&h=600&fit=crop", "Digital data visualization", "digital"),
    ("https://images.unsplash.com/photo-1516339901601-2e1b62dc0c45?w=800&h=600&fit=crop", "Multiple screens and displays", "screens"),
    // Conflict.
    ("https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=800&h=600&fit=crop", "Chaotic storm and lightning", "battle"),
    ("https://images.unsplash.com/photo-1518837695005-2083093ee35b?w=800&h=600&fit=crop", "Industrial chaos and conflict", "chaos"),
    ("https://images.unsplash.com/photo-1516339901601-2e1b62dc0c45?w=800&h=600&fit=crop", "Urban conflict scene", "conflict"),
    // Resolution.
    ("https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=800&h=600&fit=crop", "Peaceful resolution sunrise", "resolution"),
    ("https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=800&h=600&fit=crop", "Tranquil peaceful scene", "peace"),
    ("https://images.unsplash.com/photo-1507525428034-b723cf961d3e?w=800&h=600&fit=crop", "Beautiful ending sunset", "ending"),
    // Dark extras.
    ("https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=800&h=600&fit=crop", "Dark stormy sky with lightning", "storm"),
    ("https://images.unsplash.com/photo-1518837695005-2083093ee35b?w=800&h=600&fit=crop", "Dark industrial metal structure", "metal"),
    ("https://images.unsplash.com/photo-1516339901601-2e1b62dc0c45?w=800&h=600&fit=crop", "Gothic architecture in darkness", "gothic"),
    // Generic.
    ("https://images.unsplash.com/photo-1541185933-ef5d8ed016c2?w=800&h=600&fit=crop", "Abstract artistic composition", "abstract"),
    ("https://images.unsplash.com/photo-1446776653964-20c1d3a81b06?w=800&h=600&fit=crop", "Modern artistic scene", "artistic"),
    ("https://images.unsplash.com/photo-1614730321146-b6fa6a46bcb4?w=800&h=600&fit=crop", "Contemporary modern art", "modern"),
    // Local nature images, served from the data directory.
    ("images/sunrise.jpg", "Beautiful sunrise over mountains", "sunrise"),
    ("images/forest.jpg", "Peaceful forest path", "forest"),
    ("images/sunset.jpg", "Peaceful sunset by the ocean", "sunset"),
    // Hosted backups for the local images.
    ("https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=800&h=600&fit=crop", "Mountain sunrise landscape", "sunrise"),
    ("https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=800&h=600&fit=crop", "Forest path through trees", "forest"),
    ("https://images.unsplash.com/photo-1507525428034-b723cf961d3e?w=800&h=600&fit=crop", "Ocean sunset scene", "sunset"),
    ("https://images.unsplash.com/photo-1464822759844-d150052efe7e?w=800&h=600&fit=crop", "Mountain peak at dawn", "sunrise"),
    ("https://images.unsplash.com/photo-1518837695005-2083093ee35b?w=800&h=600&fit=crop", "Dense forest canopy", "forest"),
    ("https://images.unsplash.com/photo-1495616811223-4d98c6e9c869?w=800&h=600&fit=crop", "Peaceful lake at sunset", "sunset"),
];

/// Pool tags each act prefers. `None` (no act) gets the generic set.
pub fn preferred_tags(act: Option<Act>) -> &'static [&'static str] {
    match act {
        Some(Act::Opening) => &["tech", "digital", "screens"],
        Some(Act::Conflict) => &["battle", "chaos", "conflict"],
        Some(Act::Resolution) => &["resolution", "peace", "ending"],
        None => &["abstract", "artistic", "modern"],
    }
}

/// Image sources already placed during one render pass.
#[derive(Debug, Clone, Default)]
pub struct UsedSources {
    sources: HashSet<String>,
}

impl UsedSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, src: &str) -> bool {
        self.sources.contains(src)
    }

    pub fn insert(&mut self, src: &str) {
        self.sources.insert(src.to_owned());
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// The fixed set of tagged fallback images.
#[derive(Debug, Clone)]
pub struct ImagePool {
    entries: Vec<Image>,
}

impl Default for ImagePool {
    fn default() -> Self {
        Self::new(
            DEFAULT_POOL
                .iter()
                .map(|&(src, alt, tag)| Image::new(src, alt, tag))
                .collect(),
        )
    }
}

impl ImagePool {
    pub fn new(entries: Vec<Image>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Image] {
        &self.entries
    }

    /// Choose the image for `stanza` and record it in `used`.
    ///
    /// Returns `None` only when the stanza has no explicit image and the
    /// pool is empty.
    pub fn resolve<R: RandomSource + ?Sized>(
        &self,
        stanza: &Stanza,
        used: &mut UsedSources,
        rng: &mut R,
    ) -> Option<Image> {
        let image = match &stanza.image {
            Some(src) => Some(explicit_image(stanza, src)),
            None => self.pick_from_pool(stanza.preferred_tags, used, rng),
        }?;
        used.insert(&image.src);
        Some(image)
    }

    fn pick_from_pool<R: RandomSource + ?Sized>(
        &self,
        preferred: &[&str],
        used: &UsedSources,
        rng: &mut R,
    ) -> Option<Image> {
        let preferred_unused: Vec<&Image> = self
            .entries
            .iter()
            .filter(|img| preferred.contains(&img.tag.as_str()) && !used.contains(&img.src))
            .collect();
        if let Some(img) = pick(rng, &preferred_unused) {
            return Some((*img).clone());
        }

        let unused: Vec<&Image> = self
            .entries
            .iter()
            .filter(|img| !used.contains(&img.src))
            .collect();
        if let Some(img) = pick(rng, &unused) {
            return Some((*img).clone());
        }

        pick(rng, &self.entries).cloned()
    }

    /// Same-tag hosted replacement for an image that failed to load.
    pub fn fallback_for(&self, failed: &Image) -> Option<Image> {
        self.entries
            .iter()
            .find(|img| img.is_hosted() && img.tag == failed.tag && img.src != failed.src)
            .cloned()
    }
}

fn explicit_image(stanza: &Stanza, src: &str) -> Image {
    let act = stanza.act.map_or("stanza", Act::tag);
    let about = stanza.notes.as_deref().unwrap_or("stanza");
    Image::new(src, format!("Image for {act} - {about}"), STORY_SPECIFIC_TAG)
}
