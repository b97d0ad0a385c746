// Render tree for the poem.
//
// `build_view` turns a `PoemData` into a `PoemView`: one `StanzaBlock` per
// stanza, in stanza (act) order, each with its resolved image, display
// lines, optional act label and notes, and an entry-animation delay of
// `index * stagger_ms`. Delays are assigned by position, so the entry
// order is the act order no matter how fast images arrive.
//
// `render` wraps `build_view` for the page: a failure while building
// becomes `PoemPane::Error` with a fixed message, so the page never shows a
// blank or half-built poem.
//
// The tree is plain data. `html.rs` serializes it for the browser and the
// server exposes it as JSON.

use serde::Serialize;
use tracing::error;
use verse_roulette_prng::RandomSource;

use crate::error::PageError;
use crate::image::{Image, ImagePool, UsedSources};
use crate::verse::{Act, PoemData, Stanza};

/// Shown in place of the poem when rendering fails.
pub const RENDER_ERROR_MESSAGE: &str = "Failed to load poem. Please refresh.";

/// One visual block of the poem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StanzaBlock {
    pub act: Option<Act>,
    /// e.g. "ACT_3 (happy ending)". `None` for stanzas without an act.
    pub act_label: Option<String>,
    pub image: Image,
    pub lines: Vec<String>,
    /// Revealed on hover.
    pub notes: Option<String>,
    pub enter_delay_ms: u64,
    /// Set once the load-failure fallback has been tried for this block.
    pub image_retried: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoemView {
    pub title: String,
    pub subtitle: String,
    pub blocks: Vec<StanzaBlock>,
}

/// What the poem container currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum PoemPane {
    Empty,
    Poem(PoemView),
    Error(String),
}

/// Act label for a stanza, with the ending type appended when present.
pub fn act_label(stanza: &Stanza) -> Option<String> {
    let act = stanza.act?;
    Some(match &stanza.ending_type {
        Some(ending) => format!("{} ({ending} ending)", act.tag()),
        None => act.tag().to_owned(),
    })
}

/// Build the render tree, resolving one image per stanza without reuse
/// inside this pass.
pub fn build_view<R: RandomSource + ?Sized>(
    poem: &PoemData,
    pool: &ImagePool,
    rng: &mut R,
    stagger_ms: u64,
) -> Result<PoemView, PageError> {
    let mut used = UsedSources::new();
    let mut blocks = Vec::with_capacity(poem.stanzas.len());

    for (index, stanza) in poem.stanzas.iter().enumerate() {
        let image = pool.resolve(stanza, &mut used, rng).ok_or_else(|| {
            PageError::RenderFailure(format!("no image available for stanza {index}"))
        })?;
        blocks.push(StanzaBlock {
            act: stanza.act,
            act_label: act_label(stanza),
            image,
            lines: stanza.lines.clone(),
            notes: stanza.notes.clone(),
            enter_delay_ms: index as u64 * stagger_ms,
            image_retried: false,
        });
    }

    Ok(PoemView {
        title: poem.title.clone(),
        subtitle: poem.subtitle.clone(),
        blocks,
    })
}

/// Build the poem pane, converting any render failure into the static
/// error message.
pub fn render<R: RandomSource + ?Sized>(
    poem: &PoemData,
    pool: &ImagePool,
    rng: &mut R,
    stagger_ms: u64,
) -> PoemPane {
    match build_view(poem, pool, rng, stagger_ms) {
        Ok(view) => PoemPane::Poem(view),
        Err(err) => {
            error!(%err, "error generating poem");
            PoemPane::Error(RENDER_ERROR_MESSAGE.into())
        }
    }
}
