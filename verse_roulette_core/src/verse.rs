// Verse dataset, per-act sampling, and the built-in fallback poem.
//
// The verse dataset is a JSON array of records, each tagged with one of
// three narrative acts. Every render cycle draws one verse per act, in act
// order (opening, conflict, resolution). Acts with no records are skipped;
// records with an unrecognized act tag are ignored. Sampling is independent
// per call: no memory of earlier draws.
//
// Act tags on the wire are `ACT_1`..`ACT_3`. Older datasets spelled them
// `ACT1`..`ACT3`; both parse to the same `Act`, only the canonical form is
// ever written out.
//
// When the dataset cannot be fetched or parsed, or sampling yields nothing,
// `load_poem` substitutes the three-stanza "Nature's Symphony" poem, whose
// stanzas carry their own preferred image tags.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use verse_roulette_prng::{RandomSource, pick};

use crate::error::{Dataset, PageError};
use crate::image::preferred_tags;
use crate::source::DatasetSource;
use crate::theme::{HeadingTable, ModeId};

/// The three narrative phases, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Act {
    #[serde(rename = "ACT_1")]
    Opening,
    #[serde(rename = "ACT_2")]
    Conflict,
    #[serde(rename = "ACT_3")]
    Resolution,
}

impl Act {
    pub const ALL: [Act; 3] = [Act::Opening, Act::Conflict, Act::Resolution];

    /// Canonical wire tag, also used as the on-page act label.
    pub fn tag(self) -> &'static str {
        match self {
            Act::Opening => "ACT_1",
            Act::Conflict => "ACT_2",
            Act::Resolution => "ACT_3",
        }
    }

    /// Parse a wire tag, accepting the legacy unseparated spelling.
    pub fn from_tag(tag: &str) -> Option<Act> {
        match tag.trim() {
            "ACT_1" | "ACT1" => Some(Act::Opening),
            "ACT_2" | "ACT2" => Some(Act::Conflict),
            "ACT_3" | "ACT3" => Some(Act::Resolution),
            _ => None,
        }
    }
}

/// Verse identifiers appear as both numbers and strings in the wild. Any
/// JSON number is accepted, including negative and fractional ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerseId {
    Number(serde_json::Number),
    Text(String),
}

/// One dataset record.
#[derive(Debug, Clone, Deserialize)]
pub struct Verse {
    /// Raw act tag; see `Verse::act`.
    pub act: String,
    /// Poem text, lines separated by `\n`.
    pub text: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Explicit image URL for this verse.
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub id: Option<VerseId>,
    /// Only meaningful on resolution-act verses.
    #[serde(default)]
    pub ending_type: Option<String>,
}

impl Verse {
    pub fn act(&self) -> Option<Act> {
        Act::from_tag(&self.act)
    }
}

/// A parsed verse dataset, in file order.
#[derive(Debug, Clone, Default)]
pub struct VerseDataset {
    verses: Vec<Verse>,
}

impl VerseDataset {
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        let verses: Vec<Verse> =
            serde_json::from_str(json).map_err(|e| PageError::dataset(Dataset::Verses, e))?;
        Ok(Self { verses })
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// Records belonging to `act`, in file order.
    pub fn by_act(&self, act: Act) -> Vec<&Verse> {
        self.verses
            .iter()
            .filter(|v| v.act() == Some(act))
            .collect()
    }
}

/// A verse prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Stanza {
    /// `None` for stanzas of the built-in poem, which has no acts.
    pub act: Option<Act>,
    /// Display lines; blank lines are dropped.
    pub lines: Vec<String>,
    pub notes: Option<String>,
    /// Explicit image URL, which overrides pool lookup.
    pub image: Option<String>,
    pub ending_type: Option<String>,
    pub id: Option<VerseId>,
    /// Pool tags to prefer when no explicit image is set.
    pub preferred_tags: &'static [&'static str],
}

impl Stanza {
    pub fn from_verse(verse: &Verse, act: Act) -> Self {
        let ending_type = match act {
            Act::Resolution => non_empty(verse.ending_type.as_deref()),
            _ => None,
        };
        Self {
            act: Some(act),
            lines: display_lines(&verse.text),
            notes: non_empty(verse.notes.as_deref()),
            image: non_empty(verse.img.as_deref()),
            ending_type,
            id: verse.id.clone(),
            preferred_tags: preferred_tags(Some(act)),
        }
    }
}

/// Split verse text into lines, keeping only lines with visible content.
pub fn display_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_owned)
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Draw one verse per act, in act order. Acts without records are omitted.
pub fn sample_one_verse_per_act<R: RandomSource + ?Sized>(
    dataset: &VerseDataset,
    rng: &mut R,
) -> Vec<Stanza> {
    let mut stanzas = Vec::with_capacity(Act::ALL.len());
    for act in Act::ALL {
        let candidates = dataset.by_act(act);
        if let Some(verse) = pick(rng, &candidates) {
            debug!(act = act.tag(), id = ?verse.id, "sampled verse");
            stanzas.push(Stanza::from_verse(verse, act));
        }
    }
    stanzas
}

/// Everything the renderer needs for one poem.
#[derive(Debug, Clone, PartialEq)]
pub struct PoemData {
    pub title: String,
    pub subtitle: String,
    pub stanzas: Vec<Stanza>,
}

const FALLBACK_TITLE: &str = "Nature's Symphony";
const FALLBACK_SUBTITLE: &str = "A poem in three movements";

static FALLBACK_STANZAS: [(&[&str], &[&str]); 3] = [
    (
        &[
            "In morning's light, the world awakens bright,",
            "With golden rays that chase away the night.",
            "The dew drops glisten on the emerald grass,",
            "As gentle breezes through the meadows pass.",
        ],
        &["sunrise", "dawn", "morning"],
    ),
    (
        &[
            "Through ancient woods where tall trees stand so proud,",
            "Their whispered secrets echo clear and loud.",
            "The dancing leaves create a symphony,",
            "Of nature's pure and timeless harmony.",
        ],
        &["forest", "trees", "woods"],
    ),
    (
        &[
            "As daylight fades to purple twilight's glow,",
            "The stars begin their nightly light show.",
            "In peaceful silence, nature finds its rest,",
            "Until tomorrow brings another blessed.",
        ],
        &["sunset", "twilight", "evening"],
    ),
];

/// The built-in poem shown when the verse dataset is unavailable.
pub fn fallback_poem() -> PoemData {
    PoemData {
        title: FALLBACK_TITLE.into(),
        subtitle: FALLBACK_SUBTITLE.into(),
        stanzas: FALLBACK_STANZAS
            .iter()
            .map(|(lines, tags)| Stanza {
                act: None,
                lines: lines.iter().map(|l| (*l).to_owned()).collect(),
                notes: None,
                image: None,
                ending_type: None,
                id: None,
                preferred_tags: *tags,
            })
            .collect(),
    }
}

/// Fetch, parse and sample the verse dataset, titled for `mode`.
///
/// Never fails: an unavailable dataset or an empty sample yields
/// `fallback_poem()`, with the cause logged.
pub fn load_poem<S, R>(
    source: &mut S,
    mode: Option<ModeId>,
    headings: &HeadingTable,
    rng: &mut R,
) -> PoemData
where
    S: DatasetSource + ?Sized,
    R: RandomSource + ?Sized,
{
    let dataset = source
        .fetch_verses()
        .and_then(|json| VerseDataset::from_json(&json));
    let stanzas = match dataset {
        Ok(dataset) => sample_one_verse_per_act(&dataset, rng),
        Err(err) => {
            warn!(%err, "falling back to built-in poem");
            return fallback_poem();
        }
    };
    if stanzas.is_empty() {
        warn!("verse dataset has no usable acts, falling back to built-in poem");
        return fallback_poem();
    }

    let heading = headings.resolve(mode);
    PoemData {
        title: heading.title.into(),
        subtitle: heading.subtitle.into(),
        stanzas,
    }
}
