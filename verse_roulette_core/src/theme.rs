// Visual modes and the per-mode heading table.
//
// A mode is a complete look for the page: four palette colors, a heading and
// body font stack, and a CSS background. The registry is a fixed enum; modes
// are selected at runtime, never mutated.
//
// The heading table maps a mode to the poem's title and subtitle. A mode
// without an entry (or a page with no mode yet) falls back to
// `DEFAULT_HEADING`.
//
// Used by `stage.rs` (`Stage::apply_mode`) and `runtime.rs` (mode rolls).

use serde::{Deserialize, Serialize};
use verse_roulette_prng::{RandomSource, pick};

/// The enumerated set of visual modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeId {
    Metal,
    Girly,
    Retro,
    Space,
}

/// Palette colors as CSS hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
}

/// CSS font stacks for headings and body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FontPair {
    pub heading: &'static str,
    pub body: &'static str,
}

/// A complete visual theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mode {
    /// Shown in the mode indicator, e.g. "Metal Mode".
    pub name: &'static str,
    pub palette: Palette,
    pub fonts: FontPair,
    /// CSS `background` value.
    pub background: &'static str,
    /// Locator for the mode's theme song. Playback is not implemented; the
    /// locator is carried as theme data only.
    pub song: &'static str,
}

static METAL: Mode = Mode {
    name: "Metal Mode",
    palette: Palette {
        primary: "#1a1a1a",
        secondary: "#ff0000",
        accent: "#333333",
        text: "#ffffff",
    },
    fonts: FontPair {
        heading: "'Cinzel', serif",
        body: "'Roboto Condensed', sans-serif",
    },
    background: "radial-gradient(circle, #1a1a1a 0%, #000000 100%)",
    song: "https://www.soundjay.com/misc/sounds/metal-loop.mp3",
};

static GIRLY: Mode = Mode {
    name: "Girly Mode",
    palette: Palette {
        primary: "#ff69b4",
        secondary: "#ffb6c1",
        accent: "#ffc0cb",
        text: "#8b008b",
    },
    fonts: FontPair {
        heading: "'Dancing Script', cursive",
        body: "'Quicksand', sans-serif",
    },
    background: "linear-gradient(45deg, #ffb6c1 0%, #ffc0cb 50%, #ff69b4 100%)",
    song: "https://www.soundjay.com/misc/sounds/pop-loop.mp3",
};

static RETRO: Mode = Mode {
    name: "Retro Mode",
    palette: Palette {
        primary: "#ff6b35",
        secondary: "#f7931e",
        accent: "#ffdc00",
        text: "#2c1810",
    },
    fonts: FontPair {
        heading: "'Righteous', cursive",
        body: "'Orbitron', monospace",
    },
    background: "linear-gradient(135deg, #ff6b35 0%, #f7931e 50%, #ffdc00 100%)",
    song: "https://www.soundjay.com/misc/sounds/retro-loop.mp3",
};

static SPACE: Mode = Mode {
    name: "Space Mode",
    palette: Palette {
        primary: "#0f3460",
        secondary: "#16537e",
        accent: "#533483",
        text: "#e94560",
    },
    fonts: FontPair {
        heading: "'Orbitron', monospace",
        body: "'Exo 2', sans-serif",
    },
    background: "radial-gradient(ellipse at center, #0f3460 0%, #16537e 50%, #533483 100%)",
    song: "https://www.soundjay.com/misc/sounds/ambient-loop.mp3",
};

impl ModeId {
    /// Every mode, in registry order.
    pub const ALL: [ModeId; 4] = [ModeId::Metal, ModeId::Girly, ModeId::Retro, ModeId::Space];

    pub fn mode(self) -> &'static Mode {
        match self {
            ModeId::Metal => &METAL,
            ModeId::Girly => &GIRLY,
            ModeId::Retro => &RETRO,
            ModeId::Space => &SPACE,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ModeId::Metal => "metal",
            ModeId::Girly => "girly",
            ModeId::Retro => "retro",
            ModeId::Space => "space",
        }
    }

    /// Class applied to the page body while this mode is active.
    pub fn css_class(self) -> &'static str {
        match self {
            ModeId::Metal => "metal-mode",
            ModeId::Girly => "girly-mode",
            ModeId::Retro => "retro-mode",
            ModeId::Space => "space-mode",
        }
    }

    pub fn from_key(key: &str) -> Option<ModeId> {
        ModeId::ALL.into_iter().find(|m| m.key() == key)
    }
}

/// Pick a mode uniformly at random.
pub fn select_mode<R: RandomSource + ?Sized>(rng: &mut R) -> ModeId {
    pick(rng, &ModeId::ALL).copied().unwrap_or(ModeId::Metal)
}

/// Poem title and subtitle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub title: &'static str,
    pub subtitle: &'static str,
}

pub const DEFAULT_HEADING: Heading = Heading {
    title: "Rachael's Story",
    subtitle: "A digital nightmare in three acts",
};

/// Per-mode title/subtitle lookup.
#[derive(Debug, Clone)]
pub struct HeadingTable {
    entries: Vec<(ModeId, Heading)>,
}

impl HeadingTable {
    pub fn new(entries: Vec<(ModeId, Heading)>) -> Self {
        Self { entries }
    }

    /// Heading for `mode`, or `DEFAULT_HEADING` when no mode is set or the
    /// mode has no entry.
    pub fn resolve(&self, mode: Option<ModeId>) -> Heading {
        mode.and_then(|m| {
            self.entries
                .iter()
                .find(|(id, _)| *id == m)
                .map(|(_, h)| *h)
        })
        .unwrap_or(DEFAULT_HEADING)
    }
}

impl Default for HeadingTable {
    fn default() -> Self {
        let campaign = Heading {
            title: "Dog+Me+Daddy",
            subtitle: "A marketing adventure against blurbo",
        };
        Self::new(ModeId::ALL.iter().map(|&m| (m, campaign)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verse_roulette_prng::ScriptedRng;

    #[test]
    fn every_mode_has_distinct_class_and_name() {
        let mut classes: Vec<_> = ModeId::ALL.iter().map(|m| m.css_class()).collect();
        let mut names: Vec<_> = ModeId::ALL.iter().map(|m| m.mode().name).collect();
        classes.sort();
        classes.dedup();
        names.sort();
        names.dedup();
        assert_eq!(classes.len(), 4);
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn select_mode_uses_the_random_pick() {
        let mut rng = ScriptedRng::new([0, 1, 2, 3]);
        let picked: Vec<_> = (0..4).map(|_| select_mode(&mut rng)).collect();
        assert_eq!(picked, ModeId::ALL.to_vec());
    }

    #[test]
    fn mode_key_roundtrip() {
        for mode in ModeId::ALL {
            assert_eq!(ModeId::from_key(mode.key()), Some(mode));
        }
        assert_eq!(ModeId::from_key("disco"), None);
    }

    #[test]
    fn heading_falls_back_without_mode() {
        let table = HeadingTable::default();
        assert_eq!(table.resolve(None), DEFAULT_HEADING);
        assert_eq!(table.resolve(Some(ModeId::Retro)).title, "Dog+Me+Daddy");
    }

    #[test]
    fn heading_falls_back_for_mode_without_entry() {
        let custom = Heading {
            title: "Heavy",
            subtitle: "Very heavy",
        };
        let table = HeadingTable::new(vec![(ModeId::Metal, custom)]);
        assert_eq!(table.resolve(Some(ModeId::Metal)), custom);
        assert_eq!(table.resolve(Some(ModeId::Space)), DEFAULT_HEADING);
    }
}
