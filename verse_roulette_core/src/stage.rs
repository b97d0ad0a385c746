// The page surface as plain data.
//
// `Stage` holds everything the browser would show: body class and theme
// (from the current mode), the mode indicator, header title and subtitle,
// the poem pane, the slogan text, and the Randomize control. The runtime
// mutates it; `html.rs` serializes it.
//
// All setters replace rather than accumulate. Applying a mode swaps the
// whole theme and the single indicator, so applying the same mode twice
// leaves the stage exactly as applying it once.

use serde::Serialize;

use crate::render::{PoemPane, StanzaBlock};
use crate::slogan::FALLBACK_SLOGAN;
use crate::theme::{DEFAULT_HEADING, FontPair, ModeId, Palette};

pub const RANDOMIZE_LABEL: &str = "Randomize";
pub const BUSY_LABEL: &str = "Regenerating...";

/// Visual theme currently applied to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeStyle {
    pub mode: ModeId,
    pub body_class: &'static str,
    pub palette: Palette,
    pub fonts: FontPair,
    pub background: &'static str,
}

impl ThemeStyle {
    pub fn for_mode(mode: ModeId) -> Self {
        let m = mode.mode();
        Self {
            mode,
            body_class: mode.css_class(),
            palette: m.palette,
            fonts: m.fonts,
            background: m.background,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenerationState {
    Idle,
    Busy,
}

/// The Randomize control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlState {
    pub label: &'static str,
    pub disabled: bool,
}

impl ControlState {
    pub fn state(&self) -> RegenerationState {
        if self.disabled {
            RegenerationState::Busy
        } else {
            RegenerationState::Idle
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            label: RANDOMIZE_LABEL,
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub theme: Option<ThemeStyle>,
    /// Text of the mode indicator; at most one exists.
    pub indicator: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub poem: PoemPane,
    pub slogan: String,
    pub control: ControlState,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            theme: None,
            indicator: None,
            title: DEFAULT_HEADING.title.into(),
            subtitle: DEFAULT_HEADING.subtitle.into(),
            poem: PoemPane::Empty,
            slogan: FALLBACK_SLOGAN.into(),
            control: ControlState::default(),
        }
    }
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace theme and indicator with those of `mode`.
    pub fn apply_mode(&mut self, mode: ModeId) {
        self.theme = Some(ThemeStyle::for_mode(mode));
        self.indicator = Some(mode.mode().name.to_owned());
    }

    pub fn set_heading(&mut self, title: &str, subtitle: &str) {
        self.title = title.to_owned();
        self.subtitle = subtitle.to_owned();
    }

    pub fn show_poem(&mut self, pane: PoemPane) {
        self.poem = pane;
    }

    pub fn show_slogan(&mut self, text: &str) {
        self.slogan = text.to_owned();
    }

    /// Disable the control and show the busy label. Returns `false` (and
    /// changes nothing) if the control is already disabled.
    pub fn begin_busy(&mut self) -> bool {
        if self.control.disabled {
            return false;
        }
        self.control = ControlState {
            label: BUSY_LABEL,
            disabled: true,
        };
        true
    }

    pub fn end_busy(&mut self) {
        self.control = ControlState::default();
    }

    /// Mutable access to a rendered block, if a poem is showing.
    pub fn block_mut(&mut self, index: usize) -> Option<&mut StanzaBlock> {
        match &mut self.poem {
            PoemPane::Poem(view) => view.blocks.get_mut(index),
            _ => None,
        }
    }

    pub fn blocks(&self) -> &[StanzaBlock] {
        match &self.poem {
            PoemPane::Poem(view) => &view.blocks,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_mode_is_idempotent() {
        let mut once = Stage::new();
        once.apply_mode(ModeId::Space);
        let mut twice = Stage::new();
        twice.apply_mode(ModeId::Space);
        twice.apply_mode(ModeId::Space);
        assert_eq!(once, twice);
    }

    #[test]
    fn apply_mode_replaces_previous_theme() {
        let mut stage = Stage::new();
        stage.apply_mode(ModeId::Metal);
        stage.apply_mode(ModeId::Girly);
        let theme = stage.theme.as_ref().unwrap();
        assert_eq!(theme.body_class, "girly-mode");
        assert_eq!(theme.palette.primary, "#ff69b4");
        assert_eq!(stage.indicator.as_deref(), Some("Girly Mode"));
    }

    #[test]
    fn busy_guard_refuses_second_entry() {
        let mut stage = Stage::new();
        assert!(stage.begin_busy());
        assert_eq!(stage.control.label, BUSY_LABEL);
        assert_eq!(stage.control.state(), RegenerationState::Busy);
        assert!(!stage.begin_busy());
        stage.end_busy();
        assert_eq!(stage.control, ControlState::default());
        assert_eq!(stage.control.state(), RegenerationState::Idle);
    }

    #[test]
    fn no_blocks_without_poem() {
        let mut stage = Stage::new();
        assert!(stage.blocks().is_empty());
        assert!(stage.block_mut(0).is_none());
    }
}
