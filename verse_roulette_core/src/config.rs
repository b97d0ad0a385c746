// Data-driven page configuration.
//
// Tunables for the page live in `PageConfig`, loaded from JSON at startup.
// Every field has a default, so a config file only needs the keys it
// overrides (or can be omitted entirely).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PageError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Verse dataset file name, relative to the data directory.
    pub verse_file: String,
    /// Slogan dataset file name, relative to the data directory.
    pub slogan_file: String,
    /// Chance (0.0–1.0) that a Randomize press also re-rolls the mode.
    pub mode_reroll_probability: f64,
    /// Delay between successive stanza entry animations.
    pub stagger_ms: u64,
    /// Fixed PRNG seed. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            verse_file: "poem.json".into(),
            slogan_file: "aussie-slogans.json".into(),
            mode_reroll_probability: 0.3,
            stagger_ms: 100,
            seed: None,
        }
    }
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        let config: PageConfig =
            serde_json::from_str(json).map_err(|e| PageError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, PageError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| PageError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), PageError> {
        if !(0.0..=1.0).contains(&self.mode_reroll_probability) {
            return Err(PageError::Config(format!(
                "mode_reroll_probability must be within 0.0..=1.0, got {}",
                self.mode_reroll_probability
            )));
        }
        Ok(())
    }
}
