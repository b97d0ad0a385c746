// Slogan dataset and tagline selection.
//
// The slogan dataset maps a category name to a list of taglines. A pick is
// two-stage: a uniform category, then a uniform tagline within it, so small
// categories are as likely to appear as large ones. Categories with no
// taglines are never chosen.
//
// The slogan is independent of the poem. It is fetched on load, on every
// Randomize, and whenever the slogan itself is clicked; a failed fetch shows
// `FALLBACK_SLOGAN`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use verse_roulette_prng::{RandomSource, pick};

use crate::error::{Dataset, PageError};
use crate::source::DatasetSource;

pub const FALLBACK_SLOGAN: &str =
    "It's not a website, it's digital poetry with extreme Australian energy.";

/// Shown while a clicked slogan is being re-fetched.
pub const SLOGAN_LOADING_TEXT: &str = "Getting new wisdom...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slogan {
    pub category: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SloganBook {
    categories: BTreeMap<String, Vec<String>>,
}

impl SloganBook {
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        serde_json::from_str(json).map_err(|e| PageError::dataset(Dataset::Slogans, e))
    }

    /// Category names that have at least one tagline.
    pub fn categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, lines)| !lines.is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn pick<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Option<Slogan> {
        let categories = self.categories();
        let category = *pick(rng, &categories)?;
        let text = pick(rng, &self.categories[category])?;
        Some(Slogan {
            category: category.to_owned(),
            text: text.clone(),
        })
    }
}

/// Fetch the slogan dataset and pick one tagline.
pub fn load_slogan<S, R>(source: &mut S, rng: &mut R) -> Result<Slogan, PageError>
where
    S: DatasetSource + ?Sized,
    R: RandomSource + ?Sized,
{
    let book = SloganBook::from_json(&source.fetch_slogans()?)?;
    book.pick(rng)
        .ok_or_else(|| PageError::dataset(Dataset::Slogans, "no taglines"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use verse_roulette_prng::ScriptedRng;

    const SLOGANS: &str = r#"{
        "meat pie": ["Pie o'clock, mate.", "Sauce is mandatory."],
        "thongs": [],
        "ute": ["Tray back, bring the dog."]
    }"#;

    #[test]
    fn empty_categories_are_skipped() {
        let book = SloganBook::from_json(SLOGANS).unwrap();
        assert_eq!(book.categories(), vec!["meat pie", "ute"]);
    }

    #[test]
    fn pick_is_category_then_tagline() {
        let book = SloganBook::from_json(SLOGANS).unwrap();
        let mut rng = ScriptedRng::new([0, 1]);
        let slogan = book.pick(&mut rng).unwrap();
        assert_eq!(slogan.category, "meat pie");
        assert_eq!(slogan.text, "Sauce is mandatory.");
    }

    #[test]
    fn load_slogan_reports_unreachable_dataset() {
        let mut source = StaticSource::new(None, None);
        let err = load_slogan(&mut source, &mut ScriptedRng::default()).unwrap_err();
        assert!(matches!(
            err,
            PageError::DatasetUnavailable {
                dataset: Dataset::Slogans,
                ..
            }
        ));
    }

    #[test]
    fn load_slogan_rejects_wrong_shape() {
        let mut source = StaticSource::new(None, Some(r#"["not", "a", "map"]"#));
        assert!(load_slogan(&mut source, &mut ScriptedRng::default()).is_err());
    }

    #[test]
    fn book_without_taglines_has_no_pick() {
        let mut source = StaticSource::new(None, Some(r#"{"thongs": []}"#));
        assert!(load_slogan(&mut source, &mut ScriptedRng::default()).is_err());
    }
}
