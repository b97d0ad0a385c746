// Where the datasets come from.
//
// The page fetches its verse and slogan datasets fresh for every render
// cycle. `DatasetSource` is the seam: the server reads files from a data
// directory (`DirSource`), tests hand over in-memory strings or simulated
// outages (`StaticSource`). Sources return raw JSON text; parsing lives next
// to the types it produces (`verse.rs`, `slogan.rs`).

use std::path::PathBuf;

use crate::config::PageConfig;
use crate::error::{Dataset, PageError};

/// Fetches the raw JSON text of the two datasets.
pub trait DatasetSource {
    fn fetch_verses(&mut self) -> Result<String, PageError>;
    fn fetch_slogans(&mut self) -> Result<String, PageError>;
}

/// Reads datasets from files in a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
    verse_file: String,
    slogan_file: String,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>, config: &PageConfig) -> Self {
        Self {
            dir: dir.into(),
            verse_file: config.verse_file.clone(),
            slogan_file: config.slogan_file.clone(),
        }
    }

    fn read(&self, file: &str, dataset: Dataset) -> Result<String, PageError> {
        let path = self.dir.join(file);
        std::fs::read_to_string(&path)
            .map_err(|e| PageError::dataset(dataset, format!("{}: {e}", path.display())))
    }
}

impl DatasetSource for DirSource {
    fn fetch_verses(&mut self) -> Result<String, PageError> {
        self.read(&self.verse_file, Dataset::Verses)
    }

    fn fetch_slogans(&mut self) -> Result<String, PageError> {
        self.read(&self.slogan_file, Dataset::Slogans)
    }
}

/// In-memory datasets. `None` simulates an unreachable dataset.
///
/// Counts fetches so tests can check that a retry really went back to the
/// source.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    verses: Option<String>,
    slogans: Option<String>,
    pub verse_fetches: usize,
    pub slogan_fetches: usize,
}

impl StaticSource {
    pub fn new(verses: Option<&str>, slogans: Option<&str>) -> Self {
        Self {
            verses: verses.map(str::to_owned),
            slogans: slogans.map(str::to_owned),
            ..Self::default()
        }
    }

    pub fn set_slogans(&mut self, slogans: Option<&str>) {
        self.slogans = slogans.map(str::to_owned);
    }
}

impl DatasetSource for StaticSource {
    fn fetch_verses(&mut self) -> Result<String, PageError> {
        self.verse_fetches += 1;
        self.verses
            .clone()
            .ok_or_else(|| PageError::dataset(Dataset::Verses, "unreachable"))
    }

    fn fetch_slogans(&mut self) -> Result<String, PageError> {
        self.slogan_fetches += 1;
        self.slogans
            .clone()
            .ok_or_else(|| PageError::dataset(Dataset::Slogans, "unreachable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_source_reads_configured_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("poem.json"), "[]").unwrap();
        let mut source = DirSource::new(dir.path(), &PageConfig::default());
        assert_eq!(source.fetch_verses().unwrap(), "[]");
        let err = source.fetch_slogans().unwrap_err();
        assert!(matches!(
            err,
            PageError::DatasetUnavailable {
                dataset: Dataset::Slogans,
                ..
            }
        ));
    }

    #[test]
    fn static_source_counts_fetches() {
        let mut source = StaticSource::new(Some("[]"), None);
        assert!(source.fetch_verses().is_ok());
        assert!(source.fetch_slogans().is_err());
        assert!(source.fetch_slogans().is_err());
        assert_eq!(source.verse_fetches, 1);
        assert_eq!(source.slogan_fetches, 2);
    }
}
