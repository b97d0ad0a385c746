// Error taxonomy for the page.
//
// None of these ever reach the user as a crash. `DatasetUnavailable` is
// recovered with built-in fallback content, `ImageLoadFailure` with one
// same-tag alternate, `RenderFailure` with a static error pane. `Config` only
// occurs at startup, before a page exists.

use std::fmt;

use thiserror::Error;

/// Which external dataset a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Verses,
    Slogans,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Verses => write!(f, "verse"),
            Dataset::Slogans => write!(f, "slogan"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    /// Fetch or parse failure for one of the datasets.
    #[error("{dataset} dataset unavailable: {reason}")]
    DatasetUnavailable { dataset: Dataset, reason: String },

    /// An image failed to load in the presentation layer.
    #[error("image failed to load: {src}")]
    ImageLoadFailure { src: String },

    /// Something went wrong while building the render tree.
    #[error("render failed: {0}")]
    RenderFailure(String),

    #[error("invalid config: {0}")]
    Config(String),
}

impl PageError {
    pub fn dataset(dataset: Dataset, reason: impl fmt::Display) -> Self {
        PageError::DatasetUnavailable {
            dataset,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_error_message_names_the_dataset() {
        let err = PageError::dataset(Dataset::Slogans, "connection refused");
        assert_eq!(
            err.to_string(),
            "slogan dataset unavailable: connection refused"
        );
    }
}
