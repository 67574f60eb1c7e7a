//! Error types for the pitch_report crate.

use std::io;

use thiserror::Error;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Coarse classification of [`ReportError`] values.
///
/// Every category is fatal for a render; the classification only exists so
/// callers and tests can tell what kind of input caused the abort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A font or other local asset could not be located or loaded.
    Resource,
    /// A block does not fit the usable page area.
    Layout,
    /// Malformed table, chart or markup input.
    Data,
    /// Failures while producing or writing the output.
    Output,
}

/// Errors that can occur while generating charts or rendering the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No usable font family could be found.
    #[error("resource unavailable: {0}")]
    Resource(String),

    /// A font family was located but `genpdf` could not load it.
    #[error("failed to load font family '{family}'")]
    FontLoad {
        family: String,
        #[source]
        source: genpdf::error::Error,
    },

    /// A block exceeds the usable page area or column widths do not fit.
    #[error("layout error: {0}")]
    Layout(String),

    /// Malformed table, chart or markup input.
    #[error("invalid data: {0}")]
    Data(String),

    /// The chart rasterizer failed.
    #[error("chart rendering failed: {0}")]
    Chart(String),

    /// The PDF engine failed while laying out or writing the document.
    #[error("PDF rendering failed")]
    Pdf(#[from] genpdf::error::Error),

    /// I/O error when reading fonts or writing the output file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The rendered PDF could not be post-processed with section bookmarks.
    #[cfg(feature = "bookmarks")]
    #[error("failed to embed section bookmarks")]
    Bookmark(#[from] crate::bookmarks::BookmarkError),
}

impl ReportError {
    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Resource(_) | Self::FontLoad { .. } => ErrorCategory::Resource,
            Self::Layout(_) => ErrorCategory::Layout,
            Self::Data(_) => ErrorCategory::Data,
            Self::Chart(_) | Self::Pdf(_) | Self::Io(_) => ErrorCategory::Output,
            #[cfg(feature = "bookmarks")]
            Self::Bookmark(_) => ErrorCategory::Output,
        }
    }

    pub(crate) fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub(crate) fn layout(message: impl Into<String>) -> Self {
        Self::Layout(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            ReportError::Resource("fonts".into()).category(),
            ErrorCategory::Resource
        );
        assert_eq!(ReportError::layout("too tall").category(), ErrorCategory::Layout);
        assert_eq!(ReportError::data("ragged").category(), ErrorCategory::Data);
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        assert_eq!(ReportError::from(io_err).category(), ErrorCategory::Output);
    }
}
