//! Core entry point for the pitch_report crate.
//!
//! The crate renders the Let's Watch project report: charts are drawn to PNG
//! buffers first, then text, tables and chart images are assembled into a
//! block sequence and paginated onto A4 pages with `genpdf`.

pub mod assembler;
pub mod builder;
pub mod charts;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod model;
pub mod report;
pub mod richtext;
pub mod style;
pub mod table;
pub mod theme;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

use std::path::{Path, PathBuf};

use log::debug;

pub use assembler::{DocumentAssembler, RenderOutcome, RenderedDocument};
pub use charts::ChartFactory;
pub use error::{ErrorCategory, ReportError, Result};
pub use theme::Theme;

/// Inputs of a report run.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    output: PathBuf,
    fonts_dir: Option<PathBuf>,
    theme: Theme,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(report::OUTPUT_FILE_NAME),
            fonts_dir: None,
            theme: Theme::default(),
        }
    }
}

impl ReportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the PDF to write; an existing file is replaced.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Directory searched first for the report font family.
    pub fn with_fonts_dir(mut self, fonts_dir: impl Into<Option<PathBuf>>) -> Self {
        self.fonts_dir = fonts_dir.into();
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn fonts_dir(&self) -> Option<&Path> {
        self.fonts_dir.as_deref()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }
}

/// Generates every chart, assembles the report and writes the PDF.
pub fn generate_report(options: &ReportOptions) -> Result<RenderOutcome> {
    let fonts = fonts::resolve_fonts(options.fonts_dir())?;
    debug!("report fonts: {} ({})", fonts.family, fonts.regular.display());

    let factory = ChartFactory::new(options.theme(), &fonts)?;
    let charts = report::ReportCharts::generate(&factory)?;

    let assembler = DocumentAssembler::new(options.theme().clone(), fonts)
        .with_document_title(format!("{} - Project Report", report::REPORT_TITLE));
    let content = report::build_report(&charts, &assembler)?;
    let blocks = assembler.assemble(&content);

    assembler.render(&blocks, options.output())
}
