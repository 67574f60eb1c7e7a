//! Turns a [`Report`] into an ordered block sequence and renders that
//! sequence to a paginated PDF.
//!
//! The assembler only appends blocks; it never edits a block once created.
//! Rendering happens entirely in memory and the output file is written only
//! after the whole document (and its optional outline) has been produced, so
//! a failed render never leaves a partial file behind.

use std::fs;
use std::path::{Path, PathBuf};

use genpdf::elements::{PageBreak, Paragraph};
use genpdf::error::ErrorKind;
use genpdf::style::StyledString;
use genpdf::{Alignment, Element};
use log::{debug, info};

use crate::builder::{DocumentBuilder, PageTracker, SectionMark};
use crate::elements::{
    mm_from_f64, IndentedParagraph, PageAnchor, SizedImage, Spacer, ThemedTable,
};
use crate::error::{ReportError, Result};
use crate::fonts::FontFiles;
use crate::model::{Block, HeadingLevel, ImageBlock, ParagraphBlock, Report};
use crate::richtext::styled_runs;
use crate::style::{build_styles, names, StyleSheet};
use crate::table::{self, ColumnWidths, TableBlock};
use crate::theme::Theme;

/// Default document font size in points.
const BASE_FONT_SIZE: u8 = 9;

/// Slack allowed when checking image sizes against the page body.
const IMAGE_FIT_TOLERANCE_MM: f64 = 0.5;

/// Space that must remain below a heading for it to stay on the current page.
fn keep_with_next_mm(level: HeadingLevel) -> f64 {
    match level {
        HeadingLevel::H1 => 40.0,
        HeadingLevel::H2 => 25.0,
        HeadingLevel::H3 => 18.0,
    }
}

/// A rendered document held in memory.
#[derive(Clone, Debug)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub pages: usize,
    /// Level-one headings and the pages they landed on.
    pub sections: Vec<SectionMark>,
}

/// Summary of a document written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub size_bytes: usize,
    pub pages: usize,
    pub sections: Vec<SectionMark>,
}

pub struct DocumentAssembler {
    theme: Theme,
    fonts: FontFiles,
    styles: StyleSheet,
    title: Option<String>,
}

impl DocumentAssembler {
    pub fn new(theme: Theme, fonts: FontFiles) -> Self {
        let styles = build_styles(&theme);
        Self {
            theme,
            fonts,
            styles,
            title: None,
        }
    }

    /// Sets the title stored in the PDF metadata.
    pub fn with_document_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Builds a themed table sized against this assembler's page geometry.
    pub fn build_table<R, C, S>(&self, rows: R, widths: &ColumnWidths) -> Result<TableBlock>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        table::build_table(rows, widths, &self.theme)
    }

    /// Flattens the report into page-flow order: cover, numbered sections,
    /// closing blocks.
    pub fn assemble(&self, report: &Report) -> Vec<Block> {
        let cover = report.cover();
        let mut blocks = Vec::new();

        if cover.top_spacing_mm() > 0.0 {
            blocks.push(Block::spacer(cover.top_spacing_mm()));
        }
        blocks.push(Block::paragraph(names::TITLE, cover.title()));
        if let Some(subtitle) = cover.subtitle() {
            blocks.push(Block::paragraph(names::SUBTITLE, subtitle));
        }
        blocks.extend(cover.blocks().iter().cloned());
        blocks.push(Block::page_break());

        for (index, section) in report.sections().iter().enumerate() {
            blocks.push(Block::heading(
                HeadingLevel::H1,
                format!("{}. {}", index + 1, section.title()),
            ));
            blocks.extend(section.blocks().iter().cloned());
        }

        blocks.extend(report.closing().iter().cloned());
        debug!(
            "assembled {} blocks from {} sections",
            blocks.len(),
            report.sections().len()
        );
        blocks
    }

    /// Renders `blocks` into memory.
    pub fn render_to_vec(&self, blocks: &[Block]) -> Result<RenderedDocument> {
        self.validate(blocks)?;

        let page = &self.theme.page;
        let body_height = page.body_height_mm();
        let tracker = PageTracker::new();
        let footer_style = self.styles.resolve(names::FOOTER)?.text_style();

        let mut builder = DocumentBuilder::for_page(page)
            .with_font_size(BASE_FONT_SIZE)
            .with_page_tracker(tracker.clone())
            .with_footer(mm_from_f64(page.footer_height_mm), move |number| {
                Paragraph::new(StyledString::new(format!("Page {number}"), footer_style))
                    .aligned(Alignment::Center)
            });
        if let Some(title) = &self.title {
            builder = builder.with_title(title.clone());
        }

        let family = self.fonts.load_family()?;
        let mut document = builder.build(family);

        for block in blocks {
            match block {
                Block::Heading { level, text } => {
                    let mut anchor =
                        PageAnchor::new(tracker.clone(), keep_with_next_mm(*level), body_height);
                    if *level == HeadingLevel::H1 {
                        anchor = anchor.with_section(text.clone());
                    }
                    document.push(anchor);

                    let spec = self.styles.resolve(level.style_name())?;
                    let heading =
                        Paragraph::new(StyledString::new(text.clone(), spec.text_style()))
                            .aligned(spec.genpdf_alignment());
                    document.push(
                        IndentedParagraph::new(heading, spec.text_indent_mm())
                            .padded(spec.spacing()),
                    );
                }
                Block::Paragraph(paragraph) => {
                    document.push(self.paragraph_element(paragraph)?);
                }
                Block::Table(table) => {
                    document.push(ThemedTable::new(table.clone(), body_height));
                }
                Block::Image(image) => {
                    document.push(self.image_element(image)?);
                }
                Block::Spacer { height_mm } => {
                    document.push(Spacer::new(*height_mm));
                }
                Block::PageBreak => {
                    document.push(PageBreak::new());
                }
            }
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(|err| match err.kind() {
            ErrorKind::PageSizeExceeded => ReportError::layout(err.to_string()),
            _ => ReportError::Pdf(err),
        })?;

        let pages = tracker.current_page().max(1);
        let sections = tracker.marks();
        debug!("laid out {pages} pages with {} sections", sections.len());

        #[cfg(feature = "bookmarks")]
        let bytes = crate::bookmarks::apply_section_bookmarks(&bytes, &sections)?;

        Ok(RenderedDocument {
            bytes,
            pages,
            sections,
        })
    }

    /// Renders `blocks` and writes the PDF to `path`, replacing any existing file.
    pub fn render(&self, blocks: &[Block], path: impl AsRef<Path>) -> Result<RenderOutcome> {
        let path = path.as_ref();
        let rendered = self.render_to_vec(blocks)?;
        fs::write(path, &rendered.bytes)?;
        info!(
            "wrote {} ({} pages, {} bytes)",
            path.display(),
            rendered.pages,
            rendered.bytes.len()
        );

        Ok(RenderOutcome {
            path: path.to_path_buf(),
            size_bytes: rendered.bytes.len(),
            pages: rendered.pages,
            sections: rendered.sections,
        })
    }

    /// Rejects blocks that can never be placed, before any layout work starts.
    fn validate(&self, blocks: &[Block]) -> Result<()> {
        let page = &self.theme.page;
        for block in blocks {
            match block {
                Block::Image(image) => {
                    if image.bytes().is_empty() {
                        return Err(ReportError::data("image block has an empty buffer"));
                    }
                    if image.width_mm() > page.usable_width_mm() + IMAGE_FIT_TOLERANCE_MM {
                        return Err(ReportError::layout(format!(
                            "image is {:.1} mm wide but the page body is {:.1} mm",
                            image.width_mm(),
                            page.usable_width_mm()
                        )));
                    }
                    if image.height_mm() > page.body_height_mm() + IMAGE_FIT_TOLERANCE_MM {
                        return Err(ReportError::layout(format!(
                            "image is {:.1} mm tall but the page body is {:.1} mm",
                            image.height_mm(),
                            page.body_height_mm()
                        )));
                    }
                }
                Block::Table(table) => {
                    let usable = page.usable_width_mm();
                    if table.total_width_mm() > usable + table::WIDTH_TOLERANCE_MM {
                        return Err(ReportError::layout(format!(
                            "table is {:.1} mm wide but the page body is {usable:.1} mm",
                            table.total_width_mm()
                        )));
                    }
                }
                Block::Paragraph(paragraph) => {
                    self.styles.resolve(paragraph.style())?;
                }
                Block::Heading { .. } | Block::Spacer { .. } | Block::PageBreak => {}
            }
        }
        Ok(())
    }

    fn paragraph_element(&self, block: &ParagraphBlock) -> Result<impl Element> {
        let spec = self.styles.resolve(block.style())?;
        let base = spec.text_style();
        let runs = styled_runs(block.text(), base).map_err(|err| {
            ReportError::data(format!("invalid markup in '{}': {err}", block.text()))
        })?;

        let mut paragraph = Paragraph::default();
        for run in runs {
            paragraph.push(run);
        }
        paragraph.set_alignment(spec.genpdf_alignment());

        let mut element = IndentedParagraph::new(paragraph, spec.text_indent_mm());
        if let Some(glyph) = block.bullet() {
            element = element.with_bullet(StyledString::new(glyph, base), spec.bullet_indent_mm());
        }
        Ok(element.padded(spec.spacing()))
    }

    fn image_element(&self, block: &ImageBlock) -> Result<SizedImage> {
        let image = SizedImage::from_bytes(block.bytes(), block.width_mm(), block.height_mm())
            .map_err(|err| ReportError::data(format!("image could not be decoded: {err}")))?;
        let image = match block.caption() {
            Some(caption) => {
                let spec = self.styles.resolve(names::FOOTER)?;
                image.with_caption(Paragraph::new(StyledString::new(
                    caption.to_string(),
                    spec.text_style(),
                )))
            }
            None => image,
        };
        Ok(image.with_alignment(block.alignment()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cover, Section};
    use std::path::PathBuf;

    fn assembler() -> DocumentAssembler {
        let fonts = FontFiles {
            family: "Test".into(),
            regular: PathBuf::from("Regular.ttf"),
            bold: PathBuf::from("Bold.ttf"),
            italic: PathBuf::from("Regular.ttf"),
            bold_italic: PathBuf::from("Bold.ttf"),
        };
        DocumentAssembler::new(Theme::default(), fonts)
    }

    fn report() -> Report {
        Report::new(
            Cover::new("Let's Watch")
                .with_subtitle(Some("Project Report".to_string()))
                .with_top_spacing_mm(30.0)
                .with_block(Block::body("Prepared by the team")),
        )
        .with_section(Section::new("Project Definition").with_block(Block::body("one")))
        .with_section(
            Section::builder("User Flow")
                .push_block(Block::body("two"))
                .page_break_after(true)
                .build(),
        )
        .with_closing_block(Block::body("closing"))
    }

    #[test]
    fn assembles_cover_then_numbered_sections() {
        let blocks = assembler().assemble(&report());

        assert_eq!(blocks[0], Block::spacer(30.0));
        assert_eq!(blocks[1], Block::paragraph(names::TITLE, "Let's Watch"));
        assert_eq!(blocks[2], Block::paragraph(names::SUBTITLE, "Project Report"));
        assert_eq!(blocks[3], Block::body("Prepared by the team"));
        assert_eq!(blocks[4], Block::PageBreak);
        assert_eq!(
            blocks[5],
            Block::heading(HeadingLevel::H1, "1. Project Definition")
        );
        assert_eq!(blocks[7], Block::heading(HeadingLevel::H1, "2. User Flow"));
        assert_eq!(blocks[9], Block::PageBreak);
        assert_eq!(blocks.last(), Some(&Block::body("closing")));
    }

    #[test]
    fn empty_image_buffer_is_a_data_error() {
        let blocks = vec![Block::Image(ImageBlock::new(Vec::new(), 50.0, 20.0))];
        let err = assembler().validate(&blocks).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Data);
    }

    #[test]
    fn oversize_image_is_a_layout_error() {
        let blocks = vec![Block::Image(ImageBlock::new(vec![1u8, 2, 3], 150.0, 280.0))];
        let err = assembler().validate(&blocks).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Layout);

        let blocks = vec![Block::Image(ImageBlock::new(vec![1u8, 2, 3], 190.0, 80.0))];
        let err = assembler().validate(&blocks).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Layout);
    }

    #[test]
    fn unknown_paragraph_style_is_rejected() {
        let blocks = vec![Block::paragraph("caption", "x")];
        assert!(assembler().validate(&blocks).is_err());
    }

    #[test]
    fn tables_use_the_usable_width() {
        let table = assembler()
            .build_table(
                [["Metric", "Value"], ["Users", "25,000"]],
                &ColumnWidths::Proportional(vec![1.0, 1.0]),
            )
            .unwrap();
        assert!((table.total_width_mm() - 170.0).abs() < 1e-6);
    }

    #[test]
    fn empty_font_files_fail_the_render_with_a_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let regular = dir.path().join("Regular.ttf");
        let bold = dir.path().join("Bold.ttf");
        std::fs::write(&regular, b"").unwrap();
        std::fs::write(&bold, b"").unwrap();
        let fonts = FontFiles {
            family: "Empty".into(),
            regular: regular.clone(),
            bold: bold.clone(),
            italic: regular,
            bold_italic: bold,
        };

        let err = DocumentAssembler::new(Theme::default(), fonts)
            .render_to_vec(&[Block::body("text")])
            .unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Resource);
    }
}
