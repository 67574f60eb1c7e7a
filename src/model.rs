//! Data structures describing the logical content of the report.
//!
//! The types in this module form an append-only content model that mirrors
//! the building blocks understood by the render step. They avoid referencing
//! the rendering crate directly (apart from the alignment conversion) so
//! content can be assembled and inspected without a loaded font.

use std::sync::Arc;

use crate::charts::ChartImage;
use crate::style::names;
use crate::table::TableBlock;

/// Horizontal placement of text and images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
    /// Fully justified paragraphs.
    Justified,
}

impl From<HorizontalAlignment> for genpdf::Alignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left | HorizontalAlignment::Justified => genpdf::Alignment::Left,
            HorizontalAlignment::Center => genpdf::Alignment::Center,
            HorizontalAlignment::Right => genpdf::Alignment::Right,
        }
    }
}

/// Heading depth; each level maps to one named heading style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Name of the stylesheet entry used for this level.
    pub fn style_name(self) -> &'static str {
        match self {
            HeadingLevel::H1 => names::HEADING1,
            HeadingLevel::H2 => names::HEADING2,
            HeadingLevel::H3 => names::HEADING3,
        }
    }
}

/// Bullet list depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletLevel {
    First,
    Second,
}

impl BulletLevel {
    pub fn style_name(self) -> &'static str {
        match self {
            BulletLevel::First => names::BULLET,
            BulletLevel::Second => names::BULLET2,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            BulletLevel::First => "\u{2022}",
            BulletLevel::Second => "\u{2013}",
        }
    }
}

/// A paragraph of inline markup rendered with a named style.
///
/// The text uses the markup understood by [`crate::richtext::parse_runs`];
/// bullet entries carry the glyph printed ahead of the text.
#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphBlock {
    style: String,
    text: String,
    bullet: Option<&'static str>,
}

impl ParagraphBlock {
    pub fn new(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            text: text.into(),
            bullet: None,
        }
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bullet(&self) -> Option<&'static str> {
        self.bullet
    }
}

/// An embedded raster image together with its print size.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    png: Arc<[u8]>,
    width_mm: f64,
    height_mm: f64,
    alignment: HorizontalAlignment,
    caption: Option<String>,
}

impl ImageBlock {
    /// Creates a centered image block printed at the given size.
    pub fn new(png: impl Into<Arc<[u8]>>, width_mm: f64, height_mm: f64) -> Self {
        Self {
            png: png.into(),
            width_mm,
            height_mm,
            alignment: HorizontalAlignment::Center,
            caption: None,
        }
    }

    /// Creates an image block for a generated chart at the chart's print size.
    pub fn from_chart(chart: &ChartImage) -> Self {
        Self::new(chart.shared_bytes(), chart.width_mm(), chart.height_mm())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_caption(mut self, caption: impl Into<Option<String>>) -> Self {
        self.caption = caption.into();
        self
    }
}

/// Individual content blocks, in page-flow order.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Heading rendered with the style for its level.
    Heading { level: HeadingLevel, text: String },
    /// Styled paragraph or bullet entry.
    Paragraph(ParagraphBlock),
    /// Themed table.
    Table(TableBlock),
    /// Embedded chart or picture.
    Image(ImageBlock),
    /// Fixed vertical whitespace.
    Spacer { height_mm: f64 },
    /// Explicit page break request.
    PageBreak,
}

impl Block {
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    /// A paragraph in the named style.
    pub fn paragraph(style: &str, text: impl Into<String>) -> Self {
        Self::Paragraph(ParagraphBlock::new(style, text))
    }

    /// A body-text paragraph.
    pub fn body(text: impl Into<String>) -> Self {
        Self::paragraph(names::BODY, text)
    }

    /// A bullet entry at the given depth.
    pub fn bullet(level: BulletLevel, text: impl Into<String>) -> Self {
        Self::Paragraph(ParagraphBlock {
            style: level.style_name().to_string(),
            text: text.into(),
            bullet: Some(level.glyph()),
        })
    }

    pub fn image(chart: &ChartImage) -> Self {
        Self::Image(ImageBlock::from_chart(chart))
    }

    pub fn spacer(height_mm: f64) -> Self {
        Self::Spacer { height_mm }
    }

    /// Convenience helper that yields an explicit page break block.
    pub fn page_break() -> Self {
        Self::PageBreak
    }
}

/// Metadata that describes the cover page of the report.
#[derive(Clone, Debug, PartialEq)]
pub struct Cover {
    title: String,
    subtitle: Option<String>,
    top_spacing_mm: f64,
    blocks: Vec<Block>,
}

impl Cover {
    /// Creates a new cover with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            top_spacing_mm: 0.0,
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// Whitespace printed above the title.
    pub fn top_spacing_mm(&self) -> f64 {
        self.top_spacing_mm
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<Option<String>>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_top_spacing_mm(mut self, spacing: f64) -> Self {
        self.top_spacing_mm = spacing;
        self
    }

    /// Appends a block to the cover and returns the updated instance.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the cover with multiple blocks and returns the updated instance.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }
}

/// Logical representation of one top-level report topic.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    title: String,
    blocks: Vec<Block>,
}

impl Section {
    /// Creates a new section with the provided title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Whether the section closes with an explicit page break.
    pub fn ends_with_page_break(&self) -> bool {
        matches!(self.blocks.last(), Some(Block::PageBreak))
    }

    /// Appends a block and returns the updated section.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the section with additional blocks and returns the updated instance.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Creates a builder that can append a closing page break.
    pub fn builder(title: impl Into<String>) -> SectionBuilder {
        SectionBuilder::new(title)
    }
}

/// Builder for [`Section`] values.
///
/// Callers opt in to closing the section with a page break via
/// [`SectionBuilder::page_break_after`], so the next section starts on a
/// fresh page.
#[derive(Clone, Debug, Default)]
pub struct SectionBuilder {
    title: String,
    blocks: Vec<Block>,
    page_break_after: bool,
}

impl SectionBuilder {
    /// Creates a builder for a section with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Marks the section to be followed by a page break.
    pub fn page_break_after(mut self, page_break_after: bool) -> Self {
        self.page_break_after = page_break_after;
        self
    }

    /// Pushes an additional block into the section.
    pub fn push_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the builder with multiple blocks.
    pub fn extend_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Builds the final section, appending a page break when requested.
    pub fn build(mut self) -> Section {
        if self.page_break_after {
            match self.blocks.last() {
                Some(Block::PageBreak) => {}
                _ => self.blocks.push(Block::PageBreak),
            }
        }

        Section {
            title: self.title,
            blocks: self.blocks,
        }
    }
}

/// The complete report: a cover, the numbered sections and closing blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    cover: Cover,
    sections: Vec<Section>,
    closing: Vec<Block>,
}

impl Report {
    pub fn new(cover: Cover) -> Self {
        Self {
            cover,
            sections: Vec::new(),
            closing: Vec::new(),
        }
    }

    pub fn cover(&self) -> &Cover {
        &self.cover
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Blocks appended after the last section (footer rule, copyright).
    pub fn closing(&self) -> &[Block] {
        &self.closing
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_closing_block(mut self, block: Block) -> Self {
        self.closing.push(block);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, BulletLevel, Section};

    #[test]
    fn builder_appends_page_break() {
        let section = Section::builder("Intro")
            .page_break_after(true)
            .push_block(Block::body("text"))
            .build();

        assert!(matches!(section.blocks().last(), Some(Block::PageBreak)));
        assert!(section.ends_with_page_break());
    }

    #[test]
    fn builder_does_not_duplicate_page_break() {
        let section = Section::builder("Intro")
            .page_break_after(true)
            .push_block(Block::PageBreak)
            .build();

        assert_eq!(section.blocks().len(), 1);
    }

    #[test]
    fn bullets_use_level_styles() {
        let Block::Paragraph(first) = Block::bullet(BulletLevel::First, "a") else {
            panic!("bullet should be a paragraph");
        };
        let Block::Paragraph(second) = Block::bullet(BulletLevel::Second, "b") else {
            panic!("bullet should be a paragraph");
        };
        assert_eq!(first.style(), "bullet");
        assert_eq!(second.style(), "bullet2");
        assert_eq!(first.bullet(), Some("\u{2022}"));
        assert_eq!(second.bullet(), Some("\u{2013}"));
    }
}
