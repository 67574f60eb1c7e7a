//! Named, inheritable paragraph styles.
//!
//! Styles are described with typographic points the same way the report was
//! originally drafted, and converted to `genpdf` styles and margins only when
//! the document is rendered. A [`StyleSpec`] is a value: deriving a child
//! copies the parent's attributes, records the parent name, and applies the
//! overrides. Once placed in a [`StyleSheet`] styles are only handed out by
//! shared reference.

use std::collections::BTreeMap;

use genpdf::style::Style;
use genpdf::{Alignment, Margins};

use crate::elements::{mm_from_f64, pt_to_mm};
use crate::error::{ReportError, Result};
use crate::model::HorizontalAlignment;
use crate::theme::{Rgb, Theme};

/// Ratio between the line height `genpdf` derives from a font and its size.
const FONT_LINE_HEIGHT_RATIO: f64 = 1.2;

/// Names of the styles produced by [`build_styles`].
pub mod names {
    pub const TITLE: &str = "title";
    pub const SUBTITLE: &str = "subtitle";
    pub const HEADING1: &str = "heading1";
    pub const HEADING2: &str = "heading2";
    pub const HEADING3: &str = "heading3";
    pub const BODY: &str = "body";
    pub const BULLET: &str = "bullet";
    pub const BULLET2: &str = "bullet2";
    pub const FOOTER: &str = "footer";
}

/// A named bundle of presentation attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSpec {
    name: String,
    parent: Option<String>,
    font_size: f64,
    bold: bool,
    italic: bool,
    color: Rgb,
    alignment: HorizontalAlignment,
    leading: f64,
    space_before: f64,
    space_after: f64,
    left_indent: f64,
    bullet_indent: f64,
}

impl StyleSpec {
    /// Creates a root style: 10pt regular black text with 12pt leading.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            font_size: 10.0,
            bold: false,
            italic: false,
            color: Rgb::BLACK,
            alignment: HorizontalAlignment::Left,
            leading: 12.0,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
            bullet_indent: 0.0,
        }
    }

    /// Creates a child style inheriting every attribute from `self`.
    pub fn derive(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(self.name.clone()),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the style this one was derived from.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Font size in points.
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Baseline-to-baseline distance in points.
    pub fn leading(&self) -> f64 {
        self.leading
    }

    pub fn space_before(&self) -> f64 {
        self.space_before
    }

    pub fn space_after(&self) -> f64 {
        self.space_after
    }

    /// Indent of the text body in points.
    pub fn left_indent(&self) -> f64 {
        self.left_indent
    }

    /// Indent of the bullet glyph in points.
    pub fn bullet_indent(&self) -> f64 {
        self.bullet_indent
    }

    pub fn with_font_size(mut self, points: f64) -> Self {
        self.font_size = points;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn aligned(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_leading(mut self, points: f64) -> Self {
        self.leading = points;
        self
    }

    pub fn with_space_before(mut self, points: f64) -> Self {
        self.space_before = points;
        self
    }

    pub fn with_space_after(mut self, points: f64) -> Self {
        self.space_after = points;
        self
    }

    pub fn with_left_indent(mut self, points: f64) -> Self {
        self.left_indent = points;
        self
    }

    pub fn with_bullet_indent(mut self, points: f64) -> Self {
        self.bullet_indent = points;
        self
    }

    /// Font size rounded to the whole points `genpdf` supports.
    pub fn font_size_pt(&self) -> u8 {
        self.font_size.round().clamp(1.0, 255.0) as u8
    }

    /// Converts the text attributes into a `genpdf` style.
    pub fn text_style(&self) -> Style {
        let mut style = Style::new()
            .with_font_size(self.font_size_pt())
            .with_color(self.color.into());
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        let natural = self.font_size * FONT_LINE_HEIGHT_RATIO;
        if natural > f64::EPSILON {
            style.set_line_spacing((self.leading / natural).max(1.0));
        }
        style
    }

    /// Space before and after the paragraph, as `genpdf` margins.
    pub fn spacing(&self) -> Margins {
        Margins::trbl(
            mm_from_f64(pt_to_mm(self.space_before)),
            mm_from_f64(0.0),
            mm_from_f64(pt_to_mm(self.space_after)),
            mm_from_f64(0.0),
        )
    }

    /// Left edge of the text body in millimetres.
    pub fn text_indent_mm(&self) -> f64 {
        pt_to_mm(self.left_indent)
    }

    /// Left edge of the bullet glyph in millimetres. Wrapped lines hang at
    /// [`StyleSpec::text_indent_mm`].
    pub fn bullet_indent_mm(&self) -> f64 {
        pt_to_mm(self.bullet_indent)
    }

    /// `genpdf` has no justified mode; justified text is set flush left.
    pub fn genpdf_alignment(&self) -> Alignment {
        self.alignment.into()
    }
}

/// An immutable lookup table of styles keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleSheet {
    styles: BTreeMap<String, StyleSpec>,
}

impl StyleSheet {
    /// Creates an empty stylesheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The base stylesheet every report style is derived from.
    pub fn base() -> Self {
        BaseStyles::new().into_sheet()
    }

    /// Adds (or replaces) a style and returns the updated sheet.
    pub fn with_style(mut self, spec: StyleSpec) -> Self {
        self.styles.insert(spec.name.clone(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&StyleSpec> {
        self.styles.get(name)
    }

    /// Looks up a style, failing with a data error for unknown names.
    pub fn resolve(&self, name: &str) -> Result<&StyleSpec> {
        self.get(name)
            .ok_or_else(|| ReportError::data(format!("unknown paragraph style '{name}'")))
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

struct BaseStyles {
    normal: StyleSpec,
    title: StyleSpec,
    heading1: StyleSpec,
    heading2: StyleSpec,
    heading3: StyleSpec,
}

impl BaseStyles {
    fn new() -> Self {
        let normal = StyleSpec::root("Normal");
        let title = normal
            .derive("Title")
            .with_font_size(18.0)
            .with_leading(22.0)
            .bold()
            .aligned(HorizontalAlignment::Center)
            .with_space_after(6.0);
        let heading1 = normal
            .derive("Heading1")
            .with_font_size(18.0)
            .with_leading(22.0)
            .bold()
            .with_space_after(6.0);
        let heading2 = normal
            .derive("Heading2")
            .with_font_size(14.0)
            .with_leading(18.0)
            .bold()
            .with_space_before(12.0)
            .with_space_after(6.0);
        let heading3 = normal
            .derive("Heading3")
            .with_font_size(12.0)
            .with_leading(14.4)
            .bold()
            .with_space_before(12.0)
            .with_space_after(6.0);
        Self {
            normal,
            title,
            heading1,
            heading2,
            heading3,
        }
    }

    fn into_sheet(self) -> StyleSheet {
        StyleSheet::new()
            .with_style(self.normal)
            .with_style(self.title)
            .with_style(self.heading1)
            .with_style(self.heading2)
            .with_style(self.heading3)
    }
}

/// Builds the fixed report style palette on top of the base stylesheet.
pub fn build_styles(theme: &Theme) -> StyleSheet {
    let palette = &theme.palette;
    let base = BaseStyles::new();

    let title = base
        .title
        .derive(names::TITLE)
        .with_font_size(26.0)
        .with_color(palette.primary)
        .with_space_after(4.0)
        .aligned(HorizontalAlignment::Center);
    let subtitle = base
        .normal
        .derive(names::SUBTITLE)
        .with_font_size(11.0)
        .with_color(palette.muted)
        .aligned(HorizontalAlignment::Center)
        .with_space_after(16.0);
    let heading1 = base
        .heading1
        .derive(names::HEADING1)
        .with_font_size(16.0)
        .with_color(palette.dark)
        .with_space_before(16.0)
        .with_space_after(8.0);
    let heading2 = base
        .heading2
        .derive(names::HEADING2)
        .with_font_size(13.0)
        .with_color(palette.accent)
        .with_space_before(12.0)
        .with_space_after(6.0);
    let heading3 = base
        .heading3
        .derive(names::HEADING3)
        .with_font_size(10.0)
        .with_color(palette.info)
        .with_space_before(6.0)
        .with_space_after(4.0);
    let body = base
        .normal
        .derive(names::BODY)
        .with_font_size(9.0)
        .with_color(palette.text)
        .with_space_after(5.0)
        .with_leading(13.0)
        .aligned(HorizontalAlignment::Justified);
    let bullet = base
        .normal
        .derive(names::BULLET)
        .with_font_size(9.0)
        .with_color(palette.text)
        .with_left_indent(18.0)
        .with_bullet_indent(8.0)
        .with_space_before(1.0)
        .with_space_after(1.0)
        .with_leading(12.0);
    let bullet2 = base
        .normal
        .derive(names::BULLET2)
        .with_font_size(8.5)
        .with_color(palette.text)
        .with_left_indent(30.0)
        .with_bullet_indent(20.0)
        .with_space_before(1.0)
        .with_space_after(1.0)
        .with_leading(11.0);
    let footer = base
        .normal
        .derive(names::FOOTER)
        .with_font_size(8.0)
        .with_color(palette.muted)
        .aligned(HorizontalAlignment::Center);

    base.into_sheet()
        .with_style(title)
        .with_style(subtitle)
        .with_style(heading1)
        .with_style(heading2)
        .with_style(heading3)
        .with_style(body)
        .with_style(bullet)
        .with_style(bullet2)
        .with_style(footer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_style_inherits_and_overrides() {
        let parent = StyleSpec::root("Normal").with_leading(14.0);
        let child = parent.derive("Loud").with_font_size(20.0).bold();
        assert_eq!(child.parent(), Some("Normal"));
        assert_eq!(child.leading(), 14.0);
        assert_eq!(child.font_size(), 20.0);
        assert!(child.is_bold());
        assert!(!parent.is_bold());
    }

    #[test]
    fn report_palette_defines_every_named_style() {
        let theme = Theme::default();
        let sheet = build_styles(&theme);
        for name in [
            names::TITLE,
            names::SUBTITLE,
            names::HEADING1,
            names::HEADING2,
            names::HEADING3,
            names::BODY,
            names::BULLET,
            names::BULLET2,
            names::FOOTER,
        ] {
            assert!(sheet.get(name).is_some(), "missing style {name}");
        }
        let title = sheet.resolve(names::TITLE).unwrap();
        assert_eq!(title.parent(), Some("Title"));
        assert_eq!(title.color(), theme.palette.primary);
        assert_eq!(title.alignment(), HorizontalAlignment::Center);
    }

    #[test]
    fn second_level_bullets_indent_further() {
        let sheet = build_styles(&Theme::default());
        let first = sheet.resolve(names::BULLET).unwrap();
        let second = sheet.resolve(names::BULLET2).unwrap();
        assert!(second.left_indent() > first.left_indent());
        assert!(second.bullet_indent() > first.bullet_indent());
    }

    #[test]
    fn bullet_text_hangs_past_the_glyph() {
        let sheet = build_styles(&Theme::default());
        for name in [names::BULLET, names::BULLET2] {
            let spec = sheet.resolve(name).unwrap();
            assert!(spec.text_indent_mm() > spec.bullet_indent_mm());
        }
        let first = sheet.resolve(names::BULLET).unwrap();
        assert!((first.text_indent_mm() - pt_to_mm(18.0)).abs() < 1e-9);
        assert!((first.bullet_indent_mm() - pt_to_mm(8.0)).abs() < 1e-9);
    }

    #[test]
    fn unknown_style_is_a_data_error() {
        let sheet = StyleSheet::base();
        let err = sheet.resolve("nope").unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Data);
    }

    #[test]
    fn fractional_sizes_round_for_genpdf() {
        let spec = StyleSpec::root("x").with_font_size(8.4);
        assert_eq!(spec.font_size_pt(), 8);
    }
}
