//! Custom element implementations built on top of `genpdf` primitives.
//!
//! `genpdf` ships paragraphs, images and a basic table layout, but its cell
//! decorators draw after the cell content, which rules out filled cell
//! backgrounds. [`ThemedTable`] therefore renders the whole grid itself. The
//! module also provides fixed-size images, millimetre spacers and the page
//! anchors used to keep headings with their content and to record section
//! pages.

use image::GenericImageView;
use log::debug;

use genpdf::elements::{Image, Paragraph};
use genpdf::error::{Context as _, Error, ErrorKind};
use genpdf::style::{Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Rotation, Scale, Size};

use crate::builder::PageTracker;
use crate::model::HorizontalAlignment;
use crate::table::TableBlock;
use crate::theme::Rgb;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;
const DEFAULT_CAPTION_SPACING_MM: f64 = 2.0;
const FIT_EPSILON_MM: f64 = 0.01;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Converts typographic points to millimetres.
pub(crate) fn pt_to_mm(points: f64) -> f64 {
    points * MM_PER_INCH / POINTS_PER_INCH
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> (f64, f64) {
    let (px_width, px_height) = image.dimensions();
    (
        MM_PER_INCH * (px_width as f64) / dpi,
        MM_PER_INCH * (px_height as f64) / dpi,
    )
}

/// Loads an image from in-memory bytes using the [`image`] crate with descriptive errors.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<image::DynamicImage, Error> {
    image::load_from_memory(bytes.as_ref()).context("Failed to decode image from provided bytes")
}

fn hairline(color: Rgb) -> Style {
    Style::new().with_color(color.into())
}

/// A solid rectangle in millimetres, relative to the top left corner of a table slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellFill {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
}

impl CellFill {
    /// Paints the rectangle as a one-pixel image stretched over it.
    ///
    /// `Area::draw_line` only strokes hairlines, so solid fills go through the
    /// image path: at 25.4 dpi one pixel is one millimetre and the scale is the
    /// size in millimetres.
    fn paint(&self, area: &render::Area<'_>) {
        let pixel = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            1,
            1,
            image::Rgb([self.color.r, self.color.g, self.color.b]),
        ));
        area.add_image(
            &pixel,
            Position::new(mm_from_f64(self.x), mm_from_f64(self.y + self.height)),
            Scale::new(self.width, self.height),
            Rotation::default(),
            Some(MM_PER_INCH),
        );
    }
}

/// Background rectangles for `rows` of `table`, one per cell, stacked from the
/// top of the slice. `heights` holds the height of every row of the table.
pub fn row_fills(
    table: &TableBlock,
    rows: std::ops::Range<usize>,
    heights: &[f64],
) -> Vec<CellFill> {
    let mut fills = Vec::with_capacity(rows.len() * table.columns());
    let mut y = 0.0;
    for row in rows {
        let height = heights[row];
        let mut x = 0.0;
        for (column, width) in table.column_widths_mm().iter().enumerate() {
            fills.push(CellFill {
                x,
                y,
                width: *width,
                height,
                color: table.cell_background(row, column),
            });
            x += width;
        }
        y += height;
    }
    fills
}

/// An image printed at an exact size, with an optional caption underneath.
///
/// The image is never split across pages: when the remaining space on the
/// current page is too small, the element asks for a new page.
pub struct SizedImage {
    image: Image,
    height_mm: f64,
    caption: Option<Paragraph>,
    image_done: bool,
}

impl SizedImage {
    /// Decodes `bytes` and scales the image to `width_mm` x `height_mm`.
    pub fn from_bytes(
        bytes: impl AsRef<[u8]>,
        width_mm: f64,
        height_mm: f64,
    ) -> Result<Self, Error> {
        let dynamic = decode_image_from_bytes(bytes)?;
        let (natural_width, natural_height) = estimated_image_size(&dynamic, DEFAULT_IMAGE_DPI);
        if natural_width <= f64::EPSILON || natural_height <= f64::EPSILON {
            return Err(Error::new("Image has no pixels", ErrorKind::InvalidData));
        }

        let mut image = Image::from_dynamic_image(dynamic)?;
        image.set_scale(Scale::new(
            width_mm / natural_width,
            height_mm / natural_height,
        ));

        Ok(Self {
            image,
            height_mm,
            caption: None,
            image_done: false,
        })
    }

    /// Sets the horizontal alignment of the image and its caption.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        let alignment: Alignment = alignment.into();
        self.image.set_alignment(alignment);
        if let Some(caption) = self.caption.as_mut() {
            caption.set_alignment(alignment);
        }
        self
    }

    /// Adds a caption paragraph below the image.
    pub fn with_caption(mut self, caption: Paragraph) -> Self {
        self.caption = Some(caption);
        self
    }
}

impl Element for SizedImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();

        if !self.image_done {
            if self.height_mm > mm_to_f64(area.size().height) + FIT_EPSILON_MM {
                result.has_more = true;
                return Ok(result);
            }
            let image_result = self.image.render(context, area.clone(), style)?;
            self.image_done = true;
            result.size = result.size.stack_vertical(image_result.size);
            area.add_offset(Position::new(0, image_result.size.height));
        }

        if let Some(caption) = self.caption.as_mut() {
            let spacing = mm_from_f64(DEFAULT_CAPTION_SPACING_MM);
            area.add_offset(Position::new(0, spacing));
            result.size = result.size.stack_vertical(Size::new(0, spacing));
            let caption_result = caption.render(context, area, style)?;
            result.size = result.size.stack_vertical(caption_result.size);
            result.has_more |= caption_result.has_more;
        }

        Ok(result)
    }
}

/// A paragraph whose text starts `text_indent_mm` from the left edge, with an
/// optional bullet glyph printed at its own indent on the first line.
pub struct IndentedParagraph {
    body: Paragraph,
    text_indent_mm: f64,
    glyph: Option<(StyledString, f64)>,
}

impl IndentedParagraph {
    pub fn new(body: Paragraph, text_indent_mm: f64) -> Self {
        Self {
            body,
            text_indent_mm,
            glyph: None,
        }
    }

    /// Hangs `glyph` at `indent_mm`; wrapped lines stay at the text indent.
    pub fn with_bullet(mut self, glyph: StyledString, indent_mm: f64) -> Self {
        self.glyph = Some((glyph, indent_mm));
        self
    }
}

impl Element for IndentedParagraph {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut text_area = area.clone();
        text_area.add_offset(Position::new(mm_from_f64(self.text_indent_mm), 0));
        let mut result = self.body.render(context, text_area, style)?;

        // The glyph goes out with the first line the body actually places.
        if mm_to_f64(result.size.height) > 0.0 {
            if let Some((glyph, indent_mm)) = self.glyph.take() {
                let glyph_style = style.and(glyph.style);
                area.print_str(
                    &context.font_cache,
                    Position::new(mm_from_f64(indent_mm), 0),
                    glyph_style,
                    &glyph.s,
                )?;
            }
        }

        result.size.width = result.size.width + mm_from_f64(self.text_indent_mm);
        Ok(result)
    }
}

/// Fixed vertical whitespace. A spacer that reaches the bottom of the page is
/// truncated instead of carrying over.
pub struct Spacer {
    height_mm: f64,
}

impl Spacer {
    pub fn new(height_mm: f64) -> Self {
        Self {
            height_mm: height_mm.max(0.0),
        }
    }
}

impl Element for Spacer {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let available = mm_to_f64(area.size().height);
        let mut result = RenderResult::default();
        result.size = Size::new(0, mm_from_f64(self.height_mm.min(available)));
        Ok(result)
    }
}

/// Zero-height marker placed in front of a heading.
///
/// When less than `min_space_mm` is left on the page the anchor pushes itself
/// (and therefore the following heading) to the next page. Once placed it
/// records the page number of the section in the shared [`PageTracker`].
pub struct PageAnchor {
    tracker: PageTracker,
    title: Option<String>,
    min_space_mm: f64,
    page_body_height_mm: f64,
}

impl PageAnchor {
    pub fn new(tracker: PageTracker, min_space_mm: f64, page_body_height_mm: f64) -> Self {
        Self {
            tracker,
            title: None,
            min_space_mm,
            page_body_height_mm,
        }
    }

    /// Records the page where the anchor lands under `title`.
    pub fn with_section(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Element for PageAnchor {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let available = mm_to_f64(area.size().height);
        let fresh_page = available + 1.0 >= self.page_body_height_mm;

        if available < self.min_space_mm && !fresh_page {
            result.has_more = true;
            return Ok(result);
        }

        if let Some(title) = self.title.take() {
            let page = self.tracker.current_page();
            debug!("section '{title}' starts on page {page}");
            self.tracker.mark(title);
        }

        Ok(result)
    }
}

/// Breaks cell text into lines no wider than `max_width`.
///
/// Explicit `\n` always starts a new line; other whitespace is a break
/// opportunity. A single word wider than `max_width` gets a line of its own.
pub fn wrap_text<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }

    lines
}

/// Number of leading rows whose cumulative height fits into `available`.
pub fn rows_fitting(heights: &[f64], available: f64) -> usize {
    let mut used = 0.0;
    heights
        .iter()
        .take_while(|height| {
            used += **height;
            used <= available + FIT_EPSILON_MM
        })
        .count()
}

/// Assigns rows to pages in order.
///
/// `first_available` is the space left on the page where the table starts and
/// `page_height` the body height of every following page. Returns the row
/// index range of each page; the first range is empty when not even the first
/// row fits on the starting page.
pub fn paginate_rows(
    heights: &[f64],
    first_available: f64,
    page_height: f64,
) -> Result<Vec<std::ops::Range<usize>>, Error> {
    if let Some(height) = heights.iter().find(|height| **height > page_height + FIT_EPSILON_MM) {
        return Err(Error::new(
            format!(
                "Table row of {height:.1} mm exceeds the page body height of {page_height:.1} mm"
            ),
            ErrorKind::PageSizeExceeded,
        ));
    }

    let mut pages = Vec::new();
    let mut start = 0;
    let mut available = first_available;
    while start < heights.len() {
        let count = rows_fitting(&heights[start..], available);
        pages.push(start..start + count);
        start += count;
        available = page_height;
    }
    Ok(pages)
}

struct RowLayout {
    cells: Vec<Vec<String>>,
    height_mm: f64,
}

/// Renders a [`TableBlock`] with filled cells, a thin inner grid and an outer
/// box, splitting between rows when the page is full.
pub struct ThemedTable {
    table: TableBlock,
    page_body_height_mm: f64,
    layout: Option<Vec<RowLayout>>,
    next_row: usize,
}

impl ThemedTable {
    pub fn new(table: TableBlock, page_body_height_mm: f64) -> Self {
        Self {
            table,
            page_body_height_mm,
            layout: None,
            next_row: 0,
        }
    }

    fn cell_style(&self, base: Style, row: usize, column: usize) -> Style {
        let size = self.table.cell_font_size_pt(row).round().clamp(1.0, 255.0) as u8;
        let mut style = base
            .with_font_size(size)
            .with_color(self.table.cell_text_color(row).into());
        style.set_line_spacing(1.0);
        if self.table.cell_is_bold(row, column) {
            style.set_bold();
        }
        style
    }

    fn layout_rows(&self, context: &genpdf::Context, base: Style) -> Vec<RowLayout> {
        let theme = self.table.theme();
        let pad_x = pt_to_mm(theme.padding_x_pt);
        let pad_y = pt_to_mm(theme.padding_y_pt);

        self.table
            .rows()
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let mut height_mm: f64 = 0.0;
                let cells = cells
                    .iter()
                    .zip(self.table.column_widths_mm())
                    .enumerate()
                    .map(|(column, (text, width))| {
                        let style = self.cell_style(base, row, column);
                        let line_height = mm_to_f64(style.line_height(&context.font_cache));
                        let lines = wrap_text(text, width - 2.0 * pad_x, |candidate| {
                            mm_to_f64(style.str_width(&context.font_cache, candidate))
                        });
                        height_mm = height_mm.max(lines.len() as f64 * line_height + 2.0 * pad_y);
                        lines
                    })
                    .collect();
                RowLayout { cells, height_mm }
            })
            .collect()
    }

    fn draw_rows(
        &self,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        base: Style,
        layout: &[RowLayout],
        rows: std::ops::Range<usize>,
    ) -> Result<f64, Error> {
        let theme = self.table.theme();
        let widths = self.table.column_widths_mm();
        let total_width = self.table.total_width_mm();
        let pad_x = pt_to_mm(theme.padding_x_pt);
        let pad_y = pt_to_mm(theme.padding_y_pt);

        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut y = 0.0;
        for row in rows.clone() {
            offsets.push(y);
            y += layout[row].height_mm;
        }
        offsets.push(y);
        let total_height = y;

        // Backgrounds first so text and rules stay visible on top of them.
        let heights: Vec<f64> = layout.iter().map(|row| row.height_mm).collect();
        for fill in row_fills(&self.table, rows.clone(), &heights) {
            fill.paint(area);
        }

        for (slot, row) in rows.clone().enumerate() {
            let top = offsets[slot];
            let mut x = 0.0;
            for (column, (lines, width)) in layout[row].cells.iter().zip(widths).enumerate() {
                let style = self.cell_style(base, row, column);
                let line_height = mm_to_f64(style.line_height(&context.font_cache));
                for (index, line) in lines.iter().enumerate() {
                    let text_width = mm_to_f64(style.str_width(&context.font_cache, line));
                    let indent = match self.table.cell_alignment(column) {
                        HorizontalAlignment::Center => ((width - text_width) / 2.0).max(pad_x),
                        HorizontalAlignment::Right => (width - pad_x - text_width).max(pad_x),
                        HorizontalAlignment::Left | HorizontalAlignment::Justified => pad_x,
                    };
                    let position = Position::new(
                        mm_from_f64(x + indent),
                        mm_from_f64(top + pad_y + index as f64 * line_height),
                    );
                    area.print_str(&context.font_cache, position, style, line)?;
                }
                x += width;
            }
        }

        let grid = hairline(theme.grid);
        for offset in &offsets[1..offsets.len() - 1] {
            area.draw_line(
                vec![
                    Position::new(0, mm_from_f64(*offset)),
                    Position::new(mm_from_f64(total_width), mm_from_f64(*offset)),
                ],
                grid,
            );
        }
        let mut x = 0.0;
        for width in &widths[..widths.len() - 1] {
            x += width;
            area.draw_line(
                vec![
                    Position::new(mm_from_f64(x), 0),
                    Position::new(mm_from_f64(x), mm_from_f64(total_height)),
                ],
                grid,
            );
        }

        let border = hairline(theme.border);
        area.draw_line(
            vec![
                Position::new(0, 0),
                Position::new(mm_from_f64(total_width), 0),
                Position::new(mm_from_f64(total_width), mm_from_f64(total_height)),
                Position::new(0, mm_from_f64(total_height)),
                Position::new(0, 0),
            ],
            border,
        );

        Ok(total_height)
    }
}

impl Element for ThemedTable {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let layout = match self.layout.take() {
            Some(layout) => layout,
            None => self.layout_rows(context, style),
        };

        if self.next_row >= layout.len() {
            self.layout = Some(layout);
            return Ok(result);
        }

        let heights: Vec<f64> = layout[self.next_row..]
            .iter()
            .map(|row| row.height_mm)
            .collect();
        let available = mm_to_f64(area.size().height);
        let pages = paginate_rows(&heights, available, self.page_body_height_mm)?;
        let count = pages.first().map(|range| range.len()).unwrap_or(0);

        if count == 0 {
            debug!("table row {} moves to the next page", self.next_row);
            result.has_more = true;
            self.layout = Some(layout);
            return Ok(result);
        }

        let rows = self.next_row..self.next_row + count;
        let height = self.draw_rows(context, &area, style, &layout, rows)?;
        self.next_row += count;

        result.size = Size::new(
            mm_from_f64(self.table.total_width_mm()),
            mm_from_f64(height),
        );
        result.has_more = self.next_row < layout.len();
        self.layout = Some(layout);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_width(text: &str) -> f64 {
        text.chars().count() as f64
    }

    #[test]
    fn wrap_respects_explicit_breaks() {
        let lines = wrap_text("Sprint 1\nWeeks 1-2", 100.0, char_width);
        assert_eq!(lines, vec!["Sprint 1", "Weeks 1-2"]);
    }

    #[test]
    fn wrap_breaks_at_word_boundaries() {
        let lines = wrap_text("one two three four", 9.0, char_width);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn overlong_word_keeps_its_own_line() {
        let lines = wrap_text("a supercalifragilistic b", 5.0, char_width);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn empty_cell_still_has_one_line() {
        assert_eq!(wrap_text("", 10.0, char_width), vec![String::new()]);
    }

    #[test]
    fn rows_fitting_counts_prefix() {
        assert_eq!(rows_fitting(&[10.0, 10.0, 10.0], 25.0), 2);
        assert_eq!(rows_fitting(&[10.0, 10.0], 20.0), 2);
        assert_eq!(rows_fitting(&[30.0], 20.0), 0);
    }

    #[test]
    fn every_row_lands_on_exactly_one_page_in_order() {
        let heights = vec![7.0; 60];
        let pages = paginate_rows(&heights, 100.0, 259.0).unwrap();
        assert!(pages.len() > 1);

        let mut expected = 0;
        for range in &pages {
            assert_eq!(range.start, expected);
            expected = range.end;
        }
        assert_eq!(expected, heights.len());
        assert_eq!(pages[0].len(), 14);
    }

    #[test]
    fn first_page_may_be_skipped() {
        let pages = paginate_rows(&[20.0, 20.0], 10.0, 259.0).unwrap();
        assert_eq!(pages, vec![0..0, 0..2]);
    }

    #[test]
    fn row_taller_than_page_is_rejected() {
        assert!(paginate_rows(&[300.0], 259.0, 259.0).is_err());
    }

    fn five_column_table() -> TableBlock {
        let rows: Vec<Vec<String>> = (0..11)
            .map(|row| (0..5).map(|column| format!("r{row}c{column}")).collect())
            .collect();
        crate::table::build_table(
            rows,
            &crate::table::ColumnWidths::Proportional(vec![1.0; 5]),
            &crate::theme::Theme::default(),
        )
        .unwrap()
    }

    #[test]
    fn every_cell_gets_one_fill() {
        let table = five_column_table();
        let heights = vec![6.0; 11];
        let fills = row_fills(&table, 0..11, &heights);

        assert_eq!(fills.len(), 55);
        assert!((fills[4].x + fills[4].width - table.total_width_mm()).abs() < 1e-9);
        assert!((fills[54].y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn header_fills_differ_from_body_fills() {
        let table = five_column_table();
        let fills = row_fills(&table, 0..11, &[6.0; 11]);
        let header = table.theme().header_background;

        for fill in &fills[..5] {
            assert_eq!(fill.color, header);
            assert!(fill.width > 0.0 && fill.height > 0.0);
        }
        assert!(fills[5..].iter().all(|fill| fill.color != header));
    }

    #[test]
    fn continuation_slice_starts_at_the_top() {
        let table = five_column_table();
        let fills = row_fills(&table, 7..11, &[6.0; 11]);
        assert_eq!(fills.len(), 20);
        assert_eq!(fills[0].y, 0.0);
        assert_eq!(fills[0].color, table.cell_background(7, 0));
    }

    #[test]
    fn points_convert_to_millimetres() {
        assert!((pt_to_mm(72.0) - 25.4).abs() < 1e-9);
        assert!((mm_to_f64(mm_from_f64(12.5)) - 12.5).abs() < 1e-9);
    }
}
