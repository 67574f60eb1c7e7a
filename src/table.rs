//! Themed tables: validation, column width resolution and per-cell styling rules.
//!
//! A [`TableBlock`] is only produced by [`build_table`], which guarantees that
//! every row has exactly as many cells as the header and that the column
//! widths add up to the usable page width. Rendering lives in
//! [`crate::elements::ThemedTable`].

use crate::error::{ReportError, Result};
use crate::model::HorizontalAlignment;
use crate::theme::{Palette, Rgb, Theme};

/// Maximum difference between the column width sum and the usable width.
pub const WIDTH_TOLERANCE_MM: f64 = 0.5;

/// How the caller specifies column widths.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnWidths {
    /// Widths in millimetres; they must add up to the usable page width.
    Absolute(Vec<f64>),
    /// Relative weights scaled to the usable page width.
    Proportional(Vec<f64>),
    /// Widths in millimetres for all but the last column, which takes the rest.
    FixedThenRemainder(Vec<f64>),
}

impl ColumnWidths {
    /// Resolves the widths for a table with `columns` columns.
    pub fn resolve(&self, columns: usize, usable_width_mm: f64) -> Result<Vec<f64>> {
        let widths = match self {
            ColumnWidths::Absolute(widths) => {
                check_count(widths.len(), columns)?;
                let total: f64 = widths.iter().sum();
                if (total - usable_width_mm).abs() > WIDTH_TOLERANCE_MM {
                    return Err(ReportError::layout(format!(
                        "column widths add up to {total:.1} mm \
                         but the usable width is {usable_width_mm:.1} mm"
                    )));
                }
                widths.clone()
            }
            ColumnWidths::Proportional(weights) => {
                check_count(weights.len(), columns)?;
                let total: f64 = weights.iter().sum();
                if !(total > 0.0) {
                    return Err(ReportError::data("column weights must have a positive sum"));
                }
                weights
                    .iter()
                    .map(|weight| usable_width_mm * weight / total)
                    .collect()
            }
            ColumnWidths::FixedThenRemainder(fixed) => {
                check_count(fixed.len() + 1, columns)?;
                let used: f64 = fixed.iter().sum();
                let mut widths = fixed.clone();
                widths.push(usable_width_mm - used);
                widths
            }
        };

        if let Some(index) = widths.iter().position(|width| !(*width > 0.0)) {
            return Err(ReportError::layout(format!(
                "column {index} resolves to a non-positive width"
            )));
        }

        Ok(widths)
    }
}

fn check_count(given: usize, columns: usize) -> Result<()> {
    if given == columns {
        Ok(())
    } else {
        Err(ReportError::data(format!(
            "{given} column widths given for a table with {columns} columns"
        )))
    }
}

/// The uniform visual theme applied to every table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableTheme {
    pub header_background: Rgb,
    pub header_text: Rgb,
    pub body_text: Rgb,
    /// Alternating backgrounds of the data rows, starting with the first data row.
    pub row_backgrounds: [Rgb; 2],
    /// Hairline color of the inner grid.
    pub grid: Rgb,
    /// Hairline color of the outer box.
    pub border: Rgb,
    pub padding_x_pt: f64,
    pub padding_y_pt: f64,
    pub header_font_size_pt: f64,
    pub body_font_size_pt: f64,
}

impl TableTheme {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            header_background: palette.dark,
            header_text: Rgb::WHITE,
            body_text: palette.text,
            row_backgrounds: [Rgb::WHITE, palette.light_background],
            grid: palette.grid,
            border: palette.dark,
            padding_x_pt: 6.0,
            padding_y_pt: 4.0,
            header_font_size_pt: 8.0,
            body_font_size_pt: 8.0,
        }
    }
}

/// A validated grid of cell strings plus its styling rules.
///
/// Row 0 is the header row. Cells are top-aligned; `\n` inside a cell forces a
/// line break and long text wraps at word boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct TableBlock {
    rows: Vec<Vec<String>>,
    column_widths_mm: Vec<f64>,
    theme: TableTheme,
    column_fills: Vec<Option<Rgb>>,
    centered_from: Option<usize>,
    bold_first_column: bool,
}

impl TableBlock {
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    pub fn body_rows(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }

    pub fn columns(&self) -> usize {
        self.column_widths_mm.len()
    }

    pub fn column_widths_mm(&self) -> &[f64] {
        &self.column_widths_mm
    }

    pub fn total_width_mm(&self) -> f64 {
        self.column_widths_mm.iter().sum()
    }

    pub fn theme(&self) -> &TableTheme {
        &self.theme
    }

    /// Paints every data cell of `column` with `color` instead of the zebra stripe.
    pub fn with_column_fill(mut self, column: usize, color: Rgb) -> Result<Self> {
        let slot = self.column_fills.get_mut(column).ok_or_else(|| {
            ReportError::data(format!("column {column} does not exist in this table"))
        })?;
        *slot = Some(color);
        Ok(self)
    }

    /// Centers the text of `column` and every column after it.
    pub fn with_centered_columns_from(mut self, column: usize) -> Self {
        self.centered_from = Some(column);
        self
    }

    /// Sets the data cells of the first column in bold.
    pub fn with_bold_first_column(mut self) -> Self {
        self.bold_first_column = true;
        self
    }

    pub fn with_font_sizes(mut self, header_pt: f64, body_pt: f64) -> Self {
        self.theme.header_font_size_pt = header_pt;
        self.theme.body_font_size_pt = body_pt;
        self
    }

    pub fn is_header(&self, row: usize) -> bool {
        row == 0
    }

    /// Background color of a cell.
    pub fn cell_background(&self, row: usize, column: usize) -> Rgb {
        if self.is_header(row) {
            return self.theme.header_background;
        }
        if let Some(Some(fill)) = self.column_fills.get(column) {
            return *fill;
        }
        self.theme.row_backgrounds[(row - 1) % 2]
    }

    pub fn cell_text_color(&self, row: usize) -> Rgb {
        if self.is_header(row) {
            self.theme.header_text
        } else {
            self.theme.body_text
        }
    }

    pub fn cell_is_bold(&self, row: usize, column: usize) -> bool {
        self.is_header(row) || (self.bold_first_column && column == 0)
    }

    pub fn cell_font_size_pt(&self, row: usize) -> f64 {
        if self.is_header(row) {
            self.theme.header_font_size_pt
        } else {
            self.theme.body_font_size_pt
        }
    }

    pub fn cell_alignment(&self, column: usize) -> HorizontalAlignment {
        match self.centered_from {
            Some(first) if column >= first => HorizontalAlignment::Center,
            _ => HorizontalAlignment::Left,
        }
    }
}

/// Validates a grid of cells and applies the report table theme.
///
/// The first row is the header. Every row must have as many cells as the
/// header; the widths must resolve to the usable width of the page.
pub fn build_table<R, C, S>(rows: R, widths: &ColumnWidths, theme: &Theme) -> Result<TableBlock>
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = S>,
    S: Into<String>,
{
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(Into::into).collect())
        .collect();

    let columns = match rows.first() {
        Some(header) if !header.is_empty() => header.len(),
        Some(_) => return Err(ReportError::data("table header row has no cells")),
        None => return Err(ReportError::data("table needs at least a header row")),
    };

    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != columns)
    {
        return Err(ReportError::data(format!(
            "table row {index} has {} cells but the header has {columns}",
            row.len()
        )));
    }

    let column_widths_mm = widths.resolve(columns, theme.page.usable_width_mm())?;

    Ok(TableBlock {
        rows,
        column_widths_mm,
        theme: TableTheme::from_palette(&theme.palette),
        column_fills: vec![None; columns],
        centered_from: None,
        bold_first_column: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn grid(columns: usize, rows: usize) -> Vec<Vec<String>> {
        (0..rows)
            .map(|row| {
                (0..columns)
                    .map(|column| format!("r{row}c{column}"))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn header_is_distinguished_from_all_data_rows() {
        let theme = Theme::default();
        let table = build_table(
            grid(5, 11),
            &ColumnWidths::Proportional(vec![1.0; 5]),
            &theme,
        )
        .unwrap();

        assert_eq!(table.body_rows().len(), 10);
        for row in 1..11 {
            for column in 0..5 {
                assert_ne!(table.cell_background(0, column), table.cell_background(row, column));
            }
            assert_ne!(table.cell_text_color(0), table.cell_text_color(row));
        }
    }

    #[test]
    fn rows_are_structurally_consistent() {
        let theme = Theme::default();
        let widths = ColumnWidths::Proportional(vec![1.0, 2.0, 1.0]);
        let table = build_table(grid(3, 4), &widths, &theme).unwrap();
        for row in table.rows() {
            assert_eq!(row.len(), table.header().len());
        }
        let usable = theme.page.usable_width_mm();
        assert!((table.total_width_mm() - usable).abs() < WIDTH_TOLERANCE_MM);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec!["a", "b"], vec!["only one"]];
        let err = build_table(rows, &ColumnWidths::Proportional(vec![1.0, 1.0]), &Theme::default())
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Data);
    }

    #[test]
    fn absolute_widths_must_fill_the_usable_width() {
        let theme = Theme::default();
        let err = build_table(grid(2, 2), &ColumnWidths::Absolute(vec![35.0, 100.0]), &theme)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Layout);

        let ok = build_table(grid(2, 2), &ColumnWidths::Absolute(vec![35.0, 135.0]), &theme);
        assert!(ok.is_ok());
    }

    #[test]
    fn remainder_goes_to_last_column() {
        let widths = ColumnWidths::FixedThenRemainder(vec![35.0])
            .resolve(2, 170.0)
            .unwrap();
        assert_eq!(widths, vec![35.0, 135.0]);

        let err = ColumnWidths::FixedThenRemainder(vec![100.0, 80.0])
            .resolve(3, 170.0)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Layout);
    }

    #[test]
    fn zebra_stripes_alternate_and_column_fill_wins() {
        let theme = Theme::default();
        let table = build_table(grid(2, 4), &ColumnWidths::Proportional(vec![1.0, 1.0]), &theme)
            .unwrap()
            .with_column_fill(1, Rgb::from_u32(0xFFF3E0))
            .unwrap();
        assert_ne!(table.cell_background(1, 0), table.cell_background(2, 0));
        assert_eq!(table.cell_background(1, 0), table.cell_background(3, 0));
        assert_eq!(table.cell_background(2, 1), Rgb::from_u32(0xFFF3E0));
        assert_eq!(table.cell_background(0, 1), theme.palette.dark);
        assert!(table.clone().with_column_fill(7, Rgb::WHITE).is_err());
    }

    #[test]
    fn empty_table_is_rejected() {
        let rows: Vec<Vec<String>> = Vec::new();
        assert!(build_table(rows, &ColumnWidths::Proportional(vec![]), &Theme::default()).is_err());
    }
}
