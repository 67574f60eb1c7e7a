//! Chart generation: parameter objects in, PNG images out.
//!
//! Every chart is produced in two phases. A pure layout function turns the
//! chart parameters into a [`Scene`] in pixel space, then [`raster::rasterize`]
//! draws the scene with `plotters` and encodes it as PNG. Equal inputs always
//! give byte-identical images.

use std::sync::Arc;

use log::debug;

use crate::error::{ReportError, Result};
use crate::fonts::FontFiles;
use crate::theme::{Palette, Rgb, Theme};

mod bar;
mod diagram;
mod gantt;
mod pie;
pub mod raster;
pub mod scene;
mod trend;

pub use bar::{horizontal_bar_scene, BarOptions};
pub use diagram::{
    architecture_scene, flow_scene, DiagramBox, DiagramLink, DiagramSpec, FlowSpec, FlowStep,
};
pub use gantt::{gantt_scene, GanttOwner, GanttSpec, GanttTask};
pub use pie::{pie_scene, PieOptions};
pub use scene::Scene;
pub use trend::{trend_scene, TrendOptions};

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Labels, values and colors of a single-series chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Series colors; reused cyclically when there are fewer colors than values.
    pub colors: Vec<Rgb>,
}

impl ChartSpec {
    pub fn new<L, S>(
        title: impl Into<String>,
        labels: L,
        values: Vec<f64>,
        colors: Vec<Rgb>,
    ) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            values,
            colors,
        }
    }

    /// Checks the series for the invariants every chart relies on.
    pub fn validate(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(ReportError::data(format!("chart '{}' has no values", self.title)));
        }
        if self.labels.len() != self.values.len() {
            return Err(ReportError::data(format!(
                "chart '{}' has {} labels but {} values",
                self.title,
                self.labels.len(),
                self.values.len()
            )));
        }
        if self.colors.is_empty() {
            return Err(ReportError::data(format!("chart '{}' has no colors", self.title)));
        }
        if let Some(value) = self.values.iter().find(|value| !value.is_finite() || **value < 0.0) {
            return Err(ReportError::data(format!(
                "chart '{}' contains the invalid value {value}",
                self.title
            )));
        }
        Ok(())
    }

    /// Color of the value at `index`.
    pub fn color(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }
}

/// Printed size of a chart in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl ChartSize {
    pub const fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// Pixel dimensions at `dpi`.
    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        let convert = |mm: f64| (mm / MM_PER_INCH * dpi as f64).round().max(1.0) as u32;
        (convert(self.width_mm), convert(self.height_mm))
    }
}

/// Pixel canvas of a chart plus the point-to-pixel scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    dpi: f64,
}

impl Canvas {
    pub fn new(size: ChartSize, dpi: u32) -> Self {
        let (width, height) = size.pixels(dpi);
        Self {
            width: width as f64,
            height: height as f64,
            dpi: dpi as f64,
        }
    }

    /// Converts typographic points to pixels.
    pub fn pt(&self, points: f64) -> f64 {
        points * self.dpi / POINTS_PER_INCH
    }

    pub fn empty_scene(&self, background: Rgb) -> Scene {
        Scene::new(self.width as u32, self.height as u32, background)
    }
}

/// Colors and type sizes shared by all charts.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartStyle {
    pub background: Rgb,
    pub title: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub axis: Rgb,
    pub connector: Rgb,
    pub flow_arrow: Rgb,
    /// Opacity of filled boxes and bars, flattened over the background.
    pub fill_alpha: f64,
    /// Opacity of the area under a trend line.
    pub area_alpha: f64,
    pub title_pt: f64,
    pub label_pt: f64,
    pub tick_pt: f64,
}

impl ChartStyle {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            background: Rgb::WHITE,
            title: palette.text,
            text: palette.text,
            muted: palette.muted,
            axis: palette.muted,
            connector: Rgb::from_u32(0xAAAAAA),
            flow_arrow: Rgb::from_u32(0x333333),
            fill_alpha: 0.85,
            area_alpha: 0.3,
            title_pt: 10.0,
            label_pt: 7.5,
            tick_pt: 7.0,
        }
    }

    /// `color` at the fill opacity over the background.
    pub fn fill(&self, color: Rgb) -> Rgb {
        color.over(self.background, self.fill_alpha)
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::from_palette(&Palette::default())
    }
}

/// Adds the bold chart title centered in the top band and returns the band height.
pub(crate) fn title_band(
    scene: &mut Scene,
    canvas: &Canvas,
    style: &ChartStyle,
    title: &str,
) -> f64 {
    let size = canvas.pt(style.title_pt);
    if title.is_empty() {
        return size * 0.5;
    }
    scene.text(
        scene::TextShape::new((canvas.width / 2.0, size * 1.0), title, size)
            .bold()
            .color(style.title),
    );
    size * 2.2
}

/// A "nice" tick step giving roughly `target` intervals up to `max`.
pub(crate) fn nice_step(max: f64, target: usize) -> f64 {
    if max <= 0.0 || target == 0 {
        return 1.0;
    }
    let raw = max / target as f64;
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude)
}

/// Formats a number without trailing zeros (`10`, `0.5`, `2.25`).
pub(crate) fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Formats an integer with comma thousands separators (`25,000`).
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if rounded < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

/// A rendered chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartImage {
    png: Arc<[u8]>,
    width_px: u32,
    height_px: u32,
    size: ChartSize,
}

impl ChartImage {
    pub fn bytes(&self) -> &[u8] {
        &self.png
    }

    /// The PNG bytes, shared without copying.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.png)
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }

    pub fn width_mm(&self) -> f64 {
        self.size.width_mm
    }

    pub fn height_mm(&self) -> f64 {
        self.size.height_mm
    }
}

/// Produces chart images with the report styling.
///
/// Creating a factory registers the chart fonts with `plotters`; the factory
/// itself holds only immutable styling, so every method is independent of
/// previous calls.
#[derive(Clone, Debug)]
pub struct ChartFactory {
    style: ChartStyle,
    dpi: u32,
}

impl ChartFactory {
    pub fn new(theme: &Theme, fonts: &FontFiles) -> Result<Self> {
        raster::register_fonts(fonts)?;
        Ok(Self {
            style: ChartStyle::from_palette(&theme.palette),
            dpi: theme.chart_dpi,
        })
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    fn canvas(&self, size: ChartSize) -> Canvas {
        Canvas::new(size, self.dpi)
    }

    fn finish(&self, kind: &str, scene: Scene, size: ChartSize) -> Result<ChartImage> {
        let png = raster::rasterize(&scene)?;
        debug!(
            "{kind} chart rendered at {}x{} px ({} bytes)",
            scene.width(),
            scene.height(),
            png.len()
        );
        Ok(ChartImage {
            png: png.into(),
            width_px: scene.width(),
            height_px: scene.height(),
            size,
        })
    }

    /// Pie chart, or donut chart when `options.hole_ratio` is non-zero.
    pub fn pie_chart(
        &self,
        spec: &ChartSpec,
        options: &PieOptions,
        size: ChartSize,
    ) -> Result<ChartImage> {
        let scene = pie_scene(spec, options, &self.canvas(size), &self.style)?;
        self.finish("pie", scene, size)
    }

    pub fn horizontal_bar_chart(
        &self,
        spec: &ChartSpec,
        options: &BarOptions,
        size: ChartSize,
    ) -> Result<ChartImage> {
        let scene = horizontal_bar_scene(spec, options, &self.canvas(size), &self.style)?;
        self.finish("bar", scene, size)
    }

    pub fn gantt_chart(&self, spec: &GanttSpec, size: ChartSize) -> Result<ChartImage> {
        let scene = gantt_scene(spec, &self.canvas(size), &self.style)?;
        self.finish("gantt", scene, size)
    }

    pub fn architecture_diagram(&self, spec: &DiagramSpec, size: ChartSize) -> Result<ChartImage> {
        let scene = architecture_scene(spec, &self.canvas(size), &self.style)?;
        self.finish("architecture", scene, size)
    }

    pub fn flow_chart(&self, spec: &FlowSpec, size: ChartSize) -> Result<ChartImage> {
        let scene = flow_scene(spec, &self.canvas(size), &self.style)?;
        self.finish("flow", scene, size)
    }

    pub fn trend_chart(
        &self,
        spec: &ChartSpec,
        options: &TrendOptions,
        size: ChartSize,
    ) -> Result<ChartImage> {
        let scene = trend_scene(spec, options, &self.canvas(size), &self.style)?;
        self.finish("trend", scene, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn pixel_size_follows_print_size() {
        assert_eq!(ChartSize::new(25.4, 50.8).pixels(150), (150, 300));
        let canvas = Canvas::new(ChartSize::new(25.4, 25.4), 144);
        assert!((canvas.pt(10.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_series_is_rejected() {
        let spec = ChartSpec::new("t", ["a", "b"], vec![1.0], vec![Rgb::BLACK]);
        assert_eq!(spec.validate().unwrap_err().category(), ErrorCategory::Data);
    }

    #[test]
    fn negative_and_nan_values_are_rejected() {
        let negative = ChartSpec::new("t", ["a"], vec![-1.0], vec![Rgb::BLACK]);
        assert!(negative.validate().is_err());
        let nan = ChartSpec::new("t", ["a"], vec![f64::NAN], vec![Rgb::BLACK]);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn colors_cycle() {
        let spec = ChartSpec::new("t", ["a", "b", "c"], vec![1.0; 3], vec![Rgb::BLACK, Rgb::WHITE]);
        assert_eq!(spec.color(2), Rgb::BLACK);
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(100.0), "100");
        assert_eq!(group_thousands(2000.0), "2,000");
        assert_eq!(group_thousands(1_234_567.0), "1,234,567");
    }

    #[test]
    fn numbers_drop_trailing_zeros() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.1), "0.1");
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(14.0, 7), 2.0);
        assert_eq!(nice_step(25_000.0, 5), 5_000.0);
    }
}
