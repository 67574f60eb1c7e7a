//! Horizontal bar comparison chart.

use super::scene::{approx_text_height, approx_text_width, HAnchor, Scene, TextShape, VAnchor};
use super::{format_number, nice_step, title_band, Canvas, ChartSpec, ChartStyle};
use crate::error::{ReportError, Result};
use crate::theme::Rgb;

#[derive(Clone, Debug, PartialEq)]
pub struct BarOptions {
    /// Caption under the value axis.
    pub axis_label: Option<String>,
    /// Upper end of the value axis; derived from the data when unset.
    pub x_max: Option<f64>,
    /// Appended to the value label printed after each bar.
    pub value_suffix: String,
    /// Bar thickness as a fraction of the category slot.
    pub bar_ratio: f64,
}

impl Default for BarOptions {
    fn default() -> Self {
        Self {
            axis_label: None,
            x_max: None,
            value_suffix: String::new(),
            bar_ratio: 0.55,
        }
    }
}

impl BarOptions {
    pub fn with_axis_label(mut self, label: impl Into<String>) -> Self {
        self.axis_label = Some(label.into());
        self
    }

    pub fn with_x_max(mut self, x_max: f64) -> Self {
        self.x_max = Some(x_max);
        self
    }

    pub fn with_value_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.value_suffix = suffix.into();
        self
    }
}

/// Lays out horizontal bars, the first category at the bottom, each followed
/// by its value label.
pub fn horizontal_bar_scene(
    spec: &ChartSpec,
    options: &BarOptions,
    canvas: &Canvas,
    style: &ChartStyle,
) -> Result<Scene> {
    spec.validate()?;
    let data_max = spec.values.iter().copied().fold(0.0, f64::max);
    let x_max = match options.x_max {
        Some(x_max) if x_max > 0.0 && x_max >= data_max => x_max,
        Some(x_max) => {
            return Err(ReportError::data(format!(
                "axis maximum {x_max} does not cover the largest value {data_max}"
            )))
        }
        None => {
            let step = nice_step(data_max.max(1.0) * 1.15, 6);
            (data_max * 1.15 / step).ceil().max(1.0) * step
        }
    };

    let mut scene = canvas.empty_scene(style.background);
    let top = title_band(&mut scene, canvas, style, &spec.title);

    let label_size = canvas.pt(style.label_pt);
    let tick_size = canvas.pt(style.tick_pt);
    let pad = canvas.pt(4.0);
    let category_width = spec
        .labels
        .iter()
        .map(|label| approx_text_width(label, label_size))
        .fold(0.0, f64::max);
    let value_width = spec
        .values
        .iter()
        .map(|value| {
            let label = format!("{}{}", format_number(*value), options.value_suffix);
            approx_text_width(&label, label_size)
        })
        .fold(0.0, f64::max);
    let axis_label_height = options
        .axis_label
        .as_deref()
        .map(|label| approx_text_height(label, label_size) + pad / 2.0)
        .unwrap_or(0.0);

    let left = pad + category_width + pad;
    let right = canvas.width - pad - value_width * 0.5;
    let bottom = canvas.height - pad - axis_label_height - tick_size * 1.6;
    if right <= left || bottom <= top {
        return Err(ReportError::layout(format!(
            "bar chart '{}' is too small for its labels",
            spec.title
        )));
    }

    let x_of = |value: f64| left + (right - left) * value / x_max;
    let slot = (bottom - top) / spec.values.len() as f64;
    let thickness = slot * options.bar_ratio.clamp(0.05, 1.0);

    let step = nice_step(x_max, 7);
    let mut tick = 0.0;
    while tick <= x_max + step * 1e-6 {
        let x = x_of(tick);
        scene.line((x, bottom), (x, bottom + tick_size * 0.3), style.axis, 1.0);
        scene.text(
            TextShape::new((x, bottom + tick_size * 0.4), format_number(tick), tick_size)
                .color(style.text)
                .anchor(HAnchor::Center, VAnchor::Top),
        );
        tick += step;
    }

    for (index, (label, value)) in spec.labels.iter().zip(&spec.values).enumerate() {
        let center = bottom - slot * (index as f64 + 0.5);
        let (y0, y1) = (center - thickness / 2.0, center + thickness / 2.0);
        let end = x_of(*value);
        scene.rect((left, y0), (end, y1), spec.color(index));
        scene.outline((left, y0), (end, y1), Rgb::WHITE, canvas.pt(0.5));

        scene.text(
            TextShape::new((left - pad / 2.0, center), label.clone(), label_size)
                .color(style.text)
                .anchor(HAnchor::Right, VAnchor::Middle),
        );
        scene.text(
            TextShape::new(
                (end + canvas.pt(2.0), center),
                format!("{}{}", format_number(*value), options.value_suffix),
                label_size,
            )
            .bold()
            .color(style.text)
            .anchor(HAnchor::Left, VAnchor::Middle),
        );
    }

    // Left and bottom spines only.
    scene.line((left, top), (left, bottom), style.axis, 1.0);
    scene.line((left, bottom), (right, bottom), style.axis, 1.0);

    if let Some(axis_label) = &options.axis_label {
        scene.text(
            TextShape::new(
                ((left + right) / 2.0, canvas.height - pad),
                axis_label.clone(),
                label_size,
            )
            .color(style.text)
            .anchor(HAnchor::Center, VAnchor::Bottom),
        );
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSize;

    fn market() -> ChartSpec {
        ChartSpec::new(
            "Competitor user base",
            ["Teleparty", "Rave", "Kosmi", "Scener", "Let's Watch\n(target)"],
            vec![10.0, 5.0, 0.5, 2.0, 0.1],
            vec![
                Rgb::from_u32(0xE63946),
                Rgb::from_u32(0xFF6F00),
                Rgb::from_u32(0x00B4D8),
                Rgb::from_u32(0x9B59B6),
                Rgb::from_u32(0xFF8E53),
            ],
        )
    }

    fn canvas() -> Canvas {
        Canvas::new(ChartSize::new(130.0, 65.0), 150)
    }

    #[test]
    fn bar_lengths_are_proportional_and_first_is_lowest() {
        let options = BarOptions::default().with_x_max(14.0).with_value_suffix("M");
        let style = ChartStyle::default();
        let scene = horizontal_bar_scene(&market(), &options, &canvas(), &style).unwrap();
        let bars = scene.rects();
        assert_eq!(bars.len(), 5);

        let length = |index: usize| bars[index].1 .0 - bars[index].0 .0;
        assert!((length(0) / length(1) - 2.0).abs() < 1e-6);
        assert!(bars[0].0 .1 > bars[4].0 .1);
        assert!(scene.texts().iter().any(|text| text.text == "0.5M"));
        assert!(scene.texts().iter().any(|text| text.text == "14"));
    }

    #[test]
    fn axis_maximum_must_cover_data() {
        let options = BarOptions::default().with_x_max(4.0);
        let style = ChartStyle::default();
        let err = horizontal_bar_scene(&market(), &options, &canvas(), &style).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Data);
    }
}
