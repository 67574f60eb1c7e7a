//! Filled line chart for a single growing series.

use super::scene::{approx_text_width, HAnchor, Scene, Shape, TextShape, VAnchor};
use super::{group_thousands, nice_step, title_band, Canvas, ChartSpec, ChartStyle};
use crate::error::{ReportError, Result};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrendOptions {
    /// Caption printed above the value axis.
    pub axis_label: Option<String>,
}

impl TrendOptions {
    pub fn with_axis_label(mut self, label: impl Into<String>) -> Self {
        self.axis_label = Some(label.into());
        self
    }
}

/// Lays out the area under the series, the line itself, point markers and a
/// thousands-separated value label above every point. The line uses the first
/// series color.
pub fn trend_scene(
    spec: &ChartSpec,
    options: &TrendOptions,
    canvas: &Canvas,
    style: &ChartStyle,
) -> Result<Scene> {
    spec.validate()?;

    let mut scene = canvas.empty_scene(style.background);
    let top = title_band(&mut scene, canvas, style, &spec.title);

    let label_size = canvas.pt(style.label_pt);
    let tick_size = canvas.pt(style.tick_pt);
    let pad = canvas.pt(4.0);

    let data_max = spec.values.iter().copied().fold(0.0, f64::max).max(1.0);
    let step = nice_step(data_max * 1.12, 5);
    let y_max = (data_max * 1.12 / step).ceil() * step;

    let tick_width = approx_text_width(&group_thousands(y_max), tick_size);
    let axis_label_height = if options.axis_label.is_some() { label_size * 1.4 } else { 0.0 };
    let left = pad + tick_width + pad;
    let right = canvas.width - pad;
    let plot_top = top + axis_label_height;
    let bottom = canvas.height - pad - label_size * 1.6;
    if right <= left || bottom <= plot_top {
        return Err(ReportError::layout(format!(
            "trend chart '{}' is too small for its labels",
            spec.title
        )));
    }

    let count = spec.values.len();
    let inset = (right - left) * 0.05;
    let x_of = |index: usize| {
        if count == 1 {
            (left + right) / 2.0
        } else {
            left + inset + (right - left - 2.0 * inset) * index as f64 / (count - 1) as f64
        }
    };
    let y_of = |value: f64| bottom - (bottom - plot_top) * value / y_max;

    let mut tick = 0.0;
    while tick <= y_max + step * 1e-6 {
        let y = y_of(tick);
        scene.line((left - tick_size * 0.3, y), (left, y), style.axis, 1.0);
        scene.text(
            TextShape::new((left - tick_size * 0.4, y), group_thousands(tick), tick_size)
                .color(style.text)
                .anchor(HAnchor::Right, VAnchor::Middle),
        );
        tick += step;
    }

    let color = spec.color(0);
    let points: Vec<_> = spec
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| (x_of(index), y_of(*value)))
        .collect();

    let mut area = Vec::with_capacity(points.len() + 2);
    area.push((x_of(0), bottom));
    area.extend(points.iter().copied());
    area.push((x_of(count - 1), bottom));
    scene.push(Shape::Polygon {
        points: area,
        fill: color.over(style.background, style.area_alpha),
    });

    scene.push(Shape::Polyline {
        points: points.clone(),
        color,
        width: canvas.pt(2.0),
    });

    for (index, (point, value)) in points.iter().zip(&spec.values).enumerate() {
        scene.push(Shape::Circle {
            center: *point,
            radius: canvas.pt(2.5),
            fill: color,
        });
        scene.text(
            TextShape::new((point.0, point.1 - canvas.pt(4.0)), group_thousands(*value), label_size)
                .bold()
                .color(style.text)
                .anchor(HAnchor::Center, VAnchor::Bottom),
        );
        scene.text(
            TextShape::new(
                (point.0, bottom + label_size * 0.4),
                spec.labels[index].clone(),
                label_size,
            )
            .color(style.text)
            .anchor(HAnchor::Center, VAnchor::Top),
        );
    }

    scene.line((left, plot_top), (left, bottom), style.axis, 1.0);
    scene.line((left, bottom), (right, bottom), style.axis, 1.0);

    if let Some(axis_label) = &options.axis_label {
        scene.text(
            TextShape::new((left, top), axis_label.clone(), label_size)
                .color(style.text)
                .anchor(HAnchor::Left, VAnchor::Top),
        );
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSize;
    use crate::theme::Rgb;

    fn users() -> ChartSpec {
        ChartSpec::new(
            "Target users",
            ["March", "April", "May", "June", "July", "August"],
            vec![100.0, 500.0, 2000.0, 5000.0, 12000.0, 25000.0],
            vec![Rgb::from_u32(0xFF8E53)],
        )
    }

    #[test]
    fn labels_use_thousands_separators() {
        let canvas = Canvas::new(ChartSize::new(130.0, 65.0), 150);
        let style = ChartStyle::default();
        let scene = trend_scene(&users(), &TrendOptions::default(), &canvas, &style).unwrap();
        let texts: Vec<_> = scene.texts().iter().map(|text| text.text.clone()).collect();
        assert!(texts.contains(&"25,000".to_string()));
        assert!(texts.contains(&"12,000".to_string()));
        assert!(texts.contains(&"August".to_string()));
    }

    #[test]
    fn line_rises_with_values() {
        let canvas = Canvas::new(ChartSize::new(130.0, 65.0), 150);
        let style = ChartStyle::default();
        let scene = trend_scene(&users(), &TrendOptions::default(), &canvas, &style).unwrap();
        let line = scene
            .shapes()
            .iter()
            .find_map(|shape| match shape {
                Shape::Polyline { points, width, .. } if points.len() == 6 && *width > 1.0 => {
                    Some(points.clone())
                }
                _ => None,
            })
            .unwrap();
        for pair in line.windows(2) {
            assert!(pair[0].0 < pair[1].0);
            assert!(pair[0].1 > pair[1].1);
        }
        let area = scene.polygons();
        assert_eq!(area.len(), 1);
        assert_eq!(area[0].0.len(), 8);
    }
}
