//! Pie and donut charts.

use super::scene::{
    approx_text_height, approx_text_width, HAnchor, Point, Scene, Shape, TextShape, VAnchor,
};
use super::{title_band, Canvas, ChartSpec, ChartStyle};
use crate::error::{ReportError, Result};
use crate::theme::Rgb;

/// Arc segments are at most this many degrees wide.
const ARC_STEP_DEG: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct PieOptions {
    /// Per-wedge offset from the center as a fraction of the radius; missing
    /// entries mean no offset.
    pub explode: Vec<f64>,
    /// Inner radius as a fraction of the outer radius; zero draws a full pie.
    pub hole_ratio: f64,
    /// Angle of the first wedge edge, counterclockwise from 3 o'clock.
    pub start_angle_deg: f64,
    /// Decimals of the percentage printed inside each wedge; `None` hides it.
    pub percent_decimals: Option<usize>,
}

impl Default for PieOptions {
    fn default() -> Self {
        Self {
            explode: Vec::new(),
            hole_ratio: 0.0,
            start_angle_deg: 90.0,
            percent_decimals: Some(0),
        }
    }
}

impl PieOptions {
    pub fn with_explode(mut self, explode: Vec<f64>) -> Self {
        self.explode = explode;
        self
    }

    pub fn donut(mut self, hole_ratio: f64) -> Self {
        self.hole_ratio = hole_ratio;
        self
    }
}

fn polar(center: Point, radius: f64, angle_deg: f64) -> Point {
    let angle = angle_deg.to_radians();
    (center.0 + radius * angle.cos(), center.1 - radius * angle.sin())
}

fn arc(center: Point, radius: f64, from_deg: f64, to_deg: f64) -> Vec<Point> {
    let span = to_deg - from_deg;
    let steps = (span.abs() / ARC_STEP_DEG).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|step| polar(center, radius, from_deg + span * step as f64 / steps as f64))
        .collect()
}

/// Lays out a pie chart; wedges run counterclockwise from `start_angle_deg`
/// with category labels outside and percentages inside.
pub fn pie_scene(
    spec: &ChartSpec,
    options: &PieOptions,
    canvas: &Canvas,
    style: &ChartStyle,
) -> Result<Scene> {
    spec.validate()?;
    if !(0.0..0.95).contains(&options.hole_ratio) {
        return Err(ReportError::data(format!(
            "donut hole ratio {} is outside [0, 0.95)",
            options.hole_ratio
        )));
    }
    let total: f64 = spec.values.iter().sum();
    if total <= 0.0 {
        return Err(ReportError::data(format!("pie chart '{}' has a zero total", spec.title)));
    }

    let mut scene = canvas.empty_scene(style.background);
    let top = title_band(&mut scene, canvas, style, &spec.title);

    let label_size = canvas.pt(style.label_pt);
    let percent_size = canvas.pt(style.tick_pt);
    let max_explode = options.explode.iter().copied().fold(0.0, f64::max);
    let label_width = spec
        .labels
        .iter()
        .map(|label| approx_text_width(label, label_size))
        .fold(0.0, f64::max);
    let label_height = spec
        .labels
        .iter()
        .map(|label| approx_text_height(label, label_size))
        .fold(0.0, f64::max);
    let label_gap = label_size * 0.5;

    // The wedge ring, its largest explode offset and the label beyond it all fit.
    let horizontal = canvas.width / 2.0 - label_gap - label_width;
    let vertical = (canvas.height - top) / 2.0 - label_gap - label_height;
    let radius = (horizontal.min(vertical) / (1.0 + max_explode)).max(canvas.pt(10.0));
    let center = (canvas.width / 2.0, top + (canvas.height - top) / 2.0);
    let inner = radius * options.hole_ratio;
    let edge = canvas.pt(0.6);

    let mut angle = options.start_angle_deg;
    let mut labels = Vec::new();
    for (index, value) in spec.values.iter().enumerate() {
        let sweep = 360.0 * value / total;
        let (from, to) = (angle, angle + sweep);
        angle = to;
        if sweep <= f64::EPSILON {
            continue;
        }

        let middle = (from + to) / 2.0;
        let offset = options.explode.get(index).copied().unwrap_or(0.0) * radius;
        let wedge_center = polar(center, offset, middle);

        let mut outline = arc(wedge_center, radius, from, to);
        if inner > 0.0 {
            let mut inner_arc = arc(wedge_center, inner, from, to);
            inner_arc.reverse();
            outline.extend(inner_arc);
        } else {
            outline.insert(0, wedge_center);
        }

        scene.push(Shape::Polygon {
            points: outline.clone(),
            fill: spec.color(index),
        });
        let mut closed = outline;
        if let Some(first) = closed.first().copied() {
            closed.push(first);
        }
        scene.push(Shape::Polyline {
            points: closed,
            color: Rgb::WHITE,
            width: edge,
        });

        if let Some(decimals) = options.percent_decimals {
            let percent = 100.0 * value / total;
            let radial = if inner > 0.0 {
                (radius + inner) / 2.0
            } else {
                radius * 0.6
            };
            scene.text(
                TextShape::new(
                    polar(wedge_center, radial, middle),
                    format!("{percent:.decimals$}%"),
                    percent_size,
                )
                .bold()
                .color(Rgb::WHITE),
            );
        }

        let half_height = approx_text_height(&spec.labels[index], label_size) / 2.0;
        let (sin, cos) = middle.to_radians().sin_cos();
        let anchor = polar(wedge_center, radius + label_gap + sin.abs() * half_height, middle);
        let h_anchor = if cos > 0.1 {
            HAnchor::Left
        } else if cos < -0.1 {
            HAnchor::Right
        } else {
            HAnchor::Center
        };
        labels.push(
            TextShape::new(anchor, spec.labels[index].clone(), label_size)
                .color(style.text)
                .anchor(h_anchor, VAnchor::Middle),
        );
    }

    for label in labels {
        scene.text(label);
    }

    Ok(scene)
}
