//! Rasterizes a [`Scene`] with `plotters` and encodes it as PNG.

use std::io::Cursor;
use std::sync::{Mutex, PoisonError};

use log::debug;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};

use super::scene::{HAnchor, Point, Scene, Shape, TextShape, VAnchor};
use crate::error::{ReportError, Result};
use crate::fonts::FontFiles;
use crate::theme::Rgb;

/// Family name under which the chart fonts are registered with `plotters`.
pub const CHART_FONT_FAMILY: &str = "pitch-report-sans";

static REGISTERED: Registration = Registration::new();

fn leak(bytes: Vec<u8>) -> &'static [u8] {
    Box::leak(bytes.into_boxed_slice())
}

/// Remembers the family that made it into the process-wide `plotters` font
/// table. Only a successful registration is recorded, so a failed attempt is
/// retried by the next caller.
struct Registration {
    family: Mutex<Option<String>>,
}

impl Registration {
    const fn new() -> Self {
        Self {
            family: Mutex::new(None),
        }
    }

    fn ensure<F>(&self, family: &str, register: F) -> std::result::Result<(), String>
    where
        F: FnOnce() -> std::result::Result<(), String>,
    {
        let mut registered = self.family.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = registered.as_deref() {
            if existing != family {
                debug!("chart fonts already registered from {existing}");
            }
            return Ok(());
        }
        register()?;
        *registered = Some(family.to_owned());
        Ok(())
    }
}

/// Registers the regular and bold faces of `fonts` as [`CHART_FONT_FAMILY`].
///
/// The `plotters` font table is process-wide, so once a family is registered
/// later calls keep it. A failed registration leaves the table open for the
/// next call.
pub fn register_fonts(fonts: &FontFiles) -> Result<()> {
    REGISTERED
        .ensure(&fonts.family, || {
            let regular = fonts.regular_bytes().map_err(|err| err.to_string())?;
            let bold = fonts.bold_bytes().map_err(|err| err.to_string())?;
            register_font(CHART_FONT_FAMILY, FontStyle::Normal, leak(regular))
                .map_err(|_| format!("invalid font file {}", fonts.regular.display()))?;
            register_font(CHART_FONT_FAMILY, FontStyle::Bold, leak(bold))
                .map_err(|_| format!("invalid font file {}", fonts.bold.display()))?;
            Ok(())
        })
        .map_err(|message| {
            ReportError::Resource(format!("chart fonts could not be registered: {message}"))
        })
}

fn chart_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::Chart(err.to_string())
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.r, rgb.g, rgb.b)
}

fn px(point: Point) -> (i32, i32) {
    (point.0.round() as i32, point.1.round() as i32)
}

fn stroke(width: f64) -> u32 {
    width.round().max(1.0) as u32
}

fn arrow_head(from: Point, to: Point, head: f64) -> (Point, Vec<Point>) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f64::EPSILON {
        return (to, Vec::new());
    }
    let (ux, uy) = (dx / length, dy / length);
    let head = head.min(length);
    let base = (to.0 - ux * head, to.1 - uy * head);
    let half = head * 0.45;
    let (nx, ny) = (-uy * half, ux * half);
    (
        base,
        vec![to, (base.0 + nx, base.1 + ny), (base.0 - nx, base.1 - ny)],
    )
}

fn text_lines(text: &TextShape) -> Vec<(Point, &str)> {
    let lines: Vec<&str> = text.lines().collect();
    let pitch = text.line_pitch();
    let block = pitch * (lines.len() as f64 - 1.0);
    let first_center = match text.v_anchor {
        VAnchor::Top => text.position.1 + pitch / 2.0,
        VAnchor::Middle => text.position.1 - block / 2.0,
        VAnchor::Bottom => text.position.1 - block - pitch / 2.0,
    };
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| ((text.position.0, first_center + index as f64 * pitch), line))
        .collect()
}

/// Draws `scene` into an RGB buffer and returns the PNG encoding.
pub fn rasterize(scene: &Scene) -> Result<Vec<u8>> {
    let (width, height) = (scene.width(), scene.height());
    if width == 0 || height == 0 {
        return Err(ReportError::data("chart has no pixels"));
    }

    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&color(scene.background())).map_err(chart_error)?;

        for shape in scene.shapes() {
            match shape {
                Shape::Rect { min, max, fill } => {
                    root.draw(&Rectangle::new([px(*min), px(*max)], color(*fill).filled()))
                        .map_err(chart_error)?;
                }
                Shape::Polygon { points, fill } => {
                    let points: Vec<_> = points.iter().copied().map(px).collect();
                    root.draw(&Polygon::new(points, color(*fill).filled()))
                        .map_err(chart_error)?;
                }
                Shape::Polyline {
                    points,
                    color: line_color,
                    width,
                } => {
                    let points: Vec<_> = points.iter().copied().map(px).collect();
                    root.draw(&PathElement::new(
                        points,
                        color(*line_color).stroke_width(stroke(*width)),
                    ))
                    .map_err(chart_error)?;
                }
                Shape::Circle {
                    center,
                    radius,
                    fill,
                } => {
                    root.draw(&Circle::new(
                        px(*center),
                        radius.round().max(1.0) as u32,
                        color(*fill).filled(),
                    ))
                    .map_err(chart_error)?;
                }
                Shape::Arrow {
                    from,
                    to,
                    color: arrow_color,
                    width,
                    head,
                } => {
                    let (base, triangle) = arrow_head(*from, *to, *head);
                    root.draw(&PathElement::new(
                        vec![px(*from), px(base)],
                        color(*arrow_color).stroke_width(stroke(*width)),
                    ))
                    .map_err(chart_error)?;
                    if !triangle.is_empty() {
                        let triangle: Vec<_> = triangle.into_iter().map(px).collect();
                        root.draw(&Polygon::new(triangle, color(*arrow_color).filled()))
                            .map_err(chart_error)?;
                    }
                }
                Shape::Text(text) => {
                    let weight = if text.bold {
                        FontStyle::Bold
                    } else {
                        FontStyle::Normal
                    };
                    let h_pos = match text.h_anchor {
                        HAnchor::Left => HPos::Left,
                        HAnchor::Center => HPos::Center,
                        HAnchor::Right => HPos::Right,
                    };
                    let family = FontFamily::Name(CHART_FONT_FAMILY);
                    let style = FontDesc::new(family, text.size, weight)
                        .color(&color(text.color))
                        .pos(Pos::new(h_pos, VPos::Center));
                    for (position, line) in text_lines(text) {
                        if line.is_empty() {
                            continue;
                        }
                        root.draw(&Text::new(line.to_string(), px(position), style.clone()))
                            .map_err(chart_error)?;
                    }
                }
            }
        }

        root.present().map_err(chart_error)?;
    }

    encode_png(width, height, buffer)
}

fn encode_png(width: u32, height: u32, buffer: Vec<u8>) -> Result<Vec<u8>> {
    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| ReportError::Chart("pixel buffer does not match the chart size".into()))?;

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .map_err(chart_error)?;
    Ok(bytes)
}
