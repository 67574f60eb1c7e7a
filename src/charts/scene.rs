//! Pixel-space description of a chart, independent of the rasterizer.

use crate::theme::Rgb;

/// A point in pixels, origin at the top-left corner, y growing downwards.
pub type Point = (f64, f64);

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAnchor {
    Left,
    Center,
    Right,
}

/// Vertical text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VAnchor {
    Top,
    Middle,
    Bottom,
}

/// A text run. `\n` separates lines, which are stacked around the anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct TextShape {
    pub position: Point,
    pub text: String,
    pub size: f64,
    pub bold: bool,
    pub color: Rgb,
    pub h_anchor: HAnchor,
    pub v_anchor: VAnchor,
}

impl TextShape {
    /// Centered, regular-weight black text.
    pub fn new(position: Point, text: impl Into<String>, size: f64) -> Self {
        Self {
            position,
            text: text.into(),
            size,
            bold: false,
            color: Rgb::BLACK,
            h_anchor: HAnchor::Center,
            v_anchor: VAnchor::Middle,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn anchor(mut self, h_anchor: HAnchor, v_anchor: VAnchor) -> Self {
        self.h_anchor = h_anchor;
        self.v_anchor = v_anchor;
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Distance between the centers of consecutive lines.
    pub fn line_pitch(&self) -> f64 {
        self.size * 1.2
    }
}

/// A drawing primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Axis-aligned filled rectangle.
    Rect { min: Point, max: Point, fill: Rgb },
    /// Filled polygon.
    Polygon { points: Vec<Point>, fill: Rgb },
    /// Open stroked path; repeat the first point to close it.
    Polyline {
        points: Vec<Point>,
        color: Rgb,
        width: f64,
    },
    /// Filled circle.
    Circle { center: Point, radius: f64, fill: Rgb },
    /// Straight arrow with a filled head at `to`.
    Arrow {
        from: Point,
        to: Point,
        color: Rgb,
        width: f64,
        head: f64,
    },
    Text(TextShape),
}

/// An ordered list of shapes on a background; later shapes paint over earlier ones.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    width: u32,
    height: u32,
    background: Rgb,
    shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            background,
            shapes: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn text(&mut self, text: TextShape) {
        self.shapes.push(Shape::Text(text));
    }

    pub fn rect(&mut self, min: Point, max: Point, fill: Rgb) {
        self.shapes.push(Shape::Rect { min, max, fill });
    }

    /// Rectangle outline drawn as a closed polyline.
    pub fn outline(&mut self, min: Point, max: Point, color: Rgb, width: f64) {
        self.shapes.push(Shape::Polyline {
            points: vec![min, (max.0, min.1), max, (min.0, max.1), min],
            color,
            width,
        });
    }

    pub fn line(&mut self, from: Point, to: Point, color: Rgb, width: f64) {
        self.shapes.push(Shape::Polyline {
            points: vec![from, to],
            color,
            width,
        });
    }

    /// Filled rectangles in paint order.
    pub fn rects(&self) -> Vec<(Point, Point, Rgb)> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Rect { min, max, fill } => Some((*min, *max, *fill)),
                _ => None,
            })
            .collect()
    }

    /// Arrow endpoints in paint order.
    pub fn arrows(&self) -> Vec<(Point, Point)> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Arrow { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&TextShape> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn polygons(&self) -> Vec<(&[Point], Rgb)> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Polygon { points, fill } => Some((points.as_slice(), *fill)),
                _ => None,
            })
            .collect()
    }
}

/// Rough text width used for layout decisions before any font is loaded.
pub fn approx_text_width(text: &str, size: f64) -> f64 {
    text.split('\n')
        .map(|line| line.chars().count() as f64 * size * 0.55)
        .fold(0.0, f64::max)
}

/// Rough height of a possibly multi-line text block.
pub fn approx_text_height(text: &str, size: f64) -> f64 {
    text.split('\n').count() as f64 * size * 1.2
}
