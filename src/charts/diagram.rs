//! Box-and-arrow diagrams: a free-form architecture diagram and a
//! left-to-right step sequence.

use super::scene::{HAnchor, Point, Scene, Shape, TextShape, VAnchor};
use super::{title_band, Canvas, ChartStyle};
use crate::error::{ReportError, Result};
use crate::theme::Rgb;

/// A labeled box in logical diagram coordinates (origin bottom-left, y up).
#[derive(Clone, Debug, PartialEq)]
pub struct DiagramBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub color: Rgb,
}

impl DiagramBox {
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        label: impl Into<String>,
        color: Rgb,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            label: label.into(),
            color,
        }
    }
}

/// An arrow between two points in logical coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiagramLink {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl DiagramLink {
    pub fn new(from: (f64, f64), to: (f64, f64)) -> Self {
        Self { from, to }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiagramSpec {
    pub title: String,
    /// Logical width and height of the drawing.
    pub extent: (f64, f64),
    pub boxes: Vec<DiagramBox>,
    pub links: Vec<DiagramLink>,
}

impl DiagramSpec {
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.extent;
        if !(width > 0.0 && height > 0.0) {
            return Err(ReportError::data(format!("diagram '{}' has an empty extent", self.title)));
        }
        let inside = |(x, y): (f64, f64)| (0.0..=width).contains(&x) && (0.0..=height).contains(&y);

        for item in &self.boxes {
            if item.width <= 0.0
                || item.height <= 0.0
                || !inside((item.x, item.y))
                || !inside((item.x + item.width, item.y + item.height))
            {
                return Err(ReportError::data(format!(
                    "diagram box '{}' lies outside the extent",
                    item.label.replace('\n', " ")
                )));
            }
        }
        if let Some(link) = self.links.iter().find(|link| !inside(link.from) || !inside(link.to)) {
            return Err(ReportError::data(format!(
                "diagram link {:?} -> {:?} lies outside the extent",
                link.from, link.to
            )));
        }
        Ok(())
    }
}

/// Maps logical coordinates onto a pixel rectangle, keeping the aspect ratio.
struct Viewport {
    origin: Point,
    scale: f64,
    height: f64,
}

impl Viewport {
    fn fit(extent: (f64, f64), min: Point, max: Point) -> Self {
        let scale = ((max.0 - min.0) / extent.0).min((max.1 - min.1) / extent.1);
        let used = (extent.0 * scale, extent.1 * scale);
        let origin = (
            min.0 + ((max.0 - min.0) - used.0) / 2.0,
            min.1 + ((max.1 - min.1) - used.1) / 2.0,
        );
        Self {
            origin,
            scale,
            height: extent.1,
        }
    }

    fn point(&self, (x, y): (f64, f64)) -> Point {
        (
            self.origin.0 + x * self.scale,
            self.origin.1 + (self.height - y) * self.scale,
        )
    }
}

fn labeled_box(
    scene: &mut Scene,
    style: &ChartStyle,
    (min, max): (Point, Point),
    color: Rgb,
    label: &str,
    label_size: f64,
    edge: f64,
) {
    scene.rect(min, max, style.fill(color));
    scene.outline(min, max, Rgb::WHITE, edge);
    scene.text(
        TextShape::new(((min.0 + max.0) / 2.0, (min.1 + max.1) / 2.0), label, label_size)
            .bold()
            .color(Rgb::WHITE),
    );
}

/// Lays out the boxes and connecting arrows of an architecture diagram.
pub fn architecture_scene(
    spec: &DiagramSpec,
    canvas: &Canvas,
    style: &ChartStyle,
) -> Result<Scene> {
    spec.validate()?;

    let mut scene = canvas.empty_scene(style.background);
    let top = title_band(&mut scene, canvas, style, &spec.title);
    let pad = canvas.pt(3.0);
    let view = Viewport::fit(spec.extent, (pad, top), (canvas.width - pad, canvas.height - pad));

    for item in &spec.boxes {
        let min = view.point((item.x, item.y + item.height));
        let max = view.point((item.x + item.width, item.y));
        labeled_box(
            &mut scene,
            style,
            (min, max),
            item.color,
            &item.label,
            canvas.pt(6.0),
            canvas.pt(1.5),
        );
    }

    for link in &spec.links {
        scene.push(Shape::Arrow {
            from: view.point(link.from),
            to: view.point(link.to),
            color: style.connector,
            width: canvas.pt(1.0),
            head: canvas.pt(5.0),
        });
    }

    Ok(scene)
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowStep {
    pub label: String,
    pub color: Rgb,
}

impl FlowStep {
    pub fn new(label: impl Into<String>, color: Rgb) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// An ordered sequence of steps drawn as equal boxes from left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowSpec {
    pub title: String,
    pub steps: Vec<FlowStep>,
}

const FLOW_EXTENT: (f64, f64) = (10.0, 3.5);
const FLOW_MARGIN: f64 = 0.1;
const FLOW_GAP: f64 = 0.2;
const FLOW_BOX_Y: f64 = 1.0;
const FLOW_BOX_HEIGHT: f64 = 1.4;
const FLOW_ARROW_CLEARANCE: f64 = 0.03;

/// Lays out numbered step boxes with an arrow between each consecutive pair.
pub fn flow_scene(spec: &FlowSpec, canvas: &Canvas, style: &ChartStyle) -> Result<Scene> {
    if spec.steps.is_empty() {
        return Err(ReportError::data(format!("flow chart '{}' has no steps", spec.title)));
    }

    let mut scene = canvas.empty_scene(style.background);
    let top = title_band(&mut scene, canvas, style, &spec.title);
    let pad = canvas.pt(3.0);
    let view = Viewport::fit(FLOW_EXTENT, (pad, top), (canvas.width - pad, canvas.height - pad));

    let count = spec.steps.len() as f64;
    let box_width = (FLOW_EXTENT.0 - 2.0 * FLOW_MARGIN - FLOW_GAP * (count - 1.0)) / count;
    if box_width <= 0.0 {
        return Err(ReportError::layout(format!(
            "flow chart '{}' has too many steps to fit",
            spec.title
        )));
    }
    let box_x = |index: usize| FLOW_MARGIN + index as f64 * (box_width + FLOW_GAP);
    let middle = FLOW_BOX_Y + FLOW_BOX_HEIGHT / 2.0;

    for (index, step) in spec.steps.iter().enumerate() {
        let x = box_x(index);
        let min = view.point((x, FLOW_BOX_Y + FLOW_BOX_HEIGHT));
        let max = view.point((x + box_width, FLOW_BOX_Y));
        labeled_box(
            &mut scene,
            style,
            (min, max),
            step.color,
            &step.label,
            canvas.pt(8.0),
            canvas.pt(2.0),
        );
        scene.text(
            TextShape::new(
                view.point((x + box_width / 2.0, FLOW_BOX_Y + FLOW_BOX_HEIGHT + 0.12)),
                (index + 1).to_string(),
                canvas.pt(7.0),
            )
            .bold()
            .color(step.color)
            .anchor(HAnchor::Center, VAnchor::Bottom),
        );

        if index + 1 < spec.steps.len() {
            scene.push(Shape::Arrow {
                from: view.point((x + box_width + FLOW_ARROW_CLEARANCE, middle)),
                to: view.point((box_x(index + 1) - FLOW_ARROW_CLEARANCE, middle)),
                color: style.flow_arrow,
                width: canvas.pt(1.5),
                head: canvas.pt(4.0),
            });
        }
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSize;

    fn six_steps() -> FlowSpec {
        FlowSpec {
            title: "User flow".into(),
            steps: [
                "Sign up\n+ Profile",
                "Discover\n+ Filter",
                "Apply /\nOpen room",
                "Accept\n+ DM",
                "DM\nIntro",
                "Watch\n& Date",
            ]
            .iter()
            .map(|label| FlowStep::new(*label, Rgb::from_u32(0x4285F4)))
            .collect(),
        }
    }

    #[test]
    fn six_steps_give_six_boxes_and_five_arrows_left_to_right() {
        let canvas = Canvas::new(ChartSize::new(150.0, 65.0), 150);
        let scene = flow_scene(&six_steps(), &canvas, &ChartStyle::default()).unwrap();

        let boxes = scene.rects();
        let arrows = scene.arrows();
        assert_eq!(boxes.len(), 6);
        assert_eq!(arrows.len(), 5);

        for (index, (from, to)) in arrows.iter().enumerate() {
            assert!(from.0 < to.0);
            assert!(from.0 >= boxes[index].1 .0);
            assert!(to.0 <= boxes[index + 1].0 .0);
        }
        for pair in boxes.windows(2) {
            assert!(pair[0].1 .0 < pair[1].0 .0);
        }

        let texts = scene.texts();
        for (index, step) in six_steps().steps.iter().enumerate() {
            let label = texts.iter().find(|text| text.text == step.label).unwrap();
            let (min, max, _) = boxes[index];
            assert!(label.position.0 > min.0 && label.position.0 < max.0);
            assert!(texts.iter().any(|text| text.text == (index + 1).to_string()));
        }
    }

    #[test]
    fn boxes_keep_logical_orientation() {
        let spec = DiagramSpec {
            title: String::new(),
            extent: (10.0, 8.0),
            boxes: vec![
                DiagramBox::new(0.2, 6.5, 2.8, 1.0, "Desktop", Rgb::from_u32(0x47848F)),
                DiagramBox::new(0.2, 1.4, 2.5, 1.0, "Ads", Rgb::from_u32(0x9B59B6)),
            ],
            links: vec![DiagramLink::new((1.4, 6.5), (1.4, 2.4))],
        };
        let canvas = Canvas::new(ChartSize::new(155.0, 105.0), 150);
        let scene = architecture_scene(&spec, &canvas, &ChartStyle::default()).unwrap();
        let boxes = scene.rects();
        assert!(boxes[0].0 .1 < boxes[1].0 .1);
        let (from, to) = scene.arrows()[0];
        assert!(from.1 < to.1);
    }

    #[test]
    fn box_outside_extent_is_rejected() {
        let spec = DiagramSpec {
            title: "x".into(),
            extent: (10.0, 8.0),
            boxes: vec![DiagramBox::new(9.0, 1.0, 2.0, 1.0, "Too wide", Rgb::BLACK)],
            links: Vec::new(),
        };
        assert!(spec.validate().is_err());
    }
}
