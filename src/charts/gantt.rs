//! Gantt chart over a calendar date axis.

use chrono::{Duration, NaiveDate};

use super::scene::{approx_text_width, HAnchor, Scene, TextShape, VAnchor};
use super::{title_band, Canvas, ChartStyle};
use crate::error::{ReportError, Result};
use crate::theme::Rgb;

/// Format of the date tick labels, e.g. `13 Feb`.
const TICK_FORMAT: &str = "%d %b";

#[derive(Clone, Debug, PartialEq)]
pub struct GanttOwner {
    pub name: String,
    pub color: Rgb,
}

impl GanttOwner {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GanttTask {
    pub owner: String,
    pub name: String,
    /// Days after the timeline start.
    pub offset_days: u32,
    pub duration_days: u32,
}

impl GanttTask {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        offset_days: u32,
        duration_days: u32,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            offset_days,
            duration_days,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GanttSpec {
    pub title: String,
    pub start: NaiveDate,
    /// Right end of the date axis.
    pub end: NaiveDate,
    pub owners: Vec<GanttOwner>,
    /// One row per task, top to bottom.
    pub tasks: Vec<GanttTask>,
    pub tick_interval_days: u32,
}

impl GanttSpec {
    fn owner(&self, name: &str) -> Option<&GanttOwner> {
        self.owners.iter().find(|owner| owner.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() || self.owners.is_empty() {
            return Err(ReportError::data(format!(
                "gantt chart '{}' has no tasks or owners",
                self.title
            )));
        }
        if self.tick_interval_days == 0 {
            return Err(ReportError::data("gantt tick interval must be at least one day"));
        }
        let span = (self.end - self.start).num_days();
        if span <= 0 {
            return Err(ReportError::data(format!(
                "gantt timeline ends on {} before it starts on {}",
                self.end, self.start
            )));
        }
        for task in &self.tasks {
            if self.owner(&task.owner).is_none() {
                return Err(ReportError::data(format!(
                    "gantt task '{}' belongs to unknown owner '{}'",
                    task.name, task.owner
                )));
            }
            if task.duration_days == 0 {
                return Err(ReportError::data(format!(
                    "gantt task '{}' has no duration",
                    task.name
                )));
            }
            if i64::from(task.offset_days) + i64::from(task.duration_days) > span {
                return Err(ReportError::data(format!(
                    "gantt task '{}' runs past the end of the timeline",
                    task.name
                )));
            }
        }
        Ok(())
    }
}

/// Lays out one bar per task, labeled inside, with owner names on the left,
/// date ticks below and an owner legend in the lower right corner.
pub fn gantt_scene(spec: &GanttSpec, canvas: &Canvas, style: &ChartStyle) -> Result<Scene> {
    spec.validate()?;

    let mut scene = canvas.empty_scene(style.background);
    let top = title_band(&mut scene, canvas, style, &spec.title);

    let owner_size = canvas.pt(6.0);
    let task_size = canvas.pt(5.0);
    let tick_size = canvas.pt(style.tick_pt);
    let pad = canvas.pt(4.0);
    let owner_width = spec
        .owners
        .iter()
        .map(|owner| approx_text_width(&owner.name, owner_size))
        .fold(0.0, f64::max);

    let left = pad + owner_width + pad;
    let right = canvas.width - pad;
    let bottom = canvas.height - pad - tick_size * 1.6;

    let span = (spec.end - spec.start).num_days() as f64;
    let axis_start = -0.5;
    let x_of = |day: f64| left + (right - left) * (day - axis_start) / (span - axis_start);

    let rows = spec.tasks.len() as f64;
    let slot = (bottom - top) / rows;
    let thickness = slot * 0.6;

    let mut day = 0;
    while i64::from(day) <= span as i64 {
        let x = x_of(day as f64);
        let date = spec.start + Duration::days(i64::from(day));
        scene.line((x, bottom), (x, bottom + tick_size * 0.3), style.axis, 1.0);
        scene.text(
            TextShape::new(
                (x, bottom + tick_size * 0.4),
                date.format(TICK_FORMAT).to_string(),
                tick_size,
            )
            .color(style.text)
            .anchor(HAnchor::Center, VAnchor::Top),
        );
        day += spec.tick_interval_days;
    }

    for (row, task) in spec.tasks.iter().enumerate() {
        let color = spec
            .owner(&task.owner)
            .map(|owner| owner.color)
            .unwrap_or(style.muted);
        let center = top + slot * (row as f64 + 0.5);
        let (y0, y1) = (center - thickness / 2.0, center + thickness / 2.0);
        let x0 = x_of(task.offset_days as f64);
        let x1 = x_of((task.offset_days + task.duration_days) as f64);

        scene.rect((x0, y0), (x1, y1), style.fill(color));
        scene.outline((x0, y0), (x1, y1), Rgb::WHITE, canvas.pt(0.5));
        scene.text(
            TextShape::new(((x0 + x1) / 2.0, center), task.name.clone(), task_size)
                .bold()
                .color(Rgb::WHITE),
        );
        scene.text(
            TextShape::new((left - pad / 2.0, center), task.owner.clone(), owner_size)
                .color(style.text)
                .anchor(HAnchor::Right, VAnchor::Middle),
        );
    }

    scene.line((left, top), (left, bottom), style.axis, 1.0);
    scene.line((left, bottom), (right, bottom), style.axis, 1.0);

    legend(&mut scene, canvas, style, &spec.owners, (right, bottom));

    Ok(scene)
}

fn legend(
    scene: &mut Scene,
    canvas: &Canvas,
    style: &ChartStyle,
    owners: &[GanttOwner],
    corner: (f64, f64),
) {
    let size = canvas.pt(style.tick_pt);
    let pad = canvas.pt(3.0);
    let swatch = size;
    let row_height = size * 1.5;
    let text_width = owners
        .iter()
        .map(|owner| approx_text_width(&owner.name, size))
        .fold(0.0, f64::max);

    let width = pad * 3.0 + swatch + text_width;
    let height = pad * 2.0 + row_height * owners.len() as f64;
    let (x1, y1) = (corner.0 - pad, corner.1 - pad);
    let (x0, y0) = (x1 - width, y1 - height);

    scene.rect((x0, y0), (x1, y1), style.background);
    scene.outline((x0, y0), (x1, y1), style.muted.over(style.background, 0.4), 1.0);

    for (index, owner) in owners.iter().enumerate() {
        let center = y0 + pad + row_height * (index as f64 + 0.5);
        scene.rect(
            (x0 + pad, center - swatch / 2.0),
            (x0 + pad + swatch, center + swatch / 2.0),
            owner.color,
        );
        scene.text(
            TextShape::new((x0 + pad * 2.0 + swatch, center), owner.name.clone(), size)
                .color(style.text)
                .anchor(HAnchor::Left, VAnchor::Middle),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSize;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn spec() -> GanttSpec {
        GanttSpec {
            title: "Work breakdown".into(),
            start: date(2026, 2, 13),
            end: date(2026, 3, 14),
            owners: vec![
                GanttOwner::new("Talha", Rgb::from_u32(0xFF8E53)),
                GanttOwner::new("Ege", Rgb::from_u32(0x4285F4)),
            ],
            tasks: vec![
                GanttTask::new("Talha", "Signaling", 0, 3),
                GanttTask::new("Ege", "Website", 3, 3),
            ],
            tick_interval_days: 3,
        }
    }

    #[test]
    fn ticks_use_day_month_format() {
        let canvas = Canvas::new(ChartSize::new(155.0, 145.0), 150);
        let scene = gantt_scene(&spec(), &canvas, &ChartStyle::default()).unwrap();
        let texts: Vec<_> = scene.texts().iter().map(|text| text.text.clone()).collect();
        assert!(texts.contains(&"13 Feb".to_string()));
        assert!(texts.contains(&"16 Feb".to_string()));
        assert!(texts.contains(&"Signaling".to_string()));
    }

    #[test]
    fn later_tasks_start_further_right_and_lower() {
        let canvas = Canvas::new(ChartSize::new(155.0, 145.0), 150);
        let scene = gantt_scene(&spec(), &canvas, &ChartStyle::default()).unwrap();
        let bars = scene.rects();
        assert!(bars[1].0 .0 > bars[0].0 .0);
        assert!(bars[1].0 .1 > bars[0].0 .1);
    }

    #[test]
    fn unknown_owner_is_rejected() {
        let mut spec = spec();
        spec.tasks.push(GanttTask::new("Deniz", "Extension", 0, 3));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn task_past_the_timeline_is_rejected() {
        let mut spec = spec();
        spec.tasks.push(GanttTask::new("Ege", "Late", 28, 3));
        assert!(spec.validate().is_err());
    }
}
