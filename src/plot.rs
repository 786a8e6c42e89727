//! Difficulty comparison charts
//!
//! A [`ChartModel`] holds everything drawn for one (task, noise) figure; the
//! [`PlotRenderer`] rasterizes it to PNG with `plotters`.

use crate::error::AnalysisError;
use crate::types::{Difficulty, DifficultySummary, Noise, Task};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};

const FONT: &str = "sans-serif";

/// Panel margin on every side
const MARGIN: i32 = 10;
/// Width of the y tick label area
const Y_LABEL_AREA: i32 = 70;
/// Extra left margin holding the reference line annotations
const ANNOTATION_WIDTH: i32 = 50;

/// Output file name of the chart for one task and noise condition
pub fn chart_file_name(task: Task, noise: Noise) -> String {
    format!("relation_difficulty_comparison_{task}_{noise}.png")
}

/// One participant's error bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub participant: String,
    /// Participant index
    pub x: f64,
    /// Average ratio
    pub y: f64,
    /// Minimum ratio (bottom of the error bar)
    pub low: f64,
    /// Maximum ratio (top of the error bar)
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Average,
    LowerBand,
    UpperBand,
}

/// Horizontal reference line with its annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub kind: ReferenceKind,
    pub value: f64,
    pub label: String,
}

impl ReferenceLine {
    fn new(kind: ReferenceKind, value: f64) -> Self {
        Self {
            kind,
            value,
            label: format!("{value:.2}"),
        }
    }

    fn color(&self) -> RGBColor {
        match self.kind {
            ReferenceKind::Average => RED,
            ReferenceKind::LowerBand | ReferenceKind::UpperBand => GREEN,
        }
    }
}

/// One difficulty subplot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelModel {
    pub difficulty: Difficulty,
    pub points: Vec<ChartPoint>,
    pub reference_lines: Vec<ReferenceLine>,
    pub x_range: (f64, f64),
    /// Upper y limit (the task ceiling); the lower limit is 0
    pub y_max: f64,
}

impl PanelModel {
    pub fn from_summary(summary: &DifficultySummary) -> Self {
        let points = summary
            .kept()
            .map(|p| ChartPoint {
                participant: p.participant.clone(),
                x: p.index as f64,
                y: p.average,
                low: p.min,
                high: p.max,
            })
            .collect();

        let reference_lines = summary
            .overall
            .as_ref()
            .map(|o| {
                vec![
                    ReferenceLine::new(ReferenceKind::Average, o.average),
                    ReferenceLine::new(ReferenceKind::LowerBand, o.lower_band()),
                    ReferenceLine::new(ReferenceKind::UpperBand, o.upper_band()),
                ]
            })
            .unwrap_or_default();

        let slots = summary.participants.len().max(1) as f64;
        Self {
            difficulty: summary.difficulty,
            points,
            reference_lines,
            x_range: (-0.5, slots - 0.5),
            y_max: summary.ceiling,
        }
    }

    pub fn title(&self) -> String {
        format!("Difficulty {}", self.difficulty)
    }
}

/// Everything drawn in one figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub task: Task,
    pub noise: Noise,
    pub panels: Vec<PanelModel>,
}

impl ChartModel {
    /// Build the figure for `task` from its per-difficulty summaries
    pub fn build(task: Task, noise: Noise, summaries: &[DifficultySummary]) -> Self {
        let panels = summaries
            .iter()
            .filter(|s| s.task == task)
            .map(PanelModel::from_summary)
            .collect();
        Self { task, noise, panels }
    }

    pub fn file_name(&self) -> String {
        chart_file_name(self.task, self.noise)
    }

    pub fn title(&self) -> String {
        format!(
            "Actions per switch by difficulty: task {}, noise {}",
            self.task, self.noise
        )
    }

    /// (rows, columns) of the subplot grid: two columns, rows as needed
    pub fn grid(&self) -> (usize, usize) {
        let cols = if self.panels.len() > 1 { 2 } else { 1 };
        let rows = self.panels.len().div_ceil(cols).max(1);
        (rows, cols)
    }
}

/// Top-left pixel of a reference line label, relative to the panel area
///
/// `axis_left` is the x pixel of the y axis and `line_y` the y pixel of the
/// line. The label lands in the annotation margin, left of the tick labels.
fn annotation_anchor(axis_left: i32, line_y: i32) -> (i32, i32) {
    (axis_left - Y_LABEL_AREA - ANNOTATION_WIDTH, line_y - 7)
}

fn plot_err<E: Display>(e: E) -> AnalysisError {
    AnalysisError::PlotError(e.to_string())
}

/// PNG renderer for [`ChartModel`]s
#[derive(Debug, Clone, Copy)]
pub struct PlotRenderer {
    width: u32,
    height: u32,
}

impl Default for PlotRenderer {
    fn default() -> Self {
        Self::new(1600, 1200)
    }
}

impl PlotRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Draw `model` into `output_dir` and return the written path
    pub fn render(&self, model: &ChartModel, output_dir: &Path) -> Result<PathBuf, AnalysisError> {
        let path = output_dir.join(model.file_name());
        {
            let root = BitMapBackend::new(&path, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(plot_err)?;
            let body = root
                .titled(&model.title(), (FONT, 28).into_font())
                .map_err(plot_err)?;

            let areas = body.split_evenly(model.grid());
            for (panel, area) in model.panels.iter().zip(&areas) {
                self.draw_panel(panel, area)?;
            }
            root.present().map_err(plot_err)?;
        }
        Ok(path)
    }

    fn draw_panel(
        &self,
        panel: &PanelModel,
        area: &DrawingArea<BitMapBackend, Shift>,
    ) -> Result<(), AnalysisError> {
        let (x0, x1) = panel.x_range;
        let y_max = panel.y_max;

        let mut chart = ChartBuilder::on(area)
            .caption(panel.title(), (FONT, 20))
            .margin(MARGIN)
            .margin_left(MARGIN + ANNOTATION_WIDTH)
            .x_label_area_size(30)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(x0..x1, 0.0..y_max)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Participant")
            .y_desc("Actions / switch")
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series(panel.points.iter().map(|p| {
                ErrorBar::new_vertical(
                    p.x,
                    p.low.max(0.0).min(y_max),
                    p.y,
                    p.high.max(0.0).min(y_max),
                    BLUE.filled(),
                    10,
                )
            }))
            .map_err(plot_err)?;

        let base = area.get_base_pixel();
        for line in &panel.reference_lines {
            let color = line.color();
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x0, line.value), (x1, line.value)],
                    color.stroke_width(2),
                )))
                .map_err(plot_err)?;

            let (px, py) = chart.backend_coord(&(x0, line.value));
            area.draw(&Text::new(
                line.label.clone(),
                annotation_anchor(px - base.0, py - base.1),
                (FONT, 14).into_font().color(&color),
            ))
            .map_err(plot_err)?;
        }

        Ok(())
    }
}
