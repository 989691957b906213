//! Page layout for visit reports.
//!
//! Produces a render script: per page, a list of positioned text runs and
//! chart polylines. Coordinates are millimetres from the bottom-left corner,
//! matching the PDF coordinate system.

use serde::{Deserialize, Serialize};

use super::compose::{ReportBlock, TrendChart, VisitReport};
use super::metrics::{unwrap_lines, wrap_to_width, FontWeight, Join, PT_TO_MM};
use crate::timeline::intensity_color;

/// A4 portrait.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
pub const TOP_MM: f32 = PAGE_HEIGHT_MM - MARGIN_MM;
pub const BOTTOM_MM: f32 = MARGIN_MM;

const CHART_HEIGHT_MM: f32 = 45.0;
const LINE_SPACING: f32 = 1.4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x_mm: f32,
    /// Baseline
    pub y_mm: f32,
    pub size_pt: f32,
    pub weight: FontWeight,
    pub join: Join,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Polyline {
    pub points: Vec<(f32, f32)>,
    pub rgb: (u8, u8, u8),
    pub thickness_pt: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DrawOp {
    Text(TextRun),
    Polyline(Polyline),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LayoutPage {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub pages: Vec<LayoutPage>,
}

impl ReportLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text in reading order. Wrapped lines are re-joined with the
    /// separators they were broken at, so every composed value appears verbatim.
    pub fn plain_text(&self) -> String {
        unwrap_lines(
            self.pages
                .iter()
                .flat_map(|p| &p.ops)
                .filter_map(|op| match op {
                    DrawOp::Text(run) => Some((run.text.as_str(), &run.join)),
                    DrawOp::Polyline(_) => None,
                }),
        )
    }
}

/// Typography for one block kind.
struct BlockStyle {
    size_pt: f32,
    weight: FontWeight,
    space_before_mm: f32,
    indent_mm: f32,
    /// Lines that must fit on the page before the block starts; keeps
    /// headings from being stranded at the bottom.
    keep_lines: f32,
}

impl BlockStyle {
    fn line_height(&self) -> f32 {
        self.size_pt * PT_TO_MM * LINE_SPACING
    }
}

fn style_for(block: &ReportBlock) -> BlockStyle {
    match block {
        ReportBlock::Title(_) => BlockStyle {
            size_pt: 16.0,
            weight: FontWeight::Bold,
            space_before_mm: 0.0,
            indent_mm: 0.0,
            keep_lines: 2.0,
        },
        ReportBlock::Heading(_) => BlockStyle {
            size_pt: 13.0,
            weight: FontWeight::Bold,
            space_before_mm: 6.0,
            indent_mm: 0.0,
            keep_lines: 3.0,
        },
        ReportBlock::Subheading(_) => BlockStyle {
            size_pt: 11.0,
            weight: FontWeight::Bold,
            space_before_mm: 3.0,
            indent_mm: 0.0,
            keep_lines: 3.0,
        },
        ReportBlock::Field { .. } | ReportBlock::Paragraph(_) | ReportBlock::Chart(_) => {
            BlockStyle {
                size_pt: 10.0,
                weight: FontWeight::Regular,
                space_before_mm: 0.0,
                indent_mm: 4.0,
                keep_lines: 1.0,
            }
        }
    }
}

/// Running cursor over a growing list of pages.
struct Cursor {
    pages: Vec<LayoutPage>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![LayoutPage::default()],
            y: TOP_MM,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(LayoutPage::default());
        self.y = TOP_MM;
    }

    /// Start a new page unless `height` fits above the bottom margin.
    fn reserve(&mut self, height: f32) {
        if self.y - height < BOTTOM_MM && self.y < TOP_MM {
            self.new_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

/// Lay out a composed report onto A4 pages.
pub fn layout_report(report: &VisitReport) -> ReportLayout {
    let mut cursor = Cursor::new();

    for block in &report.blocks {
        let style = style_for(block);
        let line_height = style.line_height();

        match block {
            ReportBlock::Chart(chart) => {
                cursor.reserve(line_height + CHART_HEIGHT_MM);
                layout_text(&mut cursor, &style, &chart.caption);
                layout_chart(&mut cursor, chart);
            }
            ReportBlock::Title(text)
            | ReportBlock::Heading(text)
            | ReportBlock::Subheading(text)
            | ReportBlock::Paragraph(text) => {
                cursor.y -= style.space_before_mm;
                cursor.reserve(line_height * style.keep_lines);
                layout_text(&mut cursor, &style, text);
            }
            ReportBlock::Field { label, value } => {
                cursor.reserve(line_height * style.keep_lines);
                layout_text(&mut cursor, &style, &format!("{}: {}", label, value));
            }
        }
    }

    ReportLayout {
        title: report.title.clone(),
        pages: cursor.pages,
    }
}

fn layout_text(cursor: &mut Cursor, style: &BlockStyle, text: &str) {
    let line_height = style.line_height();
    let width = CONTENT_WIDTH_MM - style.indent_mm;

    for (line, join) in wrap_to_width(text, width, style.size_pt, style.weight) {
        if cursor.y - line_height < BOTTOM_MM {
            cursor.new_page();
        }
        cursor.y -= line_height;
        cursor.push(DrawOp::Text(TextRun {
            text: line,
            x_mm: MARGIN_MM + style.indent_mm,
            y_mm: cursor.y,
            size_pt: style.size_pt,
            weight: style.weight,
            join,
        }));
    }
}

/// Axes plus one polyline through the points, x evenly spaced, y by level 1-5.
fn layout_chart(cursor: &mut Cursor, chart: &TrendChart) {
    let left = MARGIN_MM + 4.0;
    let right = MARGIN_MM + CONTENT_WIDTH_MM;
    let top = cursor.y - 2.0;
    let bottom = cursor.y - CHART_HEIGHT_MM + 2.0;

    cursor.push(DrawOp::Polyline(Polyline {
        points: vec![(left, top), (left, bottom), (right, bottom)],
        rgb: (158, 158, 158),
        thickness_pt: 0.5,
    }));

    let span = (chart.points.len().max(2) - 1) as f32;
    let plot_height = top - bottom;
    let points: Vec<(f32, f32)> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = left + (right - left) * i as f32 / span;
            let y = bottom + plot_height * f32::from(p.level.clamp(1, 5) - 1) / 4.0;
            (x, y)
        })
        .collect();

    let peak = chart.points.iter().map(|p| p.level).max().unwrap_or(1);
    let color = intensity_color(peak);
    cursor.push(DrawOp::Polyline(Polyline {
        points,
        rgb: (color.r, color.g, color.b),
        thickness_pt: 1.5,
    }));

    cursor.y -= CHART_HEIGHT_MM;
}
