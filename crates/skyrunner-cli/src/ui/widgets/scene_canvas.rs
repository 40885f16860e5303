use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use skyrunner_engine::{DrawCall, ScreenRect, Sprite};

use crate::ui::widgets::style;

const PLAYER_GLYPHS: [&str; 4] = ["█", "▓", "█", "▒"];

/// Paints the draw calls of one presented frame, scaled to fit the widget area.
#[derive(Debug)]
pub struct SceneCanvas<'a> {
    calls: &'a [DrawCall],
    block: Option<BlockWidget<'a>>,
}

impl<'a> SceneCanvas<'a> {
    pub fn new(calls: &'a [DrawCall]) -> Self {
        Self { calls, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }
}

impl Widget for SceneCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        if area.is_empty() {
            return;
        }

        let projection = Projection::new(area);
        for call in self.calls {
            let Some(cells) = projection.cells(&call.dest) else {
                continue;
            };
            match call.sprite {
                Sprite::Background => fill(buf, &cells, " ", style::SKY),
                Sprite::Obstacle => fill_ellipse(buf, &cells, "█", style::OBSTACLE),
                Sprite::Agent { variant } => {
                    let style = style::AGENTS[usize::from(variant) % style::AGENTS.len()];
                    fill(buf, &cells, "█", style);
                }
                Sprite::Player { frame } => {
                    let glyph = PLAYER_GLYPHS[usize::from(frame) % PLAYER_GLYPHS.len()];
                    fill(buf, &cells, glyph, style::PLAYER);
                }
            }
        }
    }
}

/// Maps screen-space rectangles of the full field onto terminal cells.
#[derive(Debug, Clone, Copy)]
struct Projection {
    area: Rect,
    scale_x: f64,
    scale_y: f64,
}

/// A projected rectangle: the covered cells plus its exact extent in cell units.
#[derive(Debug, Clone)]
struct Cells {
    columns: Range<u16>,
    rows: Range<u16>,
    center: (f64, f64),
    radii: (f64, f64),
}

impl Projection {
    fn new(area: Rect) -> Self {
        let field = ScreenRect::FIELD;
        Self {
            area,
            scale_x: f64::from(area.width) / f64::from(field.width),
            scale_y: f64::from(area.height) / f64::from(field.height),
        }
    }

    /// Returns `None` when the rectangle lies entirely outside the area.
    fn cells(&self, dest: &ScreenRect) -> Option<Cells> {
        let left = f64::from(self.area.x) + f64::from(dest.x) * self.scale_x;
        let top = f64::from(self.area.y) + f64::from(dest.y) * self.scale_y;
        let width = f64::from(dest.width) * self.scale_x;
        let height = f64::from(dest.height) * self.scale_y;
        Some(Cells {
            columns: span(left, width, self.area.left(), self.area.right())?,
            rows: span(top, height, self.area.top(), self.area.bottom())?,
            center: (left + width / 2.0, top + height / 2.0),
            radii: (width / 2.0, height / 2.0),
        })
    }
}

/// Cells touched by `[start, start + len)`, at least one, clipped to `[lo, hi)`.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn span(start: f64, len: f64, lo: u16, hi: u16) -> Option<Range<u16>> {
    let first = start.floor();
    let last = (start + len).ceil().max(first + 1.0);
    let first = first.max(f64::from(lo));
    let last = last.min(f64::from(hi));
    (first < last).then(|| first as u16..last as u16)
}

fn fill(buf: &mut Buffer, cells: &Cells, glyph: &str, style: Style) {
    for y in cells.rows.clone() {
        for x in cells.columns.clone() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(glyph).set_style(style);
            }
        }
    }
}

fn fill_ellipse(buf: &mut Buffer, cells: &Cells, glyph: &str, style: Style) {
    let (cx, cy) = cells.center;
    let (rx, ry) = cells.radii;
    // Shapes thinner than a cell would vanish between cell centers.
    let (rx, ry) = (rx.max(0.5), ry.max(0.5));
    for y in cells.rows.clone() {
        for x in cells.columns.clone() {
            let dx = (f64::from(x) + 0.5 - cx) / rx;
            let dy = (f64::from(y) + 0.5 - cy) / ry;
            if dx * dx + dy * dy <= 1.0
                && let Some(cell) = buf.cell_mut((x, y))
            {
                cell.set_symbol(glyph).set_style(style);
            }
        }
    }
}
