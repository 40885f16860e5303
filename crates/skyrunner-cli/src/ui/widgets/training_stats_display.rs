use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use skyrunner_training::GenerationController;

use crate::ui::widgets::style;

/// Side panel with the live state of a training run.
pub struct TrainingStatsDisplay<'a> {
    controller: &'a GenerationController,
    block: Option<BlockWidget<'a>>,
}

impl<'a> TrainingStatsDisplay<'a> {
    pub fn new(controller: &'a GenerationController) -> Self {
        Self {
            controller,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        22 + super::block_horizontal_margin(self.block.as_ref())
    }
}

type Value = &'static dyn Fn(&GenerationController) -> String;

#[derive(Clone, Copy)]
enum Row {
    Empty,
    FullLabel(&'static str),
    LabelValue(&'static str, Value),
}

fn archive_entry(controller: &GenerationController, rank: usize) -> String {
    controller
        .archive()
        .get(rank)
        .map_or_else(|| "-".to_owned(), |r| format!("{} (#{})", r.score, r.generation))
}

const ROWS: &[Row] = &[
    Row::LabelValue("GENERATION:", &|c| (c.generation() + 1).to_string()),
    Row::LabelValue("TICKS:", &|c| c.state().ticks.to_string()),
    Row::LabelValue("ALIVE:", &|c| {
        format!("{}/{}", c.alive_count(), c.population().len())
    }),
    Row::LabelValue("LEADER:", &|c| {
        c.leader_score().map_or_else(|| "-".to_owned(), |s| s.to_string())
    }),
    Row::LabelValue("OBSTACLES:", &|c| c.field().len().to_string()),
    Row::Empty,
    Row::LabelValue("ARCHIVE:", &|c| {
        format!("{}/{}", c.archive().len(), c.archive().limit())
    }),
    Row::FullLabel("TOP SCORES:"),
    Row::LabelValue(" 1.", &|c| archive_entry(c, 0)),
    Row::LabelValue(" 2.", &|c| archive_entry(c, 1)),
    Row::LabelValue(" 3.", &|c| archive_entry(c, 2)),
];

impl Widget for TrainingStatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;

        let rows_areas =
            Layout::vertical((0..ROWS.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(ROWS.iter().copied(), rows_areas.iter().copied()) {
            match row {
                Row::Empty => {}
                Row::FullLabel(label) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                }
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Length(11),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value(self.controller), style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use skyrunner_training::{MemoryStore, SpawnClock, TrainingConfig};

    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
    }

    #[test]
    fn test_renders_fresh_controller() {
        let config = TrainingConfig {
            population_size: 6,
            seed: Some(1),
            ..TrainingConfig::default()
        };
        let controller =
            GenerationController::new(config, Box::new(MemoryStore::new()), SpawnClock::Ticks)
                .unwrap();
        let display = TrainingStatsDisplay::new(&controller);
        let area = Rect::new(0, 0, display.width(), 12);
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);

        assert!(row_text(&buf, 0).starts_with("GENERATION:"));
        assert!(row_text(&buf, 0).trim_end().ends_with('1'));
        assert!(row_text(&buf, 2).trim_end().ends_with("6/6"));
        assert!(row_text(&buf, 6).trim_end().ends_with("0/10"));
        assert!(row_text(&buf, 8).trim_end().ends_with('-'));
    }
}
