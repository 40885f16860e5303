use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::style;

/// Keys that trigger one action of a mode.
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    keys: &'static [&'static str],
    action: &'static str,
}

impl KeyBinding {
    pub const fn new(keys: &'static [&'static str], action: &'static str) -> Self {
        Self { keys, action }
    }

    /// `key1/key2 action`
    fn spans(self) -> impl Iterator<Item = Span<'static>> {
        let keys = self.keys.iter().enumerate().flat_map(|(i, key)| {
            let separator = (i > 0).then(|| Span::styled("/", style::HELP_SEPARATOR));
            separator
                .into_iter()
                .chain([Span::styled(*key, style::HELP_KEY)])
        });
        keys.chain([
            Span::styled(" ", style::DEFAULT),
            Span::styled(self.action, style::DEFAULT),
        ])
    }
}

/// Bottom bar listing the key bindings of the running mode.
#[derive(Debug)]
pub struct HelpBar<'a> {
    bindings: &'a [KeyBinding],
    block: Option<BlockWidget<'a>>,
}

impl<'a> HelpBar<'a> {
    pub fn new(bindings: &'a [KeyBinding]) -> Self {
        Self {
            bindings,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn height(&self) -> u16 {
        1 + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for HelpBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let spans = self.bindings.iter().enumerate().flat_map(|(i, binding)| {
            let separator = (i > 0).then(|| Span::styled(" | ", style::HELP_SEPARATOR));
            separator.into_iter().chain(binding.spans())
        });
        Line::from_iter(spans).centered().render(area, buf);
    }
}
