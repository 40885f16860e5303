use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{help_bar::*, scene_canvas::*, training_stats_display::*};

mod help_bar;
mod scene_canvas;
mod training_stats_display;

mod color {
    use ratatui::style::Color;

    pub const SKY: Color = Color::Rgb(8, 12, 32);
    pub const ROCK: Color = Color::Rgb(150, 110, 80);
    pub const YELLOW: Color = Color::Rgb(255, 255, 0);
    pub const CYAN: Color = Color::Rgb(0, 255, 255);
    pub const GREEN: Color = Color::Rgb(0, 255, 0);
    pub const MAGENTA: Color = Color::Rgb(255, 0, 255);
    pub const ORANGE: Color = Color::Rgb(255, 127, 0);
    pub const BLUE: Color = Color::Rgb(80, 120, 255);
    pub const RED: Color = Color::Rgb(255, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    pub const GRAY: Color = Color::Rgb(110, 110, 110);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
}

pub mod style {
    use ratatui::style::{Color, Modifier, Style};

    use crate::ui::widgets::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const SKY: Style = fg_bg(color::SKY, color::SKY);
    pub const OBSTACLE: Style = fg_bg(color::ROCK, color::SKY);
    pub const PLAYER: Style = fg_bg(color::YELLOW, color::SKY);
    pub const HELP_KEY: Style = fg_bg(color::CYAN, color::BLACK);
    pub const HELP_SEPARATOR: Style = fg_bg(color::GRAY, color::BLACK);
    pub const BANNER: Style = fg_bg(color::RED, color::BLACK).add_modifier(Modifier::BOLD);

    /// One style per agent skin.
    pub const AGENTS: [Style; 5] = [
        fg_bg(color::CYAN, color::SKY),
        fg_bg(color::GREEN, color::SKY),
        fg_bg(color::MAGENTA, color::SKY),
        fg_bg(color::ORANGE, color::SKY),
        fg_bg(color::BLUE, color::SKY),
    ];
}

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}
