use std::fmt::Display;

use crossterm::event::KeyCode;
use ratatui::{
    prelude::{Buffer, Rect, Widget},
    text::{Line, Span},
};

use crate::widgets::Theme;

#[derive(Debug, Clone)]
pub struct Hotkey<'a> {
    pub keycode: KeyCode,
    pub description: &'a str,
}

impl Display for Hotkey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keycode)
    }
}

/// Hotkeys laid out left to right on a single line
pub struct HotkeyView<'a> {
    pub hotkeys: &'a [Hotkey<'a>],
    pub theme: &'a Theme,
}

impl Widget for HotkeyView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans = self.hotkeys.iter().flat_map(|hotkey| {
            [
                Span::styled(format!("<{hotkey}>"), self.theme.focused()),
                Span::styled(format!(" {}  ", hotkey.description), self.theme.blurred()),
            ]
        });
        Line::from(spans.collect::<Vec<_>>()).render(area, buf);
    }
}
