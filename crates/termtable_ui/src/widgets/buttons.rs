use ratatui::{
    prelude::{Buffer, Rect, Widget},
    style::{Color, Style},
    text::{Line, Span},
};

use crate::widgets::Theme;

/// A row of buttons. `selected` is highlighted only while the row has focus;
/// `tint` overrides the colour of one button, e.g. to show a test result.
pub struct Buttons<'a> {
    pub buttons: Vec<&'a str>,
    pub selected: usize,
    pub focused: bool,
    pub tint: Option<(usize, Color)>,
    pub theme: &'a Theme,
}

impl Widget for Buttons<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut button_spans = vec![];
        for (i, button) in self.buttons.iter().enumerate() {
            let mut style = if self.focused && i == self.selected {
                Style::default().fg(Color::White).bg(self.theme.accent)
            } else {
                Style::default().fg(Color::White).bg(self.theme.blurred)
            };
            if let Some((tinted, colour)) = self.tint
                && tinted == i
            {
                style = style.bg(colour);
            }
            button_spans.push(Span::styled(format!(" {button} "), style));
            button_spans.push(Span::raw(" "));
        }
        Line::from(button_spans).centered().render(area, buf);
    }
}
