use ratatui::{
    prelude::{Buffer, Rect, Widget},
    style::{Modifier, Style},
    text::{Line, Span},
};

/// A single-line text input with cursor management.
///
/// The cursor is a character index, so multi-byte input edits correctly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor_position: usize,
}

impl TextInput {
    /// Create a new empty `TextInput`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `TextInput` with initial text and cursor at the end
    #[must_use]
    pub fn with_text(text: String) -> Self {
        let cursor_position = text.chars().count();
        Self {
            text,
            cursor_position,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor position
    pub fn add_char(&mut self, ch: char) {
        let at = self.byte_index(self.cursor_position);
        self.text.insert(at, ch);
        self.cursor_position += 1;
    }

    /// Delete the character before the cursor (backspace)
    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let at = self.byte_index(self.cursor_position - 1);
            self.text.remove(at);
            self.cursor_position -= 1;
        }
    }

    pub const fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.len() {
            self.cursor_position += 1;
        }
    }

    pub const fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.len();
    }

    /// Clear all text and reset cursor
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor_position = 0;
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in characters
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Renders a labelled [`TextInput`] on one line, optionally masking its text
pub struct TextField<'a> {
    pub label: &'a str,
    pub input: &'a TextInput,
    pub masked: bool,
    pub style: Style,
}

impl TextField<'_> {
    /// Column offset of the cursor relative to the field's area
    #[must_use]
    pub fn cursor_x(&self) -> u16 {
        let offset = self.label.chars().count() + 2 + self.input.cursor_position();
        u16::try_from(offset).unwrap_or(u16::MAX)
    }
}

impl Widget for TextField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let value = if self.masked {
            "•".repeat(self.input.len())
        } else {
            self.input.text().to_string()
        };
        let placeholder = self.input.is_empty() && !self.masked;
        let value_span = if placeholder {
            Span::styled(self.label.to_lowercase(), self.style.add_modifier(Modifier::DIM))
        } else {
            Span::styled(value, self.style)
        };

        Line::from(vec![
            Span::styled(format!("{}: ", self.label), self.style),
            value_span,
        ])
        .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_char() {
        let mut input = TextInput::new();
        input.add_char('a');
        assert_eq!(input.text(), "a");
        assert_eq!(input.cursor_position(), 1);
    }

    #[test]
    fn test_delete_char() {
        let mut input = TextInput::with_text("hello".to_string());
        input.delete_char();
        assert_eq!(input.text(), "hell");
        assert_eq!(input.cursor_position(), 4);
    }

    #[test]
    fn test_cursor_movement() {
        let mut input = TextInput::with_text("hello".to_string());
        input.move_cursor_to_start();
        assert_eq!(input.cursor_position(), 0);
        input.move_cursor_right();
        assert_eq!(input.cursor_position(), 1);
        input.move_cursor_left();
        input.move_cursor_left();
        assert_eq!(input.cursor_position(), 0);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = TextInput::with_text("pä".to_string());
        input.move_cursor_left();
        input.add_char('ß');
        assert_eq!(input.text(), "pßä");
        input.move_cursor_to_end();
        input.delete_char();
        assert_eq!(input.text(), "pß");
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn test_masked_field_hides_text() {
        let input = TextInput::with_text("secret".to_string());
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        TextField {
            label: "Pass",
            input: &input,
            masked: true,
            style: Style::default(),
        }
        .render(area, &mut buf);

        let rendered: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(rendered.starts_with("Pass: ••••••"));
        assert!(!rendered.contains("secret"));
    }
}
