use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget, Wrap},
};

use crate::widgets::Theme;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusKind {
    #[default]
    Info,
    Success,
    Error,
}

/// A one-line message shown under a screen's main content
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLine {
    message: String,
    kind: StatusKind,
}

impl StatusLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            message: String::new(),
            kind: StatusKind::Info,
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.kind = StatusKind::Info;
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.kind = StatusKind::Success;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.kind = StatusKind::Error;
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn kind(&self) -> StatusKind {
        self.kind
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, StatusKind::Error)
    }

    pub fn clear(&mut self) {
        self.message.clear();
        self.kind = StatusKind::Info;
    }

    /// Pair the message with the theme it should be drawn in
    #[must_use]
    pub const fn themed<'a>(&'a self, theme: &'a Theme) -> StatusLineView<'a> {
        StatusLineView { status: self, theme }
    }
}

pub struct StatusLineView<'a> {
    status: &'a StatusLine,
    theme: &'a Theme,
}

impl Widget for StatusLineView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let style = match self.status.kind {
            StatusKind::Info => self.theme.blurred(),
            StatusKind::Success => self.theme.success(),
            StatusKind::Error => self.theme.error(),
        };

        Paragraph::new(self.status.message.as_str())
            .style(style)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let mut status = StatusLine::new();
        status.set_error("boom");
        assert!(status.is_error());
        assert_eq!(status.message(), "boom");
        status.set_success("ok");
        assert_eq!(status.kind(), StatusKind::Success);
        status.clear();
        assert!(status.message().is_empty());
        assert_eq!(status.kind(), StatusKind::Info);
    }
}
