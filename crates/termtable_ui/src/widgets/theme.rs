use ratatui::style::{Color, Modifier, Style};

/// Colours used across every screen.
///
/// Built once at startup and handed to the renderer; widgets never reach for
/// a global style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub focused: Color,
    pub blurred: Color,
    pub success: Color,
    pub error: Color,
    pub selected: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Blue,
            focused: Color::White,
            blurred: Color::DarkGray,
            success: Color::Green,
            error: Color::Red,
            selected: Color::Magenta,
        }
    }
}

impl Theme {
    #[must_use]
    pub fn focused(&self) -> Style {
        Style::default().fg(self.focused)
    }

    #[must_use]
    pub fn blurred(&self) -> Style {
        Style::default().fg(self.blurred)
    }

    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    #[must_use]
    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Border style for a region that does or does not have focus
    #[must_use]
    pub fn border(&self, focused: bool) -> Style {
        if focused { self.focused() } else { self.blurred() }
    }
}
