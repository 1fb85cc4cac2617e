use crossterm::event::KeyCode;
use ratatui::{
    prelude::{Alignment, Buffer, Constraint, Layout, Rect, Widget},
    widgets::Paragraph,
};
use termtable_db::ConnectionProfile;

use super::hotkey::{Hotkey, HotkeyView};
use crate::widgets::Theme;

pub const APP_NAME: &str = "TermTable";

pub const HOME_HOTKEYS: [Hotkey; 2] = [
    Hotkey {
        keycode: KeyCode::Enter,
        description: "Select",
    },
    Hotkey {
        keycode: KeyCode::Char('q'),
        description: "Quit",
    },
];

pub const FORM_HOTKEYS: [Hotkey; 3] = [
    Hotkey {
        keycode: KeyCode::Tab,
        description: "Next Field",
    },
    Hotkey {
        keycode: KeyCode::Left,
        description: "Submit/Test",
    },
    Hotkey {
        keycode: KeyCode::Esc,
        description: "Back",
    },
];

pub const PICKER_HOTKEYS: [Hotkey; 3] = [
    Hotkey {
        keycode: KeyCode::Enter,
        description: "Open Connection",
    },
    Hotkey {
        keycode: KeyCode::Char('d'),
        description: "Delete Connection",
    },
    Hotkey {
        keycode: KeyCode::Esc,
        description: "Back",
    },
];

pub const BROWSER_HOTKEYS: [Hotkey; 3] = [
    Hotkey {
        keycode: KeyCode::Right,
        description: "Switch Pane",
    },
    Hotkey {
        keycode: KeyCode::Char('r'),
        description: "Reload",
    },
    Hotkey {
        keycode: KeyCode::Char('q'),
        description: "Home",
    },
];

pub struct TopBarView<'a> {
    pub current_connection: Option<&'a ConnectionProfile>,
    pub hotkeys: &'a [Hotkey<'a>],
    pub theme: &'a Theme,
}

impl Widget for TopBarView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [left, middle, right] = Layout::horizontal([
            Constraint::Percentage(30),
            Constraint::Percentage(55),
            Constraint::Percentage(15),
        ])
        .spacing(1)
        .areas(area);

        let connection = self
            .current_connection
            .map(|p| format!("{} / {}", p.name, p.database))
            .unwrap_or_default();
        Paragraph::new(connection)
            .style(self.theme.selected())
            .render(left, buf);
        HotkeyView {
            hotkeys: self.hotkeys,
            theme: self.theme,
        }
        .render(middle, buf);
        Paragraph::new(APP_NAME)
            .style(self.theme.focused())
            .alignment(Alignment::Right)
            .render(right, buf);
    }
}
