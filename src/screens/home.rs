use crossterm::event::{KeyCode, KeyEvent};
use termtable_ui::widgets::select_list::SelectList;

use super::Transition;

pub const NEW_CONNECTION: &str = "New Connection";
pub const JOIN_EXISTING: &str = "Join Existing";

/// The start menu
#[derive(Debug, Clone)]
pub struct HomeScreen {
    pub menu: SelectList,
}

impl Default for HomeScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeScreen {
    #[must_use]
    pub fn new() -> Self {
        Self {
            menu: SelectList::new(vec![
                NEW_CONNECTION.to_string(),
                JOIN_EXISTING.to_string(),
            ]),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Transition {
        match (key.modifiers, key.code) {
            (_, KeyCode::Char('q') | KeyCode::Esc) => Transition::Quit,
            (_, KeyCode::Down | KeyCode::Char('j')) => {
                self.menu.select_next();
                Transition::Stay
            }
            (_, KeyCode::Up | KeyCode::Char('k')) => {
                self.menu.select_previous();
                Transition::Stay
            }
            (_, KeyCode::Enter) => match self.menu.selected_item() {
                Some(NEW_CONNECTION) => Transition::NewConnection,
                Some(JOIN_EXISTING) => Transition::Picker,
                Some(_) | None => Transition::Stay,
            },
            _ => Transition::Stay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::test_support::key;

    #[test]
    fn test_menu_routes() {
        let mut home = HomeScreen::new();
        assert_eq!(home.handle_key(key(KeyCode::Enter)), Transition::NewConnection);

        home.handle_key(key(KeyCode::Down));
        assert_eq!(home.handle_key(key(KeyCode::Enter)), Transition::Picker);

        home.handle_key(key(KeyCode::Char('k')));
        assert_eq!(home.menu.selected_item(), Some(NEW_CONNECTION));
    }

    #[test]
    fn test_quit() {
        let mut home = HomeScreen::new();
        assert_eq!(home.handle_key(key(KeyCode::Char('q'))), Transition::Quit);
    }
}
