use ratatui::{
    prelude::{Buffer, Rect, StatefulWidget, Widget},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::widgets::Theme;

/// A vertical single-selection list of labels. Selection stops at both ends.
#[derive(Debug, Clone, Default)]
pub struct SelectList {
    items: Vec<String>,
    state: ListState,
}

impl SelectList {
    #[must_use]
    pub fn new(items: Vec<String>) -> Self {
        let selected = (!items.is_empty()).then_some(0);
        Self {
            items,
            state: ListState::default().with_selected(selected),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    #[must_use]
    pub fn selected_item(&self) -> Option<&str> {
        self.selected()
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
    }

    pub fn select_next(&mut self) {
        if let Some(i) = self.selected()
            && i + 1 < self.items.len()
        {
            self.state.select(Some(i + 1));
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(i) = self.selected()
            && i > 0
        {
            self.state.select(Some(i - 1));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct SelectListView<'a> {
    pub list: &'a SelectList,
    pub title: &'a str,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl Widget for SelectListView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = self
            .list
            .items
            .iter()
            .map(|item| ListItem::new(item.as_str()))
            .collect();
        let highlight = if self.focused {
            self.theme.selected()
        } else {
            self.theme.focused()
        };

        let list = List::new(items)
            .block(
                Block::new()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border(self.focused))
                    .title(format!(" {} ", self.title)),
            )
            .style(self.theme.blurred())
            .highlight_style(highlight)
            .highlight_symbol("> ");

        let mut state = self.list.state.clone();
        StatefulWidget::render(list, area, buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> SelectList {
        SelectList::new(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    }

    #[test]
    fn test_selection_stops_at_ends() {
        let mut l = list();
        l.select_previous();
        assert_eq!(l.selected(), Some(0));
        l.select_next();
        l.select_next();
        l.select_next();
        assert_eq!(l.selected_item(), Some("c"));
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let mut l = SelectList::new(vec![]);
        l.select_next();
        assert_eq!(l.selected(), None);
        assert_eq!(l.selected_item(), None);
    }
}
