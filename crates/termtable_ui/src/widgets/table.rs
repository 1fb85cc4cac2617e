use ratatui::{
    layout::{Constraint, Rect},
    prelude::Buffer,
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, HighlightSpacing, Row, StatefulWidget, Table, TableState, Widget},
};
use termtable_db::{TableData, TabularResult};

use crate::widgets::{Theme, constraint_len_calculator};

/// One row of an arbitrary query result
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTableRow {
    pub values: Vec<String>,
}

impl TableData for RawTableRow {
    fn title() -> &'static str {
        "Table Data"
    }

    fn ref_array(&self) -> Vec<String> {
        self.values.clone()
    }

    fn cols() -> Vec<&'static str> {
        // Column names are only known at runtime; see `DataTable::header`.
        vec![]
    }
}

/// Rows plus the view state needed to draw them: selection, column scroll
/// offset and per-column widths.
#[derive(Clone, Debug, Default)]
pub struct DataTable<T: TableData + Clone> {
    pub items: Vec<T>,
    pub header: Vec<String>,
    pub longest_item_lens: Vec<u16>,
    pub table_state: TableState,
    pub column_offset: usize,
}

impl DataTable<RawTableRow> {
    /// A table showing a query result, header from its column names
    #[must_use]
    pub fn from_tabular(result: &TabularResult) -> Self {
        let items: Vec<RawTableRow> = result
            .rows
            .iter()
            .map(|values| RawTableRow {
                values: values.clone(),
            })
            .collect();

        let mut longest_item_lens = constraint_len_calculator(&items);
        for (i, name) in result.columns.iter().enumerate() {
            let width = u16::try_from(unicode_width::UnicodeWidthStr::width(name.as_str()))
                .unwrap_or(u16::MAX);
            match longest_item_lens.get_mut(i) {
                Some(len) => *len = (*len).max(width),
                None => longest_item_lens.push(width),
            }
        }

        Self::with_header(items, result.columns.clone(), longest_item_lens)
    }
}

impl<T: TableData + Clone> DataTable<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let longest_item_lens = constraint_len_calculator(&items);
        let header = T::cols().into_iter().map(str::to_string).collect();
        Self::with_header(items, header, longest_item_lens)
    }

    fn with_header(items: Vec<T>, header: Vec<String>, longest_item_lens: Vec<u16>) -> Self {
        let selected = (!items.is_empty()).then_some(0);
        Self {
            items,
            header,
            longest_item_lens,
            table_state: TableState::default().with_selected(selected),
            column_offset: 0,
        }
    }

    #[must_use]
    pub fn selected_item(&self) -> Option<&T> {
        self.table_state.selected().and_then(|i| self.items.get(i))
    }

    pub fn select_next(&mut self) {
        if let Some(i) = self.table_state.selected()
            && i + 1 < self.items.len()
        {
            self.table_state.select(Some(i + 1));
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(i) = self.table_state.selected()
            && i > 0
        {
            self.table_state.select(Some(i - 1));
        }
    }

    pub fn scroll_columns_right(&mut self) {
        if self.column_offset + 1 < self.longest_item_lens.len() {
            self.column_offset += 1;
        }
    }

    pub const fn scroll_columns_left(&mut self) {
        self.column_offset = self.column_offset.saturating_sub(1);
    }

    /// Indices of the columns that fit in `area_width`, starting at the offset.
    /// At least one column is always returned for a non-empty table.
    #[must_use]
    pub fn visible_columns(&self, area_width: u16) -> Vec<usize> {
        let mut visible = Vec::new();
        let mut cumulative_width = 0u16;
        for (idx, &len) in self.longest_item_lens.iter().enumerate().skip(self.column_offset) {
            let col_width = len.saturating_add(1);
            if cumulative_width.saturating_add(col_width) > area_width {
                break;
            }
            cumulative_width += col_width;
            visible.push(idx);
        }

        if visible.is_empty() && self.column_offset < self.longest_item_lens.len() {
            visible.push(self.column_offset);
        }
        visible
    }
}

pub struct DataTableView<'a, T: TableData + Clone> {
    pub table: &'a DataTable<T>,
    pub title: &'a str,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl<T: TableData + Clone> Widget for DataTableView<'_, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::new()
            .borders(Borders::ALL)
            .border_style(self.theme.border(self.focused))
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);
        block.render(area, buf);

        let visible = self.table.visible_columns(inner.width);
        if visible.is_empty() {
            return;
        }

        let header = visible
            .iter()
            .map(|&idx| Cell::from(self.table.header.get(idx).cloned().unwrap_or_default()))
            .collect::<Row>()
            .style(self.theme.focused().add_modifier(Modifier::BOLD))
            .height(1);

        let rows = self.table.items.iter().map(|data| {
            let row_data = data.ref_array();
            visible
                .iter()
                .map(|&idx| Cell::from(row_data.get(idx).cloned().unwrap_or_default()))
                .collect::<Row>()
                .height(1)
        });

        let constraints = visible
            .iter()
            .map(|&idx| {
                Constraint::Length(
                    self.table
                        .longest_item_lens
                        .get(idx)
                        .map_or(1, |len| len.saturating_add(1)),
                )
            })
            .collect::<Vec<_>>();

        let row_highlight = if self.focused {
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(self.theme.selected)
        } else {
            Style::default()
        };

        let table = Table::new(rows, constraints)
            .header(header)
            .style(self.theme.focused())
            .row_highlight_style(row_highlight)
            .highlight_symbol(" █ ")
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = self.table.table_state.clone();
        StatefulWidget::render(table, inner, buf, &mut state);
    }
}
