pub mod buttons;
pub mod hotkey;
pub mod select_list;
pub mod status_line;
pub mod table;
pub mod text_input;
pub mod theme;
pub mod top_bar_view;

use termtable_db::TableData;
use unicode_width::UnicodeWidthStr;

pub use status_line::StatusLine;
pub use theme::Theme;

/// Display width of the widest line in each column, headers included
pub fn constraint_len_calculator<T: TableData>(items: &[T]) -> Vec<u16> {
    let mut result = T::cols()
        .iter()
        .map(|name| UnicodeWidthStr::width(*name))
        .collect::<Vec<usize>>();

    for data in items {
        let values = data.ref_array();
        if result.len() < values.len() {
            result.resize(values.len(), 0);
        }
        for (max_width, value) in result.iter_mut().zip(values.iter()) {
            let width = value.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
            *max_width = (*max_width).max(width);
        }
    }

    result
        .into_iter()
        .map(|w| u16::try_from(w).unwrap_or(u16::MAX))
        .collect()
}
