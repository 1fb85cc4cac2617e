use crossterm::event::{KeyCode, KeyEvent};
use termtable_db::{ConnectionProfile, ConnectionStatus, QueryError};
use termtable_ui::{
    StatusLine,
    widgets::{
        select_list::SelectList,
        table::{DataTable, RawTableRow},
    },
};
use tracing::{debug, warn};

use super::{Services, Transition};

/// Which half of the browser receives Up/Down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserFocus {
    #[default]
    Tables,
    Content,
}

impl BrowserFocus {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Tables => Self::Content,
            Self::Content => Self::Tables,
        }
    }
}

/// Table list on the left, contents of the selected table on the right
#[derive(Debug, Clone)]
pub struct TableBrowser {
    pub profile: ConnectionProfile,
    pub tables: SelectList,
    pub content: Option<DataTable<RawTableRow>>,
    /// Table whose rows are in `content`
    pub loaded_table: Option<String>,
    pub focus: BrowserFocus,
    pub status: StatusLine,
}

impl TableBrowser {
    /// Enter the browser: list the tables and show the first one.
    ///
    /// An unreachable server still opens the browser, empty, with the error
    /// shown and the profile marked disconnected.
    pub async fn open(profile: ConnectionProfile, services: &Services<'_>) -> Self {
        let mut browser = Self {
            profile,
            tables: SelectList::default(),
            content: None,
            loaded_table: None,
            focus: BrowserFocus::Tables,
            status: StatusLine::new(),
        };
        browser.load_tables(services).await;
        browser
    }

    /// `<name> / <database>`
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} / {}", self.profile.name, self.profile.database)
    }

    async fn load_tables(&mut self, services: &Services<'_>) {
        match services.list_tables(&self.profile).await {
            Ok(tables) => {
                self.profile.status = ConnectionStatus::Connected;
                debug!(name = %self.profile.name, count = tables.len(), "tables loaded");
                self.tables = SelectList::new(tables);
                if self.tables.is_empty() {
                    self.status.set_message("No tables");
                } else {
                    self.load_selected(services).await;
                }
            }
            Err(e) => {
                warn!(name = %self.profile.name, error = %e, "could not list tables");
                self.profile.status = ConnectionStatus::Disconnected;
                self.status.set_error(e.to_string());
            }
        }
    }

    /// Fetch the selected table. On failure the previous view is kept; a
    /// connection failure also marks the profile disconnected.
    async fn load_selected(&mut self, services: &Services<'_>) {
        let Some(table) = self.tables.selected_item().map(str::to_string) else {
            return;
        };

        match services.fetch_all(&self.profile, &table).await {
            Ok(result) => {
                self.profile.status = ConnectionStatus::Connected;
                self.content = Some(DataTable::from_tabular(&result));
                self.status
                    .set_message(format!("{table}: {} rows", result.rows.len()));
                self.loaded_table = Some(table);
            }
            Err(e) => {
                warn!(name = %self.profile.name, table = %table, error = %e, "could not fetch table");
                if matches!(e, QueryError::ConnectionFailed(_)) {
                    self.profile.status = ConnectionStatus::Disconnected;
                }
                self.status.set_error(format!("Could not load {table}: {e}"));
            }
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent, services: &Services<'_>) -> Transition {
        match (key.modifiers, key.code) {
            (_, KeyCode::Char('q') | KeyCode::Esc) => return Transition::Home,
            (_, KeyCode::Left | KeyCode::Right | KeyCode::Tab) => {
                self.focus = self.focus.toggled();
            }
            (_, KeyCode::Char('r')) => {
                if self.tables.is_empty() {
                    self.load_tables(services).await;
                } else {
                    self.load_selected(services).await;
                }
            }
            (_, KeyCode::Down | KeyCode::Char('j')) => self.move_selection(true, services).await,
            (_, KeyCode::Up | KeyCode::Char('k')) => self.move_selection(false, services).await,
            (_, KeyCode::Char('l')) => {
                if let Some(content) = &mut self.content {
                    content.scroll_columns_right();
                }
            }
            (_, KeyCode::Char('h')) => {
                if let Some(content) = &mut self.content {
                    content.scroll_columns_left();
                }
            }
            _ => {}
        }
        Transition::Stay
    }

    async fn move_selection(&mut self, down: bool, services: &Services<'_>) {
        match self.focus {
            BrowserFocus::Tables => {
                let before = self.tables.selected();
                if down {
                    self.tables.select_next();
                } else {
                    self.tables.select_previous();
                }
                if self.tables.selected() != before {
                    self.load_selected(services).await;
                }
            }
            BrowserFocus::Content => {
                if let Some(content) = &mut self.content {
                    if down {
                        content.select_next();
                    } else {
                        content.select_previous();
                    }
                }
            }
        }
    }
}
