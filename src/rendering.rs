use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    widgets::{Block, Borders},
};
use termtable_db::{ConnectionProfile, TableData, TestOutcome};
use termtable_ui::{
    StatusLine, Theme,
    widgets::{
        buttons::Buttons,
        hotkey::Hotkey,
        select_list::SelectListView,
        table::{DataTableView, RawTableRow},
        text_input::TextField,
        top_bar_view::{
            APP_NAME, BROWSER_HOTKEYS, FORM_HOTKEYS, HOME_HOTKEYS, PICKER_HOTKEYS, TopBarView,
        },
    },
};

use crate::{
    app::App,
    screens::{
        ConnectionPicker, HomeScreen, NewConnectionForm, Screen, TableBrowser,
        browser::BrowserFocus,
        new_connection::{FIELD_LABELS, FormAction},
    },
};

const FORM_WIDTH: u16 = 60;
const HOME_WIDTH: u16 = 30;

impl App {
    /// Renders the user interface: top bar, the active screen, status line.
    pub fn render(&self, frame: &mut Frame) {
        let [top_bar, main, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            TopBarView {
                current_connection: self.current_connection(),
                hotkeys: self.hotkeys(),
                theme: &self.theme,
            },
            top_bar,
        );

        match &self.screen {
            Screen::Home(home) => render_home(frame, home, &self.theme, main),
            Screen::NewConnection(form) => render_form(frame, form, &self.theme, main),
            Screen::Picker(picker) => render_picker(frame, picker, &self.theme, main),
            Screen::Browser(browser) => render_browser(frame, browser, &self.theme, main),
        }

        if let Some(status_line) = self.status_line() {
            frame.render_widget(status_line.themed(&self.theme), status);
        }
    }

    fn current_connection(&self) -> Option<&ConnectionProfile> {
        match &self.screen {
            Screen::Browser(browser) => Some(&browser.profile),
            Screen::Home(_) | Screen::NewConnection(_) | Screen::Picker(_) => None,
        }
    }

    fn hotkeys(&self) -> &'static [Hotkey<'static>] {
        match &self.screen {
            Screen::Home(_) => &HOME_HOTKEYS,
            Screen::NewConnection(_) => &FORM_HOTKEYS,
            Screen::Picker(_) => &PICKER_HOTKEYS,
            Screen::Browser(_) => &BROWSER_HOTKEYS,
        }
    }

    fn status_line(&self) -> Option<&StatusLine> {
        match &self.screen {
            Screen::Home(_) => None,
            Screen::NewConnection(form) => Some(&form.status),
            Screen::Picker(picker) => Some(&picker.status),
            Screen::Browser(browser) => Some(&browser.status),
        }
    }
}

/// A `width` x `height` rect in the middle of `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn render_home(frame: &mut Frame, home: &HomeScreen, theme: &Theme, area: Rect) {
    let height = u16::try_from(home.menu.items().len()).unwrap_or(u16::MAX) + 2;
    frame.render_widget(
        SelectListView {
            list: &home.menu,
            title: APP_NAME,
            focused: true,
            theme,
        },
        centered(area, HOME_WIDTH, height),
    );
}

fn render_form(frame: &mut Frame, form: &NewConnectionForm, theme: &Theme, area: Rect) {
    let field_count = u16::try_from(FIELD_LABELS.len()).unwrap_or(u16::MAX);
    let area = centered(area, FORM_WIDTH, field_count + 4);

    let block = Block::new()
        .borders(Borders::ALL)
        .border_style(theme.focused())
        .title(" New Connection ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [fields_area, _, buttons_area] = Layout::vertical([
        Constraint::Length(field_count),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);
    let rows = Layout::vertical([Constraint::Length(1); FIELD_LABELS.len()]).split(fields_area);

    for (i, ((label, input), row)) in FIELD_LABELS
        .iter()
        .zip(form.fields.iter())
        .zip(rows.iter())
        .enumerate()
    {
        let focused = form.focus == i;
        let field = TextField {
            label,
            input,
            masked: NewConnectionForm::is_masked(i),
            style: if focused { theme.selected() } else { theme.blurred() },
        };
        if focused {
            frame.set_cursor_position(Position::new(row.x + field.cursor_x(), row.y));
        }
        frame.render_widget(field, *row);
    }

    let tint = form.test_result.map(|outcome| {
        let colour = match outcome {
            TestOutcome::Passed => theme.success,
            TestOutcome::Failed => theme.error,
        };
        (form.action.index(), colour)
    });
    let labels = FormAction::ALL.map(|action| action.to_string());
    frame.render_widget(
        Buttons {
            buttons: labels.iter().map(String::as_str).collect(),
            selected: form.action.index(),
            focused: form.on_action_row(),
            tint,
            theme,
        },
        buttons_area,
    );
}

fn render_picker(frame: &mut Frame, picker: &ConnectionPicker, theme: &Theme, area: Rect) {
    frame.render_widget(
        DataTableView {
            table: &picker.table,
            title: ConnectionProfile::title(),
            focused: true,
            theme,
        },
        area,
    );
}

fn render_browser(frame: &mut Frame, browser: &TableBrowser, theme: &Theme, area: Rect) {
    let [tables_area, content_area] =
        Layout::horizontal([Constraint::Percentage(25), Constraint::Min(0)]).areas(area);

    frame.render_widget(
        SelectListView {
            list: &browser.tables,
            title: "Tables",
            focused: browser.focus == BrowserFocus::Tables,
            theme,
        },
        tables_area,
    );

    let content_focused = browser.focus == BrowserFocus::Content;
    let title = browser
        .loaded_table
        .as_deref()
        .unwrap_or(RawTableRow::title());
    if let Some(content) = &browser.content {
        frame.render_widget(
            DataTableView {
                table: content,
                title,
                focused: content_focused,
                theme,
            },
            content_area,
        );
    } else {
        frame.render_widget(
            Block::new()
                .borders(Borders::ALL)
                .border_style(theme.border(content_focused))
                .title(format!(" {title} ")),
            content_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc};

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};
    use termtable_auth::MemorySecretStore;
    use termtable_db::{
        ConnectionRegistry, MetadataStore, TabularResult, testing::FakeConnector,
    };

    use super::*;
    use crate::config::Config;

    fn app() -> App {
        app_with(FakeConnector::reachable())
    }

    fn app_with(connector: FakeConnector) -> App {
        let registry = ConnectionRegistry::new(
            MetadataStore::open_in_memory().unwrap(),
            Box::new(MemorySecretStore::new()),
        );
        let config = Config {
            app_dir: PathBuf::new(),
            connect_timeout: std::time::Duration::from_millis(100),
            theme: Theme::default(),
        };
        App::new(registry, Arc::new(connector), &config)
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_home_shows_menu() {
        let text = screen_text(&app());
        assert!(text.contains("New Connection"));
        assert!(text.contains("Join Existing"));
    }

    #[tokio::test]
    async fn test_form_masks_password() {
        let mut app = app();
        app.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .await;
        for _ in 0..3 {
            app.handle_key_event(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE))
                .await;
        }
        for ch in "hunter2".chars() {
            app.handle_key_event(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))
                .await;
        }

        let text = screen_text(&app);
        assert!(text.contains("New Connection"));
        assert!(text.contains("SUBMIT"));
        assert!(!text.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_browser_titles_loaded_table() {
        let users = TabularResult::new(
            vec!["id".to_string(), "name".to_string()],
            vec![vec!["1".to_string(), "alice".to_string()]],
        );
        let mut app = app_with(FakeConnector::reachable().with_table("accounts", users));
        app.registry()
            .save(&ConnectionProfile {
                name: "local".to_string(),
                host: "localhost".to_string(),
                port: "5432".to_string(),
                database: "app".to_string(),
                user: "admin".to_string(),
                pass: "pw".to_string(),
                ..ConnectionProfile::default()
            })
            .unwrap();
        for code in [KeyCode::Down, KeyCode::Enter, KeyCode::Enter] {
            app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
                .await;
        }

        let text = screen_text(&app);
        assert!(text.contains(" accounts "));
        assert!(text.contains("alice"));
    }
}
