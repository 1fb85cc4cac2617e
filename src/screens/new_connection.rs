use std::fmt::{self, Display};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use termtable_db::{ConnectionProfile, TestOutcome};
use termtable_ui::{StatusLine, widgets::text_input::TextInput};
use tracing::info;

use super::{Services, Transition};

pub const FIELD_LABELS: [&str; 6] = ["Host", "Port", "User", "Pass", "Database", "Name"];

const HOST: usize = 0;
const PORT: usize = 1;
const USER: usize = 2;
const PASS: usize = 3;
const DATABASE: usize = 4;
const NAME: usize = 5;

/// Focus index of the SUBMIT/TEST row, after the last field
pub const ACTION_ROW: usize = FIELD_LABELS.len();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormAction {
    #[default]
    Submit,
    Test,
}

impl FormAction {
    pub const ALL: [Self; 2] = [Self::Submit, Self::Test];

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Submit => Self::Test,
            Self::Test => Self::Submit,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Submit => 0,
            Self::Test => 1,
        }
    }
}

impl Display for FormAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit => write!(f, "SUBMIT"),
            Self::Test => write!(f, "TEST"),
        }
    }
}

/// Form for a connection that has not been saved yet
#[derive(Debug, Clone, Default)]
pub struct NewConnectionForm {
    pub fields: [TextInput; FIELD_LABELS.len()],
    pub focus: usize,
    pub action: FormAction,
    pub test_result: Option<TestOutcome>,
    pub status: StatusLine,
}

impl NewConnectionForm {
    /// Empty fields, focus on the first one
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn on_action_row(&self) -> bool {
        self.focus == ACTION_ROW
    }

    #[must_use]
    pub const fn is_masked(field: usize) -> bool {
        field == PASS
    }

    fn value(&self, field: usize) -> String {
        self.fields
            .get(field)
            .map(|input| input.text().trim().to_string())
            .unwrap_or_default()
    }

    /// The profile described by the form. Without a name the database name
    /// is used.
    #[must_use]
    pub fn profile(&self) -> ConnectionProfile {
        let database = self.value(DATABASE);
        let name = Some(self.value(NAME))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| database.clone());

        ConnectionProfile {
            name,
            host: self.value(HOST),
            port: self.value(PORT),
            database,
            user: self.value(USER),
            pass: self
                .fields
                .get(PASS)
                .map(|input| input.text().to_string())
                .unwrap_or_default(),
            ..ConnectionProfile::default()
        }
    }

    const fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % (ACTION_ROW + 1);
    }

    const fn focus_previous(&mut self) {
        self.focus = (self.focus + ACTION_ROW) % (ACTION_ROW + 1);
    }

    fn reset_result(&mut self) {
        self.test_result = None;
        self.status.clear();
    }

    pub async fn handle_key(&mut self, key: KeyEvent, services: &Services<'_>) -> Transition {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => return Transition::Home,
            (_, KeyCode::Tab | KeyCode::Down) => self.focus_next(),
            (_, KeyCode::BackTab | KeyCode::Up) => self.focus_previous(),
            (_, KeyCode::Left | KeyCode::Right) if self.on_action_row() => {
                self.action = self.action.toggled();
                self.reset_result();
            }
            (_, KeyCode::Enter) if self.on_action_row() => return self.run_action(services).await,
            (_, KeyCode::Enter) => self.focus_next(),
            _ => self.edit_focused(key),
        }
        Transition::Stay
    }

    fn edit_focused(&mut self, key: KeyEvent) {
        let Some(input) = self.fields.get_mut(self.focus) else {
            return;
        };
        let changed = match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                input.move_cursor_to_start();
                false
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                input.move_cursor_to_end();
                false
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                input.clear();
                true
            }
            (_, KeyCode::Char(ch)) if !ch.is_control() => {
                input.add_char(ch);
                true
            }
            (_, KeyCode::Backspace) => {
                input.delete_char();
                true
            }
            (_, KeyCode::Left) => {
                input.move_cursor_left();
                false
            }
            (_, KeyCode::Right) => {
                input.move_cursor_right();
                false
            }
            _ => false,
        };
        if changed {
            self.reset_result();
        }
    }

    /// Insert pasted text into the focused field, dropping line breaks
    pub fn paste(&mut self, text: &str) {
        let Some(input) = self.fields.get_mut(self.focus) else {
            return;
        };
        text.chars()
            .filter(|ch| !ch.is_control())
            .for_each(|ch| input.add_char(ch));
        self.reset_result();
    }

    async fn run_action(&mut self, services: &Services<'_>) -> Transition {
        let mut profile = self.profile();
        match self.action {
            FormAction::Test => {
                let outcome = services.probe(&mut profile).await;
                self.test_result = Some(outcome);
                match outcome {
                    TestOutcome::Passed => self.status.set_success("Connection test PASSED"),
                    TestOutcome::Failed => self.status.set_error("Connection test FAILED"),
                }
                Transition::Stay
            }
            FormAction::Submit => {
                let missing = profile.missing_fields();
                if !missing.is_empty() {
                    self.status
                        .set_error(format!("Required: {}", missing.join(", ")));
                    return Transition::Stay;
                }

                let outcome = services.probe(&mut profile).await;
                self.test_result = Some(outcome);
                match outcome {
                    TestOutcome::Passed => {
                        info!(name = %profile.name, "new connection verified");
                        Transition::Browse {
                            profile,
                            persist: true,
                        }
                    }
                    TestOutcome::Failed => {
                        self.status.set_error(format!(
                            "Could not connect to {}:{}",
                            profile.host, profile.port
                        ));
                        Transition::Stay
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use termtable_db::{ConnectionStatus, testing::FakeConnector};

    use super::*;
    use crate::screens::test_support::{TIMEOUT, key};

    fn type_text(form: &mut NewConnectionForm, text: &str) {
        for ch in text.chars() {
            form.edit_focused(key(KeyCode::Char(ch)));
        }
    }

    fn filled() -> NewConnectionForm {
        let mut form = NewConnectionForm::new();
        for value in ["localhost", "5432", "admin", "pw", "app"] {
            type_text(&mut form, value);
            form.focus_next();
        }
        form
    }

    async fn submit(form: &mut NewConnectionForm, connector: &FakeConnector) -> Transition {
        let services = Services {
            connector,
            timeout: TIMEOUT,
        };
        form.focus = ACTION_ROW;
        form.handle_key(key(KeyCode::Enter), &services).await
    }

    #[test]
    fn test_fresh_form_is_empty() {
        let form = NewConnectionForm::new();
        assert_eq!(form.focus, 0);
        assert!(form.fields.iter().all(TextInput::is_empty));
        assert_eq!(form.action, FormAction::Submit);
        assert_eq!(form.test_result, None);
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut form = NewConnectionForm::new();
        form.focus_previous();
        assert_eq!(form.focus, ACTION_ROW);
        form.focus_next();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_profile_name_defaults_to_database() {
        let form = filled();
        let profile = form.profile();
        assert_eq!(profile.name, "app");
        assert_eq!(profile.pass, "pw");

        let mut named = filled();
        named.focus = NAME;
        type_text(&mut named, "prod");
        assert_eq!(named.profile().name, "prod");
    }

    #[test]
    fn test_paste_into_focused_field() {
        let mut form = NewConnectionForm::new();
        form.paste("db.internal\n");
        assert_eq!(form.profile().host, "db.internal");

        form.focus = ACTION_ROW;
        form.paste("ignored");
        assert_eq!(form.profile().host, "db.internal");
    }

    #[tokio::test]
    async fn test_submit_with_missing_fields_stays() {
        let connector = FakeConnector::reachable();
        let mut form = NewConnectionForm::new();
        assert_eq!(submit(&mut form, &connector).await, Transition::Stay);
        assert!(form.status.is_error());
        assert_eq!(connector.opened(), 0);
    }

    #[tokio::test]
    async fn test_submit_passing_enters_browser() {
        let connector = FakeConnector::reachable();
        let mut form = filled();
        let transition = submit(&mut form, &connector).await;
        let Transition::Browse { profile, persist } = transition else {
            panic!("expected browse, got {transition:?}");
        };
        assert!(persist);
        assert_eq!(profile.status, ConnectionStatus::Connected);
        assert_eq!(connector.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_submit_failing_stays_with_error() {
        let mut form = filled();
        let transition = submit(&mut form, &FakeConnector::unreachable()).await;
        assert_eq!(transition, Transition::Stay);
        assert_eq!(form.test_result, Some(TestOutcome::Failed));
        assert!(form.status.is_error());
    }

    #[tokio::test]
    async fn test_submit_times_out() {
        let mut form = filled();
        let transition = submit(&mut form, &FakeConnector::hanging()).await;
        assert_eq!(transition, Transition::Stay);
        assert_eq!(form.test_result, Some(TestOutcome::Failed));
    }

    #[tokio::test]
    async fn test_test_action_reports_inline() {
        let connector = FakeConnector::reachable();
        let services = Services {
            connector: &connector,
            timeout: TIMEOUT,
        };
        let mut form = filled();
        form.focus = ACTION_ROW;

        form.handle_key(key(KeyCode::Right), &services).await;
        assert_eq!(form.action, FormAction::Test);

        let transition = form.handle_key(key(KeyCode::Enter), &services).await;
        assert_eq!(transition, Transition::Stay);
        assert_eq!(form.test_result, Some(TestOutcome::Passed));

        form.handle_key(key(KeyCode::Left), &services).await;
        assert_eq!(form.action, FormAction::Submit);
        assert_eq!(form.test_result, None);
    }
}
