use std::{sync::Arc, time::Duration};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use termtable_db::{ConnectionRegistry, Connector};
use termtable_ui::Theme;
use tracing::{info, warn};

use crate::{
    config::Config,
    screens::{
        ConnectionPicker, HomeScreen, NewConnectionForm, Screen, Services, TableBrowser,
        Transition,
    },
};

/// The main application: the active screen plus the collaborators screens
/// are allowed to call.
pub struct App {
    /// Is the application running?
    running: bool,
    pub(crate) screen: Screen,
    registry: ConnectionRegistry,
    connector: Arc<dyn Connector>,
    pub(crate) theme: Theme,
    connect_timeout: Duration,
}

impl App {
    /// Start on the home screen
    #[must_use]
    pub fn new(
        registry: ConnectionRegistry,
        connector: Arc<dyn Connector>,
        config: &Config,
    ) -> Self {
        Self {
            running: true,
            screen: Screen::Home(HomeScreen::new()),
            registry,
            connector,
            theme: config.theme,
            connect_timeout: config.connect_timeout,
        }
    }

    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Run the application's main loop.
    ///
    /// # Errors
    ///
    /// Fails if the terminal cannot be drawn to or read from.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;
        info!("started");
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events().await?;
        }
        info!("stopped");
        Ok(())
    }

    /// Reads one crossterm event and updates the state of [`App`].
    async fn handle_crossterm_events(&mut self) -> Result<()> {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key_event(key).await;
            }
            Event::Paste(text) => self.handle_paste(&text),
            Event::Key(_)
            | Event::FocusGained
            | Event::FocusLost
            | Event::Mouse(_)
            | Event::Resize(_, _) => {}
        }
        Ok(())
    }

    /// Route a key to the active screen and apply the transition it asks for.
    /// Ctrl+C quits from anywhere.
    pub async fn handle_key_event(&mut self, key: KeyEvent) {
        if let (KeyModifiers::CONTROL, KeyCode::Char('c' | 'C')) = (key.modifiers, key.code) {
            self.quit();
            return;
        }

        let services = Services {
            connector: self.connector.as_ref(),
            timeout: self.connect_timeout,
        };
        let transition = match &mut self.screen {
            Screen::Home(home) => home.handle_key(key),
            Screen::NewConnection(form) => form.handle_key(key, &services).await,
            Screen::Picker(picker) => picker.handle_key(key, &self.registry),
            Screen::Browser(browser) => browser.handle_key(key, &services).await,
        };
        self.apply(transition).await;
    }

    /// Bracketed paste only lands in the connection form.
    pub fn handle_paste(&mut self, text: &str) {
        if let Screen::NewConnection(form) = &mut self.screen {
            form.paste(text);
        }
    }

    async fn apply(&mut self, transition: Transition) {
        let from = self.screen.name();
        match transition {
            Transition::Stay => return,
            Transition::Quit => {
                self.quit();
                return;
            }
            Transition::Home => self.screen = Screen::Home(HomeScreen::new()),
            Transition::NewConnection => {
                self.screen = Screen::NewConnection(NewConnectionForm::new());
            }
            Transition::Picker => {
                self.screen = Screen::Picker(ConnectionPicker::load(&self.registry));
            }
            Transition::Browse { profile, persist } => {
                let saved = persist.then(|| self.registry.save(&profile));

                let services = Services {
                    connector: self.connector.as_ref(),
                    timeout: self.connect_timeout,
                };
                let mut browser = TableBrowser::open(profile, &services).await;

                if let Some(Err(e)) = saved {
                    warn!(name = %browser.profile.name, error = %e, "could not save connection");
                    browser
                        .status
                        .set_error(format!("Connection not saved: {e}"));
                }
                self.screen = Screen::Browser(browser);
            }
        }
        info!(from, to = self.screen.name(), "screen changed");
    }

    /// Set running to false to quit the application.
    const fn quit(&mut self) {
        self.running = false;
    }
}
