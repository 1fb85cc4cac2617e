//! The four screens and the transitions between them.
//!
//! Each screen owns its state and handles its own keys. The only data that
//! crosses from one screen to the next travels inside a [`Transition`].

pub mod browser;
pub mod home;
pub mod new_connection;
pub mod picker;

use std::time::Duration;

use termtable_db::{
    ConnectionProfile, ConnectionStatus, Connector, QueryError,
    TabularResult, TestOutcome,
};
use tracing::warn;

pub use browser::TableBrowser;
pub use home::HomeScreen;
pub use new_connection::NewConnectionForm;
pub use picker::ConnectionPicker;

/// The active screen and its private state
#[derive(Debug)]
pub enum Screen {
    Home(HomeScreen),
    NewConnection(NewConnectionForm),
    Picker(ConnectionPicker),
    Browser(TableBrowser),
}

impl Screen {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Home(_) => "home",
            Self::NewConnection(_) => "new_connection",
            Self::Picker(_) => "picker",
            Self::Browser(_) => "browser",
        }
    }
}

/// What a screen asks the app to do after handling a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Home,
    NewConnection,
    Picker,
    /// Enter the browser with `profile`. `persist` saves it to the registry
    /// first; profiles opened from the registry are not written back.
    Browse {
        profile: ConnectionProfile,
        persist: bool,
    },
    Quit,
}

/// Collaborators a screen may call while handling a key.
///
/// Every network call goes through here so it is bounded by `timeout`.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub connector: &'a dyn Connector,
    pub timeout: Duration,
}

impl Services<'_> {
    /// Probe `profile` and record the outcome on it. Running out of time
    /// counts as `Failed`.
    pub async fn probe(&self, profile: &mut ConnectionProfile) -> TestOutcome {
        let probe = termtable_db::probe_profile(self.connector, profile);
        if let Ok(outcome) = tokio::time::timeout(self.timeout, probe).await {
            outcome
        } else {
            warn!(name = %profile.name, timeout = ?self.timeout, "probe timed out");
            profile.status = ConnectionStatus::Disconnected;
            TestOutcome::Failed
        }
    }

    /// # Errors
    ///
    /// See [`termtable_db::list_tables`]; a timeout is `ConnectionFailed`.
    pub async fn list_tables(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<Vec<String>, QueryError> {
        tokio::time::timeout(
            self.timeout,
            termtable_db::list_tables(self.connector, profile),
        )
        .await
        .map_err(|_| self.timed_out(profile))?
    }

    /// # Errors
    ///
    /// See [`termtable_db::fetch_all`]; a timeout is `ConnectionFailed`.
    pub async fn fetch_all(
        &self,
        profile: &ConnectionProfile,
        table_name: &str,
    ) -> Result<TabularResult, QueryError> {
        tokio::time::timeout(
            self.timeout,
            termtable_db::fetch_all(self.connector, profile, table_name),
        )
        .await
        .map_err(|_| self.timed_out(profile))?
    }

    fn timed_out(&self, profile: &ConnectionProfile) -> QueryError {
        warn!(name = %profile.name, timeout = ?self.timeout, "query timed out");
        QueryError::ConnectionFailed(format!(
            "timed out after {}s",
            self.timeout.as_secs()
        ))
    }
}
