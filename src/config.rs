//! Application directory and user settings.
//!
//! Everything lives in `~/.termtable` (or `$TERMTABLE_HOME`): the connection
//! metadata file, the log file and an optional `config.toml`.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use color_eyre::{
    Result,
    eyre::{WrapErr, eyre},
};
use directories::BaseDirs;
use ratatui::style::Color;
use serde::Deserialize;
use termtable_db::metadata::{METADATA_FILE, create_private_dir};
use termtable_ui::Theme;

/// Overrides the application directory
pub const HOME_ENV: &str = "TERMTABLE_HOME";

const APP_DIR: &str = ".termtable";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "termtable.log";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Settings {
    connect_timeout_secs: u64,
    theme: ThemeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            theme: ThemeSettings::default(),
        }
    }
}

/// Colour names as accepted by ratatui, e.g. `"blue"`, `"#ff8800"`, `"42"`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ThemeSettings {
    accent: Option<String>,
    focused: Option<String>,
    blurred: Option<String>,
    success: Option<String>,
    error: Option<String>,
    selected: Option<String>,
}

impl ThemeSettings {
    fn into_theme(self) -> Result<Theme> {
        let defaults = Theme::default();
        Ok(Theme {
            accent: colour(self.accent, defaults.accent)?,
            focused: colour(self.focused, defaults.focused)?,
            blurred: colour(self.blurred, defaults.blurred)?,
            success: colour(self.success, defaults.success)?,
            error: colour(self.error, defaults.error)?,
            selected: colour(self.selected, defaults.selected)?,
        })
    }
}

fn colour(name: Option<String>, default: Color) -> Result<Color> {
    name.map_or(Ok(default), |name| {
        Color::from_str(&name).map_err(|_| eyre!("unknown colour '{name}' in {CONFIG_FILE}"))
    })
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_dir: PathBuf,
    /// Upper bound on every probe and table query
    pub connect_timeout: Duration,
    pub theme: Theme,
}

impl Config {
    /// Load from the default application directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Fails if no home directory can be found, the directory cannot be
    /// created, or `config.toml` exists but is invalid.
    pub fn load() -> Result<Self> {
        Self::from_dir(Self::default_app_dir()?)
    }

    /// `$TERMTABLE_HOME`, falling back to `~/.termtable`
    ///
    /// # Errors
    ///
    /// Fails if the variable is unset and no home directory can be found.
    pub fn default_app_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        let base = BaseDirs::new().ok_or_else(|| eyre!("could not determine home directory"))?;
        Ok(base.home_dir().join(APP_DIR))
    }

    /// Load using `app_dir` as the application directory.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created or `config.toml` exists but
    /// is invalid.
    pub fn from_dir(app_dir: impl AsRef<Path>) -> Result<Self> {
        let app_dir = app_dir.as_ref().to_path_buf();
        create_private_dir(&app_dir)
            .wrap_err_with(|| format!("could not create {}", app_dir.display()))?;

        let path = app_dir.join(CONFIG_FILE);
        let settings = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str::<Settings>(&content)
                .wrap_err_with(|| format!("invalid {}", path.display()))?
        } else {
            Settings::default()
        };

        Ok(Self {
            app_dir,
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs.max(1)),
            theme: settings.theme.into_theme()?,
        })
    }

    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.app_dir.join(METADATA_FILE)
    }

    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.app_dir.join(LOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_dir(dir.path().join("app")).unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.theme, Theme::default());
        assert!(config.app_dir.is_dir());
        assert!(config.metadata_path().ends_with(METADATA_FILE));
    }

    #[test]
    fn test_reads_timeout_and_theme() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "connect_timeout_secs = 2\n[theme]\naccent = \"green\"\n",
        )
        .unwrap();

        let config = Config::from_dir(dir.path()).unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.theme.accent, Color::Green);
        assert_eq!(config.theme.error, Theme::default().error);
    }

    #[test]
    fn test_rejects_unknown_colour() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[theme]\nerror = \"nope\"\n").unwrap();
        assert!(Config::from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "connect_timeout_secs = \"soon\"").unwrap();
        assert!(Config::from_dir(dir.path()).is_err());
    }
}
