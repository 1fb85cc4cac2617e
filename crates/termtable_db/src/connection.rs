use std::fmt::{self, Display};

use crate::{TableData, metadata::MetadataRecord};

/// Reachability of a profile, as last observed by a probe.
///
/// Never persisted; every profile read from the registry starts as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

#[derive(Default, Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub name: String,
    pub host: String,
    pub port: String,
    pub database: String,
    pub user: String,
    pub pass: String,
    pub status: ConnectionStatus,
}

impl ConnectionProfile {
    /// Rebuild a profile from its persisted metadata. Credentials stay empty
    /// until resolved from the secret store.
    #[must_use]
    pub fn from_metadata(name: String, record: MetadataRecord) -> Self {
        Self {
            name,
            host: record.host,
            port: record.port,
            database: record.database,
            ..Self::default()
        }
    }

    /// The non-secret projection written to the metadata store
    #[must_use]
    pub fn metadata(&self) -> MetadataRecord {
        MetadataRecord {
            host: self.host.clone(),
            port: self.port.clone(),
            database: self.database.clone(),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, user: String, pass: String) -> Self {
        self.user = user;
        self.pass = pass;
        self
    }

    /// Labels of required fields that are blank. The password is optional.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("Host", &self.host),
            ("Port", &self.port),
            ("User", &self.user),
            ("Database", &self.database),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }
}

// Keeps the password out of logs and panic messages.
impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("status", &self.status)
            .finish()
    }
}

impl TableData for ConnectionProfile {
    fn title() -> &'static str {
        "Connections"
    }

    fn ref_array(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.host.clone(),
            self.port.clone(),
            self.database.clone(),
        ]
    }

    fn cols() -> Vec<&'static str> {
        vec!["Name", "Host", "Port", "Database"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ConnectionProfile {
        ConnectionProfile {
            name: "local".to_string(),
            host: "127.0.0.1".to_string(),
            port: "5432".to_string(),
            database: "db".to_string(),
            user: "u".to_string(),
            pass: "hunter2".to_string(),
            status: ConnectionStatus::Unknown,
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", profile());
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_missing_fields_ignores_password() {
        let mut p = profile();
        p.pass.clear();
        assert!(p.missing_fields().is_empty());

        p.host = "  ".to_string();
        p.database.clear();
        assert_eq!(p.missing_fields(), vec!["Host", "Database"]);
    }

    #[test]
    fn test_metadata_round_trip_drops_credentials() {
        let p = profile();
        let rebuilt = ConnectionProfile::from_metadata(p.name.clone(), p.metadata());
        assert_eq!(rebuilt.host, p.host);
        assert_eq!(rebuilt.port, p.port);
        assert_eq!(rebuilt.database, p.database);
        assert!(rebuilt.user.is_empty());
        assert!(rebuilt.pass.is_empty());
        assert_eq!(rebuilt.status, ConnectionStatus::Unknown);
    }

    #[test]
    fn test_table_row_matches_columns() {
        let p = profile();
        assert_eq!(p.ref_array().len(), ConnectionProfile::cols().len());
        assert_eq!(p.ref_array().first().map(String::as_str), Some("local"));
    }
}
