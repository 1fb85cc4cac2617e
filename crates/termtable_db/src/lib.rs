pub mod connection;
pub mod introspect;
pub mod metadata;
pub mod postgres;
pub mod probe;
pub mod registry;
pub mod testing;

pub use connection::{ConnectionProfile, ConnectionStatus};
pub use introspect::{fetch_all, list_tables};
pub use metadata::{MetadataRecord, MetadataStore};
pub use probe::{TestOutcome, probe, probe_profile};
pub use registry::{ConnectionRegistry, RegistryError};
pub use termtable_auth::StoreError;

/// Rows that can be shown by the table widgets
pub trait TableData {
    fn title() -> &'static str;
    fn ref_array(&self) -> Vec<String>;
    fn cols() -> Vec<&'static str>;
}

/// Generic string grid returned by any query.
///
/// Cell values are stringified at the driver boundary; no column types survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularResult {
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the first column, in row order
    #[must_use]
    pub fn first_column(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    ExecutionFailed(String),
}

/// Capability to open a session against the database a profile points at
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<Box<dyn Session>, QueryError>;
}

/// An open database session.
///
/// Sessions must be released with [`Session::close`]; the prober and
/// introspector never hold one past the call that opened it.
#[async_trait::async_trait]
pub trait Session: Send {
    async fn query(&mut self, sql: &str) -> Result<TabularResult, QueryError>;

    async fn close(self: Box<Self>);
}
