//! In-process stand-in for a database server.
//!
//! [`FakeConnector`] serves canned tables and counts sessions, so callers can
//! assert that nothing is left open.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    ConnectionProfile, Connector, QueryError, Session, TabularResult,
    introspect::SELECT_ALL_FROM,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behaviour {
    Reachable,
    Unreachable,
    Hanging,
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

#[derive(Debug, Clone)]
pub struct FakeConnector {
    behaviour: Behaviour,
    tables: Arc<BTreeMap<String, TabularResult>>,
    counters: Arc<Counters>,
}

impl FakeConnector {
    /// Accepts every connection
    #[must_use]
    pub fn reachable() -> Self {
        Self::with_behaviour(Behaviour::Reachable)
    }

    /// Refuses every connection, like a closed port
    #[must_use]
    pub fn unreachable() -> Self {
        Self::with_behaviour(Behaviour::Unreachable)
    }

    /// Never answers a connection attempt
    #[must_use]
    pub fn hanging() -> Self {
        Self::with_behaviour(Behaviour::Hanging)
    }

    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            tables: Arc::new(BTreeMap::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    #[must_use]
    pub fn with_table(mut self, name: &str, contents: TabularResult) -> Self {
        Arc::make_mut(&mut self.tables).insert(name.to_string(), contents);
        self
    }

    /// Sessions opened so far
    #[must_use]
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Sessions opened and not yet closed
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.opened() - self.counters.closed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Connector for FakeConnector {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<Box<dyn Session>, QueryError> {
        match self.behaviour {
            Behaviour::Reachable => {
                self.counters.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(FakeSession {
                    tables: Arc::clone(&self.tables),
                    counters: Arc::clone(&self.counters),
                }))
            }
            Behaviour::Unreachable => Err(QueryError::ConnectionFailed(format!(
                "connection refused: {}:{}",
                profile.host, profile.port
            ))),
            Behaviour::Hanging => std::future::pending().await,
        }
    }
}

struct FakeSession {
    tables: Arc<BTreeMap<String, TabularResult>>,
    counters: Arc<Counters>,
}

#[async_trait::async_trait]
impl Session for FakeSession {
    async fn query(&mut self, sql: &str) -> Result<TabularResult, QueryError> {
        if sql.contains("information_schema.tables") {
            return Ok(TabularResult::new(
                vec!["table_name".to_string()],
                self.tables.keys().map(|name| vec![name.clone()]).collect(),
            ));
        }

        sql.strip_prefix(SELECT_ALL_FROM)
            .and_then(unquote_identifier)
            .and_then(|table| self.tables.get(&table))
            .cloned()
            .ok_or_else(|| {
                QueryError::ExecutionFailed(format!("relation does not exist: {sql}"))
            })
    }

    async fn close(self: Box<Self>) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Inverse of [`crate::introspect::quote_identifier`]; `None` unless `quoted`
/// is exactly one well-formed quoted identifier.
fn unquote_identifier(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut name = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' {
            // A lone quote would end the identifier early.
            chars.next().filter(|&next| next == '"')?;
        }
        name.push(c);
    }
    Some(name)
}
