use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};
use tracing::{debug, warn};

use crate::{ConnectionProfile, Connector, QueryError, Session, TabularResult};

/// Shown for a cell that holds SQL `NULL`
pub const NULL_MARKER: &str = "NULL";

/// [`Connector`] speaking the PostgreSQL wire protocol
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresConnector;

impl PostgresConnector {
    fn config(profile: &ConnectionProfile) -> Result<tokio_postgres::Config, QueryError> {
        let port: u16 = profile.port.trim().parse().map_err(|_| {
            QueryError::ConnectionFailed(format!("invalid port '{}'", profile.port))
        })?;

        let mut config = tokio_postgres::Config::new();
        config
            .host(profile.host.trim())
            .port(port)
            .user(&profile.user)
            .dbname(&profile.database);
        if !profile.pass.is_empty() {
            config.password(&profile.pass);
        }
        Ok(config)
    }
}

#[async_trait::async_trait]
impl Connector for PostgresConnector {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<Box<dyn Session>, QueryError> {
        let config = Self::config(profile)?;
        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| QueryError::ConnectionFailed(describe(&e)))?;

        // The connection object drives the socket; it finishes once the
        // client is dropped.
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "database connection error");
            }
        });

        debug!(name = %profile.name, "opened postgres session");
        Ok(Box::new(PostgresSession { client, driver }))
    }
}

struct PostgresSession {
    client: Client,
    driver: JoinHandle<()>,
}

#[async_trait::async_trait]
impl Session for PostgresSession {
    /// Runs `sql` over the simple query protocol, so the server formats
    /// every cell as text whatever its type.
    async fn query(&mut self, sql: &str) -> Result<TabularResult, QueryError> {
        let messages = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| QueryError::ExecutionFailed(describe(&e)))?;
        Ok(tabulate(&messages))
    }

    async fn close(self: Box<Self>) {
        let Self { client, driver } = *self;
        drop(client);
        if let Err(e) = driver.await {
            warn!(error = %e, "postgres connection task did not shut down cleanly");
        }
    }
}

/// Collect the rows of the last statement in `messages`.
///
/// Column names come from the row description, so an empty table still
/// reports its header.
fn tabulate(messages: &[SimpleQueryMessage]) -> TabularResult {
    let mut result = TabularResult::default();
    for message in messages {
        if let SimpleQueryMessage::RowDescription(columns) = message {
            result = TabularResult::new(
                columns.iter().map(|col| col.name().to_string()).collect(),
                Vec::new(),
            );
        } else if let SimpleQueryMessage::Row(row) = message {
            result.rows.push(
                (0..row.len())
                    .map(|i| row.get(i).unwrap_or(NULL_MARKER).to_string())
                    .collect(),
            );
        }
    }
    result
}

/// The server's own message when there is one, rather than "db error"
fn describe(e: &tokio_postgres::Error) -> String {
    e.as_db_error()
        .map_or_else(|| e.to_string(), |db| db.message().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{TestOutcome, probe};

    fn profile(port: &str) -> ConnectionProfile {
        ConnectionProfile {
            name: "local".to_string(),
            host: "127.0.0.1".to_string(),
            port: port.to_string(),
            database: "db".to_string(),
            user: "u".to_string(),
            pass: "p".to_string(),
            ..ConnectionProfile::default()
        }
    }

    #[test]
    fn test_config_rejects_bad_port() {
        assert!(matches!(
            PostgresConnector::config(&profile("not-a-port")),
            Err(QueryError::ConnectionFailed(_))
        ));
        assert!(PostgresConnector::config(&profile(" 5432 ")).is_ok());
    }

    #[test]
    fn test_tabulate_without_rows() {
        assert_eq!(tabulate(&[]), TabularResult::default());
        assert_eq!(
            tabulate(&[SimpleQueryMessage::CommandComplete(0)]),
            TabularResult::default()
        );
    }

    #[tokio::test]
    async fn test_probe_unreachable_port_fails() {
        // Port 1 on loopback is never a postgres server.
        let outcome = probe(&PostgresConnector, &profile("1")).await;
        assert_eq!(outcome, TestOutcome::Failed);
    }
}
