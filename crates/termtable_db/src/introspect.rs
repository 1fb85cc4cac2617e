use tracing::{debug, warn};

use crate::{ConnectionProfile, Connector, QueryError, TabularResult};

const LIST_TABLES_SQL: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = 'public' ORDER BY table_name";

pub(crate) const SELECT_ALL_FROM: &str = "SELECT * FROM ";

/// Names of the user tables in the default schema. No tables is an empty
/// list, not an error.
///
/// # Errors
///
/// [`QueryError::ConnectionFailed`] if no session can be opened, or
/// [`QueryError::ExecutionFailed`] if the catalog query fails.
pub async fn list_tables(
    connector: &dyn Connector,
    profile: &ConnectionProfile,
) -> Result<Vec<String>, QueryError> {
    let result = run(connector, profile, LIST_TABLES_SQL).await?;
    debug!(name = %profile.name, tables = result.rows.len(), "listed tables");
    Ok(result.first_column())
}

/// Every row of `table_name`, every cell as a string, columns in the table's
/// declared order.
///
/// `table_name` should come from [`list_tables`]. It is sent as a quoted
/// identifier, so any catalog name can be fetched and none can break out of
/// the statement.
///
/// # Errors
///
/// [`QueryError::ExecutionFailed`] for an empty name or a failed query,
/// [`QueryError::ConnectionFailed`] if no session can be opened.
pub async fn fetch_all(
    connector: &dyn Connector,
    profile: &ConnectionProfile,
    table_name: &str,
) -> Result<TabularResult, QueryError> {
    if table_name.is_empty() {
        return Err(QueryError::ExecutionFailed("empty table name".to_string()));
    }
    let sql = format!("{SELECT_ALL_FROM}{}", quote_identifier(table_name));
    run(connector, profile, &sql).await
}

/// `name` as a double-quoted SQL identifier, embedded quotes doubled
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Open a session, run one query, and always close the session again.
async fn run(
    connector: &dyn Connector,
    profile: &ConnectionProfile,
    sql: &str,
) -> Result<TabularResult, QueryError> {
    let mut session = connector.connect(profile).await?;
    let result = session.query(sql).await;
    session.close().await;

    if let Err(e) = &result {
        warn!(name = %profile.name, error = %e, "query failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeConnector;

    fn profile() -> ConnectionProfile {
        ConnectionProfile {
            name: "local".to_string(),
            host: "127.0.0.1".to_string(),
            port: "5432".to_string(),
            database: "db".to_string(),
            user: "u".to_string(),
            ..ConnectionProfile::default()
        }
    }

    fn users() -> TabularResult {
        TabularResult::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec!["1".to_string(), "alice".to_string()],
                vec!["2".to_string(), "bob".to_string()],
            ],
        )
    }

    #[tokio::test]
    async fn test_fetch_all_shape() {
        let connector = FakeConnector::reachable().with_table("users", users());
        let result = fetch_all(&connector, &profile(), "users").await.unwrap();

        assert_eq!(result.columns, vec!["id", "name"]);
        assert_eq!(
            result.rows,
            vec![vec!["1", "alice"], vec!["2", "bob"]]
        );
        assert_eq!(connector.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_list_tables_in_order() {
        let connector = FakeConnector::reachable()
            .with_table("users", users())
            .with_table("orders", TabularResult::default());
        let tables = list_tables(&connector, &profile()).await.unwrap();
        assert_eq!(tables, vec!["orders", "users"]);
    }

    #[tokio::test]
    async fn test_list_tables_empty_database() {
        let connector = FakeConnector::reachable();
        assert!(list_tables(&connector, &profile()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_tables_unreachable() {
        let connector = FakeConnector::unreachable();
        assert!(matches!(
            list_tables(&connector, &profile()).await,
            Err(QueryError::ConnectionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_missing_table_closes_session() {
        let connector = FakeConnector::reachable();
        let err = fetch_all(&connector, &profile(), "nope").await.unwrap_err();
        assert!(matches!(err, QueryError::ExecutionFailed(_)));
        assert_eq!(connector.opened(), 1);
        assert_eq!(connector.open_sessions(), 0);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("MixedCase"), "\"MixedCase\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[tokio::test]
    async fn test_fetch_any_listed_name() {
        let names = ["MixedCase", "order-items", "line items", "café", "we\"ird"];
        let connector = names.iter().fold(FakeConnector::reachable(), |c, name| {
            c.with_table(name, users())
        });

        for name in list_tables(&connector, &profile()).await.unwrap() {
            let result = fetch_all(&connector, &profile(), &name).await.unwrap();
            assert_eq!(result, users(), "{name}");
        }
        assert_eq!(connector.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_fetch_cannot_escape_identifier() {
        let connector = FakeConnector::reachable().with_table("users", users());
        let err = fetch_all(&connector, &profile(), "users\"; DROP TABLE users; --")
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::ExecutionFailed(_)));

        assert!(fetch_all(&connector, &profile(), "").await.is_err());
        assert_eq!(connector.opened(), 1);
    }
}
