use std::fmt::{self, Display};

use tracing::{debug, info};

use crate::{ConnectionProfile, ConnectionStatus, Connector};

/// Result of a connectivity check. Not an error: `Failed` is an expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed,
}

impl From<TestOutcome> for ConnectionStatus {
    fn from(outcome: TestOutcome) -> Self {
        match outcome {
            TestOutcome::Passed => Self::Connected,
            TestOutcome::Failed => Self::Disconnected,
        }
    }
}

impl Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Open a session for `profile` and release it straight away.
///
/// Every failure (auth, network, bad port) collapses to `Failed`. This call
/// blocks for a network round trip and imposes no timeout of its own; wrap it
/// in one at the call site.
pub async fn probe(connector: &dyn Connector, profile: &ConnectionProfile) -> TestOutcome {
    match connector.connect(profile).await {
        Ok(session) => {
            session.close().await;
            info!(name = %profile.name, host = %profile.host, "probe passed");
            TestOutcome::Passed
        }
        Err(e) => {
            debug!(name = %profile.name, error = %e, "probe failed");
            TestOutcome::Failed
        }
    }
}

/// [`probe`], recording the outcome on the profile's status.
pub async fn probe_profile(
    connector: &dyn Connector,
    profile: &mut ConnectionProfile,
) -> TestOutcome {
    let outcome = probe(connector, profile).await;
    profile.status = outcome.into();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeConnector;

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

    #[tokio::test]
    async fn test_probe_passes_and_releases_session() {
        let connector = FakeConnector::reachable();
        let outcome = probe(&connector, &profile("5432")).await;
        assert_eq!(outcome, TestOutcome::Passed);
        assert_eq!(connector.opened(), 1);
        assert_eq!(connector.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_always_fails_without_leaking() {
        let connector = FakeConnector::unreachable();
        for _ in 0..3 {
            assert_eq!(probe(&connector, &profile("1")).await, TestOutcome::Failed);
        }
        assert_eq!(connector.opened(), 0);
        assert_eq!(connector.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_probe_profile_sets_status() {
        let mut p = profile("5432");
        probe_profile(&FakeConnector::reachable(), &mut p).await;
        assert_eq!(p.status, ConnectionStatus::Connected);

        probe_profile(&FakeConnector::unreachable(), &mut p).await;
        assert_eq!(p.status, ConnectionStatus::Disconnected);
    }
}
