use std::{
    fmt::Display,
    fs::DirBuilder,
    path::Path,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use rusqlite::{
    Connection as SqliteConnection, OptionalExtension, TransactionBehavior,
    params,
};
use rusqlite_migration::{M, Migrations};
use termtable_auth::StoreError;
use tracing::{debug, warn};

/// File name of the metadata store inside the application directory
pub const METADATA_FILE: &str = "connections.db";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS connections (
    name TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
) WITHOUT ROWID;";

/// How long a writer waits for another writer's transaction before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The non-secret half of a connection profile.
///
/// Stored as a JSON array of exactly [`MetadataRecord::FIELD_COUNT`] strings in
/// `host, port, database` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub host: String,
    pub port: String,
    pub database: String,
}

impl MetadataRecord {
    pub const FIELD_COUNT: usize = 3;

    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::json!([self.host, self.port, self.database]).to_string()
    }

    /// Returns `None` unless `value` is an array of exactly three strings.
    #[must_use]
    pub fn decode(value: &str) -> Option<Self> {
        let fields: Vec<String> = serde_json::from_str(value).ok()?;
        let [host, port, database]: [String; Self::FIELD_COUNT] =
            fields.try_into().ok()?;
        Some(Self {
            host,
            port,
            database,
        })
    }
}

fn io_failure(err: impl Display) -> StoreError {
    StoreError::IoFailure(err.to_string())
}

/// Creates `dir` and its parents, readable only by the owner.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

/// Durable name -> [`MetadataRecord`] table in a local SQLite file.
///
/// All access goes through one connection behind a mutex, so writers are
/// serialised in-process; SQLite's own locking serialises writers from other
/// processes, and WAL mode gives readers a consistent snapshot.
pub struct MetadataStore {
    conn: Mutex<SqliteConnection>,
}

impl MetadataStore {
    /// Open (or create) the store at `path`, creating its directory if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IoFailure`] if the directory or file cannot be
    /// created, or the schema migration fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_private_dir(parent).map_err(io_failure)?;
        }

        let mut conn = SqliteConnection::open(path).map_err(io_failure)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(io_failure)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(io_failure)?;
        Self::migrate(&mut conn)?;

        debug!(path = %path.display(), "opened metadata store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a throwaway store that lives only as long as the value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IoFailure`] if SQLite cannot be initialised.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let mut conn = SqliteConnection::open_in_memory().map_err(io_failure)?;
        Self::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate(conn: &mut SqliteConnection) -> Result<(), StoreError> {
        let migrations = Migrations::new(vec![
            M::up(CREATE_TABLE).down("DROP TABLE connections;"),
        ]);
        migrations.to_latest(conn).map_err(io_failure)
    }

    fn lock(&self) -> Result<MutexGuard<'_, SqliteConnection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("metadata store lock poisoned".to_string()))
    }

    /// Insert or replace the record stored under `name`.
    ///
    /// The write happens in one immediate transaction; on any failure the
    /// transaction rolls back and previously stored data is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IoFailure`] if the transaction cannot commit.
    pub fn put(&self, name: &str, record: &MetadataRecord) -> Result<(), StoreError> {
        self.put_value(name, &record.encode())
    }

    fn put_value(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(io_failure)?;
        tx.execute_batch(CREATE_TABLE).map_err(io_failure)?;
        tx.execute(
            "INSERT INTO connections (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            params![name, value],
        )
        .map_err(io_failure)?;
        tx.commit().map_err(io_failure)?;
        debug!(name, "stored connection metadata");
        Ok(())
    }

    /// Store an arbitrary value, bypassing encoding.
    #[cfg(test)]
    pub(crate) fn put_raw(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.put_value(name, value)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown name and
    /// [`StoreError::Corrupt`] if the stored value does not decode.
    pub fn get(&self, name: &str) -> Result<MetadataRecord, StoreError> {
        let conn = self.lock()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM connections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(io_failure)?;

        let value = value.ok_or(StoreError::NotFound)?;
        MetadataRecord::decode(&value).ok_or_else(|| {
            StoreError::Corrupt(format!("metadata for '{name}' does not decode"))
        })
    }

    /// Remove the record under `name`. Removing an absent name succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IoFailure`] if the delete cannot commit.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM connections WHERE name = ?1", params![name])
            .map_err(io_failure)?;
        debug!(name, removed, "deleted connection metadata");
        Ok(())
    }

    /// Every decodable record in name order.
    ///
    /// Records that fail to decode are logged and left out; they never abort
    /// the scan.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IoFailure`] if the table cannot be read.
    pub fn list_all(&self) -> Result<Vec<(String, MetadataRecord)>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT name, value FROM connections ORDER BY name")
            .map_err(io_failure)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(io_failure)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_failure)?;

        Ok(rows
            .into_iter()
            .filter_map(|(name, value)| match MetadataRecord::decode(&value) {
                Some(record) => Some((name, record)),
                None => {
                    warn!(name = %name, "skipping corrupt connection metadata");
                    None
                }
            })
            .collect())
    }
}
