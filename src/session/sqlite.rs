use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{DiscoveryError, Result};
use crate::session::{SessionContext, SessionStore, UserRole};

const KEY_TOKEN: &str = "token";
const KEY_USER_ID: &str = "user_id";
const KEY_ROLE: &str = "role";

/// SQLite-backed session store.
///
/// Same keys the web client kept in local storage:
/// ```sql
/// CREATE TABLE session (
///     key TEXT PRIMARY KEY,
///     value TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// ```
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    /// Open (or create) the store at `db_path`; `:memory:` works too
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS session (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DiscoveryError::Other("session store lock poisoned".to_string()))
    }

    fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM session WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(conn: &Connection, key: &str, value: Option<&str>, now: &str) -> Result<()> {
        match value {
            Some(value) => conn.execute(
                "INSERT OR REPLACE INTO session (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )?,
            None => conn.execute("DELETE FROM session WHERE key = ?", params![key])?,
        };
        Ok(())
    }

    /// When the session was last written
    pub async fn updated_at(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;

        let latest: Option<String> =
            conn.query_row("SELECT MAX(updated_at) FROM session", [], |row| row.get(0))?;

        Ok(latest.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }))
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self) -> Result<SessionContext> {
        let conn = self.lock()?;

        let role = match Self::get(&conn, KEY_ROLE)? {
            Some(raw) => match raw.parse::<UserRole>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!("Ignoring stored role: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(SessionContext {
            user_id: Self::get(&conn, KEY_USER_ID)?,
            token: Self::get(&conn, KEY_TOKEN)?,
            role,
        })
    }

    async fn save(&self, session: &SessionContext) -> Result<()> {
        let mut conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        let tx = conn.transaction()?;
        Self::put(&tx, KEY_TOKEN, session.token.as_deref(), &now)?;
        Self::put(&tx, KEY_USER_ID, session.user_id.as_deref(), &now)?;
        Self::put(&tx, KEY_ROLE, session.role.map(|r| r.as_str()), &now)?;
        tx.commit()?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM session", [])?;
        Ok(())
    }
}
