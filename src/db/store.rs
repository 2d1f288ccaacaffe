use crate::types::{AppError, HistoryEntry, Result, SessionStatus};
use libsql::{Builder, Connection, Database};

/// Persisted research session. Owned by the host application; the
/// orchestration engine only works on a per-invocation copy.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub status: SessionStatus,
    pub messages: Vec<HistoryEntry>,
    pub research_brief: Option<String>,
    pub final_report: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    /// Open (or create) the database file and initialize the schema.
    pub async fn open(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!("Failed to create database directory: {e}"))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;

        let store = Self { db };
        store.initialize_schema().await?;
        Ok(store)
    }

    fn connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {e}")))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS research_sessions (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                messages TEXT NOT NULL,
                research_brief TEXT,
                final_report TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to create research_sessions table: {e}"))
        })?;

        Ok(())
    }

    pub async fn create(&self, record: &SessionRecord) -> Result<()> {
        let conn = self.connection()?;
        let messages = encode_messages(&record.messages)?;

        conn.execute(
            "INSERT INTO research_sessions
             (id, status, messages, research_brief, final_report, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                record.id.as_str(),
                record.status.as_str(),
                messages,
                record.research_brief.as_deref(),
                record.final_report.as_deref(),
                record.created_at,
                record.updated_at,
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create session: {e}")))?;

        Ok(())
    }

    pub async fn update(&self, record: &SessionRecord) -> Result<()> {
        let conn = self.connection()?;
        let messages = encode_messages(&record.messages)?;

        conn.execute(
            "UPDATE research_sessions
             SET status = ?, messages = ?, research_brief = ?, final_report = ?, updated_at = ?
             WHERE id = ?",
            (
                record.status.as_str(),
                messages,
                record.research_brief.as_deref(),
                record.final_report.as_deref(),
                record.updated_at,
                record.id.as_str(),
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to update session: {e}")))?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<SessionRecord>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, status, messages, research_brief, final_report, created_at, updated_at
                 FROM research_sessions WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query session: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(record_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// All sessions, newest first.
    pub async fn list(&self) -> Result<Vec<SessionRecord>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, status, messages, research_brief, final_report, created_at, updated_at
                 FROM research_sessions ORDER BY created_at DESC, rowid DESC",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query sessions: {e}")))?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            records.push(record_from_row(&row)?);
        }

        Ok(records)
    }
}

fn encode_messages(messages: &[HistoryEntry]) -> Result<String> {
    serde_json::to_string(messages)
        .map_err(|e| AppError::Database(format!("Failed to encode messages: {e}")))
}

fn record_from_row(row: &libsql::Row) -> Result<SessionRecord> {
    let status_str: String = row.get(1).map_err(|e| AppError::Database(e.to_string()))?;
    let status = SessionStatus::parse(&status_str)
        .ok_or_else(|| AppError::Database(format!("Unknown session status: {status_str}")))?;

    let messages_json: String = row.get(2).map_err(|e| AppError::Database(e.to_string()))?;
    let messages: Vec<HistoryEntry> = serde_json::from_str(&messages_json)
        .map_err(|e| AppError::Database(format!("Failed to decode messages: {e}")))?;

    Ok(SessionRecord {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        status,
        messages,
        research_brief: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        final_report: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
        created_at: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
        updated_at: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
    })
}
