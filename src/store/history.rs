use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection};

/// A previously visited location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub path: String,
    pub visited_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct HistoryStore {
    conn: Connection,
    limit: usize,
}

impl HistoryStore {
    pub fn open(path: &Path, limit: usize) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        Self::with_connection(conn, limit)
    }

    pub fn in_memory(limit: usize) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, limit)
    }

    fn with_connection(conn: Connection, limit: usize) -> Result<Self> {
        let store = Self {
            conn,
            limit: limit.max(1),
        };
        store.init()?;
        Ok(store)
    }

    /// Record a visit; the list is trimmed to the newest `limit` entries
    pub fn record(&self, path: &str, at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO history(path, visited_at) VALUES (?1, ?2)
             ON CONFLICT(path) DO UPDATE SET visited_at=excluded.visited_at",
            params![path, at.timestamp_millis()],
        )?;
        self.conn.execute(
            "DELETE FROM history WHERE path NOT IN (
                SELECT path FROM history ORDER BY visited_at DESC, path ASC LIMIT ?1
            )",
            params![self.limit as i64],
        )?;
        Ok(())
    }

    /// Most recent first
    pub fn recent(&self) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, visited_at FROM history ORDER BY visited_at DESC, path ASC")?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let path: String = row.get(0)?;
            let millis: i64 = row.get(1)?;
            let visited_at = Utc
                .timestamp_millis_opt(millis)
                .single()
                .unwrap_or_default();
            out.push(HistoryEntry { path, visited_at });
        }
        Ok(out)
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM history", [])?;
        Ok(())
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS history (
                path       TEXT PRIMARY KEY,
                visited_at INTEGER NOT NULL
            );",
        )?;
        Ok(())
    }
}
