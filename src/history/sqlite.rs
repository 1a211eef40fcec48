use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection};

use super::backend::HistoryBackend;
use super::migrations::run_migrations;
use super::models::EnvironmentRecord;

/// Histories in an embedded SQLite database, one row per record.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("failed to open SQLite database {}", db_path.display()))?;
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            error!("Failed to enable WAL mode: {err}");
        }

        let backend = Self::with_connection(conn)?;
        info!("History database initialized at {}", db_path.display());
        Ok(backend)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        run_migrations(&mut conn).context("failed to run history migrations")?;
        Ok(Self { conn })
    }
}

impl HistoryBackend for SqliteBackend {
    fn read(&mut self, id: &str) -> Result<Option<Vec<EnvironmentRecord>>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, temperature, humidity, lux, co2
             FROM environment_records
             WHERE wine_id = ?1
             ORDER BY position ASC",
        )?;

        let rows = stmt
            .query_map(params![id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("failed to read history rows for {id}"))?;

        if rows.is_empty() {
            return Ok(None);
        }

        let records = rows
            .into_iter()
            .map(|(timestamp, temperature, humidity, lux, co2)| {
                Ok(EnvironmentRecord {
                    timestamp: parse_datetime(&timestamp)?,
                    temperature,
                    humidity,
                    lux,
                    co2,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(records))
    }

    fn write(&mut self, id: &str, records: &[EnvironmentRecord]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to open history transaction")?;

        tx.execute(
            "DELETE FROM environment_records WHERE wine_id = ?1",
            params![id],
        )
        .with_context(|| format!("failed to clear history for {id}"))?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO environment_records (wine_id, position, timestamp, temperature, humidity, lux, co2)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, record) in records.iter().enumerate() {
                insert
                    .execute(params![
                        id,
                        position as i64,
                        record.timestamp.to_rfc3339(),
                        record.temperature,
                        record.humidity,
                        record.lux,
                        record.co2,
                    ])
                    .with_context(|| format!("failed to insert history record for {id}"))?;
            }
        }

        tx.commit().context("failed to commit history")
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}
