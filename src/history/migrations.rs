//! Schema for the SQLite history backend, versioned through `user_version`.
//!
//! A wine's partition is every `environment_records` row sharing its
//! `wine_id`, ordered by `position` (0 = oldest). `(wine_id, position)` is
//! unique and positions run `0..len` with no gaps; writers replace a whole
//! partition inside one transaction.

use anyhow::{bail, Context, Result};
use log::info;
use rusqlite::{Connection, Transaction};

const HISTORY_SCHEMA_VERSION: i32 = 1;

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let found = schema_version(conn)?;

    if found > HISTORY_SCHEMA_VERSION {
        bail!(
            "history database is at schema v{found}, this build only knows up to v{HISTORY_SCHEMA_VERSION}"
        );
    }
    if found == HISTORY_SCHEMA_VERSION {
        return Ok(());
    }

    info!("Upgrading history database from schema v{found} to v{HISTORY_SCHEMA_VERSION}");

    let tx = conn
        .transaction()
        .context("failed to open history migration transaction")?;
    for target in found + 1..=HISTORY_SCHEMA_VERSION {
        apply_migration(&tx, target)
            .with_context(|| format!("history migration to v{target} failed"))?;
    }
    tx.pragma_update(None, "user_version", HISTORY_SCHEMA_VERSION)
        .context("failed to record history schema version")?;
    tx.commit().context("failed to commit history migrations")
}

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read history schema version")
}

fn apply_migration(tx: &Transaction<'_>, target: i32) -> Result<()> {
    let script = match target {
        1 => include_str!("schemas/schema_v1.sql"),
        _ => bail!("no history migration defined for v{target}"),
    };
    tx.execute_batch(script)
        .with_context(|| format!("failed to create history schema v{target}"))
}
