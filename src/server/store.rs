//! SQLite-backed result storage via sqlx.
//!
//! Tables (one per game, created on first start):
//! - `nreinas`: `id, N, resuelto, intentos, timestamp`
//! - `knight_tour`: `id, posicion_inicial, movimientos, completado, timestamp`
//! - `hanoi`: `id, discos, movimientos, completado, timestamp`
//!
//! Every insert and every leaderboard read runs in its own transaction, so a
//! reader sees each row either fully written or not at all.

use std::str::FromStr;

use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::config::StorageConfig;
use crate::common::error::{ArcadeError, Result};
use crate::common::messages::{
    GameKind, GameOutcome, GameResult, HanoiResult, KnightTourResult, LeaderboardEntry,
    NQueensResult,
};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS nreinas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        N INTEGER NOT NULL,
        resuelto BOOLEAN NOT NULL,
        intentos INTEGER NOT NULL,
        timestamp TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS knight_tour (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        posicion_inicial TEXT,
        movimientos INTEGER NOT NULL,
        completado BOOLEAN NOT NULL,
        timestamp TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS hanoi (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        discos INTEGER NOT NULL,
        movimientos INTEGER NOT NULL,
        completado BOOLEAN NOT NULL,
        timestamp TEXT NOT NULL
    )",
];

/// Table layout of one game: `(table, columns, success flag, ranking metric)`.
fn layout(kind: GameKind) -> (&'static str, &'static str, &'static str, &'static str) {
    match kind {
        GameKind::NQueens => ("nreinas", "id, N, resuelto, intentos, timestamp", "resuelto", "intentos"),
        GameKind::KnightTour => (
            "knight_tour",
            "id, posicion_inicial, movimientos, completado, timestamp",
            "completado",
            "movimientos",
        ),
        GameKind::Hanoi => (
            "hanoi",
            "id, discos, movimientos, completado, timestamp",
            "completado",
            "movimientos",
        ),
    }
}

/// Shared handle to the result database. Cloning shares the pool.
#[derive(Clone)]
pub struct ResultStore {
    pool: SqlitePool,
}

impl ResultStore {
    /// Open (creating if missing) the database at `config.database_url` and
    /// make sure all tables exist.
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(ArcadeError::persistence("invalid database url"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(ArcadeError::persistence("failed to open result database"))?;

        let store = Self { pool };
        store.init_schema().await?;
        info!("💾 Result store ready at {}", config.database_url);
        Ok(store)
    }

    /// Private in-memory database, used by tests.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(ArcadeError::persistence("invalid database url"))?;

        // A second connection would see a different, empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(ArcadeError::persistence("failed to open in-memory database"))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(ArcadeError::persistence("failed to create schema"))?;
        }
        Ok(())
    }

    /// Insert one result into its game's table and return the new row id.
    pub async fn save(&self, result: &GameResult) -> Result<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(ArcadeError::persistence("failed to begin transaction"))?;

        let query = match &result.outcome {
            GameOutcome::NQueens(r) => sqlx::query(
                "INSERT INTO nreinas (N, resuelto, intentos, timestamp) VALUES (?, ?, ?, ?)",
            )
            .bind(i64::from(r.n))
            .bind(r.solved)
            .bind(i64::from(r.attempts)),
            GameOutcome::KnightTour(r) => sqlx::query(
                "INSERT INTO knight_tour (posicion_inicial, movimientos, completado, timestamp) VALUES (?, ?, ?, ?)",
            )
            .bind(r.start_square.clone())
            .bind(i64::from(r.moves))
            .bind(r.completed),
            GameOutcome::Hanoi(r) => sqlx::query(
                "INSERT INTO hanoi (discos, movimientos, completado, timestamp) VALUES (?, ?, ?, ?)",
            )
            .bind(i64::from(r.disk_count))
            .bind(i64::from(r.moves))
            .bind(r.completed),
        };

        let id = query
            .bind(result.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(ArcadeError::persistence("failed to insert result"))?
            .last_insert_rowid();

        tx.commit()
            .await
            .map_err(ArcadeError::persistence("failed to commit result"))?;

        debug!("Stored {} result #{}", result.kind(), id);
        Ok(id)
    }

    /// Up to `limit` successful results of `kind`, best (lowest metric) first.
    /// Ties keep insertion order.
    pub async fn top_n(&self, kind: GameKind, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        let (table, columns, flag, metric) = layout(kind);
        let sql = format!(
            "SELECT {columns} FROM {table} WHERE {flag} = 1 ORDER BY {metric} ASC, id ASC LIMIT ?"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(ArcadeError::persistence("failed to begin transaction"))?;

        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&mut *tx)
            .await
            .map_err(ArcadeError::persistence("failed to query leaderboard"))?;

        tx.commit()
            .await
            .map_err(ArcadeError::persistence("failed to finish leaderboard read"))?;

        rows.iter().map(|row| entry_from_row(kind, row)).collect()
    }

    /// Every stored result of `kind`, in insertion order.
    pub async fn all(&self, kind: GameKind) -> Result<Vec<LeaderboardEntry>> {
        let (table, columns, _, _) = layout(kind);
        let sql = format!("SELECT {columns} FROM {table} ORDER BY id ASC");

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(ArcadeError::persistence("failed to list results"))?;

        rows.iter().map(|row| entry_from_row(kind, row)).collect()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn try_get_column<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| ArcadeError::Persistence {
        reason: format!("failed to read column {column}: {e}"),
        source: Some(e),
    })
}

fn try_get_count(row: &SqliteRow, column: &str) -> Result<u32> {
    let value: i64 = try_get_column(row, column)?;
    u32::try_from(value).map_err(|_| ArcadeError::Persistence {
        reason: format!("column {column} holds out-of-range value {value}"),
        source: None,
    })
}

fn entry_from_row(kind: GameKind, row: &SqliteRow) -> Result<LeaderboardEntry> {
    let outcome = match kind {
        GameKind::NQueens => GameOutcome::NQueens(NQueensResult {
            n: try_get_count(row, "N")?,
            solved: try_get_column(row, "resuelto")?,
            attempts: try_get_count(row, "intentos")?,
        }),
        GameKind::KnightTour => GameOutcome::KnightTour(KnightTourResult {
            start_square: try_get_column::<Option<String>>(row, "posicion_inicial")?
                .unwrap_or_default(),
            moves: try_get_count(row, "movimientos")?,
            completed: try_get_column(row, "completado")?,
        }),
        GameKind::Hanoi => GameOutcome::Hanoi(HanoiResult {
            disk_count: try_get_count(row, "discos")?,
            moves: try_get_count(row, "movimientos")?,
            completed: try_get_column(row, "completado")?,
        }),
    };

    Ok(LeaderboardEntry {
        id: try_get_column(row, "id")?,
        result: GameResult {
            outcome,
            timestamp: try_get_column(row, "timestamp")?,
        },
    })
}
