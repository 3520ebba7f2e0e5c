use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::AppError;
use crate::flow::BurstLogEntry;
use crate::model::row::SnapshotRow;
use crate::model::tick::Side;

/// Append-only sqlite sink for snapshot rows and burst ticks.
///
/// Snapshot appends are at-least-once: the shutdown flush may duplicate the
/// last periodic batch, which readers are expected to tolerate. Burst ticks
/// are deduplicated by `(symbol, side, ts_ms)` via `INSERT OR IGNORE`.
pub struct FlowStore {
    conn: Connection,
}

impl FlowStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    fn init(conn: &Connection) -> Result<(), AppError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS snapshot_rows (
                ts_ms INTEGER NOT NULL,
                symbol TEXT NOT NULL,
                last_price REAL NOT NULL,
                total_buy REAL NOT NULL,
                total_sell REAL NOT NULL,
                net_flow REAL NOT NULL,
                buy_burst TEXT NOT NULL,
                sell_burst TEXT NOT NULL,
                divergence TEXT NOT NULL,
                manipulation TEXT NOT NULL,
                today_low REAL,
                ten_day_low REAL
            );

            CREATE TABLE IF NOT EXISTS burst_ticks (
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                price REAL NOT NULL,
                qty REAL NOT NULL,
                ts_ms INTEGER NOT NULL,
                PRIMARY KEY(symbol, side, ts_ms)
            );
            "#,
        )?;
        Ok(())
    }

    /// Append one snapshot batch in a single transaction.
    pub fn append_snapshot(&mut self, rows: &[SnapshotRow]) -> Result<(), AppError> {
        let tx = self.conn.transaction()?;
        for row in rows {
            tx.execute(
                r#"
                INSERT INTO snapshot_rows (
                    ts_ms, symbol, last_price, total_buy, total_sell, net_flow,
                    buy_burst, sell_burst, divergence, manipulation, today_low, ten_day_low
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    row.timestamp_ms as i64,
                    row.symbol,
                    row.last_price,
                    row.total_buy,
                    row.total_sell,
                    row.net_flow,
                    row.buy_burst_label(),
                    row.sell_burst_label(),
                    row.divergence.label(),
                    if row.divergence.manipulation_high() {
                        "High"
                    } else {
                        "-"
                    },
                    row.today_low,
                    row.ten_day_low,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn append_burst_ticks(&mut self, entries: &[BurstLogEntry]) -> Result<(), AppError> {
        let tx = self.conn.transaction()?;
        for entry in entries {
            tx.execute(
                r#"
                INSERT OR IGNORE INTO burst_ticks (symbol, side, price, qty, ts_ms)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    entry.symbol,
                    entry.side.label(),
                    entry.price,
                    entry.qty,
                    entry.timestamp_ms as i64,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Persisted rows for one symbol, oldest first.
    pub fn load_snapshots(&self, symbol: &str) -> Result<Vec<PersistedRow>, AppError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT ts_ms, last_price, total_buy, total_sell, net_flow,
                   buy_burst, sell_burst, divergence, manipulation, today_low, ten_day_low
            FROM snapshot_rows
            WHERE symbol = ?1
            ORDER BY ts_ms ASC
            "#,
        )?;

        let rows = stmt.query_map([symbol], |row| {
            Ok(PersistedRow {
                timestamp_ms: row.get::<_, i64>(0)? as u64,
                symbol: symbol.to_string(),
                last_price: row.get(1)?,
                total_buy: row.get(2)?,
                total_sell: row.get(3)?,
                net_flow: row.get(4)?,
                buy_burst: row.get(5)?,
                sell_burst: row.get(6)?,
                divergence: row.get(7)?,
                manipulation: row.get(8)?,
                today_low: row.get(9)?,
                ten_day_low: row.get(10)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn burst_tick_count(&self, symbol: &str, side: Side) -> Result<u64, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT COUNT(*) FROM burst_ticks WHERE symbol = ?1 AND side = ?2",
        )?;
        let count: i64 = stmt.query_row(params![symbol, side.label()], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// A snapshot row as stored: bursts and labels flattened to display strings.
#[derive(Debug, Clone)]
pub struct PersistedRow {
    pub timestamp_ms: u64,
    pub symbol: String,
    pub last_price: f64,
    pub total_buy: f64,
    pub total_sell: f64,
    pub net_flow: f64,
    pub buy_burst: String,
    pub sell_burst: String,
    pub divergence: String,
    pub manipulation: String,
    pub today_low: Option<f64>,
    pub ten_day_low: Option<f64>,
}
