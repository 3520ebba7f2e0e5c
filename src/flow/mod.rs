pub mod burst;
pub mod divergence;
pub mod window;

use std::collections::HashMap;

use crate::model::row::{Divergence, SnapshotRow};
use crate::model::tick::{Side, Tick};
use crate::refdata::ReferenceLows;

use burst::BurstTracker;
use window::WindowState;

/// A burst notification destined for the notification sink. At most one is
/// emitted per contiguous burst episode per side per symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurstNotification {
    pub title: String,
    pub message: String,
}

/// One line for the burst log, keyed `(symbol, side, timestamp_ms)`.
#[derive(Debug, Clone)]
pub struct BurstLogEntry {
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub qty: f64,
    pub timestamp_ms: u64,
}

/// Side effects produced by ingesting one tick.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub notifications: Vec<BurstNotification>,
    pub burst_logs: Vec<BurstLogEntry>,
}

#[derive(Debug, Default)]
struct SymbolFlow {
    window: WindowState,
    buy_burst: BurstTracker,
    sell_burst: BurstTracker,
    lows: ReferenceLows,
}

/// Owns every symbol's window and burst state. Constructed once and confined
/// to the single aggregation task; all reads go through snapshot-row builders
/// so no partial aggregation is ever observable.
#[derive(Debug)]
pub struct FlowBook {
    symbols: Vec<String>,
    flows: HashMap<String, SymbolFlow>,
    thresholds: HashMap<String, f64>,
}

impl FlowBook {
    pub fn new(
        symbols: &[String],
        thresholds: HashMap<String, f64>,
        lows: HashMap<String, ReferenceLows>,
    ) -> Self {
        let flows = symbols
            .iter()
            .map(|sym| {
                let flow = SymbolFlow {
                    lows: lows.get(sym).copied().unwrap_or_default(),
                    ..SymbolFlow::default()
                };
                (sym.clone(), flow)
            })
            .collect();
        Self {
            symbols: symbols.to_vec(),
            flows,
            thresholds,
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Static threshold lookup; unknown symbols fall back to 0, which makes
    /// every tick qualify as a burst.
    pub fn threshold(&self, symbol: &str) -> f64 {
        self.thresholds.get(symbol).copied().unwrap_or(0.0)
    }

    /// Append a tick to its symbol's window and run both burst machines.
    /// Ticks for untracked symbols are dropped silently (`None`).
    pub fn ingest(&mut self, tick: Tick) -> Option<IngestOutcome> {
        let threshold = self.threshold(&tick.symbol);
        let flow = self.flows.get_mut(&tick.symbol)?;

        let mut outcome = IngestOutcome::default();
        for (side, tracker) in [
            (Side::Buy, &mut flow.buy_burst),
            (Side::Sell, &mut flow.sell_burst),
        ] {
            let qty = tick.qty_for(side);
            let update = tracker.on_tick(qty, threshold, tick.timestamp_ms);
            if update.notify {
                outcome.notifications.push(burst_notification(
                    &tick.symbol,
                    side,
                    qty,
                ));
            }
            if update.log {
                outcome.burst_logs.push(BurstLogEntry {
                    symbol: tick.symbol.clone(),
                    side,
                    price: tick.price,
                    qty,
                    timestamp_ms: tick.timestamp_ms,
                });
            }
        }

        flow.window.push(tick);
        Some(outcome)
    }

    fn build_row(&self, symbol: &str, flow: &SymbolFlow, timestamp_ms: u64) -> SnapshotRow {
        if flow.window.is_empty() {
            let mut row = SnapshotRow::zero(symbol, timestamp_ms, flow.lows);
            // Bursts survive the window reset, so an ongoing descriptor still
            // shows on the otherwise-zero row.
            row.buy_burst = flow.buy_burst.descriptor();
            row.sell_burst = flow.sell_burst.descriptor();
            return row;
        }

        let totals = flow.window.totals();
        let label = match (flow.window.prev(), flow.window.last()) {
            (Some(prev), Some(last)) => {
                divergence::classify(prev.price, last.price, totals.net_flow)
            }
            _ => Divergence::None,
        };

        SnapshotRow {
            timestamp_ms,
            symbol: symbol.to_string(),
            last_price: totals.last_price,
            total_buy: totals.total_buy,
            total_sell: totals.total_sell,
            net_flow: totals.net_flow,
            buy_burst: flow.buy_burst.descriptor(),
            sell_burst: flow.sell_burst.descriptor(),
            divergence: label,
            today_low: flow.lows.today_low,
            ten_day_low: flow.lows.ten_day_low,
        }
    }

    pub fn row(&self, symbol: &str, timestamp_ms: u64) -> Option<SnapshotRow> {
        self.flows
            .get(symbol)
            .map(|flow| self.build_row(symbol, flow, timestamp_ms))
    }

    /// One row per tracked symbol, in configured order. Read-only.
    pub fn rows(&self, timestamp_ms: u64) -> Vec<SnapshotRow> {
        self.symbols
            .iter()
            .filter_map(|sym| self.row(sym, timestamp_ms))
            .collect()
    }

    /// Materialize all rows and clear every window. Burst state persists so a
    /// burst can span the snapshot boundary.
    pub fn snapshot_and_reset(&mut self, timestamp_ms: u64) -> Vec<SnapshotRow> {
        let rows = self.rows(timestamp_ms);
        for flow in self.flows.values_mut() {
            flow.window.clear();
        }
        rows
    }

    /// Materialize all rows without clearing anything. Used for the final
    /// shutdown flush so an abrupt termination loses no in-flight window.
    pub fn flush(&self, timestamp_ms: u64) -> Vec<SnapshotRow> {
        self.rows(timestamp_ms)
    }
}

fn burst_notification(symbol: &str, side: Side, qty: f64) -> BurstNotification {
    let side_word = match side {
        Side::Buy => "Buy",
        Side::Sell => "Sell",
    };
    BurstNotification {
        title: format!("{} {} Burst", symbol, side_word),
        message: format!("{} burst of {} started", side_word, qty),
    }
}
