pub mod dashboard;

use std::collections::HashMap;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::event::{AppEvent, FeedStatus};
use crate::model::candle::CandleSeries;
use crate::scan;
use crate::model::row::SnapshotRow;

use dashboard::{FlowTablePanel, KeybindBar, LogPanel, ScanPanel, StatusBar};

const MAX_LOG_MESSAGES: usize = 200;

/// Candle-derived metrics for the selected symbol, recomputed per render.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub vwap: Option<f64>,
    pub position_pct: Option<f64>,
    pub bias: Option<scan::SetupBias>,
    pub zone_price: Option<f64>,
    pub hvz: Option<scan::HvzStatus>,
    pub confluence: Option<bool>,
    pub volume_up: Option<bool>,
}

pub struct AppState {
    pub symbols: Vec<String>,
    pub rows: Vec<SnapshotRow>,
    pub selected: usize,
    pub candles: HashMap<String, CandleSeries>,
    pub feed_running: bool,
    pub paused: bool,
    pub tick_count: u64,
    pub notify_count: u64,
    pub last_flush_ms: Option<u64>,
    pub snapshot_interval_ms: u64,
    pub started_ms: u64,
    pub log_messages: Vec<String>,
}

impl AppState {
    pub fn new(
        symbols: &[String],
        candle_interval_ms: u64,
        price_history_len: usize,
        snapshot_interval_ms: u64,
    ) -> Self {
        let candles = symbols
            .iter()
            .map(|sym| {
                (
                    sym.clone(),
                    CandleSeries::new(candle_interval_ms, price_history_len),
                )
            })
            .collect();
        Self {
            symbols: symbols.to_vec(),
            rows: Vec::new(),
            selected: 0,
            candles,
            feed_running: false,
            paused: false,
            tick_count: 0,
            notify_count: 0,
            last_flush_ms: None,
            snapshot_interval_ms,
            started_ms: chrono::Utc::now().timestamp_millis() as u64,
            log_messages: Vec::new(),
        }
    }

    /// Seconds until the next periodic snapshot, anchored to the last flush
    /// (or to process start before the first one).
    pub fn next_flush_in_secs(&self, now_ms: u64) -> u64 {
        let anchor = self.last_flush_ms.unwrap_or(self.started_ms);
        (anchor + self.snapshot_interval_ms).saturating_sub(now_ms) / 1_000
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    pub fn selected_symbol(&self) -> Option<&str> {
        self.symbols.get(self.selected).map(String::as_str)
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.symbols.len() {
            self.selected += 1;
        }
    }

    /// VWAP / range-position / HVZ metrics for the selected symbol.
    pub fn scan_summary(&self) -> ScanSummary {
        let Some(series) = self.selected_symbol().and_then(|s| self.candles.get(s)) else {
            return ScanSummary::default();
        };
        let candles = series.with_current();
        let Some(last_price) = series.last_price() else {
            return ScanSummary::default();
        };

        let vwap = scan::session_vwap(&candles);
        // Position within the previous closed bar's range.
        let position_pct = candles
            .len()
            .checked_sub(2)
            .map(|i| &candles[i])
            .and_then(|prev| scan::range_position_pct(last_price, prev.high, prev.low));
        let bias = match (position_pct, vwap) {
            (Some(pct), Some(vwap)) => Some(scan::setup_bias(pct, last_price, vwap)),
            _ => None,
        };
        let zone_price = scan::high_volume_zone(&series.candles);
        let hvz = zone_price.map(|zone| scan::hvz_status(last_price, zone, scan::HVZ_TOLERANCE));

        // The ten-day low stands in for the prior-session floor the low must hold.
        let lows = self
            .rows
            .iter()
            .find(|r| Some(r.symbol.as_str()) == self.selected_symbol())
            .and_then(|r| Some((r.today_low?, r.ten_day_low?)));
        let confluence = match (hvz, zone_price, lows) {
            (Some(status), Some(zone), Some((today_low, floor_low))) => {
                Some(scan::perfect_confluence(status, today_low, floor_low, zone))
            }
            _ => None,
        };

        ScanSummary {
            vwap,
            position_pct,
            bias,
            zone_price,
            hvz,
            confluence,
            volume_up: scan::volume_up(&candles),
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::MarketTick(tick) => {
                self.tick_count += 1;
                if let Some(series) = self.candles.get_mut(&tick.symbol) {
                    let qty = tick.buy_qty + tick.sell_qty;
                    series.push_trade(tick.price, qty, tick.timestamp_ms);
                }
            }
            AppEvent::FlowRows(rows) => {
                if !self.paused {
                    self.rows = rows;
                }
            }
            AppEvent::Notification { title, message } => {
                self.notify_count += 1;
                self.push_log(format!("[ALERT] {}: {}", title, message));
            }
            AppEvent::SnapshotFlushed { rows, timestamp_ms } => {
                self.last_flush_ms = Some(timestamp_ms);
                self.push_log(format!("Snapshot flushed ({} rows)", rows));
            }
            AppEvent::FeedStatus(status) => {
                self.feed_running = status == FeedStatus::Running;
                match status {
                    FeedStatus::Running => self.push_log("Feed running".to_string()),
                    FeedStatus::Stopped => self.push_log("[WARN] Feed stopped".to_string()),
                }
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                                  // status bar
            Constraint::Min(state.symbols.len() as u16 + 4),        // flow table
            Constraint::Length(4),                                  // scan metrics
            Constraint::Length(7),                                  // log
            Constraint::Length(1),                                  // keybinds
        ])
        .split(frame.area());

    let now_ms = chrono::Utc::now().timestamp_millis() as u64;
    frame.render_widget(
        StatusBar {
            feed_running: state.feed_running,
            paused: state.paused,
            tick_count: state.tick_count,
            notify_count: state.notify_count,
            next_flush_secs: state.next_flush_in_secs(now_ms),
        },
        outer[0],
    );

    frame.render_widget(FlowTablePanel::new(&state.rows, state.selected), outer[1]);

    frame.render_widget(
        ScanPanel::new(state.selected_symbol().unwrap_or("-"), &state.scan_summary()),
        outer[2],
    );

    frame.render_widget(LogPanel::new(&state.log_messages), outer[3]);

    frame.render_widget(KeybindBar, outer[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tick::{Side, Tick};
    use crate::refdata::ReferenceLows;

    fn state() -> AppState {
        AppState::new(
            &["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            60_000,
            10,
            300_000,
        )
    }

    #[test]
    fn ticks_feed_candles_and_counter() {
        let mut state = state();
        state.apply(AppEvent::MarketTick(Tick::from_trade(
            "BTCUSDT", 64000.0, 2.0, Side::Buy, 1_000,
        )));
        state.apply(AppEvent::MarketTick(Tick::from_trade(
            "BTCUSDT", 64010.0, 1.0, Side::Sell, 2_000,
        )));
        assert_eq!(state.tick_count, 2);
        let series = &state.candles["BTCUSDT"];
        assert!((series.last_price().unwrap() - 64010.0).abs() < f64::EPSILON);
        assert!((series.current.as_ref().unwrap().volume - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn paused_state_freezes_rows() {
        let mut state = state();
        state.paused = true;
        state.apply(AppEvent::FlowRows(vec![]));
        assert!(state.rows.is_empty());
        state.apply(AppEvent::Notification {
            title: "BTCUSDT Buy Burst".to_string(),
            message: "Buy burst of 6 started".to_string(),
        });
        assert_eq!(state.notify_count, 1);
        assert!(state.log_messages.last().unwrap().contains("[ALERT]"));
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut state = state();
        state.select_prev();
        assert_eq!(state.selected, 0);
        state.select_next();
        assert_eq!(state.selected, 1);
        state.select_next();
        assert_eq!(state.selected, 1);
        assert_eq!(state.selected_symbol(), Some("ETHUSDT"));
    }

    #[test]
    fn scan_summary_empty_without_candles() {
        let state = state();
        let summary = state.scan_summary();
        assert!(summary.vwap.is_none());
        assert!(summary.bias.is_none());
        assert!(summary.confluence.is_none());
    }

    #[test]
    fn confluence_surfaces_for_selected_symbol() {
        let mut state = state();
        // Two buckets so one candle closes and defines the high-volume zone
        // at 100.
        state.apply(AppEvent::MarketTick(Tick::from_trade(
            "BTCUSDT", 100.0, 5.0, Side::Buy, 0,
        )));
        state.apply(AppEvent::MarketTick(Tick::from_trade(
            "BTCUSDT", 100.0, 1.0, Side::Sell, 60_000,
        )));

        // Price near the zone with today's low held above the ten-day floor.
        let held = SnapshotRow::zero("BTCUSDT", 60_000, ReferenceLows::new(Some(99.5), Some(98.0)));
        state.apply(AppEvent::FlowRows(vec![held]));
        let summary = state.scan_summary();
        assert_eq!(summary.hvz, Some(scan::HvzStatus::Near));
        assert_eq!(summary.confluence, Some(true));

        // Today's low breaking the floor voids the setup.
        let broken =
            SnapshotRow::zero("BTCUSDT", 60_000, ReferenceLows::new(Some(97.0), Some(98.0)));
        state.apply(AppEvent::FlowRows(vec![broken]));
        assert_eq!(state.scan_summary().confluence, Some(false));
    }

    #[test]
    fn confluence_needs_reference_lows() {
        let mut state = state();
        state.apply(AppEvent::MarketTick(Tick::from_trade(
            "BTCUSDT", 100.0, 5.0, Side::Buy, 0,
        )));
        state.apply(AppEvent::MarketTick(Tick::from_trade(
            "BTCUSDT", 100.0, 1.0, Side::Sell, 60_000,
        )));
        state.apply(AppEvent::FlowRows(vec![SnapshotRow::zero(
            "BTCUSDT",
            60_000,
            ReferenceLows::default(),
        )]));

        let summary = state.scan_summary();
        assert!(summary.hvz.is_some());
        assert!(summary.confluence.is_none());
    }

    #[test]
    fn snapshot_countdown_anchors_to_last_flush() {
        let mut state = state();
        state.started_ms = 0;
        assert_eq!(state.next_flush_in_secs(50_000), 250);

        state.apply(AppEvent::SnapshotFlushed {
            rows: 2,
            timestamp_ms: 10_000,
        });
        assert_eq!(state.next_flush_in_secs(100_000), 210);
        // An overdue flush clamps at zero instead of wrapping.
        assert_eq!(state.next_flush_in_secs(1_000_000), 0);
    }
}
