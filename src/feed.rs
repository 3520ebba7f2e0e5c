use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, watch};

use crate::config::{FeedConfig, InstrumentConfig};
use crate::error::AppError;
use crate::event::{AppEvent, FeedStatus};
use crate::model::tick::{Side, Tick};

struct SimInstrument {
    symbol: String,
    price: f64,
    threshold: f64,
    /// Remaining ticks of a forced one-sided burst run.
    burst_remaining: u32,
    burst_side: Side,
}

/// Randomized trade feed standing in for an exchange connection. Each cycle
/// emits one tick per instrument; occasionally an instrument enters a burst
/// run of consecutive at-threshold ticks on one side.
pub struct SimulatedFeed {
    instruments: Vec<SimInstrument>,
    tick_interval: Duration,
    burst_chance: f64,
    burst_len: u32,
}

impl SimulatedFeed {
    pub fn new(config: &FeedConfig, instruments: &[InstrumentConfig]) -> Self {
        let instruments = instruments
            .iter()
            .map(|inst| SimInstrument {
                symbol: inst.symbol.trim().to_ascii_uppercase(),
                price: inst.base_price,
                threshold: inst.burst_threshold.unwrap_or(0.0),
                burst_remaining: 0,
                burst_side: Side::Buy,
            })
            .collect();
        Self {
            instruments,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            burst_chance: config.burst_chance,
            burst_len: config.burst_len.max(1),
        }
    }

    /// Produce ticks until shutdown. Sends with `send().await`: when the tick
    /// channel is full the feed blocks rather than dropping, since dropped
    /// ticks would corrupt the cumulative totals downstream.
    pub async fn run(
        mut self,
        tick_tx: mpsc::Sender<Tick>,
        event_tx: mpsc::Sender<AppEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), AppError> {
        let _ = event_tx
            .send(AppEvent::FeedStatus(FeedStatus::Running))
            .await;
        let _ = event_tx
            .send(AppEvent::LogMessage(format!(
                "Feed started: {} instruments @ {}ms",
                self.instruments.len(),
                self.tick_interval.as_millis()
            )))
            .await;

        let mut interval = tokio::time::interval(self.tick_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now_ms = chrono::Utc::now().timestamp_millis() as u64;
                    for tick in self.generate_cycle(now_ms) {
                        tokio::select! {
                            sent = tick_tx.send(tick) => {
                                if sent.is_err() {
                                    let _ = event_tx
                                        .send(AppEvent::FeedStatus(FeedStatus::Stopped))
                                        .await;
                                    return Err(AppError::Feed(
                                        "tick channel closed".to_string(),
                                    ));
                                }
                            }
                            _ = shutdown.changed() => {
                                let _ = event_tx
                                    .send(AppEvent::FeedStatus(FeedStatus::Stopped))
                                    .await;
                                return Ok(());
                            }
                        }
                    }
                }
                _ = shutdown.changed() => {
                    let _ = event_tx
                        .send(AppEvent::FeedStatus(FeedStatus::Stopped))
                        .await;
                    return Ok(());
                }
            }
        }
    }

    fn generate_cycle(&mut self, now_ms: u64) -> Vec<Tick> {
        let mut rng = rand::thread_rng();
        let mut ticks = Vec::with_capacity(self.instruments.len());

        for inst in &mut self.instruments {
            let change = inst.price * rng.gen_range(-0.0005..0.0005);
            inst.price += change;

            if inst.burst_remaining == 0 && rng.gen_bool(self.burst_chance.min(1.0)) {
                inst.burst_remaining = self.burst_len;
                inst.burst_side = if rng.gen_bool(0.5) {
                    Side::Buy
                } else {
                    Side::Sell
                };
            }

            let (side, qty) = if inst.burst_remaining > 0 {
                inst.burst_remaining -= 1;
                // At or above threshold so every tick of the run qualifies.
                let qty = inst.threshold.max(0.1) * rng.gen_range(1.0..2.5);
                (inst.burst_side, qty)
            } else {
                let side = if rng.gen_bool(0.5) {
                    Side::Buy
                } else {
                    Side::Sell
                };
                let qty = inst.threshold.max(0.1) * rng.gen_range(0.01..0.8);
                (side, qty)
            };

            ticks.push(Tick::from_trade(&inst.symbol, inst.price, qty, side, now_ms));
        }

        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> SimulatedFeed {
        let config = FeedConfig {
            tick_interval_ms: 10,
            burst_chance: 0.0,
            burst_len: 4,
            channel_capacity: 16,
        };
        let instruments = vec![InstrumentConfig {
            symbol: "btcusdt".to_string(),
            base_price: 64000.0,
            burst_threshold: Some(5.0),
            today_low: None,
            ten_day_low: None,
        }];
        SimulatedFeed::new(&config, &instruments)
    }

    #[test]
    fn cycle_emits_one_side_tagged_tick_per_instrument() {
        let mut feed = feed();
        let ticks = feed.generate_cycle(1_000);
        assert_eq!(ticks.len(), 1);
        let tick = &ticks[0];
        assert_eq!(tick.symbol, "BTCUSDT");
        assert_eq!(tick.timestamp_ms, 1_000);
        // Exactly one side carries quantity.
        assert!((tick.buy_qty > 0.0) ^ (tick.sell_qty > 0.0));
    }

    #[test]
    fn burst_run_stays_at_threshold_for_its_length() {
        let mut feed = feed();
        feed.instruments[0].burst_remaining = 4;
        feed.instruments[0].burst_side = Side::Buy;
        for i in 0..4u64 {
            let ticks = feed.generate_cycle(i);
            assert!(ticks[0].buy_qty >= 5.0, "tick {} below threshold", i);
        }
        assert_eq!(feed.instruments[0].burst_remaining, 0);
    }
}
