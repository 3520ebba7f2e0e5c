//! Candle-derived scan metrics: session VWAP, percent position within a prior
//! bar's range, high-volume-zone proximity, and the combined setup bias.

use crate::model::candle::Candle;

/// Price must sit within +/- this fraction of the zone to count as "near".
pub const HVZ_TOLERANCE: f64 = 0.01;
pub const BULLISH_POSITION_PCT: f64 = 85.0;
pub const BEARISH_POSITION_PCT: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupBias {
    Bullish,
    Bearish,
    Neutral,
}

impl SetupBias {
    pub fn label(&self) -> &'static str {
        match self {
            SetupBias::Bullish => "Bullish",
            SetupBias::Bearish => "Bearish",
            SetupBias::Neutral => "Neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvzStatus {
    Below,
    Near,
    Above,
}

impl HvzStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HvzStatus::Below => "Below HVZ",
            HvzStatus::Near => "Near HVZ",
            HvzStatus::Above => "Above HVZ",
        }
    }
}

/// Volume-weighted average of typical prices over the given candles.
/// `None` when there are no candles or no volume traded.
pub fn session_vwap(candles: &[Candle]) -> Option<f64> {
    let volume: f64 = candles.iter().map(|c| c.volume).sum();
    if candles.is_empty() || volume <= 0.0 {
        return None;
    }
    let weighted: f64 = candles.iter().map(|c| c.typical_price() * c.volume).sum();
    Some(weighted / volume)
}

/// Where `last_price` sits within `[prev_low, prev_high]`, as a percentage.
/// A degenerate range yields `None`.
pub fn range_position_pct(last_price: f64, prev_high: f64, prev_low: f64) -> Option<f64> {
    let range = prev_high - prev_low;
    if range <= 0.0 {
        return None;
    }
    Some((last_price - prev_low) / range * 100.0)
}

pub fn setup_bias(position_pct: f64, last_price: f64, vwap: f64) -> SetupBias {
    if position_pct >= BULLISH_POSITION_PCT && last_price > vwap {
        SetupBias::Bullish
    } else if position_pct <= BEARISH_POSITION_PCT && last_price < vwap {
        SetupBias::Bearish
    } else {
        SetupBias::Neutral
    }
}

/// The close of the highest-volume candle in the lookback.
pub fn high_volume_zone(candles: &[Candle]) -> Option<f64> {
    candles
        .iter()
        .max_by(|a, b| a.volume.total_cmp(&b.volume))
        .map(|c| c.close)
}

pub fn hvz_status(last_price: f64, zone_price: f64, tolerance: f64) -> HvzStatus {
    let lower = zone_price * (1.0 - tolerance);
    let upper = zone_price * (1.0 + tolerance);
    if last_price < lower {
        HvzStatus::Below
    } else if last_price > upper {
        HvzStatus::Above
    } else {
        HvzStatus::Near
    }
}

/// "Perfect confluence": price near the zone with today's low held between
/// yesterday's low and the zone itself.
pub fn perfect_confluence(
    status: HvzStatus,
    todays_low: f64,
    yesterdays_low: f64,
    zone_price: f64,
) -> bool {
    status == HvzStatus::Near && todays_low <= zone_price && todays_low >= yesterdays_low
}

/// Whether the most recent candle traded more volume than the one before it.
pub fn volume_up(candles: &[Candle]) -> Option<bool> {
    let len = candles.len();
    if len < 2 {
        return None;
    }
    Some(candles[len - 1].volume > candles[len - 2].volume)
}
