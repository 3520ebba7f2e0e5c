use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub instruments: Vec<InstrumentConfig>,
    pub snapshot: SnapshotConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub tick_interval_ms: u64,
    /// Per-cycle probability of starting a one-sided burst run.
    pub burst_chance: f64,
    /// How many consecutive at-threshold ticks a burst run produces.
    pub burst_len: u32,
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    pub base_price: f64,
    /// Static burst threshold. Missing means 0: every tick qualifies.
    pub burst_threshold: Option<f64>,
    pub today_low: Option<f64>,
    pub ten_day_low: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    pub interval_secs: u64,
    pub db_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub candle_interval: String,
    pub price_history_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Parse an interval string (e.g. "1s", "1m", "1h", "1d", "1w", "1M") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    if s.len() < 2 {
        bail!("invalid interval '{}': expected format like '1m'", s);
    }

    let (num_str, suffix) = s.split_at(s.len() - 1);
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 7 * 86_400_000,
        "M" => 30 * 86_400_000,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d/w/M",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Path::new("config/default.toml");
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let config: Config =
            toml::from_str(&config_str).context("failed to parse config/default.toml")?;

        config.validate()?;
        config
            .ui
            .candle_interval_ms()
            .context("ui.candle_interval is invalid")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.instruments.is_empty() {
            return Err(AppError::Config(
                "at least one [[instruments]] entry is required".to_string(),
            ));
        }
        for inst in &self.instruments {
            if inst.symbol.trim().is_empty() {
                return Err(AppError::Config("instrument symbol is empty".to_string()));
            }
            if inst.base_price <= 0.0 {
                return Err(AppError::Config(format!(
                    "instrument {} has non-positive base_price",
                    inst.symbol
                )));
            }
        }
        if self.snapshot.interval_secs == 0 {
            return Err(AppError::Config(
                "snapshot.interval_secs must be > 0".to_string(),
            ));
        }
        if self.feed.channel_capacity == 0 {
            return Err(AppError::Config(
                "feed.channel_capacity must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.feed.burst_chance) {
            return Err(AppError::Config(
                "feed.burst_chance must be within 0..=1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut out = Vec::new();
        for inst in &self.instruments {
            let s = inst.symbol.trim().to_ascii_uppercase();
            if !s.is_empty() && !out.iter().any(|v| v == &s) {
                out.push(s);
            }
        }
        out
    }
}

impl UiConfig {
    pub fn candle_interval_ms(&self) -> Result<u64> {
        parse_interval_ms(&self.candle_interval)
    }
}
