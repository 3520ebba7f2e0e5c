use crate::refdata::ReferenceLows;

/// Price movement against the sign of accumulated net flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Divergence {
    #[default]
    None,
    /// Price up while net flow is negative: hidden buying.
    Absorption,
    /// Price down while net flow is positive: hidden selling.
    Distribution,
}

impl Divergence {
    pub fn label(&self) -> &'static str {
        match self {
            Divergence::None => "-",
            Divergence::Absorption => "Absorption / Hidden Buying",
            Divergence::Distribution => "Distribution / Hidden Selling",
        }
    }

    /// The manipulation flag is high exactly when a divergence is labelled.
    pub fn manipulation_high(&self) -> bool {
        !matches!(self, Divergence::None)
    }
}

/// The ongoing burst on one side: the latest at-threshold quantity and how
/// long the episode has run, in whole seconds (truncated).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstDescriptor {
    pub qty: f64,
    pub duration_secs: u64,
}

impl BurstDescriptor {
    pub fn format(&self) -> String {
        format!("{} ({} sec)", self.qty, self.duration_secs)
    }
}

/// One materialized row per symbol. Built fresh per snapshot interval or per
/// UI refresh; never mutated after construction.
#[derive(Debug, Clone)]
pub struct SnapshotRow {
    pub timestamp_ms: u64,
    pub symbol: String,
    pub last_price: f64,
    pub total_buy: f64,
    pub total_sell: f64,
    pub net_flow: f64,
    pub buy_burst: Option<BurstDescriptor>,
    pub sell_burst: Option<BurstDescriptor>,
    pub divergence: Divergence,
    pub today_low: Option<f64>,
    pub ten_day_low: Option<f64>,
}

impl SnapshotRow {
    /// The defined row for a symbol whose window holds no ticks yet.
    pub fn zero(symbol: &str, timestamp_ms: u64, lows: ReferenceLows) -> Self {
        Self {
            timestamp_ms,
            symbol: symbol.to_string(),
            last_price: 0.0,
            total_buy: 0.0,
            total_sell: 0.0,
            net_flow: 0.0,
            buy_burst: None,
            sell_burst: None,
            divergence: Divergence::None,
            today_low: lows.today_low,
            ten_day_low: lows.ten_day_low,
        }
    }

    pub fn buy_burst_label(&self) -> String {
        self.buy_burst
            .as_ref()
            .map(BurstDescriptor::format)
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn sell_burst_label(&self) -> String {
        self.sell_burst
            .as_ref()
            .map(BurstDescriptor::format)
            .unwrap_or_else(|| "-".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_row_has_empty_aggregates() {
        let row = SnapshotRow::zero("BTCUSDT", 1_000, ReferenceLows::default());
        assert!(row.last_price.abs() < f64::EPSILON);
        assert!(row.net_flow.abs() < f64::EPSILON);
        assert_eq!(row.buy_burst_label(), "-");
        assert_eq!(row.divergence, Divergence::None);
        assert!(row.today_low.is_none());
    }

    #[test]
    fn burst_descriptor_format() {
        let d = BurstDescriptor {
            qty: 6.0,
            duration_secs: 3,
        };
        assert_eq!(d.format(), "6 (3 sec)");
    }

    #[test]
    fn manipulation_tracks_divergence() {
        assert!(!Divergence::None.manipulation_high());
        assert!(Divergence::Absorption.manipulation_high());
        assert!(Divergence::Distribution.manipulation_high());
    }
}
