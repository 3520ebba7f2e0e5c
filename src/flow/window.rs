use crate::model::tick::Tick;

/// Cumulative aggregates over a window. An empty window yields all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowTotals {
    pub last_price: f64,
    pub total_buy: f64,
    pub total_sell: f64,
    pub net_flow: f64,
}

/// The accumulated tick sequence since the last snapshot reset. Append-only
/// between resets; no time-based eviction is applied (the window is cleared
/// only by the snapshot emitter).
#[derive(Debug, Default)]
pub struct WindowState {
    ticks: Vec<Tick>,
}

impl WindowState {
    pub fn push(&mut self, tick: Tick) {
        self.ticks.push(tick);
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn last(&self) -> Option<&Tick> {
        self.ticks.last()
    }

    /// The tick before the last one, used by the divergence classifier.
    pub fn prev(&self) -> Option<&Tick> {
        self.ticks.len().checked_sub(2).map(|i| &self.ticks[i])
    }

    pub fn totals(&self) -> WindowTotals {
        let Some(last) = self.ticks.last() else {
            return WindowTotals::default();
        };
        let total_buy: f64 = self.ticks.iter().map(|t| t.buy_qty).sum();
        let total_sell: f64 = self.ticks.iter().map(|t| t.sell_qty).sum();
        WindowTotals {
            last_price: last.price,
            total_buy,
            total_sell,
            net_flow: total_buy - total_sell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tick::Side;

    fn tick(price: f64, qty: f64, side: Side) -> Tick {
        Tick::from_trade("BTCUSDT", price, qty, side, 0)
    }

    #[test]
    fn empty_window_totals_are_zero() {
        let window = WindowState::default();
        assert_eq!(window.totals(), WindowTotals::default());
        assert!(window.is_empty());
        assert!(window.prev().is_none());
    }

    #[test]
    fn totals_accumulate_both_sides() {
        let mut window = WindowState::default();
        window.push(tick(100.0, 3.0, Side::Buy));
        window.push(tick(101.0, 2.0, Side::Sell));
        window.push(tick(102.0, 6.0, Side::Buy));

        let totals = window.totals();
        assert!((totals.last_price - 102.0).abs() < f64::EPSILON);
        assert!((totals.total_buy - 9.0).abs() < f64::EPSILON);
        assert!((totals.total_sell - 2.0).abs() < f64::EPSILON);
        assert!((totals.net_flow - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn net_flow_identity_holds() {
        let mut window = WindowState::default();
        for i in 0..200u64 {
            let side = if i % 3 == 0 { Side::Sell } else { Side::Buy };
            window.push(tick(100.0 + i as f64, (i % 7) as f64 + 0.5, side));
        }
        let totals = window.totals();
        assert!((totals.total_buy - totals.total_sell - totals.net_flow).abs() < 1e-9);
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut window = WindowState::default();
        window.push(tick(100.0, 1.0, Side::Buy));
        assert_eq!(window.len(), 1);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.totals(), WindowTotals::default());
    }
}
