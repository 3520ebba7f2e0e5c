use std::fmt;

/// Which side initiated a trade. A tick carries quantity on exactly one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized trade event. Immutable once created; exactly one of
/// `buy_qty` / `sell_qty` is non-zero.
#[derive(Debug, Clone)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub buy_qty: f64,
    pub sell_qty: f64,
    pub timestamp_ms: u64,
}

impl Tick {
    /// Build a tick from a side-tagged trade, placing the quantity on the
    /// initiating side and zero on the other.
    pub fn from_trade(symbol: &str, price: f64, qty: f64, side: Side, timestamp_ms: u64) -> Self {
        let (buy_qty, sell_qty) = match side {
            Side::Buy => (qty, 0.0),
            Side::Sell => (0.0, qty),
        };
        Self {
            symbol: symbol.to_string(),
            price,
            buy_qty,
            sell_qty,
            timestamp_ms,
        }
    }

    pub fn qty_for(&self, side: Side) -> f64 {
        match side {
            Side::Buy => self.buy_qty,
            Side::Sell => self.sell_qty,
        }
    }

    pub fn side(&self) -> Side {
        if self.buy_qty > 0.0 {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}
