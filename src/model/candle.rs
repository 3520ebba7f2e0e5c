#[derive(Debug, Clone)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub open_time: u64,
    pub close_time: u64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Typical price used for VWAP accumulation.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Aggregates real-time trade ticks into a single candle over a time interval.
#[derive(Debug, Clone)]
pub struct CandleBuilder {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub open_time: u64,
    pub close_time: u64,
}

impl CandleBuilder {
    /// Start a new candle. The bucket is aligned to the interval.
    pub fn new(price: f64, qty: f64, timestamp_ms: u64, interval_ms: u64) -> Self {
        assert!(interval_ms > 0, "interval_ms must be > 0");
        let open_time = timestamp_ms - (timestamp_ms % interval_ms);
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
            volume: qty,
            open_time,
            close_time: open_time + interval_ms,
        }
    }

    /// Update the candle with a new trade.
    pub fn update(&mut self, price: f64, qty: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += qty;
    }

    /// Check if a timestamp belongs to this candle's time bucket.
    pub fn contains(&self, timestamp_ms: u64) -> bool {
        timestamp_ms >= self.open_time && timestamp_ms < self.close_time
    }

    /// Finalize into an immutable Candle.
    pub fn finish(&self) -> Candle {
        Candle {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            open_time: self.open_time,
            close_time: self.close_time,
        }
    }
}

/// A bounded per-symbol candle history fed tick by tick.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    pub candles: Vec<Candle>,
    pub current: Option<CandleBuilder>,
    interval_ms: u64,
    cap: usize,
}

impl CandleSeries {
    pub fn new(interval_ms: u64, cap: usize) -> Self {
        assert!(interval_ms > 0, "interval_ms must be > 0");
        Self {
            candles: Vec::with_capacity(cap),
            current: None,
            interval_ms,
            cap,
        }
    }

    pub fn push_trade(&mut self, price: f64, qty: f64, timestamp_ms: u64) {
        let start_new = match &self.current {
            Some(cb) => !cb.contains(timestamp_ms),
            None => true,
        };
        if start_new {
            if let Some(cb) = self.current.take() {
                self.candles.push(cb.finish());
                if self.candles.len() > self.cap {
                    self.candles.remove(0);
                }
            }
            self.current = Some(CandleBuilder::new(price, qty, timestamp_ms, self.interval_ms));
        } else if let Some(cb) = self.current.as_mut() {
            cb.update(price, qty);
        }
    }

    pub fn last_price(&self) -> Option<f64> {
        self.current
            .as_ref()
            .map(|cb| cb.close)
            .or_else(|| self.candles.last().map(|c| c.close))
    }

    /// Closed candles plus the in-progress one, oldest first.
    pub fn with_current(&self) -> Vec<Candle> {
        let mut out = self.candles.clone();
        if let Some(cb) = &self.current {
            out.push(cb.finish());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_builder_basics() {
        let mut cb = CandleBuilder::new(100.0, 1.0, 60_500, 60_000);
        assert_eq!(cb.open_time, 60_000);
        assert_eq!(cb.close_time, 120_000);
        assert!(cb.contains(60_500));
        assert!(cb.contains(119_999));
        assert!(!cb.contains(120_000));

        cb.update(105.0, 2.0);
        cb.update(95.0, 0.5);
        cb.update(102.0, 1.5);

        let candle = cb.finish();
        assert!((candle.open - 100.0).abs() < f64::EPSILON);
        assert!((candle.high - 105.0).abs() < f64::EPSILON);
        assert!((candle.low - 95.0).abs() < f64::EPSILON);
        assert!((candle.close - 102.0).abs() < f64::EPSILON);
        assert!((candle.volume - 5.0).abs() < f64::EPSILON);
        assert!(candle.is_bullish());
    }

    #[test]
    fn series_rolls_over_on_bucket_boundary() {
        let mut series = CandleSeries::new(60_000, 3);
        series.push_trade(100.0, 1.0, 0);
        series.push_trade(101.0, 1.0, 30_000);
        assert!(series.candles.is_empty());

        series.push_trade(102.0, 1.0, 60_000);
        assert_eq!(series.candles.len(), 1);
        assert!((series.candles[0].close - 101.0).abs() < f64::EPSILON);
        assert!((series.last_price().unwrap() - 102.0).abs() < f64::EPSILON);
    }

    #[test]
    fn series_trims_to_capacity() {
        let mut series = CandleSeries::new(1_000, 2);
        for i in 0..5u64 {
            series.push_trade(100.0 + i as f64, 1.0, i * 1_000);
        }
        assert_eq!(series.candles.len(), 2);
        assert_eq!(series.with_current().len(), 3);
    }

    #[test]
    #[should_panic(expected = "interval_ms must be > 0")]
    fn candle_builder_rejects_zero_interval() {
        let _ = CandleBuilder::new(100.0, 1.0, 60_500, 0);
    }
}
