use std::collections::HashMap;

use crate::config::InstrumentConfig;

/// Static reference lows fetched once per process lifetime. A failed or
/// absent lookup degrades to `None` on the row, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReferenceLows {
    pub today_low: Option<f64>,
    pub ten_day_low: Option<f64>,
}

impl ReferenceLows {
    pub fn new(today_low: Option<f64>, ten_day_low: Option<f64>) -> Self {
        Self {
            today_low,
            ten_day_low,
        }
    }
}

/// Build the per-symbol lows map from configured instruments.
pub fn reference_lows(instruments: &[InstrumentConfig]) -> HashMap<String, ReferenceLows> {
    instruments
        .iter()
        .map(|inst| {
            (
                inst.symbol.trim().to_ascii_uppercase(),
                ReferenceLows::new(inst.today_low, inst.ten_day_low),
            )
        })
        .collect()
}
