use crate::model::row::BurstDescriptor;

/// What a single tick did to one side's burst state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BurstUpdate {
    /// True exactly once per contiguous burst episode.
    pub notify: bool,
    /// True when this tick should be appended to the burst log (at most one
    /// append per distinct millisecond timestamp per side).
    pub log: bool,
    pub descriptor: Option<BurstDescriptor>,
}

/// Per-(symbol, side) IDLE/ACTIVE state machine against a static threshold.
///
/// `start_time_ms` is set iff the machine is active; `notified` latches after
/// the one-shot notification and clears the instant quantity drops below
/// threshold. Survives snapshot resets, so a burst can span a boundary.
#[derive(Debug, Default)]
pub struct BurstTracker {
    start_time_ms: Option<u64>,
    notified: bool,
    current: Option<BurstDescriptor>,
    last_logged_ms: Option<u64>,
}

impl BurstTracker {
    pub fn on_tick(&mut self, qty: f64, threshold: f64, timestamp_ms: u64) -> BurstUpdate {
        if qty >= threshold {
            let entered = self.start_time_ms.is_none();
            if entered {
                self.start_time_ms = Some(timestamp_ms);
            }
            let notify = entered && !self.notified;
            if notify {
                self.notified = true;
            }

            let start = self.start_time_ms.unwrap_or(timestamp_ms);
            let descriptor = BurstDescriptor {
                qty,
                duration_secs: timestamp_ms.saturating_sub(start) / 1_000,
            };
            self.current = Some(descriptor);

            let log = self.last_logged_ms != Some(timestamp_ms);
            if log {
                self.last_logged_ms = Some(timestamp_ms);
            }

            BurstUpdate {
                notify,
                log,
                descriptor: Some(descriptor),
            }
        } else {
            self.start_time_ms = None;
            self.notified = false;
            self.current = None;
            BurstUpdate::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.start_time_ms.is_some()
    }

    /// The descriptor formatted into the current row, if a burst is ongoing.
    pub fn descriptor(&self) -> Option<BurstDescriptor> {
        self.current
    }
}
