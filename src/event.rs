use crate::model::row::SnapshotRow;
use crate::model::tick::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Running,
    Stopped,
}

/// Everything the display loop consumes, multiplexed over one channel.
#[derive(Debug, Clone)]
pub enum AppEvent {
    MarketTick(Tick),
    /// Fresh rows for every tracked symbol, in display order.
    FlowRows(Vec<SnapshotRow>),
    /// At most one per burst episode per side per symbol.
    Notification { title: String, message: String },
    SnapshotFlushed { rows: usize, timestamp_ms: u64 },
    FeedStatus(FeedStatus),
    LogMessage(String),
    Error(String),
}
