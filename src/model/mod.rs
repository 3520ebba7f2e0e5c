pub mod candle;
pub mod row;
pub mod tick;
