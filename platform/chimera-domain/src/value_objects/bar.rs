use serde::{Deserialize, Serialize};

/// One daily OHLCV candle in the canonical Open/High/Low/Close/Volume schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    /// Epoch seconds, UTC.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}
