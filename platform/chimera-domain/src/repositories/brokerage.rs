use crate::value_objects::bar::Bar;
use crate::value_objects::order::ClosedOrder;
use crate::value_objects::position::OpenPosition;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct DailyBarsQuery {
    pub symbol: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Read-only view of the brokerage account. All calls block.
pub trait BrokerageRepository {
    fn account_equity(&self) -> Result<f64, String>;

    /// `Ok(None)` when the account holds no position in `symbol`.
    fn position(&self, symbol: &str) -> Result<Option<OpenPosition>, String>;

    fn daily_bars(&self, query: &DailyBarsQuery) -> Result<Vec<Bar>, String>;

    /// Closed orders, newest first.
    fn closed_orders(&self, limit: usize) -> Result<Vec<ClosedOrder>, String>;
}
