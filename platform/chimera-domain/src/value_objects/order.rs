use crate::value_objects::side::Side;
use chrono::{DateTime, Utc};

/// A closed order as reported by the broker. Cancelled or expired orders have
/// no fill time and no fill price.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedOrder {
    pub side: Side,
    pub filled_qty: f64,
    pub filled_avg_price: Option<f64>,
    pub filled_at: Option<DateTime<Utc>>,
}
