use crate::services::formatting::format_currency;
use crate::value_objects::order::ClosedOrder;

pub const TRADE_TIME_FORMAT: &str = "%b %d, %H:%M";

/// `• BUY 0.0100 @ $61,234.56 (Jan 05, 14:30)`. `None` for orders that never
/// filled.
pub fn format_trade_line(order: &ClosedOrder) -> Option<String> {
    let filled_at = order.filled_at?;
    let price = order.filled_avg_price?;
    Some(format!(
        "• {} {:.4} @ {} ({})",
        order.side.label(),
        order.filled_qty,
        format_currency(price),
        filled_at.format(TRADE_TIME_FORMAT)
    ))
}

/// Trade lines for the filled orders among `orders`, keeping broker order
/// (newest first) and at most `limit` lines.
pub fn recent_trade_lines(orders: &[ClosedOrder], limit: usize) -> Vec<String> {
    orders
        .iter()
        .filter_map(format_trade_line)
        .take(limit)
        .collect()
}
