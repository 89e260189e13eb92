#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub symbol: String,
    pub quantity: f64,
    pub avg_entry_price: f64,
    pub unrealized_pnl: f64,
    /// Unrealized P&L as a fraction of cost basis (0.012 == 1.2%).
    pub unrealized_pnl_fraction: f64,
}
