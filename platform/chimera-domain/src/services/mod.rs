pub mod formatting;
pub mod market_window;
pub mod trade_log;
