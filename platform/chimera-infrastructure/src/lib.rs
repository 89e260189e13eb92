pub mod alpaca;
pub mod artifacts;
pub mod rendering;
pub mod reports;
