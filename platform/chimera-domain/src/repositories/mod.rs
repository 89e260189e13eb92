pub mod analysis_report;
pub mod brokerage;
pub mod frames;
