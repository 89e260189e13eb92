use crate::value_objects::analysis::AgentAnalysis;
use crate::value_objects::bar::Bar;
use chrono::{DateTime, Utc};

pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const MAX_LAST_ACTIONS: usize = 3;
pub const AWAITING_ACTION_PLACEHOLDER: &str = "Awaiting first agent action...";
pub const CONNECTION_ERROR_ACTION: &str = "API Connection Error";

/// One cycle's fully resolved view of the account. Every field already holds
/// its default when the corresponding source was unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub equity_value: f64,
    pub unrealized_pnl: f64,
    /// Percent, not fraction (-1.2 == -1.20%).
    pub unrealized_pnl_pct: f64,
    pub position_qty: f64,
    /// Most recent first, never empty, at most [`MAX_LAST_ACTIONS`] entries.
    pub last_actions: Vec<String>,
    pub timestamp: String,
    /// Daily bars ordered by timestamp.
    pub market_data: Vec<Bar>,
    pub agent_analysis: Option<AgentAnalysis>,
}

impl PortfolioSnapshot {
    /// Snapshot used when the mandatory account or market data calls fail.
    pub fn connection_error(now: DateTime<Utc>) -> Self {
        Self {
            equity_value: 0.0,
            unrealized_pnl: 0.0,
            unrealized_pnl_pct: 0.0,
            position_qty: 0.0,
            last_actions: vec![CONNECTION_ERROR_ACTION.to_string()],
            timestamp: format_snapshot_timestamp(now),
            market_data: Vec::new(),
            agent_analysis: None,
        }
    }

    pub fn is_connection_error(&self) -> bool {
        self.last_actions.len() == 1 && self.last_actions[0] == CONNECTION_ERROR_ACTION
    }
}

pub fn format_snapshot_timestamp(now: DateTime<Utc>) -> String {
    now.format(SNAPSHOT_TIMESTAMP_FORMAT).to_string()
}

/// Caps the list at [`MAX_LAST_ACTIONS`] and substitutes the placeholder when
/// nothing was executed yet.
pub fn normalize_last_actions(mut actions: Vec<String>) -> Vec<String> {
    actions.truncate(MAX_LAST_ACTIONS);
    if actions.is_empty() {
        actions.push(AWAITING_ACTION_PLACEHOLDER.to_string());
    }
    actions
}
