use crate::config::Config;
use chimera_domain::repositories::analysis_report::AnalysisReportRepository;
use chimera_domain::repositories::brokerage::{BrokerageRepository, DailyBarsQuery};
use chimera_domain::services::market_window::{clamp_to_window, trailing_window};
use chimera_domain::services::trade_log::recent_trade_lines;
use chimera_domain::value_objects::analysis::AgentAnalysis;
use chimera_domain::value_objects::bar::Bar;
use chimera_domain::value_objects::snapshot::{
    format_snapshot_timestamp, normalize_last_actions, PortfolioSnapshot, MAX_LAST_ACTIONS,
};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{error, info_span, warn};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub trading_symbol: String,
    pub data_symbol: String,
    pub lookback_days: u32,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            trading_symbol: config.market.trading_symbol.clone(),
            data_symbol: config.market.data_symbol.clone(),
            lookback_days: config.market.lookback_days,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PositionFigures {
    qty: f64,
    pnl: f64,
    pnl_pct: f64,
}

/// Builds one [`PortfolioSnapshot`] per cycle from the broker and the agent's
/// report file. Never fails: every error is logged and replaced by a default.
pub struct SnapshotFetcher<'a> {
    brokerage: &'a dyn BrokerageRepository,
    reports: &'a dyn AnalysisReportRepository,
    settings: FetchSettings,
}

impl<'a> SnapshotFetcher<'a> {
    pub fn new(
        brokerage: &'a dyn BrokerageRepository,
        reports: &'a dyn AnalysisReportRepository,
        settings: FetchSettings,
    ) -> Self {
        Self {
            brokerage,
            reports,
            settings,
        }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub fn fetch(&self) -> PortfolioSnapshot {
        self.fetch_at(Utc::now())
    }

    pub fn fetch_at(&self, now: DateTime<Utc>) -> PortfolioSnapshot {
        let _span = info_span!(
            "fetch_snapshot",
            symbol = %self.settings.trading_symbol,
            pair = %self.settings.data_symbol
        )
        .entered();
        let start = Instant::now();

        let snapshot = match self.fetch_required(now) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(error = %err, "critical error during fetch, publishing connection error snapshot");
                metrics::counter!("chimera.fetch.aborted_total").increment(1);
                PortfolioSnapshot::connection_error(now)
            }
        };

        metrics::histogram!("chimera.fetch.duration_ms")
            .record(start.elapsed().as_millis() as f64);
        metrics::gauge!("chimera.fetch.bars").set(snapshot.market_data.len() as f64);
        snapshot
    }

    /// Account equity and market data are mandatory; their failure aborts the
    /// whole fetch. Everything else degrades in place.
    fn fetch_required(&self, now: DateTime<Utc>) -> Result<PortfolioSnapshot, String> {
        let equity_value = self
            .brokerage
            .account_equity()
            .map_err(|err| format!("account request failed: {err}"))?;

        let position = self.fetch_position();
        let market_data = self.fetch_market_data(now)?;
        let agent_analysis = self.fetch_analysis();
        let last_actions = normalize_last_actions(self.fetch_trade_lines());

        Ok(PortfolioSnapshot {
            equity_value,
            unrealized_pnl: position.pnl,
            unrealized_pnl_pct: position.pnl_pct,
            position_qty: position.qty,
            last_actions,
            timestamp: format_snapshot_timestamp(now),
            market_data,
            agent_analysis,
        })
    }

    fn fetch_position(&self) -> PositionFigures {
        match self.brokerage.position(&self.settings.trading_symbol) {
            Ok(Some(position)) => PositionFigures {
                qty: position.quantity,
                pnl: position.unrealized_pnl,
                pnl_pct: position.unrealized_pnl_fraction * 100.0,
            },
            Ok(None) => PositionFigures::default(),
            Err(err) => {
                warn!(error = %err, "position request failed, defaulting to a flat position");
                record_degraded("position");
                PositionFigures::default()
            }
        }
    }

    fn fetch_market_data(&self, now: DateTime<Utc>) -> Result<Vec<Bar>, String> {
        let (start, end) = trailing_window(now, self.settings.lookback_days);
        let query = DailyBarsQuery {
            symbol: self.settings.data_symbol.clone(),
            start,
            end,
        };
        let bars = self
            .brokerage
            .daily_bars(&query)
            .map_err(|err| format!("market data request failed: {err}"))?;
        Ok(clamp_to_window(bars, start, end))
    }

    fn fetch_analysis(&self) -> Option<AgentAnalysis> {
        match self.reports.latest_report() {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "analysis report unreadable, treating as absent");
                record_degraded("analysis_report");
                None
            }
        }
    }

    fn fetch_trade_lines(&self) -> Vec<String> {
        match self.brokerage.closed_orders(MAX_LAST_ACTIONS) {
            Ok(orders) => recent_trade_lines(&orders, MAX_LAST_ACTIONS),
            Err(err) => {
                warn!(error = %err, "could not fetch last orders");
                record_degraded("orders");
                Vec::new()
            }
        }
    }
}

fn record_degraded(stage: &'static str) {
    metrics::counter!("chimera.fetch.degraded_total", "stage" => stage).increment(1);
}
