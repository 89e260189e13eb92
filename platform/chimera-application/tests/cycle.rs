use chimera_application::config::Config;
use chimera_application::cycle::run_cycle_at;
use chimera_application::fetching::{FetchSettings, SnapshotFetcher};
use chimera_domain::repositories::analysis_report::AnalysisReportRepository;
use chimera_domain::repositories::brokerage::{BrokerageRepository, DailyBarsQuery};
use chimera_domain::repositories::frames::{FrameRenderer, FrameSink};
use chimera_domain::value_objects::analysis::AgentAnalysis;
use chimera_domain::value_objects::bar::Bar;
use chimera_domain::value_objects::order::ClosedOrder;
use chimera_domain::value_objects::position::OpenPosition;
use chimera_domain::value_objects::snapshot::PortfolioSnapshot;
use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;

struct StaticBrokerage {
    reachable: bool,
    bars: Vec<Bar>,
}

impl BrokerageRepository for StaticBrokerage {
    fn account_equity(&self) -> Result<f64, String> {
        if self.reachable {
            Ok(12_345.67)
        } else {
            Err("broker request failed: dns error".to_string())
        }
    }

    fn position(&self, _symbol: &str) -> Result<Option<OpenPosition>, String> {
        Ok(None)
    }

    fn daily_bars(&self, _query: &DailyBarsQuery) -> Result<Vec<Bar>, String> {
        Ok(self.bars.clone())
    }

    fn closed_orders(&self, _limit: usize) -> Result<Vec<ClosedOrder>, String> {
        Ok(Vec::new())
    }
}

struct NoReport;

impl AnalysisReportRepository for NoReport {
    fn latest_report(&self) -> Result<Option<AgentAnalysis>, String> {
        Ok(None)
    }
}

#[derive(Default)]
struct RecordingRenderer {
    rendered: RefCell<Vec<PortfolioSnapshot>>,
    fail: bool,
}

impl FrameRenderer for RecordingRenderer {
    fn render_frame(&self, snapshot: &PortfolioSnapshot) -> Result<Vec<u8>, String> {
        if self.fail {
            return Err("failed to encode png: out of memory".to_string());
        }
        self.rendered.borrow_mut().push(snapshot.clone());
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

#[derive(Default)]
struct RecordingSink {
    frames: RefCell<Vec<Vec<u8>>>,
}

impl FrameSink for RecordingSink {
    fn publish(&self, frame: &[u8]) -> Result<(), String> {
        self.frames.borrow_mut().push(frame.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, 15, 0, 0).unwrap()
}

fn daily_bar(days_ago: i64) -> Bar {
    Bar {
        symbol: "BTC/USD".to_string(),
        timestamp: now().timestamp() - days_ago * 86_400,
        open: 42_000.0,
        high: 42_800.0,
        low: 41_500.0,
        close: 42_400.0,
        volume: 3.5,
    }
}

#[test]
fn cycle_renders_and_publishes_one_frame() {
    let brokerage = StaticBrokerage {
        reachable: true,
        bars: vec![daily_bar(2), daily_bar(1)],
    };
    let fetcher = SnapshotFetcher::new(
        &brokerage,
        &NoReport,
        FetchSettings::from_config(&Config::default()),
    );
    let renderer = RecordingRenderer::default();
    let sink = RecordingSink::default();

    let report = run_cycle_at(&fetcher, &renderer, &sink, now()).expect("cycle");

    assert_eq!(report.snapshot_timestamp, "2024-01-05 15:00:00");
    assert_eq!(report.frame_bytes, 4);
    assert_eq!(report.bars, 2);
    assert!(!report.degraded);

    let rendered = renderer.rendered.borrow();
    assert_eq!(rendered.len(), 1);
    assert!((rendered[0].equity_value - 12_345.67).abs() < 1e-9);
    assert_eq!(rendered[0].last_actions, vec!["Awaiting first agent action..."]);
    assert_eq!(sink.frames.borrow().len(), 1);
}

#[test]
fn unreachable_broker_still_publishes_a_frame() {
    let brokerage = StaticBrokerage {
        reachable: false,
        bars: vec![daily_bar(1)],
    };
    let fetcher = SnapshotFetcher::new(
        &brokerage,
        &NoReport,
        FetchSettings::from_config(&Config::default()),
    );
    let renderer = RecordingRenderer::default();
    let sink = RecordingSink::default();

    let report = run_cycle_at(&fetcher, &renderer, &sink, now()).expect("cycle");

    assert!(report.degraded);
    assert_eq!(report.bars, 0);
    assert_eq!(
        renderer.rendered.borrow()[0].last_actions,
        vec!["API Connection Error"]
    );
    assert_eq!(sink.frames.borrow().len(), 1);
}

#[test]
fn render_failure_is_reported_and_nothing_is_published() {
    let brokerage = StaticBrokerage {
        reachable: true,
        bars: Vec::new(),
    };
    let fetcher = SnapshotFetcher::new(
        &brokerage,
        &NoReport,
        FetchSettings::from_config(&Config::default()),
    );
    let renderer = RecordingRenderer {
        fail: true,
        ..RecordingRenderer::default()
    };
    let sink = RecordingSink::default();

    let err = run_cycle_at(&fetcher, &renderer, &sink, now()).expect_err("render failure");
    assert!(err.contains("failed to encode png"));
    assert!(sink.frames.borrow().is_empty());
}
