use crate::fetching::SnapshotFetcher;
use chimera_domain::repositories::frames::{FrameRenderer, FrameSink};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{info, info_span};

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub snapshot_timestamp: String,
    pub frame_bytes: usize,
    pub degraded: bool,
    pub bars: usize,
}

/// One poll-render cycle: fetch a snapshot, render it, publish the frame.
pub fn run_cycle(
    fetcher: &SnapshotFetcher<'_>,
    renderer: &dyn FrameRenderer,
    sink: &dyn FrameSink,
) -> Result<CycleReport, String> {
    run_cycle_at(fetcher, renderer, sink, Utc::now())
}

pub fn run_cycle_at(
    fetcher: &SnapshotFetcher<'_>,
    renderer: &dyn FrameRenderer,
    sink: &dyn FrameSink,
    now: DateTime<Utc>,
) -> Result<CycleReport, String> {
    let _span = info_span!("dashboard_cycle", sink = %sink.describe()).entered();
    let cycle_start = Instant::now();

    info!("fetching new data for dashboard");
    let snapshot = fetcher.fetch_at(now);

    info!(bars = snapshot.market_data.len(), "generating dashboard frame");
    let render_start = Instant::now();
    let frame = renderer.render_frame(&snapshot)?;
    metrics::histogram!("chimera.render.duration_ms")
        .record(render_start.elapsed().as_millis() as f64);

    sink.publish(&frame)?;
    metrics::gauge!("chimera.frame.bytes").set(frame.len() as f64);
    metrics::counter!("chimera.cycle.completed_total").increment(1);
    metrics::histogram!("chimera.cycle.duration_ms")
        .record(cycle_start.elapsed().as_millis() as f64);

    Ok(CycleReport {
        snapshot_timestamp: snapshot.timestamp.clone(),
        frame_bytes: frame.len(),
        degraded: snapshot.is_connection_error(),
        bars: snapshot.market_data.len(),
    })
}
