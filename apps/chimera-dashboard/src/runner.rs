use crate::bootstrap::Services;
use chimera_application::cycle::{run_cycle, CycleReport};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub completed: u64,
    pub failed: u64,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Runs `cycle`, turning a panic into an error so the loop survives it.
pub fn guarded<F>(cycle: F) -> Result<CycleReport, String>
where
    F: FnOnce() -> Result<CycleReport, String>,
{
    match panic::catch_unwind(AssertUnwindSafe(cycle)) {
        Ok(result) => result,
        Err(payload) => Err(format!("cycle panicked: {}", panic_message(payload.as_ref()))),
    }
}

pub fn run_once(services: &Services) -> Result<CycleReport, String> {
    guarded(|| {
        let fetcher = services.fetcher();
        run_cycle(&fetcher, services.renderer.as_ref(), services.sink.as_ref())
    })
}

fn log_outcome(outcome: &Result<CycleReport, String>, stats: &mut LoopStats) {
    match outcome {
        Ok(report) => {
            stats.completed += 1;
            if report.degraded {
                warn!(
                    timestamp = %report.snapshot_timestamp,
                    "dashboard updated with connection error placeholder"
                );
            } else {
                info!(
                    timestamp = %report.snapshot_timestamp,
                    bytes = report.frame_bytes,
                    bars = report.bars,
                    "dashboard updated successfully"
                );
            }
        }
        Err(err) => {
            stats.failed += 1;
            metrics::counter!("chimera.cycle.failed_total").increment(1);
            error!(error = %err, "an error occurred in the main loop");
        }
    }
}

/// Runs cycles with `services.interval` between them. `max_cycles` of `None`
/// never returns.
pub fn run_loop(services: &Services, max_cycles: Option<u64>) -> LoopStats {
    let mut stats = LoopStats::default();
    let mut cycle = 0u64;
    loop {
        cycle += 1;
        let outcome = run_once(services);
        log_outcome(&outcome, &mut stats);
        if max_cycles.is_some_and(|max| cycle >= max) {
            return stats;
        }
        info!(seconds = services.interval.as_secs(), "waiting for next cycle");
        thread::sleep(services.interval);
    }
}

pub fn run_forever(services: &Services) {
    run_loop(services, None);
}
