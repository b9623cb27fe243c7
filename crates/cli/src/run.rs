//! `printloop run`: drive the pulse train on the real clock and measure it.

use anyhow::Result;
use printloop_scheduler::{EventScheduler, LoopStats, MonotonicClock};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::pulse::{PulseReport, PulseTrain};
use crate::settings::Settings;

/// Outcome of real-time setup for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RtOutcome {
    NotRequested,
    Applied,
    Failed,
}

/// Dispatch lateness summary, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatenessSummary {
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
    pub max_us: f64,
    pub rms_us: f64,
    pub late_dispatches: u64,
    pub late_rate: f64,
}

/// Everything `printloop run` reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub duration_ms: u64,
    pub step_period_us: u64,
    pub max_sleep_us: u64,
    pub rt: RtOutcome,
    pub pulse: PulseReport,
    pub lateness: LatenessSummary,
    pub stats: LoopStats,
}

/// Run the pulse train for `duration` on the calling thread.
pub fn execute(settings: &Settings, duration: Duration, rt: bool) -> Result<RunReport> {
    settings.validate()?;

    let clock = MonotonicClock::new();
    let pulse = PulseTrain::new(
        clock,
        settings.pulse.step_period(),
        duration,
        settings.pulse.housekeeping_interval(),
    );
    let mut scheduler = EventScheduler::with_config(pulse, clock, &settings.scheduler)?;

    let rt = if !rt {
        RtOutcome::NotRequested
    } else if scheduler.init_sched_thread(&settings.rt) {
        RtOutcome::Applied
    } else {
        RtOutcome::Failed
    };

    info!(
        duration_ms = duration.as_millis(),
        step_period_us = settings.pulse.step_period_us,
        "starting pulse train"
    );
    scheduler.event_loop();

    let lateness = scheduler.lateness();
    let percentiles = lateness.percentiles();
    let summary = LatenessSummary {
        p50_us: ns_to_us(percentiles.p50_ns),
        p95_us: ns_to_us(percentiles.p95_ns),
        p99_us: ns_to_us(percentiles.p99_ns),
        max_us: ns_to_us(lateness.max_lateness_ns),
        rms_us: lateness.rms_lateness_ns() / 1_000.0,
        late_dispatches: lateness.late_dispatches,
        late_rate: lateness.late_rate(),
    };

    Ok(RunReport {
        duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        step_period_us: settings.pulse.step_period_us,
        max_sleep_us: settings.scheduler.max_sleep_us,
        rt,
        pulse: scheduler.producer().report(),
        lateness: summary,
        stats: *scheduler.stats(),
    })
}

fn ns_to_us(ns: u64) -> f64 {
    ns as f64 / 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_run_reports_edges() -> Result<()> {
        let settings = Settings::default().with_overrides(Some(2_000), Some(5));

        let report = execute(&settings, Duration::from_millis(20), false)?;

        assert_eq!(report.rt, RtOutcome::NotRequested);
        assert_eq!(report.pulse.expected_edges, 10);
        assert!(report.pulse.edges <= 10);
        assert!(report.pulse.edges >= 1);
        assert_eq!(report.stats.dispatched, report.pulse.edges);
        Ok(())
    }

    #[test]
    fn test_invalid_settings_rejected_before_running() {
        let settings = Settings::default().with_overrides(Some(0), None);
        assert!(execute(&settings, Duration::from_millis(20), false).is_err());
    }
}
