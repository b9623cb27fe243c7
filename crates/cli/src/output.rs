//! Output formatting for CLI responses

use anyhow::{Error, Result};
use colored::*;
use serde_json::json;

use crate::error::CliError;
use crate::run::{RtOutcome, RunReport};
use crate::settings::Settings;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    // Print error chain if available
    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::ConfigUnreadable { .. }) => "config_unreadable",
        Some(CliError::InvalidConfiguration(_) | CliError::Scheduler(_)) => "invalid_configuration",
        Some(CliError::JsonError(_) | CliError::YamlError(_)) => "config_parse",
        None => "error",
    }
}

/// Print the effective configuration (YAML unless `json`).
pub fn print_settings(settings: &Settings, json: bool) -> Result<()> {
    if json {
        let output = json!({
            "success": true,
            "config": settings
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", serde_yaml::to_string(settings)?);
    }
    Ok(())
}

/// Print a run report.
pub fn print_run_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        let output = json!({
            "success": true,
            "report": report
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {}", "✓".green(), "Pulse train finished".bold());
    println!("  Duration:      {} ms", report.duration_ms);
    println!("  Step period:   {} us", report.step_period_us);
    println!("  Max sleep:     {} us", report.max_sleep_us);
    println!(
        "  Edges:         {} / {} expected",
        report.pulse.edges, report.pulse.expected_edges
    );
    println!("  Housekeeping:  {} passes", report.pulse.housekeeping_runs);
    println!("  Real-time:     {}", format_rt(report.rt));

    let lateness = &report.lateness;
    println!("{}", "Lateness:".bold());
    println!(
        "  p50 / p95 / p99: {:.1} / {:.1} / {:.1} us",
        lateness.p50_us, lateness.p95_us, lateness.p99_us
    );
    println!("  max:             {:.1} us", lateness.max_us);
    println!("  rms:             {:.1} us", lateness.rms_us);
    let late = format!(
        "{} ({:.2}%)",
        lateness.late_dispatches,
        lateness.late_rate * 100.0
    );
    if lateness.late_dispatches == 0 {
        println!("  late:            {}", late.green());
    } else {
        println!("  late:            {}", late.yellow());
    }

    let stats = &report.stats;
    println!("{}", "Loop:".bold());
    println!("  iterations:      {}", stats.iterations);
    println!("  dispatched:      {}", stats.dispatched);
    println!("  sleeps:          {}", stats.sleeps);
    println!(
        "  wide hints:      {} ({} forced)",
        stats.wide_hints, stats.forced_wide_hints
    );
    println!("  short hints:     {}", stats.short_hints());
    Ok(())
}

fn format_rt(outcome: RtOutcome) -> ColoredString {
    match outcome {
        RtOutcome::NotRequested => "not requested".dimmed(),
        RtOutcome::Applied => "applied".green(),
        RtOutcome::Failed => "failed, running at default priority".yellow(),
    }
}
