//! # Process Group Runtime
//!
//! Starts N processes, lets them run for the configured time (or until
//! Ctrl+C), then stops them and prints the run summary.

use anyhow::{Context, Result};
use group_runtime::{start, RunReport, RuntimeConfig};
use group_telemetry::{
    encode_metrics, init_telemetry, record_process_clock, record_snapshot, TelemetryConfig,
    GROUP_SIZE,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("failed to load configuration")?;
    info!(
        processes = config.group.process_count,
        running_time_ms = config.running_time.as_millis() as u64,
        version = group_com::VERSION,
        "Starting process group"
    );

    let running = start(&config)?;

    tokio::select! {
        _ = tokio::time::sleep(config.running_time) => {
            info!("Running time elapsed");
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Interrupted, stopping early"),
                Err(err) => warn!(error = %err, "Failed to listen for Ctrl+C"),
            }
        }
    }

    // Joining blocks on the exit barrier, keep it off the async workers.
    let report = tokio::task::spawn_blocking(move || running.stop_and_join())
        .await
        .context("shutdown task failed")??;

    if telemetry.metrics_enabled() {
        publish_metrics(&report);
    }

    if config.report_json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report);
    }

    if config.print_metrics {
        if telemetry.metrics_enabled() {
            println!("{}", encode_metrics()?);
        } else {
            warn!("PG_PRINT_METRICS is set but metrics are disabled");
        }
    }

    Ok(())
}

fn publish_metrics(report: &RunReport) {
    GROUP_SIZE.set(i64::from(report.group_size));
    record_snapshot(&report.metrics);
    for process in &report.processes {
        record_process_clock(&process.name, process.final_clock);
    }
}

fn print_summary(report: &RunReport) {
    println!(
        "{} processes ran for {} ms",
        report.group_size, report.elapsed_ms
    );
    for process in &report.processes {
        println!(
            "  {}: {} loops, clock {}, {} messages, {} critical sections",
            process.name,
            process.loops,
            process.final_clock,
            process.messages_received,
            process.critical_section_entries
        );
    }
    let order: Vec<String> = report
        .access_order
        .iter()
        .map(|record| format!("P{}@{}", record.process, record.clock))
        .collect();
    println!("Critical section order: {}", order.join(" -> "));
    println!(
        "Shared counter: {} (violations: {})",
        report.shared_counter, report.mutual_exclusion_violations
    );
}
