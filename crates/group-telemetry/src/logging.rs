//! Structured logging helpers.
//!
//! Every process-level log line carries the same leading fields so JSON logs
//! can be filtered per process:
//! - `process`: display name (`P0`, `P1`, ...)
//! - `clock`: Lamport clock when the line was written
//! - Additional context fields

/// Log a process event with the standard fields.
///
/// ```
/// group_telemetry::log_process_event!(info, "P1", 7, "heartbeat sent", round = 3);
/// ```
#[macro_export]
macro_rules! log_process_event {
    ($level:ident, $process:expr, $clock:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            process = %$process,
            clock = $clock,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a critical-section event with the standard fields.
#[macro_export]
macro_rules! log_critical_section_event {
    ($level:ident, $process:expr, $clock:expr, $msg:expr, $counter:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            process = %$process,
            clock = $clock,
            shared_counter = $counter,
            $($($field)*,)?
            $msg
        )
    };
}
