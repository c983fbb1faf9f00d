//! Logging of gate outcomes.

use tracing::{info, warn};

use dropout_model::GateReport;

/// Emits one structured event per gate so dropped counts are auditable.
pub fn log_gate(report: &GateReport) {
    let dropped = report.dropped_total();
    info!(
        gate = %report.gate,
        input = report.input,
        kept = report.kept,
        dropped,
        "gate applied"
    );
    for (reason, count) in &report.dropped {
        info!(gate = %report.gate, reason = %reason, count, "rows dropped");
    }
    if report.input > 0 && report.kept == 0 {
        warn!(gate = %report.gate, input = report.input, "gate removed every row");
    }
}
