//! Study-design filter and phase flags.

use dropout_ingest::StudyRecord;
use dropout_model::{DropReason, PhaseFlags};

pub const COMPLETED_STATUS: &str = "Completed";
pub const INTERVENTIONAL_TYPE: &str = "Interventional";

/// Sets a flag for every phase digit that appears in the phase text.
///
/// `"Phase 1/Phase 2"` sets phases 1 and 2. Missing text sets nothing.
pub fn parse_phase_flags(phase: Option<&str>) -> PhaseFlags {
    let mut flags = PhaseFlags::default();
    if let Some(text) = phase {
        for phase in PhaseFlags::PHASES {
            if text.contains(char::from(b'0' + phase)) {
                flags.set(phase);
            }
        }
    }
    flags
}

/// Keeps completed, interventional studies. Status is checked first.
pub fn study_filter(study: &StudyRecord) -> Result<(), DropReason> {
    if study.overall_status.as_deref().map(str::trim) != Some(COMPLETED_STATUS) {
        return Err(DropReason::StatusNotCompleted);
    }
    if study.study_type.as_deref().map(str::trim) != Some(INTERVENTIONAL_TYPE) {
        return Err(DropReason::NotInterventional);
    }
    Ok(())
}
