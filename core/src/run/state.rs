use crate::error::ErrorKind;
use crate::ledger::record::CheckRecord;
use serde::{Deserialize, Serialize};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckState {
    IDLE,
    RUNNING,
    SUCCEEDED,
    FAILED,
}

impl CheckState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CheckState::SUCCEEDED | CheckState::FAILED)
    }
}

/// What the last submission produced, kept until `reset` or the next submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Succeeded(CheckRecord),
    Failed(ErrorKind),
}

pub fn valid_transition(from: CheckState, to: CheckState) -> bool {
    use CheckState::*;
    match (from, to) {
        (IDLE, RUNNING) => true,
        (RUNNING, SUCCEEDED) => true,
        (RUNNING, FAILED) => true,
        // cancelled or abandoned
        (RUNNING, IDLE) => true,
        (SUCCEEDED, IDLE) => true,
        (FAILED, IDLE) => true,
        _ => false,
    }
}
