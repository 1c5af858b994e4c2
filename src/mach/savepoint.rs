use super::{ExecutionState, Frame};
use crate::mem::{Address, LocalMemory, Scene};
use tracing::debug;

/// Everything a savepoint captures: local memory, the resume point and
/// the call stack leading to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Savepoint {
    pub local: LocalMemory,
    pub scene: Scene,
    pub pc: Address,
    pub frames: Vec<Frame>,
    pub title: String,
}

/// ## Committed copy of local state
///
/// Live local memory can change at any time. Only what was captured by
/// the latest `mark` is visible to saving.

#[derive(Debug, Clone, Default)]
pub struct SavepointManager {
    committed: Savepoint,
    marks: u64,
}

impl SavepointManager {
    pub fn new() -> SavepointManager {
        SavepointManager::default()
    }

    pub fn mark(&mut self, local: &LocalMemory, state: &ExecutionState, title: &str) {
        self.committed = Savepoint {
            local: local.clone(),
            scene: state.scene(),
            pc: state.pc(),
            frames: state.frames().to_vec(),
            title: title.to_string(),
        };
        self.marks += 1;
        debug!(
            scene = self.committed.scene,
            pc = self.committed.pc,
            depth = self.committed.frames.len(),
            marks = self.marks,
            "savepoint marked"
        );
    }

    pub fn committed(&self) -> &Savepoint {
        &self.committed
    }

    /// Number of marks since construction or the last reset.
    pub fn marks(&self) -> u64 {
        self.marks
    }

    pub fn restore(&mut self, savepoint: Savepoint) {
        self.committed = savepoint;
    }

    pub fn reset(&mut self) {
        self.committed = Savepoint::default();
        self.marks = 0;
    }
}
