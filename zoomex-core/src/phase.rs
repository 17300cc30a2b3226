/// Trial lifecycle phases. `Idle` is entry, external input starts the trial,
/// and `Finished` is terminal until an explicit reset.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum TrialPhase {
    Idle,
    Running,
    Finished,
}

impl Default for TrialPhase {
    fn default() -> Self {
        TrialPhase::Idle
    }
}

impl TrialPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, TrialPhase::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TrialPhase::Running)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TrialPhase::Finished)
    }

    /// Only a running trial accepts zoom and undo input.
    pub fn allows_input(&self) -> bool {
        matches!(self, TrialPhase::Running)
    }
}
