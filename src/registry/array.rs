use super::{Descriptor, Fallback, Operation, VarSpec, VarType};

actions!(
    /// Actions of the `array` tool.
    ArrayAction {
        Status => "status",
        ParityStatus => "parity_status",
        ParityHistory => "parity_history",
        ParityStart => "parity_start",
        ParityPause => "parity_pause",
        ParityResume => "parity_resume",
        ParityCancel => "parity_cancel",
    }
);

const START_VARS: &[VarSpec] = &[VarSpec::optional("correct", "correct", VarType::Bool)
    .or(Fallback::Bool(false))
    .doc("Write corrections to parity while checking (default false).")];

const STATUS_DOC: &str = "query ArrayStatus {
  array {
    id
    state
    capacity {
      kilobytes { free used total }
      disks { free used total }
    }
    boot { id name device size status temp fsType }
    parities { id name device size status temp numErrors }
    disks { id idx name device size status temp fsType fsSize fsFree fsUsed numErrors }
    caches { id name device size status temp fsType fsSize fsFree fsUsed }
  }
}";

const PARITY_STATUS_DOC: &str = "query ParityStatus {
  array {
    id
    state
    parityCheckStatus {
      status
      progress
      speed
      errors
      date
      duration
      correcting
      paused
      running
    }
  }
}";

const PARITY_HISTORY_DOC: &str = "query ParityHistory {
  parityHistory {
    date
    duration
    speed
    status
    errors
    progress
    correcting
  }
}";

const PARITY_START_DOC: &str = "mutation StartParityCheck($correct: Boolean!) {
  parityCheck {
    start(correct: $correct)
  }
}";

const PARITY_PAUSE_DOC: &str = "mutation PauseParityCheck {
  parityCheck {
    pause
  }
}";

const PARITY_RESUME_DOC: &str = "mutation ResumeParityCheck {
  parityCheck {
    resume
  }
}";

const PARITY_CANCEL_DOC: &str = "mutation CancelParityCheck {
  parityCheck {
    cancel
  }
}";

static STATUS: Descriptor = Descriptor::query(Operation::Array(ArrayAction::Status), STATUS_DOC)
    .doc("Array state, capacity and per-disk status.");
static PARITY_STATUS: Descriptor =
    Descriptor::query(Operation::Array(ArrayAction::ParityStatus), PARITY_STATUS_DOC)
        .doc("Progress of the current parity check, if any.");
static PARITY_HISTORY: Descriptor =
    Descriptor::query(Operation::Array(ArrayAction::ParityHistory), PARITY_HISTORY_DOC)
        .doc("Results of previous parity checks.");
static PARITY_START: Descriptor =
    Descriptor::mutation(Operation::Array(ArrayAction::ParityStart), PARITY_START_DOC)
        .vars(START_VARS)
        .doc("Start a parity check.");
static PARITY_PAUSE: Descriptor =
    Descriptor::mutation(Operation::Array(ArrayAction::ParityPause), PARITY_PAUSE_DOC)
        .doc("Pause the running parity check.");
static PARITY_RESUME: Descriptor =
    Descriptor::mutation(Operation::Array(ArrayAction::ParityResume), PARITY_RESUME_DOC)
        .doc("Resume a paused parity check.");
static PARITY_CANCEL: Descriptor =
    Descriptor::mutation(Operation::Array(ArrayAction::ParityCancel), PARITY_CANCEL_DOC)
        .doc("Cancel the running parity check.");

pub(super) fn descriptor(action: ArrayAction) -> &'static Descriptor {
    match action {
        ArrayAction::Status => &STATUS,
        ArrayAction::ParityStatus => &PARITY_STATUS,
        ArrayAction::ParityHistory => &PARITY_HISTORY,
        ArrayAction::ParityStart => &PARITY_START,
        ArrayAction::ParityPause => &PARITY_PAUSE,
        ArrayAction::ParityResume => &PARITY_RESUME,
        ArrayAction::ParityCancel => &PARITY_CANCEL,
    }
}
