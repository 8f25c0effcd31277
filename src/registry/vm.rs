use super::{Descriptor, ID, Operation, VarSpec, VarType};

actions!(
    /// Actions of the `vm` tool.
    VmAction {
        List => "list",
        Details => "details",
        Start => "start",
        Stop => "stop",
        Pause => "pause",
        Resume => "resume",
        ForceStop => "force_stop",
        Reboot => "reboot",
        Reset => "reset",
    }
);

const VM: &[VarSpec] = &[VarSpec::required("vm_id", "id", VarType::String)
    .check(ID)
    .doc("VM ID (use action=list to find it).")];

const LIST_DOC: &str = "query ListVms {
  vms {
    id
    domains {
      id
      name
      state
      uuid
    }
  }
}";

const DETAILS_DOC: &str = "query VmDetails($id: PrefixedID!) {
  vms {
    domain(id: $id) {
      id
      name
      state
      uuid
      description
      autostart
      vcpus
      memory
      primaryGpu
      template
      disks { source target bus size }
      interfaces { mac network model }
    }
  }
}";

const START_DOC: &str = "mutation StartVm($id: PrefixedID!) {
  vm {
    start(id: $id)
  }
}";

const STOP_DOC: &str = "mutation StopVm($id: PrefixedID!) {
  vm {
    stop(id: $id)
  }
}";

const PAUSE_DOC: &str = "mutation PauseVm($id: PrefixedID!) {
  vm {
    pause(id: $id)
  }
}";

const RESUME_DOC: &str = "mutation ResumeVm($id: PrefixedID!) {
  vm {
    resume(id: $id)
  }
}";

const FORCE_STOP_DOC: &str = "mutation ForceStopVm($id: PrefixedID!) {
  vm {
    forceStop(id: $id)
  }
}";

const REBOOT_DOC: &str = "mutation RebootVm($id: PrefixedID!) {
  vm {
    reboot(id: $id)
  }
}";

const RESET_DOC: &str = "mutation ResetVm($id: PrefixedID!) {
  vm {
    reset(id: $id)
  }
}";

static LIST: Descriptor =
    Descriptor::query(Operation::Vm(VmAction::List), LIST_DOC).doc("List virtual machines and their state.");
static DETAILS: Descriptor = Descriptor::query(Operation::Vm(VmAction::Details), DETAILS_DOC)
    .vars(VM)
    .doc("Configuration and state of one VM.");
static START: Descriptor = Descriptor::mutation(Operation::Vm(VmAction::Start), START_DOC)
    .vars(VM)
    .doc("Start a VM.");
static STOP: Descriptor = Descriptor::mutation(Operation::Vm(VmAction::Stop), STOP_DOC)
    .vars(VM)
    .doc("Gracefully shut down a VM (ACPI).");
static PAUSE: Descriptor = Descriptor::mutation(Operation::Vm(VmAction::Pause), PAUSE_DOC)
    .vars(VM)
    .doc("Suspend a running VM.");
static RESUME: Descriptor = Descriptor::mutation(Operation::Vm(VmAction::Resume), RESUME_DOC)
    .vars(VM)
    .doc("Resume a suspended VM.");
static FORCE_STOP: Descriptor = Descriptor::mutation(Operation::Vm(VmAction::ForceStop), FORCE_STOP_DOC)
    .vars(VM)
    .destructive()
    .doc("Power off a VM immediately (may corrupt guest data).");
static REBOOT: Descriptor = Descriptor::mutation(Operation::Vm(VmAction::Reboot), REBOOT_DOC)
    .vars(VM)
    .doc("Gracefully reboot a VM.");
static RESET: Descriptor = Descriptor::mutation(Operation::Vm(VmAction::Reset), RESET_DOC)
    .vars(VM)
    .destructive()
    .doc("Hard-reset a VM (may corrupt guest data).");

pub(super) fn descriptor(action: VmAction) -> &'static Descriptor {
    match action {
        VmAction::List => &LIST,
        VmAction::Details => &DETAILS,
        VmAction::Start => &START,
        VmAction::Stop => &STOP,
        VmAction::Pause => &PAUSE,
        VmAction::Resume => &RESUME,
        VmAction::ForceStop => &FORCE_STOP,
        VmAction::Reboot => &REBOOT,
        VmAction::Reset => &RESET,
    }
}
