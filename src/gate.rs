//! Destructive-action gate.
//!
//! A destructive operation runs only when the deployment has enabled
//! destructive actions for its tool AND the caller passed `confirm=true`.
//! Non-destructive operations always pass; `confirm` is ignored for them.

use thiserror::Error;

use crate::capabilities::CapabilitySet;
use crate::registry::{Descriptor, Tool};

/// Which half of the gate was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateReason {
    CapabilityDisabled,
    NotConfirmed,
    Both,
}

impl GateReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CapabilityDisabled => "capability_disabled",
            Self::NotConfirmed => "not_confirmed",
            Self::Both => "capability_disabled_and_not_confirmed",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{tool}/{action} is destructive and was refused: {}", remedy(.tool, .reason))]
pub struct GateClosed {
    pub tool: Tool,
    pub action: &'static str,
    pub reason: GateReason,
}

/// Environment variable that enables destructive actions for `tool`.
pub fn capability_env_var(tool: Tool) -> String {
    format!("UNRAID_ALLOW_DESTRUCTIVE_{}", tool.as_str().to_ascii_uppercase())
}

fn remedy(tool: &Tool, reason: &GateReason) -> String {
    let enable = format!(
        "destructive actions are disabled for this tool (set {}=true or allow_destructive.{} in the config file)",
        capability_env_var(*tool),
        tool.as_str()
    );
    let confirm = "pass confirm=true to acknowledge the action cannot be undone";
    match reason {
        GateReason::CapabilityDisabled => enable,
        GateReason::NotConfirmed => confirm.to_string(),
        GateReason::Both => format!("{enable}; and {confirm}"),
    }
}

pub fn check(
    descriptor: &'static Descriptor,
    capabilities: &CapabilitySet,
    confirm: bool,
) -> Result<(), GateClosed> {
    if !descriptor.destructive {
        return Ok(());
    }

    let enabled = capabilities.allows_destructive(descriptor.tool);
    let reason = match (enabled, confirm) {
        (true, true) => return Ok(()),
        (false, true) => GateReason::CapabilityDisabled,
        (true, false) => GateReason::NotConfirmed,
        (false, false) => GateReason::Both,
    };
    Err(GateClosed {
        tool: descriptor.tool,
        action: descriptor.action,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::lookup;

    fn remove() -> &'static Descriptor {
        lookup("docker", "remove").unwrap()
    }

    #[test]
    fn destructive_needs_both_flag_and_confirm() {
        let on = CapabilitySet::none().allow(Tool::Docker);
        let off = CapabilitySet::none();

        assert!(check(remove(), &on, true).is_ok());
        assert_eq!(
            check(remove(), &on, false).unwrap_err().reason,
            GateReason::NotConfirmed
        );
        assert_eq!(
            check(remove(), &off, true).unwrap_err().reason,
            GateReason::CapabilityDisabled
        );
        assert_eq!(
            check(remove(), &off, false).unwrap_err().reason,
            GateReason::Both
        );
    }

    #[test]
    fn flag_is_per_tool() {
        let vm_only = CapabilitySet::none().allow(Tool::Vm);
        assert!(check(remove(), &vm_only, true).is_err());
        assert!(check(lookup("vm", "force_stop").unwrap(), &vm_only, true).is_ok());
    }

    #[test]
    fn non_destructive_ignores_gate() {
        let list = lookup("docker", "list").unwrap();
        let stop = lookup("docker", "stop").unwrap();
        for caps in [CapabilitySet::none(), CapabilitySet::all()] {
            for confirm in [true, false] {
                assert!(check(list, &caps, confirm).is_ok());
                assert!(check(stop, &caps, confirm).is_ok());
            }
        }
    }

    #[test]
    fn message_names_the_remedy() {
        let err = check(remove(), &CapabilitySet::none(), false).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("docker/remove"));
        assert!(msg.contains("UNRAID_ALLOW_DESTRUCTIVE_DOCKER"));
        assert!(msg.contains("confirm=true"));

        let msg = check(remove(), &CapabilitySet::all(), false)
            .unwrap_err()
            .to_string();
        assert!(!msg.contains("UNRAID_ALLOW_DESTRUCTIVE"));
    }
}
