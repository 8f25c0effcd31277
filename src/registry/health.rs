use super::{Descriptor, Operation, TimeoutClass};

actions!(
    /// Actions of the `health` tool.
    HealthAction {
        Check => "check",
        TestConnection => "test_connection",
    }
);

// Sections resolve independently on the server; one failing section comes
// back as a partial success rather than failing the whole check.
const CHECK_DOC: &str = "query HealthCheck {
  info {
    machineId
    time
    versions { unraid }
    os { hostname uptime }
  }
  array {
    state
    capacity { kilobytes { free used total } }
  }
  notifications {
    overview { unread { alert warning total } }
  }
  docker {
    containers(skipCache: true) { id state status }
  }
}";

const TEST_CONNECTION_DOC: &str = "query TestConnection {
  online
}";

static CHECK: Descriptor = Descriptor::query(Operation::Health(HealthAction::Check), CHECK_DOC)
    .doc("Composite health check: system, array, alerts and containers.");
static TEST_CONNECTION: Descriptor =
    Descriptor::query(Operation::Health(HealthAction::TestConnection), TEST_CONNECTION_DOC)
        .timeout(TimeoutClass::Fast)
        .doc("Verify the API is reachable and the key is accepted.");

pub(super) fn descriptor(action: HealthAction) -> &'static Descriptor {
    match action {
        HealthAction::Check => &CHECK,
        HealthAction::TestConnection => &TEST_CONNECTION,
    }
}
