use super::{Constraint, Descriptor, Fallback, ID, Operation, VarSpec, VarType};

actions!(
    /// Actions of the `docker` tool.
    DockerAction {
        List => "list",
        Details => "details",
        Logs => "logs",
        Start => "start",
        Stop => "stop",
        Pause => "pause",
        Unpause => "unpause",
        Remove => "remove",
        Update => "update",
        UpdateAll => "update_all",
        Networks => "networks",
        NetworkDetails => "network_details",
        PortConflicts => "port_conflicts",
        CheckUpdates => "check_updates",
    }
);

const CONTAINER_ID: VarSpec = VarSpec::required("container_id", "id", VarType::String)
    .check(ID)
    .doc("Container ID (use action=list to find it).");

const CONTAINER: &[VarSpec] = &[CONTAINER_ID];

const LOGS_VARS: &[VarSpec] = &[
    CONTAINER_ID,
    VarSpec::optional("tail_lines", "tail", VarType::Int)
        .check(Constraint::Range { min: 1, max: 10_000 })
        .or(Fallback::Int(100))
        .doc("Number of trailing log lines to return (default 100)."),
];

const NETWORK: &[VarSpec] = &[VarSpec::required("network_id", "id", VarType::String)
    .check(ID)
    .doc("Docker network ID.")];

const SKIP_CACHE: &[VarSpec] = &[VarSpec::optional("skip_cache", "skipCache", VarType::Bool)
    .or(Fallback::Bool(false))
    .doc("Bypass the server-side container cache.")];

const LIST_DOC: &str = "query ListContainers($skipCache: Boolean!) {
  docker {
    containers(skipCache: $skipCache) {
      id
      names
      image
      state
      status
      autoStart
    }
  }
}";

const DETAILS_DOC: &str = "query ContainerDetails($id: PrefixedID!) {
  docker {
    container(id: $id) {
      id
      names
      image
      imageId
      command
      created
      state
      status
      autoStart
      ports { ip privatePort publicPort type }
      sizeRootFs
      labels
      hostConfig { networkMode }
      networkSettings
      mounts
    }
  }
}";

const LOGS_DOC: &str = "query ContainerLogs($id: PrefixedID!, $tail: Int) {
  docker {
    logs(id: $id, tail: $tail) {
      containerId
      lines { timestamp message }
      cursor
    }
  }
}";

const START_DOC: &str = "mutation StartContainer($id: PrefixedID!) {
  docker {
    start(id: $id) { id names state status }
  }
}";

const STOP_DOC: &str = "mutation StopContainer($id: PrefixedID!) {
  docker {
    stop(id: $id) { id names state status }
  }
}";

const PAUSE_DOC: &str = "mutation PauseContainer($id: PrefixedID!) {
  docker {
    pause(id: $id) { id names state status }
  }
}";

const UNPAUSE_DOC: &str = "mutation UnpauseContainer($id: PrefixedID!) {
  docker {
    unpause(id: $id) { id names state status }
  }
}";

const REMOVE_DOC: &str = "mutation RemoveContainer($id: PrefixedID!) {
  docker {
    removeContainer(id: $id)
  }
}";

const UPDATE_DOC: &str = "mutation UpdateContainer($id: PrefixedID!) {
  docker {
    updateContainer(id: $id) { id names image state status }
  }
}";

const UPDATE_ALL_DOC: &str = "mutation UpdateAllContainers {
  docker {
    updateAllContainers { id names image state status }
  }
}";

const NETWORKS_DOC: &str = "query ListNetworks($skipCache: Boolean!) {
  docker {
    networks(skipCache: $skipCache) {
      id
      name
      driver
      scope
    }
  }
}";

const NETWORK_DETAILS_DOC: &str = "query NetworkDetails($id: String!) {
  docker {
    network(id: $id) {
      id
      name
      created
      scope
      driver
      enableIPv6
      ipam
      internal
      attachable
      ingress
      containers
      options
      labels
    }
  }
}";

const PORT_CONFLICTS_DOC: &str = "query PortConflicts {
  docker {
    portConflicts {
      containerPorts { privatePort type containers { id name } }
      lanPorts { lanIpPort publicPort type containers { id name } }
    }
  }
}";

const CHECK_UPDATES_DOC: &str = "query ContainerUpdates {
  docker {
    containerUpdateStatuses { name updateStatus }
  }
}";

static LIST: Descriptor = Descriptor::query(Operation::Docker(DockerAction::List), LIST_DOC)
    .vars(SKIP_CACHE)
    .doc("List all containers with state and image.");
static DETAILS: Descriptor = Descriptor::query(Operation::Docker(DockerAction::Details), DETAILS_DOC)
    .vars(CONTAINER)
    .doc("Full details of one container: ports, mounts, labels, network settings.");
static LOGS: Descriptor = Descriptor::query(Operation::Docker(DockerAction::Logs), LOGS_DOC)
    .vars(LOGS_VARS)
    .doc("Recent log lines of one container.");
static START: Descriptor = Descriptor::mutation(Operation::Docker(DockerAction::Start), START_DOC)
    .vars(CONTAINER)
    .doc("Start a stopped container.");
static STOP: Descriptor = Descriptor::mutation(Operation::Docker(DockerAction::Stop), STOP_DOC)
    .vars(CONTAINER)
    .doc("Stop a running container.");
static PAUSE: Descriptor = Descriptor::mutation(Operation::Docker(DockerAction::Pause), PAUSE_DOC)
    .vars(CONTAINER)
    .doc("Pause a running container.");
static UNPAUSE: Descriptor = Descriptor::mutation(Operation::Docker(DockerAction::Unpause), UNPAUSE_DOC)
    .vars(CONTAINER)
    .doc("Resume a paused container.");
static REMOVE: Descriptor = Descriptor::mutation(Operation::Docker(DockerAction::Remove), REMOVE_DOC)
    .vars(CONTAINER)
    .destructive()
    .doc("Remove a container.");
static UPDATE: Descriptor = Descriptor::mutation(Operation::Docker(DockerAction::Update), UPDATE_DOC)
    .vars(CONTAINER)
    .destructive()
    .doc("Pull the latest image and recreate one container.");
static UPDATE_ALL: Descriptor = Descriptor::mutation(Operation::Docker(DockerAction::UpdateAll), UPDATE_ALL_DOC)
    .destructive()
    .doc("Pull the latest images and recreate every container with an update available.");
static NETWORKS: Descriptor = Descriptor::query(Operation::Docker(DockerAction::Networks), NETWORKS_DOC)
    .vars(SKIP_CACHE)
    .doc("List Docker networks.");
static NETWORK_DETAILS: Descriptor =
    Descriptor::query(Operation::Docker(DockerAction::NetworkDetails), NETWORK_DETAILS_DOC)
        .vars(NETWORK)
        .doc("Details of one Docker network.");
static PORT_CONFLICTS: Descriptor =
    Descriptor::query(Operation::Docker(DockerAction::PortConflicts), PORT_CONFLICTS_DOC)
        .doc("Host ports claimed by more than one container.");
static CHECK_UPDATES: Descriptor =
    Descriptor::query(Operation::Docker(DockerAction::CheckUpdates), CHECK_UPDATES_DOC)
        .doc("Image update status of every container.");

pub(super) fn descriptor(action: DockerAction) -> &'static Descriptor {
    match action {
        DockerAction::List => &LIST,
        DockerAction::Details => &DETAILS,
        DockerAction::Logs => &LOGS,
        DockerAction::Start => &START,
        DockerAction::Stop => &STOP,
        DockerAction::Pause => &PAUSE,
        DockerAction::Unpause => &UNPAUSE,
        DockerAction::Remove => &REMOVE,
        DockerAction::Update => &UPDATE,
        DockerAction::UpdateAll => &UPDATE_ALL,
        DockerAction::Networks => &NETWORKS,
        DockerAction::NetworkDetails => &NETWORK_DETAILS,
        DockerAction::PortConflicts => &PORT_CONFLICTS,
        DockerAction::CheckUpdates => &CHECK_UPDATES,
    }
}
