use super::{Constraint, Descriptor, Fallback, ID, Operation, TimeoutClass, VarSpec, VarType};

actions!(
    /// Actions of the `storage` tool.
    StorageAction {
        Shares => "shares",
        Disks => "disks",
        DiskDetails => "disk_details",
        Unassigned => "unassigned",
        LogFiles => "log_files",
        Logs => "logs",
    }
);

/// Directories whose files may be read through `logs`.
pub const LOG_PREFIXES: &[&str] = &["/var/log/", "/boot/logs/", "/mnt/"];

const DISK: &[VarSpec] = &[VarSpec::required("disk_id", "id", VarType::String)
    .check(ID)
    .doc("Disk ID (use action=disks to find it).")];

const LOGS_VARS: &[VarSpec] = &[
    VarSpec::required("log_path", "path", VarType::String)
        .check(Constraint::PathPrefix(LOG_PREFIXES))
        .doc("Absolute path of a log file under /var/log/, /boot/logs/ or /mnt/."),
    VarSpec::optional("tail_lines", "lines", VarType::Int)
        .check(Constraint::Range { min: 1, max: 10_000 })
        .or(Fallback::Int(100))
        .doc("Number of trailing lines to return (default 100)."),
];

const SHARES_DOC: &str = "query Shares {
  shares {
    id
    name
    free
    used
    size
    include
    exclude
    cache
    nameOrig
    comment
    allocator
    splitLevel
    floor
    cow
    color
    luksStatus
  }
}";

const DISKS_DOC: &str = "query Disks {
  disks {
    id
    device
    name
    vendor
    size
    type
    interfaceType
  }
}";

const DISK_DETAILS_DOC: &str = "query DiskDetails($id: PrefixedID!) {
  disk(id: $id) {
    id
    device
    name
    vendor
    serialNum
    firmwareRevision
    size
    type
    interfaceType
    smartStatus
    temperature
    rotational
    partitions { name fsType size }
  }
}";

const UNASSIGNED_DOC: &str = "query UnassignedDevices {
  unassignedDevices {
    id
    device
    name
    size
    type
    mounted
    mountpoint
    partitions { name fsType size mounted mountpoint }
  }
}";

const LOG_FILES_DOC: &str = "query LogFiles {
  logFiles {
    name
    path
    size
    modifiedAt
  }
}";

const LOGS_DOC: &str = "query LogContent($path: String!, $lines: Int) {
  logFile(path: $path, lines: $lines) {
    path
    content
    totalLines
    startLine
  }
}";

static SHARES: Descriptor = Descriptor::query(Operation::Storage(StorageAction::Shares), SHARES_DOC)
    .doc("User shares with usage and allocation settings.");
static DISKS: Descriptor = Descriptor::query(Operation::Storage(StorageAction::Disks), DISKS_DOC)
    .doc("Physical disks known to the server.");
static DISK_DETAILS: Descriptor =
    Descriptor::query(Operation::Storage(StorageAction::DiskDetails), DISK_DETAILS_DOC)
        .vars(DISK)
        .timeout(TimeoutClass::Extended)
        .doc("SMART status, temperature and partitions of one disk (slow: may spin up the disk).");
static UNASSIGNED: Descriptor = Descriptor::query(Operation::Storage(StorageAction::Unassigned), UNASSIGNED_DOC)
    .doc("Devices not assigned to the array or a pool.");
static LOG_FILES: Descriptor = Descriptor::query(Operation::Storage(StorageAction::LogFiles), LOG_FILES_DOC)
    .doc("Available system log files.");
static LOGS: Descriptor = Descriptor::query(Operation::Storage(StorageAction::Logs), LOGS_DOC)
    .vars(LOGS_VARS)
    .doc("Tail of one system log file.");

pub(super) fn descriptor(action: StorageAction) -> &'static Descriptor {
    match action {
        StorageAction::Shares => &SHARES,
        StorageAction::Disks => &DISKS,
        StorageAction::DiskDetails => &DISK_DETAILS,
        StorageAction::Unassigned => &UNASSIGNED,
        StorageAction::LogFiles => &LOG_FILES,
        StorageAction::Logs => &LOGS,
    }
}
