//! Static operation registry.
//!
//! Every `(tool, action)` pair the server advertises maps to exactly one
//! [`Descriptor`]: a fixed GraphQL document plus the contract for building its
//! variables. Documents are compile-time constants and are sent to the API
//! byte-for-byte; caller input only ever reaches the wire through `variables`.
//!
//! Actions are closed enums per tool (one module each). String names from
//! the MCP layer are parsed into an [`Operation`] at the boundary, and
//! [`Operation::descriptor`] is a total match, so adding an action without a
//! descriptor does not compile.
//!
//! ```text
//! info.rs          - system, network, registration, UPS, settings
//! array.rs         - array state and parity checks
//! storage.rs       - shares, disks, log files
//! docker.rs        - container lifecycle and networks
//! vm.rs            - virtual machine lifecycle
//! notifications.rs - notification inbox
//! rclone.rs        - remote-storage configuration
//! keys.rs          - API key management
//! users.rs         - current user
//! health.rs        - composite health check and connectivity probe
//! ```

/// Declares a closed action enum with its wire names.
macro_rules! actions {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every action of this tool, in advertised order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The action name callers use.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Parse an action name; `None` if the tool has no such action.
            pub fn parse(action: &str) -> Option<Self> {
                match action {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

mod array;
mod docker;
mod health;
mod info;
mod keys;
mod notifications;
mod rclone;
mod storage;
mod users;
mod vm;

pub use array::ArrayAction;
pub use docker::DockerAction;
pub use health::HealthAction;
pub use info::InfoAction;
pub use keys::KeysAction;
pub use notifications::NotificationsAction;
pub use rclone::RcloneAction;
pub use storage::StorageAction;
pub use users::UsersAction;
pub use vm::VmAction;

/// Prefix shared by every MCP tool name.
pub const TOOL_PREFIX: &str = "unraid_";

/// A named group of related actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    Info,
    Array,
    Storage,
    Docker,
    Vm,
    Notifications,
    Rclone,
    Keys,
    Users,
    Health,
}

impl Tool {
    pub const ALL: &'static [Tool] = &[
        Tool::Info,
        Tool::Array,
        Tool::Storage,
        Tool::Docker,
        Tool::Vm,
        Tool::Notifications,
        Tool::Rclone,
        Tool::Keys,
        Tool::Users,
        Tool::Health,
    ];

    /// Engine-level tool id (`docker`, `array`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Info => "info",
            Tool::Array => "array",
            Tool::Storage => "storage",
            Tool::Docker => "docker",
            Tool::Vm => "vm",
            Tool::Notifications => "notifications",
            Tool::Rclone => "rclone",
            Tool::Keys => "keys",
            Tool::Users => "users",
            Tool::Health => "health",
        }
    }

    pub fn parse(tool: &str) -> Option<Self> {
        Tool::ALL.iter().copied().find(|t| t.as_str() == tool)
    }

    /// MCP tool name: `unraid_{tool}`.
    pub fn mcp_name(self) -> String {
        format!("{}{}", TOOL_PREFIX, self.as_str())
    }

    pub fn from_mcp_name(name: &str) -> Option<Self> {
        name.strip_prefix(TOOL_PREFIX).and_then(Tool::parse)
    }

    /// One-line summary shown in `tools/list`.
    pub fn summary(self) -> &'static str {
        match self {
            Tool::Info => "Query Unraid system information: OS, CPU, memory, network, registration, services, UPS and settings.",
            Tool::Array => "Inspect the disk array and run parity checks.",
            Tool::Storage => "List shares, disks and unassigned devices, inspect disk health and read system logs.",
            Tool::Docker => "List, inspect and control Docker containers and networks.",
            Tool::Vm => "List, inspect and control virtual machines.",
            Tool::Notifications => "Read, create, archive and delete Unraid notifications.",
            Tool::Rclone => "Manage rclone remote-storage configurations.",
            Tool::Keys => "Manage Unraid API keys.",
            Tool::Users => "Show the user the API key belongs to.",
            Tool::Health => "Check overall server health or test API connectivity.",
        }
    }

    /// Every operation of this tool.
    pub fn operations(self) -> Vec<Operation> {
        match self {
            Tool::Info => InfoAction::ALL.iter().map(|a| Operation::Info(*a)).collect(),
            Tool::Array => ArrayAction::ALL.iter().map(|a| Operation::Array(*a)).collect(),
            Tool::Storage => StorageAction::ALL
                .iter()
                .map(|a| Operation::Storage(*a))
                .collect(),
            Tool::Docker => DockerAction::ALL
                .iter()
                .map(|a| Operation::Docker(*a))
                .collect(),
            Tool::Vm => VmAction::ALL.iter().map(|a| Operation::Vm(*a)).collect(),
            Tool::Notifications => NotificationsAction::ALL
                .iter()
                .map(|a| Operation::Notifications(*a))
                .collect(),
            Tool::Rclone => RcloneAction::ALL
                .iter()
                .map(|a| Operation::Rclone(*a))
                .collect(),
            Tool::Keys => KeysAction::ALL.iter().map(|a| Operation::Keys(*a)).collect(),
            Tool::Users => UsersAction::ALL.iter().map(|a| Operation::Users(*a)).collect(),
            Tool::Health => HealthAction::ALL
                .iter()
                .map(|a| Operation::Health(*a))
                .collect(),
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved `(tool, action)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Info(InfoAction),
    Array(ArrayAction),
    Storage(StorageAction),
    Docker(DockerAction),
    Vm(VmAction),
    Notifications(NotificationsAction),
    Rclone(RcloneAction),
    Keys(KeysAction),
    Users(UsersAction),
    Health(HealthAction),
}

impl Operation {
    /// Translate boundary strings into the closed operation set.
    pub fn parse(tool: &str, action: &str) -> Option<Self> {
        match Tool::parse(tool)? {
            Tool::Info => InfoAction::parse(action).map(Operation::Info),
            Tool::Array => ArrayAction::parse(action).map(Operation::Array),
            Tool::Storage => StorageAction::parse(action).map(Operation::Storage),
            Tool::Docker => DockerAction::parse(action).map(Operation::Docker),
            Tool::Vm => VmAction::parse(action).map(Operation::Vm),
            Tool::Notifications => {
                NotificationsAction::parse(action).map(Operation::Notifications)
            }
            Tool::Rclone => RcloneAction::parse(action).map(Operation::Rclone),
            Tool::Keys => KeysAction::parse(action).map(Operation::Keys),
            Tool::Users => UsersAction::parse(action).map(Operation::Users),
            Tool::Health => HealthAction::parse(action).map(Operation::Health),
        }
    }

    pub const fn tool(self) -> Tool {
        match self {
            Operation::Info(_) => Tool::Info,
            Operation::Array(_) => Tool::Array,
            Operation::Storage(_) => Tool::Storage,
            Operation::Docker(_) => Tool::Docker,
            Operation::Vm(_) => Tool::Vm,
            Operation::Notifications(_) => Tool::Notifications,
            Operation::Rclone(_) => Tool::Rclone,
            Operation::Keys(_) => Tool::Keys,
            Operation::Users(_) => Tool::Users,
            Operation::Health(_) => Tool::Health,
        }
    }

    /// Wire name of the action.
    pub const fn action(self) -> &'static str {
        match self {
            Operation::Info(a) => a.as_str(),
            Operation::Array(a) => a.as_str(),
            Operation::Storage(a) => a.as_str(),
            Operation::Docker(a) => a.as_str(),
            Operation::Vm(a) => a.as_str(),
            Operation::Notifications(a) => a.as_str(),
            Operation::Rclone(a) => a.as_str(),
            Operation::Keys(a) => a.as_str(),
            Operation::Users(a) => a.as_str(),
            Operation::Health(a) => a.as_str(),
        }
    }

    pub fn descriptor(self) -> &'static Descriptor {
        match self {
            Operation::Info(a) => info::descriptor(a),
            Operation::Array(a) => array::descriptor(a),
            Operation::Storage(a) => storage::descriptor(a),
            Operation::Docker(a) => docker::descriptor(a),
            Operation::Vm(a) => vm::descriptor(a),
            Operation::Notifications(a) => notifications::descriptor(a),
            Operation::Rclone(a) => rclone::descriptor(a),
            Operation::Keys(a) => keys::descriptor(a),
            Operation::Users(a) => users::descriptor(a),
            Operation::Health(a) => health::descriptor(a),
        }
    }
}

/// Look up the descriptor for a `(tool, action)` pair.
pub fn lookup(tool: &str, action: &str) -> Option<&'static Descriptor> {
    Operation::parse(tool, action).map(Operation::descriptor)
}

/// All descriptors of a tool, in advertised order.
pub fn descriptors(tool: Tool) -> Vec<&'static Descriptor> {
    tool.operations()
        .into_iter()
        .map(Operation::descriptor)
        .collect()
}

/// Whether the document is a query or a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

/// Selects the request timeout applied by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    /// Regular reads and mutations.
    Default,
    /// Long-running reads such as SMART inspection.
    Extended,
    /// Status checks that should fail fast.
    Fast,
}

/// Accepted shape of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    String,
    Int,
    Bool,
    /// String restricted to a fixed set; matched case-insensitively and sent
    /// in canonical spelling.
    Enum(&'static [&'static str]),
    /// Array of strings (a bare string is accepted as a one-element list).
    StringList,
    /// Free-form JSON object.
    Object,
}

/// Extra check run after type coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Opaque identifier: 1..=128 chars of `[A-Za-z0-9:_.-]`.
    OpaqueId,
    /// Absolute path under one of the given prefixes, without `..` segments.
    PathPrefix(&'static [&'static str]),
    /// Inclusive integer range.
    Range { min: i64, max: i64 },
    /// String (after trimming) or list must not be empty.
    NonEmpty,
}

/// Value used when an optional parameter is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Int(i64),
    Str(&'static str),
    Bool(bool),
}

/// One entry of a descriptor's variable schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSpec {
    /// Parameter name supplied by the caller.
    pub name: &'static str,
    /// GraphQL variable (or input-object field) the value is written to.
    pub variable: &'static str,
    /// When set, the value is a field of this input-object variable.
    pub input: Option<&'static str>,
    pub ty: VarType,
    pub required: bool,
    pub constraint: Option<Constraint>,
    pub fallback: Option<Fallback>,
    pub description: &'static str,
}

impl VarSpec {
    pub const fn required(name: &'static str, variable: &'static str, ty: VarType) -> Self {
        Self {
            name,
            variable,
            input: None,
            ty,
            required: true,
            constraint: None,
            fallback: None,
            description: "",
        }
    }

    pub const fn optional(name: &'static str, variable: &'static str, ty: VarType) -> Self {
        Self {
            required: false,
            ..Self::required(name, variable, ty)
        }
    }

    pub const fn field_of(self, input: &'static str) -> Self {
        Self {
            input: Some(input),
            ..self
        }
    }

    pub const fn check(self, constraint: Constraint) -> Self {
        Self {
            constraint: Some(constraint),
            ..self
        }
    }

    pub const fn or(self, fallback: Fallback) -> Self {
        Self {
            fallback: Some(fallback),
            ..self
        }
    }

    pub const fn doc(self, description: &'static str) -> Self {
        Self {
            description,
            ..self
        }
    }
}

/// Immutable description of one operation.
#[derive(Debug)]
pub struct Descriptor {
    pub tool: Tool,
    pub action: &'static str,
    pub kind: OperationKind,
    pub document: &'static str,
    pub variables: &'static [VarSpec],
    /// Hard-to-reverse side effects; gated behind capability flag + confirm.
    pub destructive: bool,
    pub timeout: TimeoutClass,
    pub description: &'static str,
}

impl Descriptor {
    pub const fn query(operation: Operation, document: &'static str) -> Self {
        Self {
            tool: operation.tool(),
            action: operation.action(),
            kind: OperationKind::Query,
            document,
            variables: &[],
            destructive: false,
            timeout: TimeoutClass::Default,
            description: "",
        }
    }

    pub const fn mutation(operation: Operation, document: &'static str) -> Self {
        Self {
            kind: OperationKind::Mutation,
            ..Self::query(operation, document)
        }
    }

    pub const fn vars(self, variables: &'static [VarSpec]) -> Self {
        Self { variables, ..self }
    }

    pub const fn destructive(self) -> Self {
        Self {
            destructive: true,
            ..self
        }
    }

    pub const fn timeout(self, timeout: TimeoutClass) -> Self {
        Self { timeout, ..self }
    }

    pub const fn doc(self, description: &'static str) -> Self {
        Self {
            description,
            ..self
        }
    }

    pub fn var(&self, name: &str) -> Option<&'static VarSpec> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// Opaque-ID shape shared by containers, VMs, keys and notifications.
pub(crate) const ID: Constraint = Constraint::OpaqueId;
