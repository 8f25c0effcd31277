use super::{Constraint, Descriptor, Operation, TimeoutClass, VarSpec, VarType};

actions!(
    /// Actions of the `info` tool.
    InfoAction {
        Overview => "overview",
        Array => "array",
        Network => "network",
        Registration => "registration",
        Connect => "connect",
        Variables => "variables",
        Metrics => "metrics",
        Services => "services",
        Display => "display",
        Config => "config",
        Online => "online",
        Owner => "owner",
        Settings => "settings",
        Server => "server",
        Servers => "servers",
        Flash => "flash",
        UpsDevices => "ups_devices",
        UpsDevice => "ups_device",
        UpsConfig => "ups_config",
    }
);

const UPS_DEVICE_VARS: &[VarSpec] = &[VarSpec::required("device_id", "id", VarType::String)
    .check(Constraint::NonEmpty)
    .doc("UPS device ID (use action=ups_devices to find it).")];

const OVERVIEW_DOC: &str = "query SystemInfo {
  info {
    os { platform distro release codename kernel arch hostname uptime }
    cpu { manufacturer brand vendor family model speed speedmax threads cores processors socket }
    memory { layout { bank type clockSpeed formFactor manufacturer partNum size } }
    baseboard { manufacturer model version serial }
    system { manufacturer model version serial uuid }
    versions { kernel docker unraid node }
    apps { installed started }
    machineId
    time
  }
}";

const ARRAY_DOC: &str = "query ArraySummary {
  array {
    state
    capacity {
      kilobytes { free used total }
      disks { free used total }
    }
    boot { name device size status temp }
    parities { name device size status temp numErrors }
    disks { name device size status temp fsFree fsUsed numErrors }
    caches { name device size status temp fsFree fsUsed }
  }
}";

const NETWORK_DOC: &str = "query NetworkInfo {
  network {
    id
    accessUrls { type name ipv4 ipv6 }
  }
}";

const REGISTRATION_DOC: &str = "query Registration {
  registration {
    id
    type
    state
    expiration
    updateExpiration
    keyFile { location }
  }
}";

const CONNECT_DOC: &str = "query ConnectSettings {
  connect {
    id
    dynamicRemoteAccess { enabledType runningType error }
  }
}";

const VARIABLES_DOC: &str = "query ServerVariables {
  vars {
    id
    version
    name
    timeZone
    comment
    security
    workgroup
    domain
    useNtp
    useSsl
    port
    portssl
    startArray
    spindownDelay
    shareSmbEnabled
    shareNfsEnabled
    mdState
    mdNumDisks
    fsState
  }
}";

const METRICS_DOC: &str = "query Metrics {
  metrics {
    cpu { percentTotal cpus { percentTotal } }
    memory { total used free available percentTotal swapTotal swapUsed swapFree percentSwapTotal }
  }
}";

const SERVICES_DOC: &str = "query Services {
  services {
    name
    online
    uptime { timestamp }
    version
  }
}";

const DISPLAY_DOC: &str = "query DisplaySettings {
  info {
    display { theme unit scale tabs resize wwn total usage text warning critical hot max locale }
  }
}";

const CONFIG_DOC: &str = "query ConfigState {
  config {
    id
    valid
    error
  }
}";

const ONLINE_DOC: &str = "query Online {
  online
}";

const OWNER_DOC: &str = "query Owner {
  owner {
    username
    avatar
    url
  }
}";

const SETTINGS_DOC: &str = "query Settings {
  settings {
    unified { values }
  }
}";

const SERVER_DOC: &str = "query Server {
  server {
    id
    name
    status
    guid
    wanip
    lanip
    localurl
    remoteurl
    owner { username }
  }
}";

const SERVERS_DOC: &str = "query Servers {
  servers {
    id
    name
    status
    guid
    wanip
    lanip
    localurl
    remoteurl
  }
}";

const FLASH_DOC: &str = "query Flash {
  flash {
    id
    guid
    product
    vendor
  }
}";

const UPS_DEVICES_DOC: &str = "query UpsDevices {
  upsDevices {
    id
    name
    model
    status
    battery { chargeLevel estimatedRuntime health }
    power { inputVoltage outputVoltage loadPercentage }
  }
}";

const UPS_DEVICE_DOC: &str = "query UpsDevice($id: String!) {
  upsDeviceById(id: $id) {
    id
    name
    model
    status
    battery { chargeLevel estimatedRuntime health }
    power { inputVoltage outputVoltage loadPercentage }
  }
}";

const UPS_CONFIG_DOC: &str = "query UpsConfiguration {
  upsConfiguration {
    service
    upsCable
    upsType
    device
    batteryLevel
    minutes
    timeout
    killUps
    nisIp
    netServer
    upsName
    modelName
  }
}";

static OVERVIEW: Descriptor = Descriptor::query(Operation::Info(InfoAction::Overview), OVERVIEW_DOC)
    .doc("OS, CPU, memory, motherboard and software versions.");
static ARRAY: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Array), ARRAY_DOC).doc("Array state and capacity summary.");
static NETWORK: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Network), NETWORK_DOC).doc("LAN/WAN access URLs.");
static REGISTRATION: Descriptor = Descriptor::query(Operation::Info(InfoAction::Registration), REGISTRATION_DOC)
    .doc("License type, state and expiration.");
static CONNECT: Descriptor = Descriptor::query(Operation::Info(InfoAction::Connect), CONNECT_DOC)
    .doc("Unraid Connect remote-access settings.");
static VARIABLES: Descriptor = Descriptor::query(Operation::Info(InfoAction::Variables), VARIABLES_DOC)
    .doc("Core server variables (name, time zone, SMB/NFS, array settings).");
static METRICS: Descriptor = Descriptor::query(Operation::Info(InfoAction::Metrics), METRICS_DOC)
    .doc("Current CPU and memory utilisation.");
static SERVICES: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Services), SERVICES_DOC).doc("System services and their status.");
static DISPLAY: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Display), DISPLAY_DOC).doc("WebGUI display settings.");
static CONFIG: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Config), CONFIG_DOC).doc("Configuration validity.");
static ONLINE: Descriptor = Descriptor::query(Operation::Info(InfoAction::Online), ONLINE_DOC)
    .timeout(TimeoutClass::Fast)
    .doc("Whether the API reports the server online.");
static OWNER: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Owner), OWNER_DOC).doc("Server owner account.");
static SETTINGS: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Settings), SETTINGS_DOC).doc("Unified settings values.");
static SERVER: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Server), SERVER_DOC).doc("This server's identity and URLs.");
static SERVERS: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Servers), SERVERS_DOC).doc("Servers linked to the owner account.");
static FLASH: Descriptor =
    Descriptor::query(Operation::Info(InfoAction::Flash), FLASH_DOC).doc("Boot flash drive identity.");
static UPS_DEVICES: Descriptor = Descriptor::query(Operation::Info(InfoAction::UpsDevices), UPS_DEVICES_DOC)
    .doc("Connected UPS devices with battery and power readings.");
static UPS_DEVICE: Descriptor = Descriptor::query(Operation::Info(InfoAction::UpsDevice), UPS_DEVICE_DOC)
    .vars(UPS_DEVICE_VARS)
    .doc("One UPS device.");
static UPS_CONFIG: Descriptor = Descriptor::query(Operation::Info(InfoAction::UpsConfig), UPS_CONFIG_DOC)
    .doc("UPS daemon configuration.");

pub(super) fn descriptor(action: InfoAction) -> &'static Descriptor {
    match action {
        InfoAction::Overview => &OVERVIEW,
        InfoAction::Array => &ARRAY,
        InfoAction::Network => &NETWORK,
        InfoAction::Registration => &REGISTRATION,
        InfoAction::Connect => &CONNECT,
        InfoAction::Variables => &VARIABLES,
        InfoAction::Metrics => &METRICS,
        InfoAction::Services => &SERVICES,
        InfoAction::Display => &DISPLAY,
        InfoAction::Config => &CONFIG,
        InfoAction::Online => &ONLINE,
        InfoAction::Owner => &OWNER,
        InfoAction::Settings => &SETTINGS,
        InfoAction::Server => &SERVER,
        InfoAction::Servers => &SERVERS,
        InfoAction::Flash => &FLASH,
        InfoAction::UpsDevices => &UPS_DEVICES,
        InfoAction::UpsDevice => &UPS_DEVICE,
        InfoAction::UpsConfig => &UPS_CONFIG,
    }
}
