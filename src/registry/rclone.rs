use super::{Constraint, Descriptor, ID, Operation, VarSpec, VarType};

actions!(
    /// Actions of the `rclone` tool.
    RcloneAction {
        ListRemotes => "list_remotes",
        ConfigForm => "config_form",
        CreateRemote => "create_remote",
        DeleteRemote => "delete_remote",
    }
);

const REMOTE_NAME: VarSpec = VarSpec::required("name", "name", VarType::String)
    .field_of("input")
    .check(ID)
    .doc("Remote name.");

const CONFIG_FORM_VARS: &[VarSpec] = &[VarSpec::optional("provider_type", "providerType", VarType::String)
    .field_of("formOptions")
    .check(Constraint::NonEmpty)
    .doc("rclone backend type, e.g. s3, drive, b2. Omit for the provider picker form.")];

const CREATE_VARS: &[VarSpec] = &[
    REMOTE_NAME,
    VarSpec::required("provider_type", "type", VarType::String)
        .field_of("input")
        .check(Constraint::NonEmpty),
    VarSpec::required("config_data", "parameters", VarType::Object)
        .field_of("input")
        .doc("Backend parameters as a JSON object (see action=config_form)."),
];

const DELETE_VARS: &[VarSpec] = &[REMOTE_NAME];

const LIST_REMOTES_DOC: &str = "query ListRCloneRemotes {
  rclone {
    remotes {
      name
      type
      parameters
      config
    }
  }
}";

const CONFIG_FORM_DOC: &str = "query RCloneConfigForm($formOptions: RCloneConfigFormInput) {
  rclone {
    configForm(formOptions: $formOptions) {
      id
      dataSchema
      uiSchema
    }
  }
}";

const CREATE_REMOTE_DOC: &str = "mutation CreateRCloneRemote($input: CreateRCloneRemoteInput!) {
  rclone {
    createRCloneRemote(input: $input) {
      name
      type
      parameters
    }
  }
}";

const DELETE_REMOTE_DOC: &str = "mutation DeleteRCloneRemote($input: DeleteRCloneRemoteInput!) {
  rclone {
    deleteRCloneRemote(input: $input)
  }
}";

static LIST_REMOTES: Descriptor =
    Descriptor::query(Operation::Rclone(RcloneAction::ListRemotes), LIST_REMOTES_DOC)
        .doc("List configured rclone remotes.");
static CONFIG_FORM: Descriptor = Descriptor::query(Operation::Rclone(RcloneAction::ConfigForm), CONFIG_FORM_DOC)
    .vars(CONFIG_FORM_VARS)
    .doc("JSON schema describing the parameters a backend type needs.");
static CREATE_REMOTE: Descriptor =
    Descriptor::mutation(Operation::Rclone(RcloneAction::CreateRemote), CREATE_REMOTE_DOC)
        .vars(CREATE_VARS)
        .doc("Create a new rclone remote.");
static DELETE_REMOTE: Descriptor =
    Descriptor::mutation(Operation::Rclone(RcloneAction::DeleteRemote), DELETE_REMOTE_DOC)
        .vars(DELETE_VARS)
        .destructive()
        .doc("Delete an rclone remote and its stored credentials.");

pub(super) fn descriptor(action: RcloneAction) -> &'static Descriptor {
    match action {
        RcloneAction::ListRemotes => &LIST_REMOTES,
        RcloneAction::ConfigForm => &CONFIG_FORM,
        RcloneAction::CreateRemote => &CREATE_REMOTE,
        RcloneAction::DeleteRemote => &DELETE_REMOTE,
    }
}
