use super::{Constraint, Descriptor, ID, Operation, VarSpec, VarType};

actions!(
    /// Actions of the `keys` tool.
    KeysAction {
        List => "list",
        Get => "get",
        Create => "create",
        Update => "update",
        Delete => "delete",
    }
);

const ROLES: VarType = VarType::StringList;

const KEY_ID: VarSpec = VarSpec::required("key_id", "id", VarType::String)
    .check(ID)
    .doc("API key ID (use action=list to find it).");

const KEY: &[VarSpec] = &[KEY_ID];

const CREATE_VARS: &[VarSpec] = &[
    VarSpec::required("name", "name", VarType::String)
        .field_of("input")
        .check(Constraint::NonEmpty)
        .doc("Key name."),
    VarSpec::optional("description", "description", VarType::String)
        .field_of("input")
        .doc("Key description."),
    VarSpec::optional("roles", "roles", ROLES)
        .field_of("input")
        .doc("Roles granted to the key, e.g. [\"ADMIN\"] or [\"VIEWER\"]."),
];

const UPDATE_VARS: &[VarSpec] = &[
    KEY_ID.field_of("input"),
    VarSpec::optional("name", "name", VarType::String)
        .field_of("input")
        .check(Constraint::NonEmpty),
    VarSpec::optional("description", "description", VarType::String).field_of("input"),
    VarSpec::optional("roles", "roles", ROLES).field_of("input"),
];

const LIST_DOC: &str = "query ListApiKeys {
  apiKeys {
    id
    name
    description
    roles
    createdAt
    permissions { resource actions }
  }
}";

const GET_DOC: &str = "query GetApiKey($id: PrefixedID!) {
  apiKey(id: $id) {
    id
    name
    description
    roles
    createdAt
    permissions { resource actions }
  }
}";

const CREATE_DOC: &str = "mutation CreateApiKey($input: CreateApiKeyInput!) {
  apiKey {
    create(input: $input) {
      id
      name
      key
      roles
    }
  }
}";

const UPDATE_DOC: &str = "mutation UpdateApiKey($input: UpdateApiKeyInput!) {
  apiKey {
    update(input: $input) {
      id
      name
      description
      roles
    }
  }
}";

const DELETE_DOC: &str = "mutation DeleteApiKey($id: PrefixedID!) {
  apiKey {
    delete(input: { ids: [$id] })
  }
}";

static LIST: Descriptor =
    Descriptor::query(Operation::Keys(KeysAction::List), LIST_DOC).doc("List API keys (secrets are never returned).");
static GET: Descriptor = Descriptor::query(Operation::Keys(KeysAction::Get), GET_DOC)
    .vars(KEY)
    .doc("Details of one API key.");
static CREATE: Descriptor = Descriptor::mutation(Operation::Keys(KeysAction::Create), CREATE_DOC)
    .vars(CREATE_VARS)
    .doc("Create an API key. The secret is returned only once.");
static UPDATE: Descriptor = Descriptor::mutation(Operation::Keys(KeysAction::Update), UPDATE_DOC)
    .vars(UPDATE_VARS)
    .doc("Rename, re-describe or change the roles of an API key.");
static DELETE: Descriptor = Descriptor::mutation(Operation::Keys(KeysAction::Delete), DELETE_DOC)
    .vars(KEY)
    .destructive()
    .doc("Revoke an API key.");

pub(super) fn descriptor(action: KeysAction) -> &'static Descriptor {
    match action {
        KeysAction::List => &LIST,
        KeysAction::Get => &GET,
        KeysAction::Create => &CREATE,
        KeysAction::Update => &UPDATE,
        KeysAction::Delete => &DELETE,
    }
}
