use super::{Descriptor, Operation};

actions!(
    /// Actions of the `users` tool.
    UsersAction {
        Me => "me",
    }
);

const ME_DOC: &str = "query Me {
  me {
    id
    name
    description
    roles
  }
}";

static ME: Descriptor =
    Descriptor::query(Operation::Users(UsersAction::Me), ME_DOC).doc("The user the configured API key belongs to.");

pub(super) fn descriptor(action: UsersAction) -> &'static Descriptor {
    match action {
        UsersAction::Me => &ME,
    }
}
