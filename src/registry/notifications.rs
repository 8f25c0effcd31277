use super::{Constraint, Descriptor, Fallback, ID, Operation, TimeoutClass, VarSpec, VarType};

actions!(
    /// Actions of the `notifications` tool.
    NotificationsAction {
        Overview => "overview",
        List => "list",
        Warnings => "warnings",
        Create => "create",
        Archive => "archive",
        Unread => "unread",
        Delete => "delete",
        DeleteArchived => "delete_archived",
        ArchiveAll => "archive_all",
    }
);

const IMPORTANCE: VarType = VarType::Enum(&["INFO", "WARNING", "ALERT"]);
const LIST_TYPE: VarType = VarType::Enum(&["UNREAD", "ARCHIVE"]);

const NOTIFICATION_ID: VarSpec = VarSpec::required("notification_id", "id", VarType::String)
    .check(ID)
    .doc("Notification ID (use action=list to find it).");

const LIST_VARS: &[VarSpec] = &[
    VarSpec::optional("list_type", "type", LIST_TYPE)
        .field_of("filter")
        .or(Fallback::Str("UNREAD"))
        .doc("Which inbox to read: UNREAD (default) or ARCHIVE."),
    VarSpec::optional("importance", "importance", IMPORTANCE)
        .field_of("filter")
        .doc("Only return notifications of this importance."),
    VarSpec::optional("offset", "offset", VarType::Int)
        .field_of("filter")
        .check(Constraint::Range { min: 0, max: 100_000 })
        .or(Fallback::Int(0))
        .doc("Pagination offset (default 0)."),
    VarSpec::optional("limit", "limit", VarType::Int)
        .field_of("filter")
        .check(Constraint::Range { min: 1, max: 500 })
        .or(Fallback::Int(20))
        .doc("Page size (default 20, max 500)."),
];

const CREATE_VARS: &[VarSpec] = &[
    VarSpec::required("title", "title", VarType::String)
        .field_of("input")
        .check(Constraint::NonEmpty)
        .doc("Notification title."),
    VarSpec::required("subject", "subject", VarType::String)
        .field_of("input")
        .check(Constraint::NonEmpty)
        .doc("Notification subject."),
    VarSpec::required("description", "description", VarType::String)
        .field_of("input")
        .doc("Notification body."),
    VarSpec::required("importance", "importance", IMPORTANCE)
        .field_of("input"),
];

const NOTIFICATION: &[VarSpec] = &[NOTIFICATION_ID];

const DELETE_VARS: &[VarSpec] = &[
    NOTIFICATION_ID,
    VarSpec::required("notification_type", "type", LIST_TYPE)
        .doc("Inbox the notification lives in: UNREAD or ARCHIVE."),
];

const ARCHIVE_ALL_VARS: &[VarSpec] = &[VarSpec::optional("importance", "importance", IMPORTANCE)];

const OVERVIEW_DOC: &str = "query NotificationOverview {
  notifications {
    overview {
      unread { info warning alert total }
      archive { info warning alert total }
    }
  }
}";

const LIST_DOC: &str = "query ListNotifications($filter: NotificationFilter!) {
  notifications {
    list(filter: $filter) {
      id
      title
      subject
      description
      importance
      link
      type
      timestamp
      formattedTimestamp
    }
  }
}";

const WARNINGS_DOC: &str = "query WarningsAndAlerts {
  notifications {
    warningsAndAlerts {
      id
      title
      subject
      description
      importance
      type
      timestamp
      formattedTimestamp
    }
  }
}";

const CREATE_DOC: &str = "mutation CreateNotification($input: NotificationData!) {
  createNotification(input: $input) {
    id
    title
    subject
    importance
    timestamp
  }
}";

const ARCHIVE_DOC: &str = "mutation ArchiveNotification($id: PrefixedID!) {
  archiveNotification(id: $id) {
    id
    title
    importance
  }
}";

const UNREAD_DOC: &str = "mutation MarkNotificationUnread($id: PrefixedID!) {
  unreadNotification(id: $id) {
    id
    title
    importance
  }
}";

const DELETE_DOC: &str = "mutation DeleteNotification($id: PrefixedID!, $type: NotificationType!) {
  deleteNotification(id: $id, type: $type) {
    unread { total }
    archive { total }
  }
}";

const DELETE_ARCHIVED_DOC: &str = "mutation DeleteArchivedNotifications {
  deleteArchivedNotifications {
    unread { total }
    archive { total }
  }
}";

const ARCHIVE_ALL_DOC: &str = "mutation ArchiveAllNotifications($importance: NotificationImportance) {
  archiveAll(importance: $importance) {
    unread { total }
    archive { total }
  }
}";

static OVERVIEW: Descriptor =
    Descriptor::query(Operation::Notifications(NotificationsAction::Overview), OVERVIEW_DOC)
        .timeout(TimeoutClass::Fast)
        .doc("Unread and archived counts by importance.");
static LIST: Descriptor = Descriptor::query(Operation::Notifications(NotificationsAction::List), LIST_DOC)
    .vars(LIST_VARS)
    .doc("Page through unread or archived notifications.");
static WARNINGS: Descriptor = Descriptor::query(Operation::Notifications(NotificationsAction::Warnings), WARNINGS_DOC)
    .doc("Unread warnings and alerts.");
static CREATE: Descriptor = Descriptor::mutation(Operation::Notifications(NotificationsAction::Create), CREATE_DOC)
    .vars(CREATE_VARS)
    .doc("Create a notification.");
static ARCHIVE: Descriptor = Descriptor::mutation(Operation::Notifications(NotificationsAction::Archive), ARCHIVE_DOC)
    .vars(NOTIFICATION)
    .doc("Move one notification to the archive.");
static UNREAD: Descriptor = Descriptor::mutation(Operation::Notifications(NotificationsAction::Unread), UNREAD_DOC)
    .vars(NOTIFICATION)
    .doc("Move one archived notification back to unread.");
static DELETE: Descriptor = Descriptor::mutation(Operation::Notifications(NotificationsAction::Delete), DELETE_DOC)
    .vars(DELETE_VARS)
    .destructive()
    .doc("Permanently delete one notification.");
static DELETE_ARCHIVED: Descriptor =
    Descriptor::mutation(Operation::Notifications(NotificationsAction::DeleteArchived), DELETE_ARCHIVED_DOC)
        .destructive()
        .doc("Permanently delete every archived notification.");
static ARCHIVE_ALL: Descriptor =
    Descriptor::mutation(Operation::Notifications(NotificationsAction::ArchiveAll), ARCHIVE_ALL_DOC)
        .vars(ARCHIVE_ALL_VARS)
        .doc("Archive all unread notifications, optionally only one importance.");

pub(super) fn descriptor(action: NotificationsAction) -> &'static Descriptor {
    match action {
        NotificationsAction::Overview => &OVERVIEW,
        NotificationsAction::List => &LIST,
        NotificationsAction::Warnings => &WARNINGS,
        NotificationsAction::Create => &CREATE,
        NotificationsAction::Archive => &ARCHIVE,
        NotificationsAction::Unread => &UNREAD,
        NotificationsAction::Delete => &DELETE,
        NotificationsAction::DeleteArchived => &DELETE_ARCHIVED,
        NotificationsAction::ArchiveAll => &ARCHIVE_ALL,
    }
}
