//! Change notifications as seen by the reload trigger.

use notify::event::{EventKind, ModifyKind, RenameMode};
use std::fmt;
use std::path::PathBuf;

/// The kind of operation behind a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A file or directory was created.
    Create,
    /// File contents were written.
    Write,
    /// A file or directory was removed.
    Remove,
    /// A file or directory was renamed or moved.
    Rename,
    /// Only metadata (mode, owner, timestamps) changed.
    Permission,
    /// The backend could not tell.
    Unknown,
}

impl ChangeKind {
    /// Map a `notify` event kind.
    ///
    /// Access events (open, close, read) return `None`: they do not change
    /// anything on disk. So does the paired rename summary, which the backend
    /// sends in addition to the separate source and destination events.
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        let kind = match kind {
            EventKind::Access(_) => return None,
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => return None,
            EventKind::Create(_) => Self::Create,
            EventKind::Remove(_) => Self::Remove,
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
                Self::Write
            }
            EventKind::Modify(ModifyKind::Metadata(_)) => Self::Permission,
            EventKind::Modify(ModifyKind::Name(_)) => Self::Rename,
            EventKind::Modify(ModifyKind::Other) | EventKind::Any | EventKind::Other => {
                Self::Unknown
            }
        };
        Some(kind)
    }

    /// Whether an event of this kind should trigger a reload.
    pub fn triggers_reload(self) -> bool {
        self != Self::Permission
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "CREATE",
            Self::Write => "WRITE",
            Self::Remove => "REMOVE",
            Self::Rename => "RENAME",
            Self::Permission => "CHMOD",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The affected path
    pub path: PathBuf,
    /// What happened to it
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Convert a `notify` event.
    ///
    /// Returns `None` for access events and paired rename summaries. A
    /// rename surfaces as one event for the old name and one for the new.
    pub fn from_notify(event: &notify::Event) -> Option<Self> {
        let kind = ChangeKind::from_notify(&event.kind)?;
        let path = event.paths.last().cloned().unwrap_or_default();
        Some(Self { path, kind })
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.path.display().to_string(), self.kind)
    }
}
