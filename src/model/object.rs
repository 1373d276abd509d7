use time::OffsetDateTime;

/// An object as reported by a head or list call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub e_tag: Option<String>,
    pub last_modified: Option<OffsetDateTime>,
}

/// One page of a prefix listing.
#[derive(Clone, Debug, Default)]
pub struct ObjectPage {
    pub objects: Vec<ObjectSummary>,
    pub next_continuation_token: Option<String>,
}

/// Point-in-time result of an existence check.
///
/// A failed check is never reported as `Absent`; it is the `Err` arm of
/// [`crate::service::ObjectService::exists`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Existence {
    Present(ObjectSummary),
    Absent,
}

impl Existence {
    pub fn is_present(&self) -> bool {
        matches!(self, Existence::Present(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteCondition {
    Overwrite,
    /// Provider-side precondition: fail if the key already resolves.
    IfAbsent,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CopyReceipt {
    pub e_tag: Option<String>,
    pub last_modified: Option<OffsetDateTime>,
}

/// Keys touched by a folder operation, in the order they were processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderReport {
    pub prefix: String,
    pub keys: Vec<String>,
}

/// How `copy_folder` maps source keys under the destination prefix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FolderCopyMode {
    /// `src/sub/x.csv` -> `dst/sub/x.csv`
    #[default]
    Preserve,
    /// `src/sub/x.csv` -> `dst/x.csv`; sub-paths are discarded.
    Flatten,
}
