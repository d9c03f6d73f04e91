use std::path::PathBuf;

use chrono::{DateTime, Utc};

use fsaudit_watcher::{FsOp, RawEvent};

use crate::checksum::file_md5;

/// Normalized, checksum-annotated unit emitted for each observed change.
///
/// Immutable once built; ownership moves into the sink on emission.
/// `md5sum` is present exactly when the operation warranted a checksum
/// attempt and the read succeeded. `at` is capture time, not content time.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub path: PathBuf,
    pub op: FsOp,
    pub md5sum: Option<String>,
    pub at: DateTime<Utc>,
    /// Why the checksum attempt failed, when it did. The sink surfaces this
    /// as a per-event error without interrupting the stream.
    pub read_error: Option<String>,
}

/// Turn one raw event into a record, hashing content where the operation
/// calls for it.
///
/// Remove and Rename never resolve to content at the reported path, so no
/// read is attempted. Every other kind is hashed, including Chmod and any
/// kind added to the vocabulary later, which falls to the default arm on
/// purpose. A failed read (concurrent deletion, permissions, the path being
/// a directory) leaves the checksum absent and the pipeline running: one
/// unreadable file must never halt observation of the rest of the tree.
pub fn classify(raw: RawEvent) -> EventRecord {
    let (md5sum, read_error) = match raw.op {
        FsOp::Remove | FsOp::Rename => (None, None),
        FsOp::Create | FsOp::Write | FsOp::Chmod => match file_md5(&raw.path) {
            Ok(digest) => (Some(digest), None),
            Err(err) => (None, Some(err.to_string())),
        },
    };

    EventRecord {
        path: raw.path,
        op: raw.op,
        md5sum,
        at: Utc::now(),
        read_error,
    }
}
