use std::fmt;
use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind, RenameMode};

/// Operation kind of a filesystem notification.
///
/// Closed vocabulary with exhaustive matching downstream; adding a kind is a
/// compile-checked change. Rename is reported at the source path only; the
/// destination half of a move surfaces as an independent [`FsOp::Create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FsOp::Create => "CREATE",
            FsOp::Write => "WRITE",
            FsOp::Remove => "REMOVE",
            FsOp::Rename => "RENAME",
            FsOp::Chmod => "CHMOD",
        };
        f.write_str(name)
    }
}

/// One unclassified notification as delivered by the OS layer.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub path: PathBuf,
    pub op: FsOp,
}

/// Flatten one backend event into per-path raw events.
///
/// A paired rename (`RenameMode::Both`) carries source and destination in a
/// single notification; the halves stay independent here.
pub(crate) fn map_event(event: &notify::Event) -> Vec<RawEvent> {
    if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind {
        return event
            .paths
            .iter()
            .enumerate()
            .map(|(i, path)| RawEvent {
                path: path.clone(),
                op: if i == 0 { FsOp::Rename } else { FsOp::Create },
            })
            .collect();
    }

    let Some(op) = op_for(&event.kind) else {
        return Vec::new();
    };
    event
        .paths
        .iter()
        .map(|path| RawEvent {
            path: path.clone(),
            op,
        })
        .collect()
}

fn op_for(kind: &EventKind) -> Option<FsOp> {
    match kind {
        EventKind::Create(_) => Some(FsOp::Create),
        EventKind::Remove(_) => Some(FsOp::Remove),
        EventKind::Modify(ModifyKind::Metadata(_)) => Some(FsOp::Chmod),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(FsOp::Rename),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(FsOp::Create),
        EventKind::Modify(ModifyKind::Name(_)) => Some(FsOp::Rename),
        EventKind::Modify(_) => Some(FsOp::Write),
        // Access and catch-all notifications have no counterpart in the
        // five-op vocabulary and are dropped before classification.
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{
        AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode,
    };
    use std::path::Path;

    fn event(kind: EventKind, paths: &[&str]) -> notify::Event {
        let mut ev = notify::Event::new(kind);
        for p in paths {
            ev = ev.add_path(Path::new(p).to_path_buf());
        }
        ev
    }

    #[test]
    fn display_is_uppercase_operation_name() {
        assert_eq!(FsOp::Create.to_string(), "CREATE");
        assert_eq!(FsOp::Write.to_string(), "WRITE");
        assert_eq!(FsOp::Remove.to_string(), "REMOVE");
        assert_eq!(FsOp::Rename.to_string(), "RENAME");
        assert_eq!(FsOp::Chmod.to_string(), "CHMOD");
    }

    #[test]
    fn create_maps_to_create() {
        let raws = map_event(&event(EventKind::Create(CreateKind::File), &["/a"]));
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].op, FsOp::Create);
        assert_eq!(raws[0].path, Path::new("/a"));
    }

    #[test]
    fn data_modification_maps_to_write() {
        let raws = map_event(&event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/a"],
        ));
        assert_eq!(raws[0].op, FsOp::Write);
    }

    #[test]
    fn metadata_modification_maps_to_chmod() {
        let raws = map_event(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            &["/a"],
        ));
        assert_eq!(raws[0].op, FsOp::Chmod);
    }

    #[test]
    fn remove_maps_to_remove() {
        let raws = map_event(&event(EventKind::Remove(RemoveKind::File), &["/a"]));
        assert_eq!(raws[0].op, FsOp::Remove);
    }

    #[test]
    fn rename_halves_stay_independent() {
        let from = map_event(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &["/old"],
        ));
        assert_eq!(from[0].op, FsOp::Rename);

        let to = map_event(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/new"],
        ));
        assert_eq!(to[0].op, FsOp::Create);
    }

    #[test]
    fn paired_rename_splits_into_rename_and_create() {
        let raws = map_event(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/old", "/new"],
        ));
        assert_eq!(raws.len(), 2);
        assert_eq!((raws[0].path.as_path(), raws[0].op), (Path::new("/old"), FsOp::Rename));
        assert_eq!((raws[1].path.as_path(), raws[1].op), (Path::new("/new"), FsOp::Create));
    }

    #[test]
    fn access_notifications_are_dropped() {
        let raws = map_event(&event(EventKind::Access(AccessKind::Read), &["/a"]));
        assert!(raws.is_empty());
    }

    #[test]
    fn multiple_paths_fan_out() {
        let raws = map_event(&event(EventKind::Create(CreateKind::Any), &["/a", "/b"]));
        assert_eq!(raws.len(), 2);
        assert_eq!(raws[1].path, Path::new("/b"));
    }
}
