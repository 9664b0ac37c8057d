//! Translation of native events into change notifications
//!
//! Applies the two filters every backend shares: the event mask (drop kinds
//! the caller did not ask for) and the watch scope (drop paths outside the
//! root, or deeper than one level for flat watches).

use notify::event::{AccessKind, MetadataKind, ModifyKind, RenameMode};
use notify::{Event, EventKind};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use vigil_core::{ChangeKind, ChangeNotification, EventMask};

/// Paths a watch reports on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    root: PathBuf,
    recursive: bool,
}

impl Scope {
    pub fn new(root: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            root: root.into(),
            recursive,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Whether an event for `path` belongs to this watch
    ///
    /// Flat watches accept the root and its direct children only. Native
    /// primitives that are recursive-only (FSEvents) rely on this.
    pub fn contains(&self, path: &Path) -> bool {
        if path == self.root {
            return true;
        }

        match path.strip_prefix(&self.root) {
            Ok(relative) => self.recursive || relative.components().count() == 1,
            Err(_) => false,
        }
    }
}

/// What must be in the mask for an event to be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    /// FILE_NAME or DIR_NAME depending on the entry type
    Name,
    Any(EventMask),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mapping {
    Single(ChangeKind),
    /// `paths[0]` is the old name, `paths[1]` the new one
    RenamePair,
}

fn classify(kind: &EventKind) -> Option<(Mapping, Requirement)> {
    use ChangeKind::*;

    let mapped = match kind {
        EventKind::Create(_) => (Mapping::Single(Added), Requirement::Name),
        EventKind::Remove(_) => (Mapping::Single(Removed), Requirement::Name),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => (Mapping::Single(RenamedFrom), Requirement::Name),
            RenameMode::Both => (Mapping::RenamePair, Requirement::Name),
            RenameMode::To | RenameMode::Any | RenameMode::Other => {
                (Mapping::Single(RenamedTo), Requirement::Name)
            }
        },
        EventKind::Modify(ModifyKind::Data(_)) => (
            Mapping::Single(Modified),
            Requirement::Any(EventMask::SIZE | EventMask::LAST_WRITE),
        ),
        EventKind::Modify(ModifyKind::Metadata(metadata)) => {
            let bits = match metadata {
                MetadataKind::WriteTime => EventMask::LAST_WRITE,
                MetadataKind::AccessTime => EventMask::LAST_ACCESS,
                MetadataKind::Permissions | MetadataKind::Ownership => {
                    EventMask::SECURITY | EventMask::ATTRIBUTES
                }
                MetadataKind::Extended | MetadataKind::Any | MetadataKind::Other => {
                    EventMask::ATTRIBUTES | EventMask::LAST_WRITE | EventMask::SECURITY
                }
            };
            (Mapping::Single(Modified), Requirement::Any(bits))
        }
        EventKind::Modify(ModifyKind::Any | ModifyKind::Other) => (
            Mapping::Single(Modified),
            Requirement::Any(EventMask::CONTENT_CHANGES),
        ),
        EventKind::Access(AccessKind::Read | AccessKind::Any | AccessKind::Other) => (
            Mapping::Single(Modified),
            Requirement::Any(EventMask::LAST_ACCESS),
        ),
        // Opening changes nothing; a close after writing follows the data
        // events already reported for that write
        EventKind::Access(AccessKind::Open(_) | AccessKind::Close(_)) => return None,
        EventKind::Any | EventKind::Other => return None,
    };

    Some(mapped)
}

/// Name bits an entry needs, looking at the event first and the disk second
fn name_bits(kind: &EventKind, path: &Path) -> EventMask {
    use notify::event::{CreateKind, RemoveKind};

    match kind {
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => {
            EventMask::FILE_NAME
        }
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => {
            EventMask::DIR_NAME
        }
        _ => match fs::symlink_metadata(path) {
            Ok(metadata) if metadata.is_dir() => EventMask::DIR_NAME,
            Ok(_) => EventMask::FILE_NAME,
            // Gone already; either name bit will do
            Err(_) => EventMask::NAME_CHANGES,
        },
    }
}

fn admitted(requirement: Requirement, kind: &EventKind, path: &Path, mask: EventMask) -> bool {
    match requirement {
        Requirement::Any(bits) => mask.intersects(bits),
        Requirement::Name => {
            if mask.contains(EventMask::NAME_CHANGES) {
                true
            } else if !mask.intersects(EventMask::NAME_CHANGES) {
                false
            } else {
                mask.intersects(name_bits(kind, path))
            }
        }
    }
}

/// Map one native event to zero or more notifications
pub fn translate(event: &Event, mask: EventMask, scope: &Scope) -> Vec<ChangeNotification> {
    let Some((mapping, requirement)) = classify(&event.kind) else {
        return Vec::new();
    };

    let keep = |path: &Path| scope.contains(path) && admitted(requirement, &event.kind, path, mask);

    match mapping {
        Mapping::Single(kind) => event
            .paths
            .iter()
            .filter(|path| keep(path.as_path()))
            .map(|path| ChangeNotification::new(kind, path.clone()))
            .collect(),
        Mapping::RenamePair => {
            let mut out = Vec::with_capacity(2);
            if let Some(from) = event.paths.first().filter(|p| keep(p.as_path())) {
                out.push(ChangeNotification::new(ChangeKind::RenamedFrom, from.clone()));
            }
            if let Some(to) = event.paths.get(1).filter(|p| keep(p.as_path())) {
                out.push(ChangeNotification::new(ChangeKind::RenamedTo, to.clone()));
            }
            out
        }
    }
}

/// Rename cookies remembered for pairing
const RENAME_HISTORY: usize = 64;

/// Suppresses combined rename events whose halves were already seen
///
/// Some native primitives report a rename as a `From` half, a `To` half and
/// then a `Both` event carrying the same tracker. The halves alone describe
/// the rename, so the combined event is dropped. A `Both` event with no
/// matching half is kept.
#[derive(Debug, Default)]
pub struct RenameTracker {
    seen: VecDeque<usize>,
}

impl RenameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `event` and report whether it repeats a rename already seen
    pub fn is_duplicate(&mut self, event: &Event) -> bool {
        let EventKind::Modify(ModifyKind::Name(mode)) = event.kind else {
            return false;
        };
        let Some(tracker) = event.tracker() else {
            return false;
        };

        match mode {
            RenameMode::Both => {
                let paired = self.seen.contains(&tracker);
                self.seen.retain(|seen| *seen != tracker);
                paired
            }
            _ => {
                if !self.seen.contains(&tracker) {
                    if self.seen.len() >= RENAME_HISTORY {
                        self.seen.pop_front();
                    }
                    self.seen.push_back(tracker);
                }
                false
            }
        }
    }
}

/// Whether `event` means the native handle bound to the root is now stale
///
/// Handles bound to an inode stop reporting once the root is removed or
/// renamed away, even if something reappears at the same path.
pub fn invalidates_root(event: &Event, scope: &Scope) -> bool {
    let removes_or_renames = matches!(
        event.kind,
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
    );

    removes_or_renames && event.paths.iter().any(|path| path == scope.root())
}
