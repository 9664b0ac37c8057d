//! Watch requests and change notifications

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default native notification buffer hint (bytes)
pub const DEFAULT_BUFFER_SIZE: u32 = 16 * 1024;

bitflags::bitflags! {
    /// Kinds of change a watch is interested in
    ///
    /// Backends map only the subset they can observe natively. Bits a backend
    /// cannot observe are ignored, never reported.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EventMask: u32 {
        /// Files added, removed or renamed
        const FILE_NAME = 1 << 0;
        /// Directories added, removed or renamed
        const DIR_NAME = 1 << 1;
        const ATTRIBUTES = 1 << 2;
        const SIZE = 1 << 3;
        const LAST_WRITE = 1 << 4;
        const LAST_ACCESS = 1 << 5;
        const CREATION = 1 << 6;
        const SECURITY = 1 << 7;
    }
}

impl EventMask {
    /// Bits describing entries appearing, disappearing or being renamed
    pub const NAME_CHANGES: Self = Self::FILE_NAME.union(Self::DIR_NAME);

    /// Bits describing changes to an existing entry
    pub const CONTENT_CHANGES: Self = Self::ATTRIBUTES
        .union(Self::SIZE)
        .union(Self::LAST_WRITE)
        .union(Self::LAST_ACCESS)
        .union(Self::CREATION)
        .union(Self::SECURITY);

    /// Parse a single flag name, case-insensitive (`last_write`, `LAST_WRITE`)
    pub fn from_flag_name(name: &str) -> Option<Self> {
        let flag = match name.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "FILE_NAME" => Self::FILE_NAME,
            "DIR_NAME" => Self::DIR_NAME,
            "ATTRIBUTES" => Self::ATTRIBUTES,
            "SIZE" => Self::SIZE,
            "LAST_WRITE" => Self::LAST_WRITE,
            "LAST_ACCESS" => Self::LAST_ACCESS,
            "CREATION" => Self::CREATION,
            "SECURITY" => Self::SECURITY,
            "ALL" => Self::all(),
            _ => return None,
        };
        Some(flag)
    }

    /// Parse a comma or `|` separated list of flag names
    ///
    /// Returns the first unknown name on failure.
    pub fn parse_list(list: &str) -> Result<Self, String> {
        let mut mask = Self::empty();
        for name in list.split([',', '|']) {
            if name.trim().is_empty() {
                continue;
            }
            match Self::from_flag_name(name) {
                Some(flag) => mask |= flag,
                None => return Err(name.trim().to_string()),
            }
        }
        Ok(mask)
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::FILE_NAME | Self::DIR_NAME | Self::SIZE | Self::LAST_WRITE
    }
}

/// Per-watch options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Whether sub-directories are in scope
    pub recursive: bool,

    /// Backend-specific hint for the native notification buffer size
    pub buffer_size: u32,

    /// Coalescing window for repeated `Modified` notifications on one path.
    /// `Duration::ZERO` disables coalescing.
    pub debounce: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            debounce: Duration::ZERO,
        }
    }
}

/// A single `watch()` call: what to watch and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRequest {
    pub path: PathBuf,
    pub events: EventMask,
    pub options: WatchOptions,
}

impl WatchRequest {
    pub fn new(path: impl Into<PathBuf>, events: EventMask, options: WatchOptions) -> Self {
        Self {
            path: path.into(),
            events,
            options,
        }
    }

    pub fn recursive(&self) -> bool {
        self.options.recursive
    }
}

/// Type of a detected change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    /// Old name of a renamed entry
    RenamedFrom,
    /// New name of a renamed entry
    RenamedTo,
}

impl ChangeKind {
    /// Whether this change alters which names exist (as opposed to content)
    pub fn is_name_change(self) -> bool {
        !matches!(self, ChangeKind::Modified)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
            ChangeKind::RenamedFrom => "renamed_from",
            ChangeKind::RenamedTo => "renamed_to",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected change
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub kind: ChangeKind,
    /// Absolute or native-resolved path of the affected entry
    pub path: PathBuf,
}

impl ChangeNotification {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
