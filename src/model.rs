use std::path::Path;

pub(crate) const PARENT_ENTRY: &str = "..";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Target {
    Local,
    Remote { host: String },
}

impl Target {
    pub(crate) fn remote(host: impl Into<String>) -> Self {
        Self::Remote { host: host.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirectoryEntry {
    pub(crate) name: String,
    pub(crate) is_dir: bool,
    pub(crate) selected: bool,
}

impl DirectoryEntry {
    pub(crate) fn new(name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            is_dir,
            selected: false,
        }
    }

    pub(crate) fn parent() -> Self {
        Self::new(PARENT_ENTRY, true)
    }

    pub(crate) fn is_parent(&self) -> bool {
        self.name == PARENT_ENTRY
    }

    pub(crate) fn is_hidden(&self) -> bool {
        !self.is_parent() && self.name.starts_with('.')
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DirectoryListing {
    pub(crate) target: Target,
    pub(crate) path: String,
    pub(crate) entries: Vec<DirectoryEntry>,
    pub(crate) selected: usize,
    pub(crate) scroll_offset: usize,
}

impl DirectoryListing {
    pub(crate) fn new(target: Target, path: impl Into<String>, entries: Vec<DirectoryEntry>) -> Self {
        Self {
            target,
            path: path.into(),
            entries,
            selected: 0,
            scroll_offset: 0,
        }
    }

    pub(crate) fn empty(target: Target, path: impl Into<String>) -> Self {
        Self::new(target, path, vec![])
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn current(&self) -> Option<&DirectoryEntry> {
        self.entries.get(self.selected)
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut DirectoryEntry> {
        self.entries.get_mut(self.selected)
    }

    pub(crate) fn marked(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|entry| entry.selected)
    }

    pub(crate) fn has_marked(&self) -> bool {
        self.entries.iter().any(|entry| entry.selected)
    }

    pub(crate) fn unmark(&mut self, name: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.name == name) {
            entry.selected = false;
        }
    }

    pub(crate) fn move_cursor(&mut self, delta: isize, visible_rows: usize) {
        if self.entries.is_empty() {
            self.selected = 0;
            self.scroll_offset = 0;
            return;
        }
        let last = self.entries.len() - 1;
        let next = (self.selected as isize).saturating_add(delta).clamp(0, last as isize);
        self.selected = next as usize;
        self.keep_cursor_visible(visible_rows);
    }

    pub(crate) fn keep_cursor_visible(&mut self, visible_rows: usize) {
        let rows = visible_rows.max(1);
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + rows {
            self.scroll_offset = self.selected + 1 - rows;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransferDirection {
    Upload,
    Download,
}

impl TransferDirection {
    pub(crate) fn verb(self) -> &'static str {
        match self {
            TransferDirection::Upload => "Uploading",
            TransferDirection::Download => "Downloading",
        }
    }

    pub(crate) fn noun(self) -> &'static str {
        match self {
            TransferDirection::Upload => "upload",
            TransferDirection::Download => "download",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransferRequest {
    pub(crate) source: String,
    pub(crate) destination: String,
    pub(crate) host: String,
    pub(crate) direction: TransferDirection,
}

impl TransferRequest {
    pub(crate) fn file_name(&self) -> String {
        Path::new(&self.source)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.clone())
    }

    pub(crate) fn label(&self) -> String {
        format!("{} {}", self.direction.verb(), self.file_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransferPhase {
    Idle,
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Local,
    Remote,
}

impl Focus {
    pub(crate) fn toggle(self) -> Self {
        match self {
            Focus::Local => Focus::Remote,
            Focus::Remote => Focus::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    HostPicker,
    Browse,
}

#[derive(Debug, Clone)]
pub(crate) struct HostPickerState {
    pub(crate) hosts: Vec<String>,
    pub(crate) selected: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Notice {
    pub(crate) title: String,
    pub(crate) message: String,
}
