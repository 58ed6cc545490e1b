use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::errors::ListError;
use crate::model::{DirectoryEntry, DirectoryListing, Target};
use crate::ssh::{RemoteShell, shell_quote};

/// Upper bound on entries per listing, `..` included. Anything past it is
/// dropped without an error.
pub(crate) const MAX_ENTRIES: usize = 1024;

const REMOTE_ERROR_MARKER: &str = "ERR|";
const REMOTE_OK_MARKER: &str = "OK|";

pub(crate) trait DirectoryProvider: Send + Sync {
    fn target(&self) -> Target;

    fn list(&self, path: &str, show_hidden: bool) -> Result<DirectoryListing, ListError>;

    fn exists(&self, path: &str) -> Result<bool, ListError>;

    fn home_dir(&self) -> Option<String>;

    fn user_name(&self) -> Option<String>;
}

pub(crate) fn compare_entries(left: &DirectoryEntry, right: &DirectoryEntry) -> Ordering {
    match (left.is_parent(), right.is_parent()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }
    right
        .is_dir
        .cmp(&left.is_dir)
        .then_with(|| left.name.to_lowercase().cmp(&right.name.to_lowercase()))
        .then_with(|| left.name.cmp(&right.name))
}

pub(crate) fn build_listing(
    target: Target,
    path: &str,
    raw: Vec<DirectoryEntry>,
    show_hidden: bool,
) -> DirectoryListing {
    let mut entries: Vec<DirectoryEntry> = raw
        .into_iter()
        .filter(|entry| entry.name != "." && !entry.is_parent() && !entry.name.is_empty())
        .filter(|entry| show_hidden || !entry.is_hidden())
        .collect();
    if path != "/" {
        entries.push(DirectoryEntry::parent());
    }
    entries.sort_by(compare_entries);
    entries.truncate(MAX_ENTRIES);
    DirectoryListing::new(target, path, entries)
}

#[derive(Debug, Default)]
pub(crate) struct LocalProvider;

impl DirectoryProvider for LocalProvider {
    fn target(&self) -> Target {
        Target::Local
    }

    fn list(&self, path: &str, show_hidden: bool) -> Result<DirectoryListing, ListError> {
        let read = fs::read_dir(path).map_err(|err| ListError::from_io(&err, path))?;
        let mut raw = Vec::new();
        for entry in read {
            let Ok(entry) = entry else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = fs::metadata(entry.path())
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            raw.push(DirectoryEntry::new(name, is_dir));
        }
        Ok(build_listing(Target::Local, path, raw, show_hidden))
    }

    fn exists(&self, path: &str) -> Result<bool, ListError> {
        match fs::symlink_metadata(Path::new(path)) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ListError::from_io(&err, path)),
        }
    }

    fn home_dir(&self) -> Option<String> {
        dirs::home_dir().map(|home| home.to_string_lossy().into_owned())
    }

    fn user_name(&self) -> Option<String> {
        std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .ok()
            .filter(|name| !name.trim().is_empty())
    }
}

pub(crate) struct RemoteProvider {
    host: String,
    shell: Arc<dyn RemoteShell>,
}

impl RemoteProvider {
    pub(crate) fn new(host: impl Into<String>, shell: Arc<dyn RemoteShell>) -> Self {
        Self {
            host: host.into(),
            shell,
        }
    }

    fn query_line(&self, command: &str) -> Option<String> {
        let output = self.shell.run(&self.host, command).ok()?;
        if output.connection_failed() {
            return None;
        }
        output.first_line().map(str::to_string)
    }
}

impl DirectoryProvider for RemoteProvider {
    fn target(&self) -> Target {
        Target::remote(self.host.clone())
    }

    fn list(&self, path: &str, show_hidden: bool) -> Result<DirectoryListing, ListError> {
        let output = self
            .shell
            .run(&self.host, &listing_command(path))
            .map_err(|err| ListError::Unreachable(format!("{}: {err}", self.host)))?;
        if output.connection_failed() {
            return Err(ListError::Unreachable(output.failure_message(&self.host)));
        }
        let mut raw = Vec::new();
        let mut changed_dir = false;
        for line in output.stdout.lines() {
            let trimmed = line.trim();
            if let Some(marker) = trimmed.strip_prefix(REMOTE_ERROR_MARKER) {
                return Err(match marker {
                    "missing" => ListError::NotFound(path.to_string()),
                    "notdir" => ListError::NotADirectory(path.to_string()),
                    _ => ListError::PermissionDenied(path.to_string()),
                });
            }
            if trimmed == REMOTE_OK_MARKER {
                changed_dir = true;
                continue;
            }
            if let Some(entry) = parse_ls_line(line) {
                raw.push(entry);
            }
        }
        // ls exits 1 for minor trouble such as a dangling link; anything else
        // or a script that never got past `cd` means the listing is unusable
        let ls_failed = !matches!(output.status, Some(0 | 1));
        if !changed_dir || ls_failed {
            let status = output
                .status
                .map_or_else(|| "signal".to_string(), |code| code.to_string());
            return Err(ListError::Io(format!(
                "{} (listing exited with {status})",
                output.failure_message(&self.host)
            )));
        }
        Ok(build_listing(self.target(), path, raw, show_hidden))
    }

    fn exists(&self, path: &str) -> Result<bool, ListError> {
        let quoted = shell_quote(path);
        let output = self
            .shell
            .run(
                &self.host,
                &format!("[ -e {quoted} ] && echo exists || echo missing"),
            )
            .map_err(|err| ListError::Unreachable(format!("{}: {err}", self.host)))?;
        if output.connection_failed() {
            return Err(ListError::Unreachable(output.failure_message(&self.host)));
        }
        Ok(output.first_line() == Some("exists"))
    }

    fn home_dir(&self) -> Option<String> {
        self.query_line("echo $HOME")
    }

    fn user_name(&self) -> Option<String> {
        self.query_line("whoami")
    }
}

pub(crate) fn listing_command(path: &str) -> String {
    let quoted = shell_quote(path);
    format!(
        "cd -- {quoted} 2>/dev/null || {{ if [ ! -e {quoted} ]; then echo '{REMOTE_ERROR_MARKER}missing'; \
         elif [ ! -d {quoted} ]; then echo '{REMOTE_ERROR_MARKER}notdir'; \
         else echo '{REMOTE_ERROR_MARKER}denied'; fi; exit 2; }}; echo '{REMOTE_OK_MARKER}'; LC_ALL=C ls -laL 2>/dev/null"
    )
}

fn next_field<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (field, tail) = trimmed.split_at(end);
    *rest = tail;
    Some(field)
}

pub(crate) fn parse_ls_line(line: &str) -> Option<DirectoryEntry> {
    let mut rest = line.trim_end_matches(['\r', '\n']);
    let perms = next_field(&mut rest)?;
    let kind = perms.chars().next()?;
    if perms.len() < 10 || !"-dlbcps".contains(kind) {
        return None;
    }
    // links owner group size month day time; device nodes have "major, minor"
    let fields_before_name = if matches!(kind, 'b' | 'c') { 8 } else { 7 };
    for _ in 0..fields_before_name {
        next_field(&mut rest)?;
    }
    let mut name = rest.trim_start();
    if kind == 'l' {
        name = name.split(" -> ").next().unwrap_or(name);
    }
    if name.is_empty() {
        return None;
    }
    Some(DirectoryEntry::new(name, kind == 'd'))
}
