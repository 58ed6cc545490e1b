use std::sync::Arc;

use crate::app::App;
use crate::app::constants::STATUS_NOT_CONNECTED;
use crate::model::{DirectoryListing, Focus};
use crate::paths::{join_path, parent_path};
use crate::provider::DirectoryProvider;

impl App {
    pub(crate) fn pane(&self, side: Focus) -> &DirectoryListing {
        match side {
            Focus::Local => &self.local,
            Focus::Remote => &self.remote,
        }
    }

    pub(crate) fn pane_mut(&mut self, side: Focus) -> &mut DirectoryListing {
        match side {
            Focus::Local => &mut self.local,
            Focus::Remote => &mut self.remote,
        }
    }

    pub(crate) fn provider(&self, side: Focus) -> Option<Arc<dyn DirectoryProvider>> {
        match side {
            Focus::Local => Some(self.local_provider.clone()),
            Focus::Remote => self.remote_provider.clone(),
        }
    }

    pub(crate) fn change_dir(&mut self, side: Focus, path: &str) -> bool {
        let Some(provider) = self.provider(side) else {
            self.set_status(STATUS_NOT_CONNECTED);
            return false;
        };
        match provider.list(path, self.settings.show_hidden) {
            Ok(mut listing) => {
                listing.keep_cursor_visible(self.visible_rows);
                *self.pane_mut(side) = listing;
                true
            }
            Err(err) => {
                self.set_status(format!("Unable to list {path}: {err}"));
                false
            }
        }
    }

    pub(crate) fn refresh(&mut self, side: Focus) -> bool {
        let path = self.pane(side).path.clone();
        self.change_dir(side, &path)
    }

    pub(crate) fn open_selected(&mut self) {
        let Some(entry) = self.pane(self.focus).current().cloned() else {
            return;
        };
        if entry.is_parent() {
            self.up_directory();
        } else if entry.is_dir {
            let next = join_path(&self.pane(self.focus).path, &entry.name);
            self.change_dir(self.focus, &next);
        }
    }

    pub(crate) fn up_directory(&mut self) {
        let current = self.pane(self.focus).path.clone();
        let parent = parent_path(&current);
        if parent != current {
            self.change_dir(self.focus, &parent);
        }
    }

    pub(crate) fn move_cursor(&mut self, delta: isize) {
        let rows = self.visible_rows;
        self.pane_mut(self.focus).move_cursor(delta, rows);
    }

    pub(crate) fn move_cursor_to_end(&mut self, end: bool) {
        let len = self.pane(self.focus).len() as isize;
        self.move_cursor(if end { len } else { -len });
    }

    pub(crate) fn toggle_selection(&mut self) {
        if let Some(entry) = self.pane_mut(self.focus).current_mut() {
            if !entry.is_parent() {
                entry.selected = !entry.selected;
            }
        }
    }

    pub(crate) fn toggle_hidden(&mut self) {
        self.settings.show_hidden = !self.settings.show_hidden;
        self.refresh(Focus::Local);
        if self.remote_provider.is_some() {
            self.refresh(Focus::Remote);
        }
        self.save_state();
        let state = if self.settings.show_hidden { "shown" } else { "hidden" };
        self.log_line(&format!("Hidden files {state}"));
    }

    pub(crate) fn switch_focus(&mut self) {
        self.focus = self.focus.toggle();
    }

    pub(crate) fn set_visible_rows(&mut self, rows: usize) {
        let rows = rows.max(1);
        if rows == self.visible_rows {
            return;
        }
        self.visible_rows = rows;
        self.local.keep_cursor_visible(rows);
        self.remote.keep_cursor_visible(rows);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use crate::app::{App, NoLaunch};
    use crate::model::Focus;
    use crate::ssh::MockShell;

    const REMOTE_ROOT: &str = "\
OK|
drwxr-xr-x 2 a a 4096 Jan  2 10:00 etc
drwxr-xr-x 2 a a 4096 Jan  2 10:00 home
";

    fn local_tree() -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("ss-scp-panes-{nanos}"));
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("file.txt"), "x").unwrap();
        fs::write(dir.join(".dot"), "x").unwrap();
        dir
    }

    fn app() -> (App, std::path::PathBuf) {
        let dir = local_tree();
        let shell = Arc::new(MockShell::default());
        shell.respond("echo $HOME", "/home/alice\n");
        shell.respond("'/home/alice'", "OK|\ndrwxr-xr-x 2 a a 4096 Jan  2 10:00 code\n");
        shell.respond("'/home'", "OK|\ndrwxr-xr-x 2 a a 4096 Jan  2 10:00 alice\n");
        shell.respond_with_status("'/broken'", "", 127);
        shell.respond("'/'", REMOTE_ROOT);
        let app = App::for_test(&dir.to_string_lossy(), shell, Box::new(NoLaunch));
        (app, dir)
    }

    #[test]
    fn open_enters_directory_and_parent_goes_back() {
        let (mut app, dir) = app();
        let start = app.local.path.clone();
        assert_eq!(app.local.entries[1].name, "sub");
        app.move_cursor(1);
        app.open_selected();
        assert!(app.local.path.ends_with("/sub"));
        assert_eq!(app.local.selected, 0);
        app.open_selected();
        assert_eq!(app.local.path, start);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn remote_navigation_stops_at_root() {
        let (mut app, dir) = app();
        app.switch_focus();
        assert_eq!(app.focus, Focus::Remote);
        app.up_directory();
        assert_eq!(app.remote.path, "/home");
        app.up_directory();
        assert_eq!(app.remote.path, "/");
        assert_eq!(app.remote.entries[0].name, "etc");
        app.up_directory();
        assert_eq!(app.remote.path, "/");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn toggle_selection_skips_parent_entry() {
        let (mut app, dir) = app();
        app.toggle_selection();
        assert!(!app.local.has_marked());
        app.move_cursor(2);
        app.toggle_selection();
        assert_eq!(app.local.marked().count(), 1);
        app.toggle_selection();
        assert!(!app.local.has_marked());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn toggle_hidden_relists_both_panes() {
        let (mut app, dir) = app();
        assert!(!app.local.entries.iter().any(|entry| entry.name == ".dot"));
        app.toggle_hidden();
        assert!(app.settings.show_hidden);
        assert!(app.local.entries.iter().any(|entry| entry.name == ".dot"));
        app.toggle_hidden();
        assert!(!app.local.entries.iter().any(|entry| entry.name == ".dot"));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn failed_listing_keeps_previous_pane() {
        let (mut app, dir) = app();
        let before = app.local.path.clone();
        assert!(!app.change_dir(Focus::Local, "/definitely/not/here"));
        assert_eq!(app.local.path, before);
        assert!(app.status.starts_with("Unable to list"));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn failed_remote_listing_keeps_previous_pane() {
        let (mut app, dir) = app();
        let before: Vec<String> = app.remote.entries.iter().map(|e| e.name.clone()).collect();
        assert_eq!(before, vec!["..", "code"]);
        assert!(!app.change_dir(Focus::Remote, "/broken"));
        assert_eq!(app.remote.path, "/home/alice");
        let after: Vec<String> = app.remote.entries.iter().map(|e| e.name.clone()).collect();
        assert_eq!(after, before);
        assert!(app.status.starts_with("Unable to list /broken"), "{}", app.status);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn shrinking_rows_keeps_cursor_visible() {
        let (mut app, dir) = app();
        for idx in 0..20 {
            fs::write(dir.join(format!("f{idx:02}")), "x").unwrap();
        }
        app.refresh(Focus::Local);
        app.set_visible_rows(10);
        app.move_cursor_to_end(true);
        app.set_visible_rows(3);
        let pane = &app.local;
        assert!(pane.scroll_offset <= pane.selected);
        assert!(pane.selected < pane.scroll_offset + 3);
        fs::remove_dir_all(dir).ok();
    }
}
