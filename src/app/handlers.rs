use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::constants::{PAGE_STEP, QUIT_PROMPT};
use crate::app::{App, Interaction};
use crate::model::{Focus, Mode};

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent, ui: &mut dyn Interaction) -> Result<bool> {
        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.notice = None;
            }
            return Ok(false);
        }
        match self.mode {
            Mode::HostPicker => Ok(self.handle_host_picker_key(key)),
            Mode::Browse => self.handle_browse_key(key, ui),
        }
    }

    fn handle_host_picker_key(&mut self, key: KeyEvent) -> bool {
        let count = self.host_picker.hosts.len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.host_picker.selected = (self.host_picker.selected + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.host_picker.selected = (self.host_picker.selected + 1) % count;
            }
            KeyCode::Enter => {
                if let Some(host) = self.host_picker.hosts.get(self.host_picker.selected).cloned() {
                    self.connect(host);
                }
            }
            _ => {}
        }
        false
    }

    fn handle_browse_key(&mut self, key: KeyEvent, ui: &mut dyn Interaction) -> Result<bool> {
        match key.code {
            KeyCode::Char('q' | 'Q') => return self.confirm_quit(ui),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.switch_focus();
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE_STEP),
            KeyCode::PageDown => self.move_cursor(PAGE_STEP),
            KeyCode::Home => self.move_cursor_to_end(false),
            KeyCode::End => self.move_cursor_to_end(true),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Backspace => self.up_directory(),
            KeyCode::Char(' ') => self.toggle_selection(),
            KeyCode::F(5) | KeyCode::Char('d') => {
                self.download(ui)?;
            }
            KeyCode::F(6) | KeyCode::Char('u') => {
                self.upload(ui)?;
            }
            KeyCode::Char('p' | 'P') => self.toggle_hidden(),
            KeyCode::Char('r') => {
                self.refresh(Focus::Local);
                self.refresh(Focus::Remote);
            }
            KeyCode::Char('v') => self.toggle_log_view(),
            _ => {}
        }
        Ok(false)
    }

    fn confirm_quit(&mut self, ui: &mut dyn Interaction) -> Result<bool> {
        self.poll_transfer();
        if self.engine.current_label().is_none() {
            return Ok(true);
        }
        if !ui.confirm(self, QUIT_PROMPT)? {
            return Ok(false);
        }
        self.engine.cancel();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use crate::app::NoLaunch;
    use crate::ssh::MockShell;

    struct NeverAsked;

    impl Interaction for NeverAsked {
        fn confirm(&mut self, _app: &App, question: &str) -> Result<bool> {
            panic!("unexpected prompt: {question}");
        }

        fn transfer_tick(&mut self, _app: &App, _label: &str, _percent: u8) -> Result<bool> {
            panic!("no transfer expected");
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let shell = Arc::new(MockShell::default());
        shell.respond("echo $HOME", "/home/alice\n");
        shell.respond("ls -laL", "OK|\n-rw-r--r-- 1 a a 1 Jan  2 10:00 notes\n");
        let local = std::env::temp_dir().to_string_lossy().into_owned();
        let mut app = App::for_test(&local, shell, Box::new(NoLaunch));
        app.host_picker.hosts = vec!["a".into(), "b".into(), "c".into()];
        app
    }

    #[test]
    fn host_picker_wraps_and_connects() {
        let mut app = app();
        app.mode = Mode::HostPicker;
        app.host_picker.selected = 0;
        let mut ui = NeverAsked;
        app.handle_key(key(KeyCode::Up), &mut ui).unwrap();
        assert_eq!(app.host_picker.selected, 2);
        app.handle_key(key(KeyCode::Down), &mut ui).unwrap();
        assert_eq!(app.host_picker.selected, 0);
        app.handle_key(key(KeyCode::Down), &mut ui).unwrap();
        app.handle_key(key(KeyCode::Enter), &mut ui).unwrap();
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.host.as_deref(), Some("b"));
    }

    #[test]
    fn host_picker_quits_on_escape() {
        let mut app = app();
        app.mode = Mode::HostPicker;
        assert!(app.handle_key(key(KeyCode::Esc), &mut NeverAsked).unwrap());
    }

    #[test]
    fn browse_keys_drive_panes() {
        let mut app = app();
        let mut ui = NeverAsked;
        assert_eq!(app.focus, Focus::Local);
        app.handle_key(key(KeyCode::Tab), &mut ui).unwrap();
        assert_eq!(app.focus, Focus::Remote);
        app.handle_key(key(KeyCode::Down), &mut ui).unwrap();
        assert_eq!(app.remote.selected, 1);
        app.handle_key(key(KeyCode::Char(' ')), &mut ui).unwrap();
        assert!(app.remote.has_marked());
        app.handle_key(key(KeyCode::Char('v')), &mut ui).unwrap();
        assert_eq!(app.header_mode, crate::app::HeaderMode::Logs);
        assert!(!app.handle_key(key(KeyCode::Char('x')), &mut ui).unwrap());
        assert!(app.handle_key(key(KeyCode::Char('q')), &mut ui).unwrap());
    }

    #[test]
    fn notice_swallows_keys_until_closed() {
        let mut app = app();
        app.notice = Some(crate::model::Notice {
            title: "t".into(),
            message: "m".into(),
        });
        assert!(!app.handle_key(key(KeyCode::Char('q')), &mut NeverAsked).unwrap());
        assert!(app.notice.is_some());
        app.handle_key(key(KeyCode::Enter), &mut NeverAsked).unwrap();
        assert!(app.notice.is_none());
    }
}
