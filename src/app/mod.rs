use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::app::constants::{LOG_NO_LOGS_MESSAGE, NO_HOSTS_MESSAGE, STATUS_READY};
use crate::app::logging::prune_log_file;
use crate::model::{DirectoryListing, Focus, HostPickerState, Mode, Notice, Target};
use crate::paths::resolve;
use crate::provider::{DirectoryProvider, LocalProvider, RemoteProvider};
use crate::ssh::{RemoteShell, ScpLauncher, SshOptions, SshShell};
use crate::ssh_config::load_hosts;
use crate::storage::{Settings, config_path, load_settings, log_path, save_settings};
use crate::transfer::{TransferEngine, TransferLauncher};

mod commands;
mod constants;
mod handlers;
mod interaction;
mod logging;
mod panes;

pub(crate) use interaction::{Interaction, TerminalInteraction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderMode {
    Help,
    Logs,
}

pub(crate) struct App {
    pub(crate) config_path: PathBuf,
    pub(crate) log_path: PathBuf,
    pub(crate) last_log: String,
    pub(crate) log_lines: VecDeque<String>,
    pub(crate) settings: Settings,
    pub(crate) mode: Mode,
    pub(crate) host_picker: HostPickerState,
    pub(crate) host: Option<String>,
    shell: Arc<dyn RemoteShell>,
    local_provider: Arc<dyn DirectoryProvider>,
    remote_provider: Option<Arc<dyn DirectoryProvider>>,
    pub(crate) local: DirectoryListing,
    pub(crate) remote: DirectoryListing,
    pub(crate) focus: Focus,
    pub(crate) visible_rows: usize,
    pub(crate) engine: TransferEngine,
    pub(crate) transfer_line: String,
    pub(crate) status: String,
    pub(crate) notice: Option<Notice>,
    pub(crate) header_mode: HeaderMode,
    #[cfg(test)]
    scratch: Option<ScratchDir>,
}

impl App {
    pub(crate) fn load(host_arg: Option<String>) -> Result<Self> {
        let config_path = config_path()?;
        let settings = load_settings(&config_path)?;
        let log_path = log_path()?;
        prune_log_file(&log_path);
        let hosts = load_hosts()?;
        if host_arg.is_none() && hosts.is_empty() {
            bail!(NO_HOSTS_MESSAGE);
        }
        let options = SshOptions::from_settings(&settings);
        let shell: Arc<dyn RemoteShell> = Arc::new(SshShell::new(options.clone()));
        let launcher = Box::new(ScpLauncher::new(options));
        let mut app = Self::new(
            config_path,
            log_path,
            settings,
            shell,
            Arc::new(LocalProvider),
            launcher,
            hosts,
        );
        app.open_local_start();
        match host_arg {
            Some(host) => app.connect(host),
            None => app.set_status(STATUS_READY),
        }
        Ok(app)
    }

    fn new(
        config_path: PathBuf,
        log_path: PathBuf,
        settings: Settings,
        shell: Arc<dyn RemoteShell>,
        local_provider: Arc<dyn DirectoryProvider>,
        launcher: Box<dyn TransferLauncher>,
        hosts: Vec<String>,
    ) -> Self {
        let selected = settings
            .last_host
            .as_ref()
            .and_then(|last| hosts.iter().position(|host| host == last))
            .unwrap_or(0);
        Self {
            config_path,
            log_path,
            last_log: LOG_NO_LOGS_MESSAGE.to_string(),
            log_lines: VecDeque::new(),
            settings,
            mode: Mode::HostPicker,
            host_picker: HostPickerState { hosts, selected },
            host: None,
            shell,
            local_provider,
            remote_provider: None,
            local: DirectoryListing::empty(Target::Local, "/"),
            remote: DirectoryListing::empty(Target::remote(""), "/"),
            focus: Focus::Local,
            visible_rows: 1,
            engine: TransferEngine::new(launcher),
            transfer_line: String::new(),
            status: STATUS_READY.to_string(),
            notice: None,
            header_mode: HeaderMode::Help,
            #[cfg(test)]
            scratch: None,
        }
    }

    fn open_local_start(&mut self) {
        let candidates = [
            self.settings.last_local_dir.clone(),
            Some(resolve("~", self.local_provider.as_ref())),
            std::env::current_dir()
                .ok()
                .map(|dir| dir.to_string_lossy().into_owned()),
        ];
        for path in candidates.into_iter().flatten() {
            if self.change_dir(Focus::Local, &path) {
                return;
            }
        }
    }

    pub(crate) fn connect(&mut self, host: String) {
        let provider: Arc<dyn DirectoryProvider> =
            Arc::new(RemoteProvider::new(host.clone(), self.shell.clone()));
        self.remote_provider = Some(provider.clone());
        self.host = Some(host.clone());
        self.mode = Mode::Browse;
        self.focus = Focus::Local;
        self.remote = DirectoryListing::empty(provider.target(), "/");
        self.log_line(&format!("Connecting to {host}"));

        let remembered = self.settings.remote_dirs.get(&host).cloned();
        let opened = remembered.is_some_and(|path| self.change_dir(Focus::Remote, &path)) || {
            let home = resolve("~", provider.as_ref());
            let listed = self.change_dir(Focus::Remote, &home);
            if !listed {
                self.remote.path = home;
            }
            listed
        };
        self.settings.last_host = Some(host.clone());
        self.save_state();
        if opened {
            self.set_status(format!("Connected to {host}"));
        }
    }

    pub(crate) fn save_state(&mut self) {
        if !self.local.is_empty() {
            self.settings.last_local_dir = Some(self.local.path.clone());
        }
        if let (Some(host), false) = (&self.host, self.remote.is_empty()) {
            self.settings
                .remote_dirs
                .insert(host.clone(), self.remote.path.clone());
        }
        if let Err(err) = save_settings(&self.config_path, &self.settings) {
            self.log_line(&format!("Failed to save settings: {err:#}"));
        }
    }

    pub(crate) fn poll_transfer(&mut self) {
        if let Some(outcome) = self.engine.poll() {
            self.log_line(&format!("Transfer finished: {outcome:?}"));
        }
    }

    #[cfg(test)]
    pub(crate) fn for_test(
        local_dir: &str,
        shell: Arc<dyn RemoteShell>,
        launcher: Box<dyn TransferLauncher>,
    ) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        static NEXT: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
        let seq = NEXT.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let base = std::env::temp_dir().join(format!("ss-scp-app-test-{nanos}-{seq}"));
        let mut app = Self::new(
            base.join("config.json"),
            base.join("ss-scp.log"),
            Settings::default(),
            shell,
            Arc::new(LocalProvider),
            launcher,
            vec!["box".to_string()],
        );
        app.scratch = Some(ScratchDir(base));
        app.visible_rows = 5;
        app.change_dir(Focus::Local, local_dir);
        app.connect("box".to_string());
        app
    }
}

#[cfg(test)]
struct ScratchDir(PathBuf);

#[cfg(test)]
impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[cfg(test)]
pub(crate) struct NoLaunch;

#[cfg(test)]
impl TransferLauncher for NoLaunch {
    fn launch(
        &self,
        _request: &crate::model::TransferRequest,
    ) -> std::io::Result<crate::transfer::LaunchedProcess> {
        Err(std::io::Error::other("transfers are disabled here"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::MockShell;

    #[test]
    fn connect_falls_back_to_remote_home() {
        let shell = Arc::new(MockShell::default());
        shell.respond("echo $HOME", "/home/alice\n");
        shell.respond("'/home/alice'", "OK|\ndrwxr-xr-x 2 a a 4096 Jan  2 10:00 code\n");
        let local = std::env::temp_dir().to_string_lossy().into_owned();
        let app = App::for_test(&local, shell, Box::new(NoLaunch));
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.remote.path, "/home/alice");
        assert_eq!(app.remote.entries[1].name, "code");
        assert_eq!(app.settings.last_host.as_deref(), Some("box"));
        assert_eq!(
            app.settings.remote_dirs.get("box").map(String::as_str),
            Some("/home/alice")
        );
        assert!(app.status.starts_with("Connected to box"));
    }

    #[test]
    fn test_app_removes_its_config_dir() {
        let shell = Arc::new(MockShell::default());
        shell.respond("echo $HOME", "/home/alice\n");
        shell.respond("'/home/alice'", "OK|\n");
        let local = std::env::temp_dir().to_string_lossy().into_owned();
        let app = App::for_test(&local, shell, Box::new(NoLaunch));
        let base = app.config_path.parent().unwrap().to_path_buf();
        assert!(app.config_path.exists());
        assert!(app.log_path.exists());
        drop(app);
        assert!(!base.exists());
    }

    #[test]
    fn connect_reports_unreachable_host_without_failing() {
        let shell = Arc::new(MockShell::default());
        let local = std::env::temp_dir().to_string_lossy().into_owned();
        let app = App::for_test(&local, shell, Box::new(NoLaunch));
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.remote.is_empty());
        assert_eq!(app.remote.path, "~");
        assert!(app.status.starts_with("Unable to list"), "{}", app.status);
        assert!(!app.settings.remote_dirs.contains_key("box"));
    }
}
