use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;

use crate::errors::TransferError;
use crate::model::{TransferPhase, TransferRequest};
use crate::transfer::monitor::{MonitorExit, PercentScraper, TransferSignals, spawn_monitor};

pub(crate) struct LaunchedProcess {
    pub(crate) child: Child,
    pub(crate) output: Box<dyn Read + Send>,
    /// The child leads its own process group, so the whole group can be
    /// signalled on cancel.
    pub(crate) own_group: bool,
}

pub(crate) trait TransferLauncher: Send + Sync {
    fn launch(&self, request: &TransferRequest) -> io::Result<LaunchedProcess>;
}

pub(crate) fn spawn_with_combined_output(mut command: Command) -> io::Result<LaunchedProcess> {
    let (reader, writer) = io::pipe()?;
    let error_writer = writer.try_clone()?;
    command
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(error_writer);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    let child = command.spawn()?;
    // the command still holds the write ends; the reader only sees EOF once
    // they are gone
    drop(command);
    Ok(LaunchedProcess {
        child,
        output: Box::new(reader),
        own_group: cfg!(unix),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransferOutcome {
    Completed,
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone)]
pub(crate) struct TransferHandle {
    signals: Arc<TransferSignals>,
    label: String,
}

impl TransferHandle {
    pub(crate) fn progress(&self) -> u8 {
        self.signals.progress()
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }
}

struct ActiveTransfer {
    request: TransferRequest,
    child: Child,
    own_group: bool,
    signals: Arc<TransferSignals>,
    monitor: Option<JoinHandle<()>>,
    done: Receiver<MonitorExit>,
    exit: Option<MonitorExit>,
}

pub(crate) struct TransferEngine {
    launcher: Box<dyn TransferLauncher>,
    active: Option<ActiveTransfer>,
    phase: TransferPhase,
    last_progress: u8,
}

impl TransferEngine {
    pub(crate) fn new(launcher: Box<dyn TransferLauncher>) -> Self {
        Self {
            launcher,
            active: None,
            phase: TransferPhase::Idle,
            last_progress: 0,
        }
    }

    pub(crate) fn start(&mut self, request: TransferRequest) -> Result<TransferHandle, TransferError> {
        self.poll();
        if self.active.is_some() {
            return Err(TransferError::AlreadyActive);
        }
        let launched = self
            .launcher
            .launch(&request)
            .map_err(|err| TransferError::LaunchFailed(format!("{}: {err}", request.file_name())))?;
        let LaunchedProcess {
            mut child,
            output,
            own_group,
        } = launched;
        let signals = Arc::new(TransferSignals::default());
        let (done_tx, done_rx) = mpsc::channel();
        let monitor = match spawn_monitor(output, Box::new(PercentScraper), signals.clone(), done_tx)
        {
            Ok(monitor) => monitor,
            Err(err) => {
                terminate(&mut child, own_group);
                let _ = child.wait();
                return Err(TransferError::LaunchFailed(format!(
                    "{}: {err}",
                    request.file_name()
                )));
            }
        };
        let handle = TransferHandle {
            signals: signals.clone(),
            label: request.label(),
        };
        self.active = Some(ActiveTransfer {
            request,
            child,
            own_group,
            signals,
            monitor: Some(monitor),
            done: done_rx,
            exit: None,
        });
        self.phase = TransferPhase::Active;
        self.last_progress = 0;
        Ok(handle)
    }

    pub(crate) fn poll(&mut self) -> Option<TransferOutcome> {
        let active = self.active.as_mut()?;
        if active.exit.is_none() {
            match active.done.try_recv() {
                Ok(exit) => active.exit = Some(exit),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => active.exit = Some(MonitorExit::lost()),
            }
        }
        let status = match active.child.try_wait() {
            Ok(Some(status)) => Ok(status),
            Ok(None) => return None,
            Err(err) => Err(err),
        };
        let mut active = self.active.take()?;
        if let Some(monitor) = active.monitor.take() {
            let _ = monitor.join();
        }
        let exit = active.exit.take().unwrap_or_default();
        self.last_progress = active.signals.progress();
        let outcome = if exit.cancelled {
            TransferOutcome::Cancelled
        } else {
            match status {
                Ok(status) if status.success() && exit.read_error.is_none() => {
                    TransferOutcome::Completed
                }
                Ok(status) => TransferOutcome::Failed(failure_message(
                    &active.request,
                    exit,
                    status.to_string(),
                )),
                Err(err) => {
                    TransferOutcome::Failed(failure_message(&active.request, exit, err.to_string()))
                }
            }
        };
        self.phase = match outcome {
            TransferOutcome::Completed => TransferPhase::Completed,
            TransferOutcome::Failed(_) => TransferPhase::Failed,
            TransferOutcome::Cancelled => TransferPhase::Idle,
        };
        Some(outcome)
    }

    /// Stops the running transfer and returns once its monitor thread has
    /// ended and the process is reaped. A transfer that already finished is
    /// finalised normally instead. Idle engines return `None`.
    pub(crate) fn cancel(&mut self) -> Option<TransferOutcome> {
        if let Some(outcome) = self.poll() {
            return Some(outcome);
        }
        let mut active = self.active.take()?;
        let frozen = active.signals.progress();
        active.signals.request_cancel();
        terminate(&mut active.child, active.own_group);
        if let Some(monitor) = active.monitor.take() {
            let _ = monitor.join();
        }
        let _ = active.child.wait();
        self.last_progress = frozen;
        self.phase = TransferPhase::Idle;
        Some(TransferOutcome::Cancelled)
    }

    /// True while the slot is held, which is exactly when `start` rejects.
    /// The slot is released by `poll` or `cancel`, never by the monitor alone.
    pub(crate) fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn progress(&self) -> u8 {
        match &self.active {
            Some(active) => active.signals.progress(),
            None => self.last_progress,
        }
    }

    /// `Active` while the slot is held, otherwise how the last transfer
    /// ended: `Completed`, `Failed`, or `Idle` after a cancel or before any.
    pub(crate) fn phase(&self) -> TransferPhase {
        self.phase
    }

    pub(crate) fn current_label(&self) -> Option<String> {
        self.active.as_ref().map(|active| active.request.label())
    }
}

impl Drop for TransferEngine {
    fn drop(&mut self) {
        let _ = self.cancel();
    }
}

fn failure_message(request: &TransferRequest, exit: MonitorExit, fallback: String) -> String {
    let detail = exit.read_error.or(exit.last_line).unwrap_or(fallback);
    format!("{}: {detail}", request.file_name())
}

fn terminate(child: &mut Child, own_group: bool) {
    #[cfg(unix)]
    {
        if let (true, Ok(pid)) = (own_group, libc::pid_t::try_from(child.id())) {
            // SAFETY: kill(2) only takes plain integers. The child is not reaped
            // yet, so its pid still names the group it leads.
            unsafe {
                libc::kill(-pid, libc::SIGTERM);
            }
        }
    }
    #[cfg(not(unix))]
    let _ = own_group;
    let _ = child.kill();
}
