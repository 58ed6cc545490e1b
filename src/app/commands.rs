use anyhow::Result;

use crate::app::constants::{
    CANCEL_PROMPT, STATUS_ALREADY_ACTIVE, STATUS_CANCELLED, STATUS_COMPLETE, STATUS_NOT_CONNECTED,
};
use crate::app::{App, Interaction};
use crate::errors::TransferError;
use crate::model::{DirectoryListing, Focus, Notice, TransferDirection, TransferRequest};
use crate::paths::join_path;
use crate::transfer::{TransferHandle, TransferOutcome};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BatchReport {
    pub(crate) transferred: usize,
    pub(crate) failed: usize,
    pub(crate) skipped: usize,
    pub(crate) cancelled: bool,
}

pub(crate) fn effective_set(listing: &DirectoryListing) -> Vec<String> {
    let marked: Vec<String> = listing
        .marked()
        .filter(|entry| !entry.is_parent())
        .map(|entry| entry.name.clone())
        .collect();
    if !marked.is_empty() {
        return marked;
    }
    match listing.current() {
        Some(entry) if !entry.is_dir && !entry.is_parent() => vec![entry.name.clone()],
        _ => Vec::new(),
    }
}

impl App {
    pub(crate) fn download(&mut self, ui: &mut dyn Interaction) -> Result<Option<BatchReport>> {
        self.run_batch(TransferDirection::Download, ui)
    }

    pub(crate) fn upload(&mut self, ui: &mut dyn Interaction) -> Result<Option<BatchReport>> {
        self.run_batch(TransferDirection::Upload, ui)
    }

    fn run_batch(
        &mut self,
        direction: TransferDirection,
        ui: &mut dyn Interaction,
    ) -> Result<Option<BatchReport>> {
        self.poll_transfer();
        if self.engine.current_label().is_some() {
            self.set_status(STATUS_ALREADY_ACTIVE);
            return Ok(None);
        }
        let Some(host) = self.host.clone() else {
            self.set_status(STATUS_NOT_CONNECTED);
            return Ok(None);
        };
        let (source_side, dest_side) = match direction {
            TransferDirection::Download => (Focus::Remote, Focus::Local),
            TransferDirection::Upload => (Focus::Local, Focus::Remote),
        };
        let Some(dest_provider) = self.provider(dest_side) else {
            self.set_status(STATUS_NOT_CONNECTED);
            return Ok(None);
        };
        let names = effective_set(self.pane(source_side));
        if names.is_empty() {
            self.set_status(format!("Please select a file to {}", direction.noun()));
            return Ok(None);
        }
        let source_dir = self.pane(source_side).path.clone();
        let dest_dir = self.pane(dest_side).path.clone();

        let mut report = BatchReport::default();
        for name in names {
            let destination = join_path(&dest_dir, &name);
            let exists = match dest_provider.exists(&destination) {
                Ok(exists) => exists,
                Err(err) => {
                    self.log_line(&format!("Could not check {destination}: {err}"));
                    true
                }
            };
            if exists
                && !ui.confirm(self, &format!("File {name} already exists, overwrite? (y/n)"))?
            {
                self.log_line(&format!("Skipped {name}"));
                self.pane_mut(source_side).unmark(&name);
                report.skipped += 1;
                continue;
            }

            let request = TransferRequest {
                source: join_path(&source_dir, &name),
                destination,
                host: host.clone(),
                direction,
            };
            let handle = match self.engine.start(request) {
                Ok(handle) => handle,
                Err(TransferError::AlreadyActive) => {
                    self.set_status(STATUS_ALREADY_ACTIVE);
                    report.failed += 1;
                    break;
                }
                Err(err @ TransferError::LaunchFailed(_)) => {
                    self.log_line(&err.to_string());
                    self.set_status(format!("Unable to start transfer {name}"));
                    self.pane_mut(source_side).unmark(&name);
                    report.failed += 1;
                    continue;
                }
            };
            self.log_line(handle.label());
            self.transfer_line = handle.label().to_string();

            match self.follow_transfer(&handle, ui)? {
                TransferOutcome::Completed => {
                    self.log_line(&format!("Finished {name}"));
                    report.transferred += 1;
                }
                TransferOutcome::Failed(message) => {
                    self.set_status(format!("Transfer failed: {message}"));
                    report.failed += 1;
                }
                TransferOutcome::Cancelled => {
                    self.pane_mut(source_side).unmark(&name);
                    report.cancelled = true;
                    break;
                }
            }
            self.pane_mut(source_side).unmark(&name);
        }

        self.refresh(dest_side);
        if report.cancelled {
            self.transfer_line = STATUS_CANCELLED.to_string();
            self.set_status(STATUS_CANCELLED);
        } else if report.failed == 0 {
            self.transfer_line = STATUS_COMPLETE.to_string();
            self.set_status(format!(
                "{STATUS_COMPLETE}: {} transferred, {} skipped",
                report.transferred, report.skipped
            ));
        } else {
            self.transfer_line = format!("{} of {} failed", report.failed, report_total(&report));
            self.notice = Some(Notice {
                title: "Transfer failed".to_string(),
                message: self.status.clone(),
            });
        }
        Ok(Some(report))
    }

    fn follow_transfer(
        &mut self,
        handle: &TransferHandle,
        ui: &mut dyn Interaction,
    ) -> Result<TransferOutcome> {
        let label = handle.label();
        loop {
            if let Some(outcome) = self.engine.poll() {
                return Ok(outcome);
            }
            let wants_cancel = match ui.transfer_tick(self, label, handle.progress()) {
                Ok(wants_cancel) => wants_cancel,
                Err(err) => {
                    self.engine.cancel();
                    return Err(err);
                }
            };
            if !wants_cancel {
                continue;
            }
            let confirmed = match ui.confirm(self, CANCEL_PROMPT) {
                Ok(confirmed) => confirmed,
                Err(err) => {
                    self.engine.cancel();
                    return Err(err);
                }
            };
            if confirmed {
                let outcome = self.engine.cancel().unwrap_or(TransferOutcome::Cancelled);
                self.log_line(&format!("{label}: cancelled at {}%", self.engine.progress()));
                return Ok(outcome);
            }
        }
    }
}

fn report_total(report: &BatchReport) -> usize {
    report.transferred + report.failed + report.skipped
}
