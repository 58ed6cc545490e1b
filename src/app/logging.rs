use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{Datelike, NaiveDateTime};

use crate::app::constants::{
    LOG_MAX_ENTRIES, LOG_MAX_IN_MEMORY, LOG_PARSE_FORMAT, LOG_RETENTION_DAYS, LOG_SEPARATOR,
    LOG_TIMESTAMP_FORMAT,
};
use crate::app::{App, HeaderMode};

impl App {
    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.log_line(&message);
        self.status = message;
    }

    pub(crate) fn log_line(&mut self, message: &str) {
        let line = stamp(message);
        append_line(&self.log_path, &line);
        self.last_log = line.clone();
        self.log_lines.push_back(line);
        while self.log_lines.len() > LOG_MAX_IN_MEMORY {
            self.log_lines.pop_front();
        }
    }

    pub(crate) fn toggle_log_view(&mut self) {
        self.header_mode = match self.header_mode {
            HeaderMode::Help => HeaderMode::Logs,
            HeaderMode::Logs => HeaderMode::Help,
        };
    }
}

fn stamp(message: &str) -> String {
    let timestamp = chrono::Local::now().format(LOG_TIMESTAMP_FORMAT);
    format!("{timestamp}{LOG_SEPARATOR}{message}")
}

fn append_line(path: &Path, line: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{line}");
    }
}

pub(crate) fn retain_recent(content: &str, now: NaiveDateTime) -> Vec<String> {
    let cutoff = now - chrono::Duration::days(LOG_RETENTION_DAYS);
    let year = now.year();
    let mut kept: Vec<String> = content
        .lines()
        .filter(|line| {
            let Some((timestamp, _)) = line.split_once(LOG_SEPARATOR) else {
                return false;
            };
            // the stored stamp has no year; a December line read in January
            // parses as next December and falls back one year
            let parse = |year: i32| {
                NaiveDateTime::parse_from_str(&format!("{year}-{timestamp}"), LOG_PARSE_FORMAT).ok()
            };
            match parse(year) {
                Some(parsed) if parsed <= now => parsed >= cutoff,
                Some(_) => parse(year - 1).is_some_and(|parsed| parsed >= cutoff),
                None => false,
            }
        })
        .map(str::to_string)
        .collect();
    if kept.len() > LOG_MAX_ENTRIES {
        kept.drain(..kept.len() - LOG_MAX_ENTRIES);
    }
    kept
}

pub(crate) fn prune_log_file(path: &Path) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    let kept = retain_recent(&content, chrono::Local::now().naive_local());
    if kept.is_empty() {
        let _ = fs::remove_file(path);
    } else {
        let _ = fs::write(path, kept.join("\n") + "\n");
    }
}
