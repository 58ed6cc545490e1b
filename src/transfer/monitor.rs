use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

const READ_CHUNK: usize = 4096;

/// Turns one line of transfer-tool output into a percentage, if it carries one.
///
/// The result is an estimate scraped from verbose output. Values can jump
/// around and even go backwards between lines.
pub(crate) trait ProgressEstimator: Send {
    fn observe(&mut self, line: &str) -> Option<u8>;
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PercentScraper;

impl ProgressEstimator for PercentScraper {
    fn observe(&mut self, line: &str) -> Option<u8> {
        scrape_percent(line)
    }
}

pub(crate) fn scrape_percent(line: &str) -> Option<u8> {
    let idx = line.find('%')?;
    let head = &line[..idx];
    let digits = head.bytes().rev().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value: u32 = head[idx - digits..].parse().ok()?;
    u8::try_from(value).ok().filter(|value| *value <= 100)
}

#[derive(Debug, Default)]
pub(crate) struct TransferSignals {
    progress: AtomicU8,
    cancel: AtomicBool,
}

impl TransferSignals {
    pub(crate) fn progress(&self) -> u8 {
        self.progress.load(Ordering::Acquire)
    }

    pub(crate) fn set_progress(&self, value: u8) {
        self.progress.store(value.min(100), Ordering::Release);
    }

    pub(crate) fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MonitorExit {
    pub(crate) cancelled: bool,
    pub(crate) last_line: Option<String>,
    pub(crate) read_error: Option<String>,
}

impl MonitorExit {
    pub(crate) fn lost() -> Self {
        Self {
            read_error: Some("progress monitor stopped unexpectedly".to_string()),
            ..Self::default()
        }
    }
}

pub(crate) fn spawn_monitor(
    output: Box<dyn Read + Send>,
    mut estimator: Box<dyn ProgressEstimator>,
    signals: Arc<TransferSignals>,
    done: Sender<MonitorExit>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("transfer-monitor".to_string())
        .spawn(move || {
            let exit = watch(output, estimator.as_mut(), &signals);
            let _ = done.send(exit);
        })
}

/// Consumes the stream until it closes or cancellation is requested. Lines end
/// at `\n` or `\r`. A stream that closes on its own leaves progress at 100.
pub(crate) fn watch(
    mut output: impl Read,
    estimator: &mut dyn ProgressEstimator,
    signals: &TransferSignals,
) -> MonitorExit {
    let mut exit = MonitorExit::default();
    let mut chunk = [0u8; READ_CHUNK];
    let mut pending = Vec::new();
    loop {
        if signals.is_cancelled() {
            break;
        }
        match output.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => {
                for &byte in &chunk[..read] {
                    if byte == b'\n' || byte == b'\r' {
                        observe_line(&pending, estimator, signals, &mut exit);
                        pending.clear();
                    } else {
                        pending.push(byte);
                    }
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                exit.read_error = Some(err.to_string());
                break;
            }
        }
    }
    observe_line(&pending, estimator, signals, &mut exit);
    exit.cancelled = signals.is_cancelled();
    if !exit.cancelled {
        signals.set_progress(100);
    }
    exit
}

fn observe_line(
    raw: &[u8],
    estimator: &mut dyn ProgressEstimator,
    signals: &TransferSignals,
    exit: &mut MonitorExit,
) {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if let Some(percent) = estimator.observe(line) {
        signals.set_progress(percent);
    } else if !line.starts_with("debug") {
        exit.last_line = Some(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    #[derive(Default)]
    struct Recorder {
        lines: Vec<String>,
        values: Vec<u8>,
    }

    impl ProgressEstimator for Recorder {
        fn observe(&mut self, line: &str) -> Option<u8> {
            self.lines.push(line.to_string());
            let value = scrape_percent(line);
            self.values.extend(value);
            value
        }
    }

    #[test]
    fn scrape_percent_reads_digits_before_first_percent() {
        assert_eq!(scrape_percent("report.pdf   42%  1.2MB  0:03 ETA"), Some(42));
        assert_eq!(scrape_percent("0%"), Some(0));
        assert_eq!(scrape_percent("100%"), Some(100));
        assert_eq!(scrape_percent("file 7% then 90%"), Some(7));
        assert_eq!(scrape_percent("v2.5%"), Some(5));
        assert_eq!(scrape_percent("101%"), None);
        assert_eq!(scrape_percent("99999999999999999999%"), None);
        assert_eq!(scrape_percent("no digits %"), None);
        assert_eq!(scrape_percent("debug1: Sending command"), None);
    }

    #[test]
    fn watch_splits_on_carriage_returns_and_floors_at_completion() {
        let stream = "debug1: start\nfile  10%\rfile  55%\rfile  30%\nscp: done\n";
        let signals = TransferSignals::default();
        let mut recorder = Recorder::default();
        let exit = watch(Cursor::new(stream), &mut recorder, &signals);
        assert_eq!(recorder.values, vec![10, 55, 30]);
        assert_eq!(recorder.lines.len(), 5);
        assert!(!exit.cancelled);
        assert_eq!(exit.last_line.as_deref(), Some("scp: done"));
        assert_eq!(signals.progress(), 100);
    }

    #[test]
    fn watch_handles_unterminated_last_line_and_bad_utf8() {
        let mut stream = b"abc \xff\xfe 12%\npartial 64%".to_vec();
        stream.push(b'%');
        let signals = TransferSignals::default();
        let mut recorder = Recorder::default();
        watch(Cursor::new(stream), &mut recorder, &signals);
        assert_eq!(recorder.values, vec![12, 64]);
        assert_eq!(signals.progress(), 100);
    }

    #[test]
    fn cancelled_watch_keeps_progress() {
        let signals = TransferSignals::default();
        signals.set_progress(37);
        signals.request_cancel();
        let exit = watch(Cursor::new("file 80%\n"), &mut PercentScraper, &signals);
        assert!(exit.cancelled);
        assert_eq!(signals.progress(), 37);
    }

    #[test]
    fn spawned_monitor_reports_once() {
        let signals = Arc::new(TransferSignals::default());
        let (tx, rx) = mpsc::channel();
        let handle = spawn_monitor(
            Box::new(Cursor::new("x 5%\nbye\n")),
            Box::new(PercentScraper),
            signals.clone(),
            tx,
        )
        .unwrap();
        handle.join().unwrap();
        let exit = rx.recv().unwrap();
        assert_eq!(exit.last_line.as_deref(), Some("bye"));
        assert!(rx.try_recv().is_err());
        assert_eq!(signals.progress(), 100);
    }
}
