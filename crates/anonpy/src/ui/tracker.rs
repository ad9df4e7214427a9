use std::sync::Mutex;
use std::time::Duration;

use anonpy_fetch::{ProgressReporter, TransferProgress};
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

const PB_STYLE: &str = concat!(
    "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] ",
    "{wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})"
);

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .ok()
        .map(|style| style.tick_chars(TICK))
});

/// One progress bar per transfer, drawn on stderr.
#[derive(Default)]
pub struct BarReporter {
    pb: Mutex<Option<ProgressBar>>,
}

impl BarReporter {
    pub fn new() -> Self { Self::default() }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.pb.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }
}

impl ProgressReporter for BarReporter {
    fn start(&self, progress: &TransferProgress) {
        let pb = match progress.total_bytes {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::no_length(),
        };
        if let Some(style) = PB_TEMPLATE.as_ref() {
            pb.set_style(style.clone());
        }
        pb.set_prefix(progress.label.clone());

        if let Ok(mut guard) = self.pb.lock() {
            if let Some(previous) = guard.replace(pb) {
                previous.finish();
            }
        }
    }

    fn advance(&self, _delta: u64, progress: &TransferProgress) {
        self.with_bar(|pb| pb.set_position(progress.bytes_transferred));
    }

    fn finish(&self, progress: &TransferProgress) {
        if let Ok(mut guard) = self.pb.lock() {
            if let Some(pb) = guard.take() {
                pb.set_position(progress.bytes_transferred);
                pb.finish();
            }
        }
    }
}

/// Spinner shown while waiting on metadata; hidden when `enabled` is false.
pub fn spinner(enabled: bool, message: &'static str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Some(style) = SPINNER_TEMPLATE.as_ref() {
        pb.set_style(style.clone());
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_parse() {
        assert!(PB_TEMPLATE.is_some());
        assert!(SPINNER_TEMPLATE.is_some());
    }

    #[test]
    fn bar_follows_progress() {
        let reporter = BarReporter::new();
        let mut progress = TransferProgress::new("a.bin", Some(10));
        reporter.start(&progress);

        progress.bytes_transferred = 5;
        reporter.advance(5, &progress);
        let position = reporter.pb.lock().unwrap().as_ref().map(ProgressBar::position);
        assert_eq!(position, Some(5));

        progress.bytes_transferred = 10;
        reporter.finish(&progress);
        assert!(reporter.pb.lock().unwrap().is_none());
    }
}
