//! Progress reporting for the import phases.
//!
//! Interactive runs get indicatif bars; log-only runs hide them and emit
//! periodic `log` lines instead, which read better when output is tailed.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use std::time::Duration;

/// Rows between log lines in log-only mode.
const LOG_INTERVAL: u64 = 1_000;

const BAR_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})";

/// How progress is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressMode {
    #[default]
    Bars,
    LogOnly,
}

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Progress over a known number of rows.
pub struct PhaseProgress {
    bar: ProgressBar,
    mode: ProgressMode,
    phase: &'static str,
    done: u64,
    total: u64,
}

impl PhaseProgress {
    pub fn new(mode: ProgressMode, phase: &'static str, total: u64) -> Self {
        let bar = ProgressBar::new(total);
        match mode {
            ProgressMode::LogOnly => bar.set_draw_target(ProgressDrawTarget::hidden()),
            ProgressMode::Bars => {
                if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                    bar.set_style(style.progress_chars("=> "));
                }
            }
        }
        bar.set_message(phase);
        Self {
            bar,
            mode,
            phase,
            done: 0,
            total,
        }
    }

    pub fn inc(&mut self) {
        self.done += 1;
        self.bar.inc(1);
        if self.mode == ProgressMode::LogOnly
            && (self.done % LOG_INTERVAL == 0 || self.done == self.total)
        {
            let pct = 100.0 * self.done as f64 / self.total.max(1) as f64;
            info!("[{}] {}/{} ({:.1}%)", self.phase, self.done, self.total, pct);
        }
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.done
    }

    pub fn finish(self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Spinner for a step of unknown length; hidden in log-only mode.
pub fn spinner(mode: ProgressMode, msg: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    match mode {
        ProgressMode::LogOnly => pb.set_draw_target(ProgressDrawTarget::hidden()),
        ProgressMode::Bars => {
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{msg} {spinner} [{elapsed_precise}]")
            {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(100));
        }
    }
    pb.set_message(msg);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn test_phase_progress_counts() {
        let mut progress = PhaseProgress::new(ProgressMode::LogOnly, "insert", 3);
        progress.inc();
        progress.inc();
        assert_eq!(progress.position(), 2);
        progress.finish("done".to_string());
    }
}
