use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Width of the textual bar, in columns.
const BAR_WIDTH: usize = 50;

/// Turns byte counts into whole percentages, yielding only changes.
#[derive(Debug, Default)]
pub struct PercentTracker {
    last: Option<u8>,
}

impl PercentTracker {
    /// Returns the new percentage if it differs from the last one reported.
    ///
    /// A zero total yields nothing. `done` past `total` counts as 100%.
    pub fn update(&mut self, done: u64, total: u64) -> Option<u8> {
        if total == 0 {
            return None;
        }
        let pct = (u128::from(done.min(total)) * 100 / u128::from(total)) as u8;
        if self.last == Some(pct) {
            return None;
        }
        self.last = Some(pct);
        Some(pct)
    }

    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Unset,
    Percent,
    Bytes,
}

/// Progress display threaded through a download.
///
/// With a known size it draws `[=====     ] 42%` and redraws only when the
/// integer percentage moves. Without one it falls back to a byte counter.
pub struct DownloadProgress {
    bar: ProgressBar,
    tracker: PercentTracker,
    scale: Scale,
}

fn percent_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(&format!("[{{bar:{BAR_WIDTH}}}] {{pos}}%"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("= ")
}

fn bytes_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner} {bytes} downloaded")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl DownloadProgress {
    /// Draw to stderr.
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Track progress without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            bar: ProgressBar::with_draw_target(Some(100), target),
            tracker: PercentTracker::default(),
            scale: Scale::Unset,
        }
    }

    /// Report `done` bytes received out of `total`, if the server sent a size.
    pub fn update(&mut self, done: u64, total: Option<u64>) {
        match total.filter(|t| *t > 0) {
            Some(total) => {
                if self.scale != Scale::Percent {
                    self.bar.set_style(percent_style());
                    self.bar.set_length(100);
                    self.scale = Scale::Percent;
                }
                if let Some(pct) = self.tracker.update(done, total) {
                    self.bar.set_position(u64::from(pct));
                }
            }
            None => {
                if self.scale != Scale::Bytes {
                    self.bar.set_style(bytes_style());
                    self.bar.set_length(u64::MAX);
                    self.scale = Scale::Bytes;
                }
                self.bar.set_position(done);
            }
        }
    }

    /// Last percentage drawn, `None` if the size was never known.
    pub fn percent(&self) -> Option<u8> {
        self.tracker.last()
    }

    /// Leave the final state on screen.
    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Stop updating and leave the bar as last drawn, e.g. after a failed download.
    pub fn abandon(&self) {
        self.bar.abandon();
    }

    /// Run `f` with the bar hidden so its stderr output doesn't tear the redraw.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new()
    }
}
