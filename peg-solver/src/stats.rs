//! Search statistics tracking.

use std::time::{Duration, Instant};

/// Peak resident set size of this process in bytes.
/// Returns None if unable to determine.
#[cfg(unix)]
pub fn peak_memory_usage() -> Option<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage only writes into the provided struct.
    let usage = unsafe {
        if libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) != 0 {
            return None;
        }
        usage.assume_init()
    };
    let max_rss = u64::try_from(usage.ru_maxrss).ok()?;
    // Linux reports kilobytes, macOS bytes.
    if cfg!(target_os = "macos") {
        Some(max_rss)
    } else {
        Some(max_rss * 1024)
    }
}

#[cfg(not(unix))]
pub fn peak_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

/// Format a duration as `HH:MM:SS`.
pub fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Statistics collected during a search.
#[derive(Debug, Default)]
pub struct SearchStats {
    /// Moves played (first choices and alternatives)
    pub moves_applied: u64,

    /// Moves taken back
    pub moves_undone: u64,

    /// Positions with no legal move short of the target
    pub dead_ends: u64,

    /// Positions abandoned by the leg-loss check
    pub problems_detected: u64,

    /// Frames whose alternatives all failed
    pub frames_exhausted: u64,

    /// Deepest move stack reached
    pub max_depth: u64,

    /// Fewest pins left at any dead end
    pub best_pins: usize,

    /// For rate calculation
    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_dead_ends: u64,
}

impl SearchStats {
    pub fn new(initial_pins: usize) -> Self {
        Self {
            best_pins: initial_pins,
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record a dead end. Returns true if it set a new best.
    pub fn record_dead_end(&mut self, num_pins: usize) -> bool {
        self.dead_ends += 1;
        if num_pins < self.best_pins {
            self.best_pins = num_pins;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn record_depth(&mut self, depth: usize) {
        self.max_depth = self.max_depth.max(depth as u64);
    }

    /// Time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// Get current dead ends per second
    pub fn dead_ends_per_sec(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.dead_ends as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Check if `dead_ends` just crossed a logging interval.
    #[inline]
    pub fn should_log(&self, interval: u64) -> bool {
        interval > 0 && self.dead_ends % interval == 0
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, num_pins: usize, depth: usize) {
        let now = Instant::now();

        // Rate since last log
        let rate = match self.last_log_time {
            Some(last) => {
                let elapsed = last.elapsed().as_secs_f64();
                let dead_ends = self.dead_ends - self.last_log_dead_ends;
                if elapsed > 0.0 {
                    dead_ends as f64 / elapsed
                } else {
                    0.0
                }
            }
            None => self.dead_ends_per_sec(),
        };

        let mem_str = peak_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        log::info!(
            "[{}] dead_ends={} best={} pins={} depth={} rate={:.0}/s problems={}{}",
            format_clock(self.elapsed()),
            self.dead_ends,
            self.best_pins,
            num_pins,
            depth,
            rate,
            self.problems_detected,
            mem_str,
        );

        self.last_log_time = Some(now);
        self.last_log_dead_ends = self.dead_ends;
    }

    /// Log final summary
    pub fn log_summary(&self) {
        log::info!("Moves applied: {}", self.moves_applied);
        log::info!("Moves undone: {}", self.moves_undone);
        log::info!("Dead ends: {}", self.dead_ends);
        log::info!("Problems detected: {}", self.problems_detected);
        log::info!("Frames exhausted: {}", self.frames_exhausted);
        log::info!("Max depth: {}", self.max_depth);
        log::info!("Best pins at a dead end: {}", self.best_pins);
        log::info!(
            "Average rate: {:.0} dead ends/sec",
            self.dead_ends_per_sec()
        );
    }
}
