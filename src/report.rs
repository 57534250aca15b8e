//! Elapsed-time progress reporting.
//!
//! The original operator workflow watches plain stdout lines of the form
//! `[MM:SS.mmm] message`, so progress stays on stdout; the same events are
//! mirrored to `tracing` for structured logs.

use std::time::{Duration, Instant};

/// Emits progress messages annotated with elapsed wall-clock time.
///
/// The clock is monotonic: successive [`Reporter::elapsed`] calls never go
/// backwards.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    start: Instant,
}

impl Reporter {
    /// Creates a reporter whose clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Creates a reporter with an explicit timing origin.
    #[must_use]
    pub fn from_origin(start: Instant) -> Self {
        Self { start }
    }

    /// Elapsed time since the reporter's origin.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Prints a progress line for the operator and mirrors it to tracing.
    pub fn progress(&self, message: &str) {
        let elapsed = self.elapsed();
        println!("[{}] {message}", format_elapsed(elapsed));
        tracing::info!(elapsed_ms = elapsed.as_secs_f64() * 1000.0, "{message}");
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a duration as `MM:SS.mmm`, rolling minutes past 99 as-is.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let millis = elapsed.subsec_millis();
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(0)), "00:00.000");
        assert_eq!(format_elapsed(Duration::from_millis(1_500)), "00:01.500");
        assert_eq!(format_elapsed(Duration::from_secs(61)), "01:01.000");
        assert_eq!(format_elapsed(Duration::from_secs(6_000)), "100:00.000");
    }

    #[test]
    fn test_elapsed_is_non_decreasing() {
        let reporter = Reporter::new();
        let mut previous = reporter.elapsed();
        for _ in 0..10 {
            let next = reporter.elapsed();
            assert!(next >= previous);
            previous = next;
        }
    }
}
