//! Cooperative cancellation and progress notification.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable cancellation flag shared between a caller and a running call.
///
/// Algorithms poll it at well-defined points (once per rectangle, or once per
/// generation); it never interrupts a geometric update half-way.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }
    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
    /// Clears a previous request so the token can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

/// Listener invoked with `(source, new_progress)`.
pub type ProgressCallback = Box<dyn FnMut(&str, u8) + Send>;

/// Instance-scoped progress value (0..=100) plus registered listeners.
pub struct ProgressReporter {
    source: &'static str,
    progress: u8,
    listeners: Vec<ProgressCallback>,
}

impl ProgressReporter {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            progress: 0,
            listeners: Vec::new(),
        }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn get(&self) -> u8 {
        self.progress
    }

    pub fn subscribe(&mut self, callback: ProgressCallback) {
        self.listeners.push(callback);
    }

    /// Stores `value` (clamped to 100) and notifies listeners in registration order.
    pub fn report(&mut self, value: u8) {
        self.progress = value.min(100);
        for listener in self.listeners.iter_mut() {
            listener(self.source, self.progress);
        }
    }

    /// Reports `done` out of `total` units of work.
    pub fn report_fraction(&mut self, done: usize, total: usize) {
        self.report(percent(done, total));
    }

    /// Resets to 0 and notifies listeners if the value changed.
    pub fn reset(&mut self) {
        if self.progress != 0 {
            self.report(0);
        }
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("source", &self.source)
            .field("progress", &self.progress)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// `done * 100 / total`, multiplied before dividing so small totals still
/// advance; an empty workload counts as finished.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) as u64 * 100) / total as u64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn percent_is_proportional_for_small_totals() {
        assert_eq!(percent(0, 3), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn listeners_receive_source_and_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut reporter = ProgressReporter::new("test");
        reporter.subscribe(Box::new(move |src, p| {
            sink.lock().unwrap().push((src.to_string(), p));
        }));
        reporter.report_fraction(1, 2);
        reporter.report(150);
        reporter.reset();
        reporter.reset();
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("test".to_string(), 50),
                ("test".to_string(), 100),
                ("test".to_string(), 0)
            ]
        );
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
        other.reset();
        assert!(!token.is_cancelled());
    }
}
