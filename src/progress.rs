//! Progress-callback trait for per-chunk parse events.
//!
//! Inject an [`Arc<dyn ParseProgressCallback>`] via
//! [`crate::config::ParseConfigBuilder::progress_callback`] to receive
//! events as each chunk (or file) is parsed.
//!
//! # Example
//!
//! ```rust
//! use mcq2slots::{ParseConfig, ParseProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     questions: Arc<AtomicUsize>,
//! }
//!
//! impl ParseProgressCallback for CountingCallback {
//!     fn on_chunk_complete(&self, _index: usize, _total: usize, name: &str, questions: usize) {
//!         self.questions.fetch_add(questions, Ordering::SeqCst);
//!         eprintln!("{name}: {questions} questions");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     questions: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ParseConfig::builder()
//!     .progress_callback(counter as Arc<dyn ParseProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the parse entry points as each chunk is processed.
///
/// Implementations must be `Send + Sync`: [`crate::parse::process_files`]
/// parses files concurrently, so events for different files may arrive
/// from different tasks and out of order. All methods default to no-ops.
pub trait ParseProgressCallback: Send + Sync {
    /// Called once before any chunk is parsed.
    ///
    /// # Arguments
    /// * `total_chunks`: number of chunks (or files) that will be processed
    fn on_run_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called just before a chunk is parsed.
    ///
    /// # Arguments
    /// * `index`: 1-indexed chunk position
    /// * `total`: total chunks
    /// * `name` : chunk name (or its positional default)
    fn on_chunk_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a chunk was parsed and filled without error.
    ///
    /// # Arguments
    /// * `questions`: number of question records emitted for the chunk
    fn on_chunk_complete(&self, index: usize, total: usize, name: &str, questions: usize) {
        let _ = (index, total, name, questions);
    }

    /// Called when processing a chunk failed; siblings continue.
    fn on_chunk_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every chunk has been attempted.
    fn on_run_complete(&self, total_chunks: usize, success_count: usize) {
        let _ = (total_chunks, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ParseProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ParseConfig`].
pub type ProgressCallback = Arc<dyn ParseProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: Arc<AtomicUsize>,
        completes: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
        questions: Arc<AtomicUsize>,
    }

    impl ParseProgressCallback for TrackingCallback {
        fn on_chunk_start(&self, _index: usize, _total: usize, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_complete(&self, _index: usize, _total: usize, _name: &str, questions: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.questions.fetch_add(questions, Ordering::SeqCst);
        }

        fn on_chunk_error(&self, _index: usize, _total: usize, _name: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(2);
        cb.on_chunk_start(1, 2, "doc1");
        cb.on_chunk_complete(1, 2, "doc1", 5);
        cb.on_chunk_error(2, 2, "doc2", "sink full");
        cb.on_run_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: Arc::new(AtomicUsize::new(0)),
            completes: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
            questions: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_chunk_start(1, 2, "doc1");
        tracker.on_chunk_complete(1, 2, "doc1", 3);
        tracker.on_chunk_start(2, 2, "doc2");
        tracker.on_chunk_error(2, 2, "doc2", "slot 4 rejected");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.questions.load(Ordering::SeqCst), 3);
    }
}
