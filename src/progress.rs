//! Progress-callback trait for per-page pipeline events.
//!
//! Inject an [`Arc<dyn PrepProgressCallback>`] via
//! [`crate::config::PrepConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline walks the document.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a channel, a database record, or a terminal
//! progress bar — without the library knowing anything about how the host
//! application communicates. The trait is `Send + Sync` because the page
//! loop runs on a blocking worker thread, not the caller's thread.

use std::sync::Arc;

/// Called by the pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are processed strictly in order, so events
/// for page N always arrive before events for page N+1.
pub trait PrepProgressCallback: Send + Sync {
    /// Called once before any page is rendered.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be processed
    fn on_run_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is rasterised.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page finished without error.
    ///
    /// # Arguments
    /// * `written` — output images produced (0 when every sub-image was blank)
    /// * `blank`   — sub-images classified blank and skipped
    fn on_page_complete(&self, page_num: usize, total_pages: usize, written: usize, blank: usize) {
        let _ = (page_num, total_pages, written, blank);
    }

    /// Called when a page is skipped due to a non-fatal error.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after all pages have been attempted.
    fn on_run_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PrepProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PrepConfig`].
pub type ProgressCallback = Arc<dyn PrepProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        blanks: AtomicUsize,
    }

    impl PrepProgressCallback for TrackingCallback {
        fn on_page_start(&self, _page_num: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_num: usize, _total: usize, _written: usize, blank: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.blanks.fetch_add(blank, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page_num: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(5);
        cb.on_page_start(1, 5);
        cb.on_page_complete(1, 5, 2, 0);
        cb.on_page_error(2, 5, "some error");
        cb.on_run_complete(5, 4);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            blanks: AtomicUsize::new(0),
        };

        tracker.on_page_start(1, 3);
        tracker.on_page_complete(1, 3, 2, 0);
        tracker.on_page_start(2, 3);
        tracker.on_page_complete(2, 3, 1, 1);
        tracker.on_page_start(3, 3);
        tracker.on_page_error(3, 3, "render glitch");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.blanks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Arc<dyn PrepProgressCallback>>();
        let cb: Arc<dyn PrepProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
    }
}
