//! Explicit scheduled-task handles with cancellation.
//!
//! Debounce, backoff, and toast dismissal all need "run this later, unless
//! superseded". Instead of closures overwriting a shared timer variable,
//! every scheduled task returns a [`TaskHandle`] whose cancellation token
//! deterministically stops the pending run.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval for the cancellation token while a task waits out its delay.
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Handle to one pending task. Dropping the handle does NOT cancel the task;
/// cancellation is always an explicit call.
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl TaskHandle {
    /// Cancel the pending run. A task already past its delay is not
    /// interrupted; one still waiting will never fire.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Wait for the task to finish (fire or get cancelled).
    pub fn join(mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Run `task` after `delay`, unless cancelled first.
pub fn schedule_once<F>(delay: Duration, task: F) -> TaskHandle
where
    F: FnOnce() + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let token = Arc::clone(&cancelled);

    let thread = thread::Builder::new()
        .name("scheduled-task".into())
        .spawn(move || {
            let deadline = Instant::now() + delay;
            while Instant::now() < deadline {
                if token.load(Ordering::Acquire) {
                    return;
                }
                let remaining = deadline.saturating_duration_since(Instant::now());
                thread::sleep(remaining.min(CANCEL_POLL));
            }
            if !token.load(Ordering::Acquire) {
                task();
            }
        })
        .expect("spawn scheduled task thread");

    TaskHandle {
        cancelled,
        thread: Some(thread),
    }
}

/// Coalesces bursts of calls into one run after a quiet period.
///
/// Each `call` cancels the previously pending task and schedules a fresh
/// one, so only the last closure of a burst fires.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<TaskHandle>>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn call<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut guard = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(handle) = guard.as_mut() {
            handle.cancel();
        }
        *guard = Some(schedule_once(self.delay, task));
    }

    /// Cancel any pending run (form closed, component torn down).
    pub fn cancel(&self) {
        let mut guard = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(handle) = guard.as_mut() {
            handle.cancel();
        }
        *guard = None;
    }

    /// Block until a pending run completes, if any. Test helper.
    pub fn flush(&self) {
        let handle = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.join();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn task_fires_after_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = schedule_once(Duration::from_millis(20), move || {
            flag.store(true, Ordering::SeqCst);
        });
        handle.join();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn cancelled_task_never_fires() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let mut handle = schedule_once(Duration::from_millis(200), move || {
            flag.store(true, Ordering::SeqCst);
        });
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn debounce_coalesces_bursts_to_the_last_call() {
        let count = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(30));

        for i in 1..=5 {
            let count = Arc::clone(&count);
            let last = Arc::clone(&last);
            debouncer.call(move || {
                count.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            });
            thread::sleep(Duration::from_millis(5));
        }
        debouncer.flush();

        assert_eq!(count.load(Ordering::SeqCst), 1, "only one tick may fire");
        assert_eq!(last.load(Ordering::SeqCst), 5, "the surviving tick is the last");
    }

    #[test]
    fn debouncer_cancel_suppresses_pending_run() {
        let count = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let counter = Arc::clone(&count);
        debouncer.call(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();
        thread::sleep(Duration::from_millis(150));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
