//! Per-folder reader/writer monitor.
//!
//! Readers and a writer never coexist; any number of readers can
//! coexist with each other. Admission is fair in both directions: a
//! waiting writer blocks new readers from jumping the queue, and a
//! writer that exits wakes every waiting reader at once before ever
//! considering another writer.
//!
//! Hand-off accounting: when an exiting holder wakes waiters, it counts
//! them as already holding rights (`readers_active`/`writers_active`
//! are bumped at hand-off time, not when the waiter physically resumes
//! from `Condvar::wait`). Spec text for this protocol describes the
//! counters as incrementing on resume instead; doing it that way leaves
//! a window between "a reader has been promised entry" and "the reader
//! has actually resumed" during which a concurrent `reader_exit` could
//! see the active count at zero and wrongly hand off to a writer while
//! the promised reader is still mid-wakeup. Bumping at hand-off time
//! closes that window — a waiter's own `reader_pass`/`writer_pass`
//! check on resume is then pure bookkeeping, not an admission decision.
//!
//! `readers_waiting`/`writers_waiting`, by contrast, are decremented
//! only by the waiter itself as it resumes from `wait` — never reset by
//! the exiting holder that woke it. Zeroing `readers_waiting` at
//! hand-off time (instead of letting each of the N handed-off readers
//! decrement it once on resume) would underflow the moment the first
//! of them woke up.

use std::sync::{Condvar, Mutex};

struct State {
    readers_active: usize,
    writers_active: usize,
    readers_waiting: usize,
    writers_waiting: usize,
    reader_pass: usize,
    writer_pass: bool,
}

pub(crate) struct Monitor {
    state: Mutex<State>,
    cv_read: Condvar,
    cv_write: Condvar,
}

impl Monitor {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                readers_active: 0,
                writers_active: 0,
                readers_waiting: 0,
                writers_waiting: 0,
                reader_pass: 0,
                writer_pass: false,
            }),
            cv_read: Condvar::new(),
            cv_write: Condvar::new(),
        }
    }

    pub(crate) fn reader_enter(&self) {
        let mut state = self.state.lock().expect("monitor mutex poisoned");
        loop {
            if state.reader_pass > 0 {
                state.reader_pass -= 1;
                return;
            }
            if state.writers_active == 0 && state.writers_waiting == 0 {
                state.readers_active += 1;
                return;
            }
            state.readers_waiting += 1;
            state = self.cv_read.wait(state).expect("monitor mutex poisoned");
            state.readers_waiting -= 1;
        }
    }

    pub(crate) fn reader_exit(&self) {
        let mut state = self.state.lock().expect("monitor mutex poisoned");
        state.readers_active -= 1;
        if state.readers_active == 0 && state.writers_active == 0 {
            if state.writers_waiting > 0 {
                state.writers_active = 1;
                state.writer_pass = true;
                self.cv_write.notify_one();
            } else if state.readers_waiting > 0 {
                let handed_off = state.readers_waiting;
                state.readers_active += handed_off;
                state.reader_pass = handed_off;
                self.cv_read.notify_all();
            }
        }
    }

    pub(crate) fn writer_enter(&self) {
        let mut state = self.state.lock().expect("monitor mutex poisoned");
        loop {
            if state.writer_pass {
                state.writer_pass = false;
                return;
            }
            if state.readers_active == 0
                && state.writers_active == 0
                && state.readers_waiting == 0
                && state.writers_waiting == 0
            {
                state.writers_active = 1;
                return;
            }
            state.writers_waiting += 1;
            state = self.cv_write.wait(state).expect("monitor mutex poisoned");
            state.writers_waiting -= 1;
        }
    }

    pub(crate) fn writer_exit(&self) {
        let mut state = self.state.lock().expect("monitor mutex poisoned");
        state.writers_active = 0;
        if state.readers_waiting > 0 {
            let handed_off = state.readers_waiting;
            state.readers_active += handed_off;
            state.reader_pass = handed_off;
            self.cv_read.notify_all();
        } else if state.writers_waiting > 0 {
            state.writers_active = 1;
            state.writer_pass = true;
            self.cv_write.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn readers_run_concurrently() {
        let monitor = Arc::new(Monitor::new());
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let monitor = Arc::clone(&monitor);
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    monitor.reader_enter();
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    active.fetch_sub(1, Ordering::SeqCst);
                    monitor.reader_exit();
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert!(max_seen.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn writer_excludes_everyone() {
        let monitor = Arc::new(Monitor::new());
        let active_readers = Arc::new(AtomicUsize::new(0));
        let active_writers = Arc::new(AtomicUsize::new(0));
        let violations = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let monitor = Arc::clone(&monitor);
            let active_readers = Arc::clone(&active_readers);
            let active_writers = Arc::clone(&active_writers);
            let violations = Arc::clone(&violations);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    monitor.reader_enter();
                    active_readers.fetch_add(1, Ordering::SeqCst);
                    if active_writers.load(Ordering::SeqCst) > 0 {
                        violations.fetch_add(1, Ordering::SeqCst);
                    }
                    active_readers.fetch_sub(1, Ordering::SeqCst);
                    monitor.reader_exit();
                }
            }));
        }
        for _ in 0..4 {
            let monitor = Arc::clone(&monitor);
            let active_readers = Arc::clone(&active_readers);
            let active_writers = Arc::clone(&active_writers);
            let violations = Arc::clone(&violations);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    monitor.writer_enter();
                    active_writers.fetch_add(1, Ordering::SeqCst);
                    if active_readers.load(Ordering::SeqCst) > 0 {
                        violations.fetch_add(1, Ordering::SeqCst);
                    }
                    active_writers.fetch_sub(1, Ordering::SeqCst);
                    monitor.writer_exit();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(violations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn waiting_writer_is_not_starved_by_readers() {
        let monitor = Arc::new(Monitor::new());
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let writer_done = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let reader_handles: Vec<_> = (0..4)
            .map(|_| {
                let monitor = Arc::clone(&monitor);
                let stop = Arc::clone(&stop);
                thread::spawn(move || {
                    while !stop.load(Ordering::SeqCst) {
                        monitor.reader_enter();
                        thread::yield_now();
                        monitor.reader_exit();
                    }
                })
            })
            .collect();

        // Keep one reader in for a moment so the writer has to queue.
        monitor.reader_enter();
        let writer_monitor = Arc::clone(&monitor);
        let writer_done_clone = Arc::clone(&writer_done);
        let writer = thread::spawn(move || {
            writer_monitor.writer_enter();
            writer_done_clone.store(true, Ordering::SeqCst);
            writer_monitor.writer_exit();
        });
        thread::sleep(Duration::from_millis(20));
        monitor.reader_exit();

        writer.join().unwrap();
        assert!(writer_done.load(Ordering::SeqCst));

        stop.store(true, Ordering::SeqCst);
        for h in reader_handles {
            h.join().unwrap();
        }
    }
}
