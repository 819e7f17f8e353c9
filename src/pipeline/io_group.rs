// Concurrency limiter for groups of workers doing file I/O

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Capacity used when the open file limit cannot be determined.
pub const FALLBACK_LIMIT: usize = 50;

#[derive(Debug, Default)]
struct Counters {
    in_flight: usize,
    started: usize,
    finished: usize,
}

/// A bounded semaphore combined with a count of outstanding work.
///
/// [`take`](IoGroup::take) blocks until a slot is free and registers one unit
/// of work; dropping the returned permit releases the slot and completes the
/// unit. [`wait`](IoGroup::wait) blocks until every started unit completed, and
/// returns immediately when nothing was ever started.
#[derive(Debug)]
pub struct IoGroup {
    limit: usize,
    counters: Mutex<Counters>,
    changed: Condvar,
}

impl IoGroup {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            counters: Mutex::new(Counters::default()),
            changed: Condvar::new(),
        }
    }

    /// Sizes the group to `jobs` if given, else to the process's open file
    /// soft limit, else to [`FALLBACK_LIMIT`].
    pub fn with_fd_limit(jobs: Option<usize>) -> Self {
        Self::new(jobs.or_else(fd_limit).unwrap_or(FALLBACK_LIMIT))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn take(&self) -> IoPermit<'_> {
        let mut counters = self.lock();
        while counters.in_flight >= self.limit {
            counters = self
                .changed
                .wait(counters)
                .unwrap_or_else(PoisonError::into_inner);
        }
        counters.in_flight += 1;
        counters.started += 1;
        IoPermit { group: self }
    }

    /// Units of work taken but not yet released.
    pub fn outstanding(&self) -> usize {
        let counters = self.lock();
        counters.started - counters.finished
    }

    pub fn wait(&self) {
        let mut counters = self.lock();
        while counters.finished != counters.started {
            counters = self
                .changed
                .wait(counters)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn release(&self) {
        let mut counters = self.lock();
        counters.in_flight -= 1;
        counters.finished += 1;
        drop(counters);
        self.changed.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A held slot of an [`IoGroup`], released on drop.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct IoPermit<'a> {
    group: &'a IoGroup,
}

impl Drop for IoPermit<'_> {
    fn drop(&mut self) {
        self.group.release();
    }
}

/// Soft limit on open file descriptors, if there is a finite one.
#[cfg(unix)]
pub fn fd_limit() -> Option<usize> {
    let (soft, _hard) = rlimit::getrlimit(rlimit::Resource::NOFILE).ok()?;
    if soft == rlimit::INFINITY {
        return None;
    }
    usize::try_from(soft).ok().filter(|&n| n > 0)
}

#[cfg(not(unix))]
pub fn fd_limit() -> Option<usize> {
    None
}
