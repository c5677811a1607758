/// Bounded-concurrency job execution.
///
/// A `WorkerPool` owns a rayon pool sized to the job limit plus a
/// counting semaphore with one slot per job. `submit` takes a slot
/// before spawning, so when every slot is busy the producer blocks
/// right there until a worker finishes. `run` wraps everything in a
/// rayon scope, which joins all outstanding jobs exactly once before
/// returning.
use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::errors::{ScanError, ScanResult};

struct Semaphore {
    count: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    fn new(slots: usize) -> Self {
        Self {
            count: Mutex::new(slots),
            available: Condvar::new(),
        }
    }

    fn acquire(&self) -> Permit<'_> {
        let mut count = self.lock();
        while *count == 0 {
            count = self
                .available
                .wait(count)
                .unwrap_or_else(|e| e.into_inner());
        }
        *count -= 1;
        Permit { slots: self }
    }

    fn release(&self) {
        let mut count = self.lock();
        *count += 1;
        self.available.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A held slot, returned to the semaphore on drop.
struct Permit<'a> {
    slots: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.slots.release();
    }
}

pub struct WorkerPool {
    pool: rayon::ThreadPool,
    slots: Semaphore,
}

impl WorkerPool {
    pub fn new(limit: NonZeroUsize) -> ScanResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(limit.get())
            .thread_name(|i| format!("treesift-{}", i))
            .build()
            .map_err(|e| ScanError::thread_pool_error(e.to_string()))?;
        Ok(Self {
            pool,
            slots: Semaphore::new(limit.get()),
        })
    }

    /// Runs the producer on the calling thread and returns once it and
    /// every job it submitted have finished.
    pub fn run<'scope, F>(&'scope self, producer: F)
    where
        F: FnOnce(&JobScope<'_, 'scope>),
    {
        self.pool.in_place_scope(|scope| {
            let jobs = JobScope {
                scope,
                slots: &self.slots,
            };
            producer(&jobs);
        });
    }
}

/// Handle for submitting jobs from inside `WorkerPool::run`.
pub struct JobScope<'a, 'scope> {
    scope: &'a rayon::Scope<'scope>,
    slots: &'scope Semaphore,
}

impl<'a, 'scope> JobScope<'a, 'scope> {
    /// Spawns a job, blocking first if all slots are taken.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'scope,
    {
        let permit = self.slots.acquire();
        self.scope.spawn(move |_| {
            let _permit = permit;
            job();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_all_jobs_run_before_return() {
        let done = AtomicUsize::new(0);
        let pool = WorkerPool::new(NonZeroUsize::new(4).unwrap()).unwrap();

        pool.run(|jobs| {
            for _ in 0..32 {
                jobs.submit(|| {
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(done.load(Ordering::SeqCst), 32);
    }

    #[test]
    fn test_concurrency_never_exceeds_limit() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let pool = WorkerPool::new(NonZeroUsize::new(2).unwrap()).unwrap();

        pool.run(|jobs| {
            for _ in 0..16 {
                jobs.submit(|| {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_single_slot_serializes_jobs() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let done = AtomicUsize::new(0);
        let pool = WorkerPool::new(NonZeroUsize::new(1).unwrap()).unwrap();

        pool.run(|jobs| {
            for _ in 0..8 {
                jobs.submit(|| {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(2));
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(done.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_submit_after_capacity_still_completes() {
        // More jobs than slots; the producer must block and resume.
        let done = AtomicUsize::new(0);
        let pool = WorkerPool::new(NonZeroUsize::new(2).unwrap()).unwrap();

        pool.run(|jobs| {
            for _ in 0..64 {
                jobs.submit(|| {
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(done.load(Ordering::SeqCst), 64);
    }
}
