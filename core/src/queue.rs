use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

/// Pool size used when the configured worker count is unusable.
pub const DEFAULT_WORKERS: usize = 5;

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    queue: Mutex<VecDeque<Task>>,
    work_available: Condvar,
    pending: Mutex<usize>,
    idle: Condvar,
    shutdown: AtomicBool,
}

/// A fixed pool of worker threads draining one shared task queue.
///
/// `finish` blocks until every submitted task, including tasks submitted
/// from inside other tasks, has completed. `shutdown` lets the workers
/// drain whatever is queued and then exit; dropping the pool shuts it down
/// and joins the workers.
pub struct WorkQueue {
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 { DEFAULT_WORKERS } else { workers };
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            work_available: Condvar::new(),
            pending: Mutex::new(0),
            idle: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let handles = (0..workers)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || worker_loop(&shared))
            })
            .collect();

        Self { shared, handles }
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Enqueues a task. The pending counter is raised before the task
    /// becomes visible to any worker, so a `finish` racing with `execute`
    /// can never observe the queue as drained early.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.shared.shutdown.load(Ordering::SeqCst) {
            tracing::warn!("task submitted after shutdown was dropped");
            return;
        }
        *self.shared.pending.lock() += 1;
        self.shared.queue.lock().push_back(Box::new(task));
        self.shared.work_available.notify_one();
    }

    /// Blocks until all submitted and in-flight work has completed.
    pub fn finish(&self) {
        let mut pending = self.shared.pending.lock();
        while *pending > 0 {
            self.shared.idle.wait(&mut pending);
        }
    }

    /// Signals the workers to drain the queue and exit. Idempotent.
    pub fn shutdown(&self) {
        if !self.shared.shutdown.swap(true, Ordering::SeqCst) {
            self.shared.work_available.notify_all();
        }
    }

    /// Submits one task per item and waits for all of them: the fan-out
    /// half of the build-local-merge-shared pattern used by the indexing
    /// and query pipelines.
    pub fn fan_out<T, F>(&self, items: impl IntoIterator<Item = T>, work: F)
    where
        T: Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        for item in items {
            let work = Arc::clone(&work);
            self.execute(move || work(item));
        }
        self.finish();
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let task = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(task) = queue.pop_front() {
                    break task;
                }
                if shared.shutdown.load(Ordering::SeqCst) {
                    return;
                }
                shared.work_available.wait(&mut queue);
            }
        };

        if catch_unwind(AssertUnwindSafe(task)).is_err() {
            tracing::error!("worker task panicked");
        }

        let mut pending = shared.pending.lock();
        *pending -= 1;
        if *pending == 0 {
            shared.idle.notify_all();
        }
    }
}
