//! Single-worker FIFO execution context shared by the store backends.
//!
//! The worker owns the backend resource (a path, a database connection) and
//! runs one job at a time in submission order on a dedicated OS thread, so
//! blocking file and database I/O never runs on the caller's thread.

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::traits::StoreFuture;

type Job<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

pub struct SerialQueue<S> {
    name: String,
    jobs: mpsc::UnboundedSender<Job<S>>,
}

impl<S: Send + 'static> SerialQueue<S> {
    /// Spawn the worker thread, moving `state` into it.
    ///
    /// The thread exits once every handle to the queue is dropped and the
    /// jobs already submitted have run.
    pub fn spawn(name: impl Into<String>, state: S) -> Result<Self> {
        let name = name.into();
        let (jobs, mut job_rx) = mpsc::unbounded_channel::<Job<S>>();

        let worker_name = name.clone();
        std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let mut state = state;
                debug!("{} worker started", worker_name);

                while let Some(job) = job_rx.blocking_recv() {
                    job(&mut state);
                }

                debug!("{} worker shutting down", worker_name);
            })?;

        Ok(Self { name, jobs })
    }

    /// Enqueue `operation` immediately and return a future for its result.
    ///
    /// The job runs even if the returned future is dropped.
    pub fn submit<T, F>(&self, operation: F) -> StoreFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> Result<T> + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let job: Job<S> = Box::new(move |state: &mut S| {
            // Receiver may be gone; the job still ran.
            let _ = result_tx.send(operation(state));
        });

        let queued = self.jobs.send(job).is_ok();
        let name = self.name.clone();

        async move {
            if !queued {
                return Err(Error::StoreUnavailable(format!("{} worker has stopped", name)));
            }

            result_rx.await.map_err(|_| {
                Error::StoreUnavailable(format!("{} worker dropped the operation", name))
            })?
        }
        .boxed()
    }
}
