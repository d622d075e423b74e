//! Background execution of service calls for a UI thread that must not block.
//!
//! Futures run on a tokio runtime; their output comes back through a
//! crossbeam channel that the UI polls once per frame.

use crate::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use std::future::Future;
use std::time::Duration;

/// Owns the tokio runtime that service requests execute on
pub struct TaskRuntime {
    runtime: tokio::runtime::Runtime,
}

impl TaskRuntime {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("maplabel-io")
            .enable_all()
            .build()?;
        log::debug!("task runtime started");
        Ok(Self { runtime })
    }

    pub fn handle(&self) -> &tokio::runtime::Handle {
        self.runtime.handle()
    }

    pub fn spawn_task<F, T>(&self, future: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        spawn_task(self.runtime.handle(), future)
    }
}

/// Spawns `future` on `handle` and returns a handle to poll for its output.
pub fn spawn_task<F, T>(handle: &tokio::runtime::Handle, future: F) -> TaskHandle<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let (sender, receiver) = crossbeam_channel::bounded(1);
    let join = handle.spawn(async move {
        let output = future.await;
        // The receiver may be gone if the UI dropped the handle
        let _ = sender.send(output);
    });
    TaskHandle {
        receiver,
        join,
        done: false,
    }
}

/// Handle to a spawned task
pub struct TaskHandle<T> {
    receiver: Receiver<T>,
    join: tokio::task::JoinHandle<()>,
    done: bool,
}

impl<T> TaskHandle<T> {
    /// Non-blocking check for the task's output. Yields it exactly once.
    pub fn poll(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(output) => {
                self.done = true;
                Some(output)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("background task ended without a result");
                self.done = true;
                None
            }
        }
    }

    /// Blocks the calling thread until the output arrives or `timeout` passes.
    pub fn wait(mut self, timeout: Duration) -> Result<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(output) => {
                self.done = true;
                Ok(output)
            }
            Err(RecvTimeoutError::Timeout) => {
                self.join.abort();
                Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "background task timed out",
                )))
            }
            Err(RecvTimeoutError::Disconnected) => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "background task ended without a result",
            ))),
        }
    }

    /// True once the output was taken or the task can no longer produce one.
    pub fn is_done(&self) -> bool {
        self.done
    }
}
