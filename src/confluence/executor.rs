//! Strategies for running a dispatched call.
//!
//! The dispatcher turns every API call into one self-contained unit of work:
//! a future that sends the request, checks the status, and decodes the body
//! (or runs the caller's callback). An [`Executor`] decides how that future
//! runs:
//!
//! * [`BlockingExecutor`] drives it to completion on the calling thread and
//!   hands back the `Result` directly.
//! * [`PooledExecutor`] submits it to a bounded worker pool and hands back a
//!   [`ResponseFuture`] right away. Status errors only surface when that
//!   future is resolved.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::{Context, Poll};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::{Semaphore, oneshot};
use tracing::trace;

use super::error::ApiError;

/// Worker count used by [`PooledExecutor::with_default_workers`].
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// How a dispatched unit of work is run and what the caller gets back.
pub trait Executor: Send + Sync {
  /// What a call returns: the result itself, or a handle to it.
  type Handle<T: Send + 'static>;

  /// Run `work` according to this strategy.
  fn execute<T, F>(&self, work: F) -> Self::Handle<T>
  where
    T: Send + 'static,
    F: Future<Output = Result<T, ApiError>> + Send + 'static;
}

/// Runs each call to completion on the calling thread.
///
/// Owns a current-thread tokio runtime. Calls must not be made from inside
/// another async runtime; use [`PooledExecutor`] there.
#[derive(Debug)]
pub struct BlockingExecutor {
  runtime: Runtime,
}

impl BlockingExecutor {
  /// # Errors
  /// Returns [`ApiError::Runtime`] when the runtime cannot be created.
  pub fn new() -> Result<Self, ApiError> {
    let runtime = Builder::new_current_thread()
      .enable_all()
      .build()
      .map_err(ApiError::Runtime)?;
    Ok(Self { runtime })
  }
}

impl Executor for BlockingExecutor {
  type Handle<T: Send + 'static> = Result<T, ApiError>;

  fn execute<T, F>(&self, work: F) -> Self::Handle<T>
  where
    T: Send + 'static,
    F: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    self.runtime.block_on(work)
  }
}

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const CANCELLED: u8 = 2;
const FINISHED: u8 = 3;

/// Submits calls to a bounded pool of workers.
///
/// At most `max_workers` calls are in flight at once; the rest wait for a
/// slot and can still be cancelled while they wait. Completion order is not
/// tied to submission order.
pub struct PooledExecutor {
  runtime: Option<Runtime>,
  handle: Handle,
  permits: Arc<Semaphore>,
  max_workers: usize,
}

impl PooledExecutor {
  /// Create a pool backed by its own multi-thread runtime.
  ///
  /// # Errors
  /// Returns [`ApiError::Precondition`] when `max_workers` is zero and
  /// [`ApiError::Runtime`] when the runtime cannot be created.
  pub fn new(max_workers: usize) -> Result<Self, ApiError> {
    check_workers(max_workers)?;
    let runtime = Builder::new_multi_thread()
      .worker_threads(max_workers)
      .thread_name("confluence-api-worker")
      .enable_all()
      .build()
      .map_err(ApiError::Runtime)?;
    let handle = runtime.handle().clone();

    Ok(Self {
      runtime: Some(runtime),
      handle,
      permits: Arc::new(Semaphore::new(max_workers)),
      max_workers,
    })
  }

  /// Create a pool with [`DEFAULT_MAX_WORKERS`] workers.
  pub fn with_default_workers() -> Result<Self, ApiError> {
    Self::new(DEFAULT_MAX_WORKERS)
  }

  /// Run calls on a caller-owned runtime, at most `max_workers` at a time.
  pub fn from_handle(handle: Handle, max_workers: usize) -> Result<Self, ApiError> {
    check_workers(max_workers)?;
    Ok(Self {
      runtime: None,
      handle,
      permits: Arc::new(Semaphore::new(max_workers)),
      max_workers,
    })
  }

  pub fn max_workers(&self) -> usize {
    self.max_workers
  }
}

fn check_workers(max_workers: usize) -> Result<(), ApiError> {
  if max_workers == 0 {
    return Err(ApiError::precondition("worker pool needs at least one worker"));
  }
  Ok(())
}

impl fmt::Debug for PooledExecutor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PooledExecutor")
      .field("max_workers", &self.max_workers)
      .field("owns_runtime", &self.runtime.is_some())
      .finish()
  }
}

impl Drop for PooledExecutor {
  fn drop(&mut self) {
    if let Some(runtime) = self.runtime.take() {
      runtime.shutdown_background();
    }
  }
}

impl Executor for PooledExecutor {
  type Handle<T: Send + 'static> = ResponseFuture<T>;

  fn execute<T, F>(&self, work: F) -> Self::Handle<T>
  where
    T: Send + 'static,
    F: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let (sender, receiver) = oneshot::channel();
    let shared = Arc::new(Shared {
      state: AtomicU8::new(PENDING),
      sender: Mutex::new(Some(sender)),
    });
    let task = Arc::clone(&shared);
    let permits = Arc::clone(&self.permits);

    self.handle.spawn(async move {
      match permits.acquire_owned().await {
        Ok(_permit)
          if task
            .state
            .compare_exchange(PENDING, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok() =>
        {
          let outcome = work.await;
          task.state.store(FINISHED, Ordering::Release);
          task.resolve(outcome);
        }
        Ok(_) => trace!("Skipping cancelled request"),
        Err(_) => task.resolve(Err(ApiError::WorkerLost)),
      }
    });

    ResponseFuture { receiver, shared }
  }
}

/// State and result slot shared by a [`ResponseFuture`] and its task.
///
/// Whoever moves the state out of `PENDING` owns the sender.
struct Shared<T> {
  state: AtomicU8,
  sender: Mutex<Option<oneshot::Sender<Result<T, ApiError>>>>,
}

impl<T> Shared<T> {
  fn resolve(&self, outcome: Result<T, ApiError>) {
    let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(sender) = sender {
      let _ = sender.send(outcome);
    }
  }
}

/// Deferred result of a call submitted to a [`PooledExecutor`].
///
/// Resolves to the same `Result` a blocking call would return: the decoded
/// outcome, the callback's value, or the error (including HTTP status
/// errors). Can be awaited, or resolved from synchronous code with
/// [`ResponseFuture::result`].
#[must_use = "a ResponseFuture does nothing unless resolved"]
pub struct ResponseFuture<T> {
  receiver: oneshot::Receiver<Result<T, ApiError>>,
  shared: Arc<Shared<T>>,
}

impl<T> ResponseFuture<T> {
  /// Block the current thread until the call finishes.
  ///
  /// Must not be called from inside an async runtime; `.await` the future
  /// there instead.
  pub fn result(self) -> Result<T, ApiError> {
    self.receiver.blocking_recv().unwrap_or(Err(ApiError::WorkerLost))
  }

  /// Cancel the call if no worker has picked it up yet.
  ///
  /// Returns `true` when the call is (now or already) cancelled and `false`
  /// when it is running or finished. A cancelled future resolves to
  /// [`ApiError::Cancelled`] immediately, without waiting for a worker.
  pub fn cancel(&self) -> bool {
    match self
      .shared
      .state
      .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
    {
      Ok(_) => {
        self.shared.resolve(Err(ApiError::Cancelled));
        true
      }
      Err(current) => current == CANCELLED,
    }
  }

  pub fn cancelled(&self) -> bool {
    self.shared.state.load(Ordering::Acquire) == CANCELLED
  }

  pub fn running(&self) -> bool {
    self.shared.state.load(Ordering::Acquire) == RUNNING
  }

  /// `true` once the call has finished or been cancelled.
  pub fn done(&self) -> bool {
    matches!(self.shared.state.load(Ordering::Acquire), FINISHED | CANCELLED)
  }
}

impl<T> Future for ResponseFuture<T> {
  type Output = Result<T, ApiError>;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    Pin::new(&mut self.receiver)
      .poll(cx)
      .map(|received| received.unwrap_or(Err(ApiError::WorkerLost)))
  }
}

impl<T> fmt::Debug for ResponseFuture<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResponseFuture")
      .field("state", &self.shared.state.load(Ordering::Acquire))
      .finish()
  }
}
