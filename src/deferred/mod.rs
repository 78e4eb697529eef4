//! Deferred, failure-aware asynchronous computations.
//!
//! A [`Deferred`] wraps a zero-argument thunk that produces a future of
//! `Result<T, E>`. Building one performs no work; every call to
//! [`Deferred::run`] invokes the thunk afresh. Pipelines are assembled by
//! chaining the three combinators:
//!
//! - [`Deferred::lift`] turns a fallible async thunk into a deferred value
//!   whose run never panics;
//! - [`Deferred::tap_ok`] records a success value with a [`LogSink`];
//! - [`Deferred::and_then_validate`] sequences a synchronous check.
//!
//! Panics raised by the thunk or the check surface as `Err(E::from(Unwound))`.
//! A panicking sink is reported through `tracing` and the value flows on.
//!
//! ```
//! use std::sync::Arc;
//!
//! use tanuki::deferred::{Deferred, NoopLogSink, Unwound};
//!
//! #[derive(Debug, PartialEq)]
//! struct Failure(String);
//!
//! impl From<Unwound> for Failure {
//!     fn from(value: Unwound) -> Self {
//!         Self(value.message().to_owned())
//!     }
//! }
//!
//! let answer: Deferred<u32, Failure> = Deferred::lift(|| async { Ok::<_, Failure>(41) })
//!     .tap_ok(Arc::new(NoopLogSink), "answer")
//!     .and_then_validate(|value| Ok(value + 1));
//!
//! let runtime = tokio::runtime::Runtime::new().expect("runtime should start");
//! assert_eq!(runtime.block_on(answer.run()), Ok(42));
//! ```

mod sink;

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

#[cfg(any(test, feature = "test-support"))]
pub use sink::RecordingLogSink;
pub use sink::{LogSink, NoopLogSink, TracingLogSink};

type Thunk<T, E> = dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync;

/// Panic captured while running a lifted thunk.
///
/// Error types used with [`Deferred::lift`] implement `From<Unwound>` so the
/// panic surfaces as an ordinary `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwound {
    message: String,
}

impl Unwound {
    /// Builds an `Unwound` from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with a non-string payload".to_owned());
        Self { message }
    }

    /// Message carried by the panic.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Unwound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A not-yet-executed asynchronous computation that completes with a
/// `Result`.
///
/// Cloning is cheap and shares the underlying thunk. Results are never
/// cached: each [`run`](Self::run) repeats the work.
pub struct Deferred<T, E> {
    thunk: Arc<Thunk<T, E>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            thunk: Arc::clone(&self.thunk),
        }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

impl<T, E> Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Lifts a fallible async thunk into a deferred computation.
    ///
    /// The thunk's error is converted with `Into<E>`. A panic raised while
    /// the thunk builds or polls its future is caught and reported as
    /// `Err(E::from(Unwound))`.
    pub fn lift<F, Fut, R>(thunk: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, R>> + Send + 'static,
        R: Into<E>,
        E: From<Unwound>,
    {
        let shared = Arc::new(thunk);
        Self {
            thunk: Arc::new(move || {
                let call = Arc::clone(&shared);
                AssertUnwindSafe(async move { call().await })
                    .catch_unwind()
                    .map(|caught| match caught {
                        Ok(outcome) => outcome.map_err(Into::into),
                        Err(payload) => Err(E::from(Unwound::from_payload(payload.as_ref()))),
                    })
                    .boxed()
            }),
        }
    }

    /// Records the success value with `sink` under `label`, then passes it
    /// through unchanged. Errors flow past without touching the sink.
    ///
    /// A panic inside the sink is logged as a warning and does not change
    /// the outcome.
    #[must_use]
    pub fn tap_ok(self, sink: Arc<dyn LogSink>, label: impl Into<String>) -> Self
    where
        T: fmt::Debug,
    {
        let upstream = self.thunk;
        let shared_label: Arc<str> = Arc::from(label.into());
        Self {
            thunk: Arc::new(move || {
                let pending = upstream();
                let tap_sink = Arc::clone(&sink);
                let tap_label = Arc::clone(&shared_label);
                async move {
                    let outcome = pending.await;
                    if let Ok(value) = &outcome {
                        let recorded = panic::catch_unwind(AssertUnwindSafe(|| {
                            tap_sink.record(&tap_label, value);
                        }));
                        if let Err(payload) = recorded {
                            let unwound = Unwound::from_payload(payload.as_ref());
                            tracing::warn!(
                                label = &*tap_label,
                                panic = unwound.message(),
                                "log sink panicked"
                            );
                        }
                    }
                    outcome
                }
                .boxed()
            }),
        }
    }

    /// Applies `check` to the success value and adopts its outcome.
    ///
    /// An upstream `Err` short-circuits: `check` is not called and the error
    /// is returned as-is. A panic inside `check` becomes
    /// `Err(E::from(Unwound))`.
    #[must_use]
    pub fn and_then_validate<U, F>(self, check: F) -> Deferred<U, E>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
        E: From<Unwound>,
    {
        let upstream = self.thunk;
        let shared_check = Arc::new(check);
        Deferred {
            thunk: Arc::new(move || {
                let pending = upstream();
                let step = Arc::clone(&shared_check);
                async move {
                    pending.await.and_then(|value| {
                        panic::catch_unwind(AssertUnwindSafe(|| (step.as_ref())(value)))
                            .unwrap_or_else(|payload| {
                                Err(E::from(Unwound::from_payload(payload.as_ref())))
                            })
                    })
                }
                .boxed()
            }),
        }
    }

    /// Executes the computation.
    pub fn run(&self) -> BoxFuture<'static, Result<T, E>> {
        (self.thunk)()
    }
}

#[cfg(test)]
mod tests;
