//! Unit tests for deferred computations and their combinators.

use std::fmt;
use std::future::{self, Ready};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rstest::rstest;

use super::{Deferred, LogSink, RecordingLogSink, Unwound};

#[derive(Debug, Clone, PartialEq, Eq)]
enum StepError {
    Rejected(String),
    Invalid(&'static str),
    Panicked(String),
}

impl From<Unwound> for StepError {
    fn from(value: Unwound) -> Self {
        Self::Panicked(value.message().to_owned())
    }
}

/// Rejection reason used to exercise error coercion.
#[derive(Debug)]
struct Refusal(&'static str);

impl From<Refusal> for StepError {
    fn from(value: Refusal) -> Self {
        Self::Rejected(value.0.to_owned())
    }
}

fn counted_success(calls: &Arc<AtomicUsize>, value: u32) -> Deferred<u32, StepError> {
    let counter = Arc::clone(calls);
    Deferred::lift(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, StepError>(value) }
    })
}

/// Sink whose every record panics.
struct ExplodingSink;

impl LogSink for ExplodingSink {
    fn record(&self, label: &str, _value: &dyn fmt::Debug) {
        panic!("sink exploded while recording {label}");
    }
}

fn rejected() -> Deferred<u32, StepError> {
    Deferred::lift(|| async { Err::<u32, _>(Refusal("connection reset")) })
}

#[tokio::test]
async fn lift_yields_success_for_resolving_thunk() {
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = counted_success(&calls, 7);

    assert_eq!(deferred.run().await, Ok(7));
}

#[tokio::test]
async fn lift_coerces_rejection_reason() {
    assert_eq!(
        rejected().run().await,
        Err(StepError::Rejected("connection reset".to_owned()))
    );
}

#[tokio::test]
async fn lift_reports_panics_as_failures() {
    let deferred: Deferred<u32, StepError> = Deferred::lift(|| async {
        if true {
            panic!("gateway exploded");
        }
        Ok::<u32, StepError>(0)
    });

    assert_eq!(
        deferred.run().await,
        Err(StepError::Panicked("gateway exploded".to_owned()))
    );
}

#[tokio::test]
async fn lift_reports_formatted_panic_messages() {
    let deferred: Deferred<u32, StepError> = Deferred::lift(|| async {
        let code = 503;
        if code > 0 {
            panic!("status {code}");
        }
        Ok::<u32, StepError>(code)
    });

    assert_eq!(
        deferred.run().await,
        Err(StepError::Panicked("status 503".to_owned()))
    );
}

#[tokio::test]
async fn lift_reports_panics_raised_before_the_future_exists() {
    let deferred: Deferred<u32, StepError> =
        Deferred::lift(|| -> Ready<Result<u32, StepError>> {
            if true {
                panic!("thunk failed before building its future");
            }
            future::ready(Ok(0))
        });

    assert_eq!(
        deferred.run().await,
        Err(StepError::Panicked(
            "thunk failed before building its future".to_owned()
        ))
    );
}

#[tokio::test]
async fn thunk_runs_only_when_invoked_and_once_per_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = counted_success(&calls, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 0, "building must not run");

    let first = deferred.run().await;
    let second = deferred.clone().run().await;

    assert_eq!((first, second), (Ok(3), Ok(3)));
    assert_eq!(calls.load(Ordering::SeqCst), 2, "each run repeats the work");
}

#[tokio::test]
async fn tap_records_success_without_altering_it() {
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(RecordingLogSink::default());
    let deferred = counted_success(&calls, 11).tap_ok(sink.clone(), "answer");

    assert_eq!(deferred.run().await, Ok(11));
    assert_eq!(sink.entries(), vec![("answer".to_owned(), "11".to_owned())]);
}

#[tokio::test]
async fn tap_ignores_failures() {
    let sink = Arc::new(RecordingLogSink::default());
    let deferred = rejected().tap_ok(sink.clone(), "answer");

    assert_eq!(
        deferred.run().await,
        Err(StepError::Rejected("connection reset".to_owned()))
    );
    assert!(sink.entries().is_empty(), "failures must not be logged");
}

#[tokio::test]
async fn validate_skips_validator_on_failure() {
    let checks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&checks);
    let deferred = rejected().and_then_validate(move |value| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    });

    assert_eq!(
        deferred.run().await,
        Err(StepError::Rejected("connection reset".to_owned()))
    );
    assert_eq!(checks.load(Ordering::SeqCst), 0, "validator must not run");
}

#[rstest]
#[case::accepted(4, Ok("even"))]
#[case::refused(5, Err(StepError::Invalid("odd value")))]
#[tokio::test]
async fn validate_adopts_validator_outcome(
    #[case] input: u32,
    #[case] expected: Result<&'static str, StepError>,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    let checks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&checks);
    let deferred = counted_success(&calls, input).and_then_validate(move |value| {
        counter.fetch_add(1, Ordering::SeqCst);
        if value % 2 == 0 {
            Ok("even")
        } else {
            Err(StepError::Invalid("odd value"))
        }
    });

    assert_eq!(deferred.run().await, expected);
    assert_eq!(checks.load(Ordering::SeqCst), 1, "validator runs exactly once");
}

#[tokio::test]
async fn tap_then_validate_logs_before_validation_fails() {
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(RecordingLogSink::default());
    let deferred = counted_success(&calls, 9)
        .tap_ok(sink.clone(), "raw")
        .and_then_validate(|_| Err::<u32, _>(StepError::Invalid("rejected shape")));

    assert_eq!(
        deferred.run().await,
        Err(StepError::Invalid("rejected shape"))
    );
    assert_eq!(sink.labels(), vec!["raw".to_owned()]);
}

#[tokio::test]
async fn validate_reports_panicking_validator_as_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = counted_success(&calls, 2).and_then_validate(|value| {
        if value > 0 {
            panic!("validator rejected {value} loudly");
        }
        Ok(value)
    });

    assert_eq!(
        deferred.run().await,
        Err(StepError::Panicked("validator rejected 2 loudly".to_owned()))
    );
}

#[tokio::test]
async fn tap_passes_value_through_when_sink_panics() {
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = counted_success(&calls, 5)
        .tap_ok(Arc::new(ExplodingSink), "answer")
        .and_then_validate(|value| Ok(value * 2));

    assert_eq!(deferred.run().await, Ok(10));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unwound_displays_its_message() {
    assert_eq!(Unwound::new("boom").to_string(), "boom");
}
