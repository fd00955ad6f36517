//! The single funnel all diagnostic output goes through.
//!
//! Every entry point here takes a [`Fallible`] outcome. When the outcome
//! carries no failure there is no side effect at all; when it does, the
//! failure's message becomes one log record attributed to the call site, the
//! trimmed stack snippet follows, and the return value says a report was
//! emitted. Nothing here ever returns an error to its caller: a sink that
//! refuses the write is itself reported on standard error and then dropped.
//!
//! # Quick Start
//!
//! ```
//! let reported = deferlog::report(std::fs::remove_file("/nonexistent-scratch"));
//! assert!(reported);
//! assert!(!deferlog::report(Ok::<(), std::io::Error>(())));
//! ```

use std::{
    fmt,
    panic::Location,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{
    invoke::Fallible,
    sink::{self, BufferSink, Record, Sink},
    snapshot::StackSnapshot,
};

static CAPTURE_STACKS: AtomicBool = AtomicBool::new(true);

/// Enables or disables the stack snippet that follows each record.
///
/// Capture is on by default. With capture off, records are still emitted and
/// attributed to the immediate caller of the reporting entry point.
pub fn set_stack_capture(enabled: bool) {
    CAPTURE_STACKS.store(enabled, Ordering::Relaxed);
}

/// Returns whether reports currently include a stack snippet.
pub fn stack_capture_enabled() -> bool {
    CAPTURE_STACKS.load(Ordering::Relaxed)
}

/// Reports the failure carried by `outcome`, if any, attributed to the
/// caller.
///
/// Returns exactly "was a failure present". A success value produces no
/// output of any kind.
#[track_caller]
pub fn report<F: Fallible>(outcome: F) -> bool {
    dispatch(outcome, 0, Location::caller(), None)
}

/// Like [`report`], but skips `depth` additional call frames when attributing
/// the record and trimming the stack snippet.
///
/// Each unit of `depth` hides exactly one more logical frame, so a caller
/// with its own wrapper layers can keep the log line pointing at the code
/// that matters. A depth that runs past the end of the stack is harmless: the
/// snippet simply contains whatever remains.
///
/// With stack capture disabled (see [`set_stack_capture`]) there is no frame
/// list to trim, and the record falls back to crediting the immediate caller
/// regardless of `depth`.
#[track_caller]
pub fn report_with_depth<F: Fallible>(outcome: F, depth: usize) -> bool {
    dispatch(outcome, depth, Location::caller(), None)
}

/// Like [`report_with_depth`], but captures the output in a fresh buffer
/// instead of the process-wide sink, for programmatic inspection.
///
/// Returns `None` when `outcome` carries no failure. Otherwise the first line
/// of the returned string is exactly the failure's message, followed by the
/// stack snippet (two lines per frame).
///
/// ```
/// let out = deferlog::report_to_buffer(Err::<(), _>(std::io::Error::other("disk full")), 0)
///     .expect("a failure was supplied");
/// assert_eq!(out.lines().next(), Some("disk full"));
/// ```
#[track_caller]
pub fn report_to_buffer<F: Fallible>(outcome: F, depth: usize) -> Option<String> {
    let buffer = BufferSink::new();
    dispatch(outcome, depth, Location::caller(), Some(&buffer)).then(|| buffer.take_string())
}

/// Entry point for the crate's own wrappers (`close`, `defer`, `invoke`).
///
/// The wrapper's frames carry this crate's symbol prefix and are filtered
/// from the snapshot, so the record is attributed to the wrapper's external
/// caller rather than to the wrapper itself.
#[track_caller]
pub(crate) fn report_wrapped<F: Fallible>(outcome: F) -> bool {
    dispatch(outcome, 0, Location::caller(), None)
}

/// Panics with the failure's message if `result` is an error.
///
/// This is the deliberate fail-fast companion for setup-time preconditions
/// ("this must not fail or the process cannot meaningfully continue"), not an
/// error-propagation mechanism.
///
/// ```
/// let file = deferlog::expect_ok(std::fs::File::open("Cargo.toml"));
/// # drop(file);
/// ```
#[track_caller]
pub fn expect_ok<T, E: fmt::Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => panic!("{error}"),
    }
}

fn dispatch<F: Fallible>(
    outcome: F,
    depth: usize,
    caller: &'static Location<'static>,
    sink: Option<&dyn Sink>,
) -> bool {
    let Some(failure) = outcome.into_failure() else {
        return false;
    };
    let message = failure.to_string();
    // Capture directly from this frame so the prologue filter sees only the
    // reporter's own symbols between here and the caller.
    let snapshot = if stack_capture_enabled() {
        Some(StackSnapshot::capture(depth))
    } else {
        None
    };

    match sink {
        Some(sink) => emit(sink, &message, caller, snapshot.as_ref()),
        None => sink::with_current(|sink| emit(sink, &message, caller, snapshot.as_ref())),
    }
    true
}

fn emit(
    sink: &dyn Sink,
    message: &str,
    caller: &'static Location<'static>,
    snapshot: Option<&StackSnapshot>,
) {
    let attributed = snapshot.and_then(|s| s.frames.first());
    let (file, line) = match attributed {
        Some(frame) => (Some(frame.file.as_str()), frame.line),
        None => (Some(caller.file()), Some(caller.line())),
    };
    let record = Record {
        message,
        file,
        line,
    };
    if let Err(write_error) = sink.emit(&record) {
        eprintln!("{write_error}");
        eprintln!("{message}");
    }

    if let Some(snapshot) = snapshot
        && !snapshot.is_empty()
    {
        let rendered = snapshot.to_string();
        if let Err(write_error) = sink.write_bytes(rendered.as_bytes()) {
            eprintln!("{write_error}");
            eprint!("{rendered}");
        }
    }
}
