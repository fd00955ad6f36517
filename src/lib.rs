#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Best-effort surfacing of errors from deferred cleanup.
//!
//! In code that performs best-effort cleanup at the end of a scope (closing a
//! file, shutting down a connection, a fire-and-forget callback), errors are
//! easy to silently drop, yet propagating them would complicate call sites
//! that only want "best effort, but don't hide failures from the log". This
//! crate provides a single funnel for those errors: each one is formatted as
//! one log record attributed to the call site that triggered the cleanup,
//! followed by a trimmed snippet of the call stack, and control flow is never
//! interrupted.
//!
//! # Quick Start
//!
//! ```
//! use std::{fs::File, io::Read};
//!
//! fn read_config() -> std::io::Result<String> {
//!     let mut file = File::open("Cargo.toml")?;
//!     let mut contents = String::new();
//!     let result = file.read_to_string(&mut contents).map(drop);
//!     // Surface a read failure in the log without aborting the caller.
//!     deferlog::report(result);
//!     // Close best-effort; a double close is not worth a log line.
//!     deferlog::close_ignore_closed(file);
//!     Ok(contents)
//! }
//! ```
//!
//! Cleanup that is not a literal close goes through [`invoke`] or [`defer`]:
//!
//! ```
//! fn remove_scratch_dir(path: &std::path::Path) {
//!     deferlog::invoke(|| std::fs::remove_dir_all(path));
//! }
//! # remove_scratch_dir(std::path::Path::new("/nonexistent-scratch"));
//! ```
//!
//! # Where the output goes
//!
//! All reports are written to the process-wide [`Sink`], which defaults to
//! standard error. Tests and embedders can redirect it:
//!
//! ```
//! use std::sync::Arc;
//!
//! use deferlog::BufferSink;
//!
//! let buffer = Arc::new(BufferSink::new());
//! let previous = deferlog::install_sink(buffer.clone());
//! deferlog::report(Err::<(), _>(std::io::Error::other("cleanup failed")));
//! # assert!(buffer.take_string().starts_with("cleanup failed"));
//! # deferlog::take_sink();
//! # drop(previous);
//! ```
//!
//! # Failure signals
//!
//! No entry point in this crate returns an error. The only observable failure
//! signal is the `bool` returned by the [`report`] family ("was a report
//! emitted"), plus the deliberate process abort of [`expect_ok`] for
//! setup-time preconditions. If the sink itself fails to accept a record, the
//! record falls back to a direct write on standard error and is then dropped;
//! reporting never fails loudly.

pub mod close;
pub mod closed;
pub mod invoke;
pub mod report;
pub mod sink;
pub mod snapshot;

pub use crate::{
    close::{Close, close, close_ignore_closed, defer, defer_ignore_closed},
    closed::is_closed,
    invoke::{Fallible, invoke, invoke_spread},
    report::{
        expect_ok, report, report_to_buffer, report_with_depth, set_stack_capture,
        stack_capture_enabled,
    },
    sink::{BufferSink, Record, RecordFlags, Sink, StderrSink, install_sink, take_sink},
    snapshot::{Frame, StackSnapshot},
};
