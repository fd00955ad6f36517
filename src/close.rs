//! Closing resources with best-effort error reporting.
//!
//! The [`Close`] trait is the crate's closable-resource abstraction: one
//! consuming close operation that may fail. [`close`] and
//! [`close_ignore_closed`] invoke it exactly once and funnel any error
//! through the reporter; the `ignore_closed` variant first asks
//! [`is_closed`](crate::is_closed) and stays silent on an idempotent double
//! close. For cleanup that is not a literal close, [`defer`] and
//! [`defer_ignore_closed`] apply the same two policies to a zero-argument
//! closure.
//!
//! ```no_run
//! use std::net::TcpStream;
//!
//! fn send_goodbye(stream: TcpStream) {
//!     // ... last write ...
//!     deferlog::close_ignore_closed(stream);
//! }
//! ```

use std::{error::Error, fs::File, io, net::TcpStream};

use crate::{closed::is_closed, report::report_wrapped};

/// A resource with a single close operation that may fail.
///
/// Closing consumes the resource; the type system guarantees close is
/// invoked at most once per value. Handles that share an underlying resource
/// (for example [`TcpStream::try_clone`]) can still observe a double close at
/// the OS level, which is what [`close_ignore_closed`] exists for.
pub trait Close {
    /// The error the close operation can produce.
    type Error: Error + Send + Sync + 'static;

    /// Closes the resource, releasing whatever it holds.
    fn close(self) -> Result<(), Self::Error>;
}

/// Shuts down both halves of the connection.
impl Close for TcpStream {
    type Error = io::Error;

    fn close(self) -> io::Result<()> {
        self.shutdown(std::net::Shutdown::Both)
    }
}

/// Shuts down both halves of the connection.
#[cfg(unix)]
#[cfg_attr(docsrs, doc(cfg(unix)))]
impl Close for std::os::unix::net::UnixStream {
    type Error = io::Error;

    fn close(self) -> io::Result<()> {
        self.shutdown(std::net::Shutdown::Both)
    }
}

/// Flushes pending writes to disk before the handle is dropped.
///
/// Dropping a [`File`] discards any close-time error; this impl surfaces the
/// durability barrier's outcome instead.
impl Close for File {
    type Error = io::Error;

    fn close(self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Flushes the buffer into the inner writer.
impl<W: io::Write> Close for io::BufWriter<W> {
    type Error = io::Error;

    fn close(self) -> io::Result<()> {
        self.into_inner().map(drop).map_err(|e| e.into_error())
    }
}

/// Closes `resource` and reports any resulting error, attributed to the
/// caller.
#[track_caller]
pub fn close<C: Close>(resource: C) {
    report_wrapped(resource.close());
}

/// Closes `resource` and reports any resulting error, except the recognized
/// "already closed" conditions, which are suppressed.
#[track_caller]
pub fn close_ignore_closed<C: Close>(resource: C) {
    match resource.close() {
        Err(error) if !is_closed(&error) => {
            report_wrapped(Err::<(), _>(error));
        }
        _ => {}
    }
}

/// Runs a cleanup closure and reports any resulting error, attributed to the
/// caller.
#[track_caller]
pub fn defer<E>(f: impl FnOnce() -> Result<(), E>)
where
    E: Error + Send + Sync + 'static,
{
    report_wrapped(f());
}

/// Runs a cleanup closure and reports any resulting error, except the
/// recognized "already closed" conditions, which are suppressed.
#[track_caller]
pub fn defer_ignore_closed<E>(f: impl FnOnce() -> Result<(), E>)
where
    E: Error + Send + Sync + 'static,
{
    match f() {
        Err(error) if !is_closed(&error) => {
            report_wrapped(Err::<(), _>(error));
        }
        _ => {}
    }
}
