//! Destinations for diagnostic output.
//!
//! A [`Sink`] accepts two kinds of traffic: raw bytes (the stack snippet that
//! follows a report) and formatted [`Record`]s (the log line itself, carrying
//! the attribution of the call site the record belongs to). The process-wide
//! sink defaults to standard error and can be overridden with
//! [`install_sink`], which is the intended seam for tests and for embedders
//! that already own a logging pipeline.
//!
//! The process-wide slot is plain mutable state with no teardown: it is
//! installed once (or not at all) and stays valid for the life of the
//! process. Concurrent reports may interleave across threads; a single sink
//! call is the only atomicity unit this crate relies on.

use std::{
    io::{self, Write},
    sync::{Arc, OnceLock, RwLock},
    time::{SystemTime, UNIX_EPOCH},
};

/// A destination for diagnostic output.
///
/// Implementations must be safe to share across threads; the process-wide
/// sink is reached from whichever thread happens to run a cleanup path.
pub trait Sink: Send + Sync {
    /// Writes raw bytes to the destination verbatim.
    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()>;

    /// Emits one formatted log record.
    ///
    /// The sink decides how much of the record's attribution to render; see
    /// [`RecordFlags`] for the knobs the built-in stderr sink exposes.
    fn emit(&self, record: &Record<'_>) -> io::Result<()>;
}

/// One log record: a message plus the call-site attribution it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// The failure message, without a trailing newline.
    pub message: &'a str,
    /// Source file of the attributed call site, when known.
    pub file: Option<&'a str>,
    /// Line number of the attributed call site, when known.
    pub line: Option<u32>,
}

/// Controls which annotations [`StderrSink`] adds to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFlags {
    /// Prefix each record with the wall-clock time as `secs.millis` since the
    /// Unix epoch.
    pub timestamp: bool,
    /// Prefix each record with the attributed `file:line:`.
    pub source_location: bool,
}

impl RecordFlags {
    /// Timestamps on, source locations off.
    pub const DEFAULT: Self = Self {
        timestamp: true,
        source_location: false,
    };

    /// Timestamps and source locations both on.
    pub const VERBOSE: Self = Self {
        timestamp: true,
        source_location: true,
    };

    /// No annotations at all; records are the bare message.
    pub const PLAIN: Self = Self {
        timestamp: false,
        source_location: false,
    };
}

impl Default for RecordFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The default sink: records and stack snippets go to standard error.
///
/// ```
/// use deferlog::{RecordFlags, StderrSink};
///
/// // A sink that annotates every record with its call site.
/// let sink = StderrSink::new("cleanup: ", RecordFlags::VERBOSE);
/// # drop(sink);
/// ```
#[derive(Debug, Clone)]
pub struct StderrSink {
    prefix: String,
    flags: RecordFlags,
}

impl StderrSink {
    /// Creates a stderr sink with the given record prefix and flags.
    pub fn new(prefix: impl Into<String>, flags: RecordFlags) -> Self {
        Self {
            prefix: prefix.into(),
            flags,
        }
    }

    fn render(&self, record: &Record<'_>) -> String {
        let mut out = String::with_capacity(self.prefix.len() + record.message.len() + 32);
        out.push_str(&self.prefix);
        if self.flags.timestamp {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            out.push_str(&format!("{}.{:03} ", now.as_secs(), now.subsec_millis()));
        }
        if self.flags.source_location
            && let Some(file) = record.file
        {
            out.push_str(file);
            if let Some(line) = record.line {
                out.push_str(&format!(":{line}"));
            }
            out.push_str(": ");
        }
        out.push_str(record.message);
        out.push('\n');
        out
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new("", RecordFlags::DEFAULT)
    }
}

impl Sink for StderrSink {
    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        io::stderr().lock().write_all(bytes)
    }

    fn emit(&self, record: &Record<'_>) -> io::Result<()> {
        self.write_bytes(self.render(record).as_bytes())
    }
}

/// An in-memory sink for programmatic inspection of reports.
///
/// Records are written as the bare message line with no prefix or timestamp,
/// so the first line of the captured content is always the failure message.
/// Used internally by [`report_to_buffer`](crate::report_to_buffer) and
/// useful in tests together with [`install_sink`].
#[derive(Debug, Default)]
pub struct BufferSink(std::sync::Mutex<Vec<u8>>);

impl BufferSink {
    /// Creates an empty buffer sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Drains the buffer and returns its content as a string, lossily.
    pub fn take_string(&self) -> String {
        String::from_utf8_lossy(&std::mem::take(&mut *self.lock())).into_owned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        self.0.lock().expect("unable to acquire buffer sink lock")
    }
}

impl Sink for BufferSink {
    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        self.lock().extend_from_slice(bytes);
        Ok(())
    }

    fn emit(&self, record: &Record<'_>) -> io::Result<()> {
        let mut buffer = self.lock();
        buffer.extend_from_slice(record.message.as_bytes());
        buffer.push(b'\n');
        Ok(())
    }
}

static SINK: SinkSlot = SinkSlot::new();

#[repr(transparent)]
struct SinkSlot(RwLock<Option<Arc<dyn Sink>>>);

impl SinkSlot {
    const fn new() -> Self {
        Self(RwLock::new(None))
    }

    fn read(&'static self) -> Option<Arc<dyn Sink>> {
        self.0
            .read()
            .expect("unable to acquire sink lock")
            .as_ref()
            .map(Arc::clone)
    }

    fn replace(&'static self, sink: Option<Arc<dyn Sink>>) -> Option<Arc<dyn Sink>> {
        std::mem::replace(&mut *self.0.write().expect("unable to acquire sink lock"), sink)
    }
}

/// Installs `sink` as the process-wide destination for all reports.
///
/// Returns the previously installed sink, if any, so callers that only want
/// a temporary override can restore it afterwards.
pub fn install_sink(sink: Arc<dyn Sink>) -> Option<Arc<dyn Sink>> {
    SINK.replace(Some(sink))
}

/// Removes any installed sink, returning to the default stderr sink.
///
/// Returns the sink that was removed, if any.
pub fn take_sink() -> Option<Arc<dyn Sink>> {
    SINK.replace(None)
}

/// Runs `f` against the current process-wide sink.
pub(crate) fn with_current<R>(f: impl FnOnce(&dyn Sink) -> R) -> R {
    match SINK.read() {
        Some(sink) => f(&*sink),
        None => f(default_sink()),
    }
}

fn default_sink() -> &'static StderrSink {
    static DEFAULT: OnceLock<StderrSink> = OnceLock::new();
    DEFAULT.get_or_init(StderrSink::default)
}
