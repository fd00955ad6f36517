//! Structured capture of the current call stack.
//!
//! A [`StackSnapshot`] is an ordered list of resolved [`Frame`]s, most recent
//! first. Capture filters out the frames that belong to this crate and to the
//! unwinding machinery itself, so the first frame of a snapshot is always the
//! call site that triggered the report. An additional skip count removes that
//! many more logical frames, one per wrapper layer the caller wants hidden.
//!
//! Rendering writes two lines per frame: the demangled symbol, then a
//! tab-indented `file:line` location. Log-scraping tooling can rely on that
//! shape.

use std::{fmt, sync::OnceLock};

use regex::Regex;

/// A trimmed snapshot of the call stack at the moment of a report.
#[derive(Debug, Default)]
pub struct StackSnapshot {
    /// Surviving frames, ordered from most recent to oldest.
    pub frames: Vec<Frame>,
}

/// A single resolved stack frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The demangled symbol name.
    pub symbol: String,
    /// Source file from the debug information.
    pub file: String,
    /// Line number, when the debug information carries one.
    pub line: Option<u32>,
}

impl StackSnapshot {
    /// Captures the current call stack, then drops `skip` additional frames
    /// beyond the reporting machinery's own.
    ///
    /// Frames without a resolvable symbol name or source file are never
    /// included. If `skip` runs past the end of the stack, trimming stops at
    /// the end and the snapshot is empty; capture never fails.
    pub fn capture(skip: usize) -> Self {
        let mut frames: Vec<Frame> = Vec::new();
        let mut in_prologue = true;

        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                let (Some(name), Some(file)) = (symbol.name(), symbol.filename_raw()) else {
                    return;
                };
                let symbol_name = format!("{name:#}");
                if in_prologue {
                    if internal_symbol(&symbol_name) {
                        return;
                    }
                    in_prologue = false;
                }
                frames.push(Frame {
                    symbol: symbol_name,
                    file: file.to_str_lossy().into_owned(),
                    line: symbol.lineno(),
                });
            });
            true
        });

        let skip = skip.min(frames.len());
        frames.drain(..skip);
        Self { frames }
    }

    /// Returns true if no frames survived capture and trimming.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for StackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "{}", frame.symbol)?;
            write!(f, "\t{}", frame.file)?;
            if let Some(line) = frame.line {
                write!(f, ":{line}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Recognizes symbols belonging to this crate, the capture machinery, or the
/// standard library plumbing between them.
///
/// These form the prologue of every raw trace and carry no information for
/// the reader; they are skipped until the first foreign frame appears. Frames
/// from `core`/`std`/`alloc` are only dropped here in the prologue, where
/// they are adapter frames on the reporter's own path (`core::ops`,
/// `core::bool`, and friends), never in the body of the snapshot.
fn internal_symbol(symbol: &str) -> bool {
    static INTERNAL: OnceLock<Regex> = OnceLock::new();
    INTERNAL
        .get_or_init(|| {
            Regex::new(r"^(backtrace|deferlog|core|std|alloc)(::|$)")
                .expect("built-in pattern for internal symbols should be valid")
        })
        .is_match(symbol)
}
