//! Deferred invocation of arbitrary cleanup functions.
//!
//! [`invoke`] calls a function value once and inspects what it returned: a
//! failure is routed through the reporter, attributed to [`invoke`]'s caller;
//! anything else is left alone. The inspection is expressed by the
//! [`Fallible`] trait, so argument binding happens at the call site with an
//! ordinary closure and a signature mismatch is a compile error rather than
//! a runtime fault.
//!
//! ```
//! let scratch = std::env::temp_dir().join("never-created");
//! // remove_dir_all's error (if any) lands in the log; control flow continues.
//! deferlog::invoke(|| std::fs::remove_dir_all(&scratch));
//! // Return values that cannot carry a failure are simply discarded.
//! deferlog::invoke(|| "cache already cold".len());
//! ```

use core::convert::Infallible;
use std::fmt;

use crate::report::report_wrapped;

/// A return value that may carry a failure worth reporting.
///
/// Implemented for `()` (no return value at all), for `Result` (the failure
/// is the `Err` side), and for a set of plain value types whose presence in
/// trailing position never signals failure. Implement it for your own return
/// types to make them usable with [`invoke`].
pub trait Fallible {
    /// The failure carried, when there is one.
    type Failure: fmt::Display;

    /// Extracts the failure, consuming the value. `None` means success.
    fn into_failure(self) -> Option<Self::Failure>;
}

impl Fallible for () {
    type Failure = Infallible;

    fn into_failure(self) -> Option<Self::Failure> {
        None
    }
}

impl<T, E: fmt::Display> Fallible for Result<T, E> {
    type Failure = E;

    fn into_failure(self) -> Option<Self::Failure> {
        self.err()
    }
}

/// Return types that are values, not failure signals.
macro_rules! never_fails {
    ($($ty:ty),* $(,)?) => {$(
        impl Fallible for $ty {
            type Failure = Infallible;

            fn into_failure(self) -> Option<Self::Failure> {
                None
            }
        }
    )*};
}

never_fails!(bool, char, i32, i64, u32, u64, usize, f64, &str, String);

/// Calls `f` once; if its return value carries a failure, reports it
/// attributed to the caller.
///
/// Arguments are bound at the call site with a closure, so any signature
/// works without a dedicated wrapper:
///
/// ```
/// let path = std::env::temp_dir().join("session.lock");
/// deferlog::invoke(move || std::fs::remove_file(&path));
/// ```
#[track_caller]
pub fn invoke<R: Fallible>(f: impl FnOnce() -> R) {
    report_wrapped(f());
}

/// Like [`invoke`], for functions whose final parameter is a slice of
/// arguments assembled at the call site.
///
/// Equivalent to calling `f(args)` directly and inspecting the result; the
/// variant exists so variadic-style cleanup functions keep their natural
/// shape at the call site.
///
/// ```
/// fn remove_all(paths: &[&str]) -> std::io::Result<()> {
///     paths.iter().try_for_each(std::fs::remove_file)
/// }
///
/// deferlog::invoke_spread(remove_all, &[]);
/// ```
#[track_caller]
pub fn invoke_spread<A, R: Fallible>(f: impl FnOnce(&[A]) -> R, args: &[A]) {
    report_wrapped(f(args));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_and_plain_values_carry_no_failure() {
        assert!(().into_failure().is_none());
        assert!(true.into_failure().is_none());
        assert!(42usize.into_failure().is_none());
        assert!("done".into_failure().is_none());
        assert!(String::from("done").into_failure().is_none());
    }

    #[test]
    fn result_failure_is_the_err_side() {
        assert!(Ok::<u32, String>(7).into_failure().is_none());
        assert_eq!(
            Err::<u32, String>("boom".into()).into_failure().as_deref(),
            Some("boom")
        );
    }
}
