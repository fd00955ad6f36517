//! Classification of idempotent "already closed" errors.

use std::{error::Error, io};

/// Returns true if `err` represents a resource that was already closed.
///
/// Two conditions are recognized: a closed file handle from the filesystem
/// layer, and a closed connection from the network layer. The whole
/// [`source`](Error::source) chain is walked, so an error that wraps one of
/// the recognized conditions still classifies as closed.
///
/// ```
/// use std::io;
///
/// let second_shutdown = io::Error::from(io::ErrorKind::NotConnected);
/// assert!(deferlog::is_closed(&second_shutdown));
/// assert!(!deferlog::is_closed(&io::Error::other("disk full")));
/// ```
pub fn is_closed(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(link) = current {
        if let Some(io_error) = link.downcast_ref::<io::Error>() {
            if closed_io_error(io_error) {
                return true;
            }
            // `io::Error::source()` skips the boxed payload and returns the
            // payload's source, so a wrapped `io::Error` would never be
            // visited; walk through the payload itself instead.
            current = io_error
                .get_ref()
                .map(|payload| -> &(dyn Error + 'static) { payload });
        } else {
            current = link.source();
        }
    }
    false
}

fn closed_io_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::NotConnected {
        return true;
    }
    #[cfg(unix)]
    if error.raw_os_error() == Some(EBADF) {
        return true;
    }
    #[cfg(windows)]
    if error.raw_os_error() == Some(ERROR_INVALID_HANDLE) {
        return true;
    }
    false
}

/// `EBADF`: operation on a file descriptor that is no longer open.
#[cfg(unix)]
const EBADF: i32 = 9;

/// The Win32 counterpart of a closed handle.
#[cfg(windows)]
const ERROR_INVALID_HANDLE: i32 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_closed_connection() {
        assert!(is_closed(&io::Error::from(io::ErrorKind::NotConnected)));
    }

    #[cfg(unix)]
    #[test]
    fn recognizes_closed_handle() {
        assert!(is_closed(&io::Error::from_raw_os_error(EBADF)));
    }

    #[test]
    fn rejects_other_errors() {
        assert!(!is_closed(&io::Error::other("disk full")));
        assert!(!is_closed(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[test]
    fn tolerates_wrapping() {
        #[derive(Debug, thiserror::Error)]
        #[error("shutting down listener")]
        struct Shutdown(#[source] io::Error);

        let wrapped = Shutdown(io::Error::from(io::ErrorKind::NotConnected));
        assert!(is_closed(&wrapped));

        let wrapped = Shutdown(io::Error::other("disk full"));
        assert!(!is_closed(&wrapped));
    }

    #[test]
    fn tolerates_io_error_wrapping() {
        let inner = io::Error::from(io::ErrorKind::NotConnected);
        let outer = io::Error::other(inner);
        assert!(is_closed(&outer));

        let benign = io::Error::other(io::Error::other("disk full"));
        assert!(!is_closed(&benign));
    }

    #[test]
    fn tolerates_nested_mixed_wrapping() {
        #[derive(Debug, thiserror::Error)]
        #[error("closing transport")]
        struct Transport(#[source] io::Error);

        // io wraps custom wraps io: every link must be visited.
        let chain = io::Error::other(Transport(io::Error::from(io::ErrorKind::NotConnected)));
        assert!(is_closed(&chain));

        let chain = io::Error::other(io::Error::other(io::Error::from(
            io::ErrorKind::NotConnected,
        )));
        assert!(is_closed(&chain));
    }
}
